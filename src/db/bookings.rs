use sea_orm::entity::prelude::Date;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::*;
use uuid::Uuid;

use crate::models::bookings::{
    self, BookedRange, BookingStatus, CreateBooking, PaymentStatus,
};

/// Name of the Postgres exclusion constraint that forbids two non-canceled
/// bookings of the same listing with overlapping `[start, end)` ranges.
/// Inserts that lose the availability race fail against it.
pub const NO_OVERLAP_CONSTRAINT: &str = "bookings_no_overlap";

/// Insert a booking at `pending`/`paid`. The overlap exclusion constraint
/// makes this the authoritative availability check: if a concurrent request
/// slipped in between the advisory check and this write, the insert itself
/// fails and `is_overlap_violation` identifies it.
pub async fn insert_booking(
    db: &DatabaseConnection,
    input: CreateBooking,
) -> Result<bookings::Model, DbErr> {
    let new_booking = bookings::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        listing_id: Set(input.listing_id),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        guests: Set(input.guests),
        total_price: Set(input.total_price),
        status: Set(BookingStatus::Pending),
        payment_status: Set(PaymentStatus::Paid),
        payment_id: Set(Some(input.payment_id)),
        payment_order_id: Set(Some(input.payment_order_id)),
        version: Set(0),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_booking.insert(db).await
}

/// Whether a `DbErr` came from the overlap exclusion constraint.
pub fn is_overlap_violation(err: &DbErr) -> bool {
    err.to_string().contains(NO_OVERLAP_CONSTRAINT)
}

/// Advisory conflict probe: does any non-canceled booking of this listing
/// overlap `[start, end)`? Two ranges conflict iff `s1 < e2 AND e1 > s2`.
pub async fn find_conflicting(
    db: &DatabaseConnection,
    listing_id: Uuid,
    start: Date,
    end: Date,
) -> Result<Option<bookings::Model>, DbErr> {
    bookings::Entity::find()
        .filter(bookings::Column::ListingId.eq(listing_id))
        .filter(bookings::Column::Status.ne(BookingStatus::Canceled))
        .filter(bookings::Column::StartDate.lt(end))
        .filter(bookings::Column::EndDate.gt(start))
        .one(db)
        .await
}

/// Fetch a single booking by ID.
pub async fn get_booking_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<bookings::Model>, DbErr> {
    bookings::Entity::find_by_id(id).one(db).await
}

/// Fetch all bookings made by a user, newest first.
pub async fn get_bookings_by_user_id(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<bookings::Model>, DbErr> {
    bookings::Entity::find()
        .filter(bookings::Column::UserId.eq(user_id))
        .order_by_desc(bookings::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch all bookings across a set of listings (an owner's portfolio),
/// newest first.
pub async fn get_bookings_for_listings(
    db: &DatabaseConnection,
    listing_ids: Vec<Uuid>,
) -> Result<Vec<bookings::Model>, DbErr> {
    if listing_ids.is_empty() {
        return Ok(Vec::new());
    }
    bookings::Entity::find()
        .filter(bookings::Column::ListingId.is_in(listing_ids))
        .order_by_desc(bookings::Column::CreatedAt)
        .all(db)
        .await
}

/// Date ranges of non-canceled bookings for a listing, for client calendars.
pub async fn get_booked_ranges(
    db: &DatabaseConnection,
    listing_id: Uuid,
) -> Result<Vec<BookedRange>, DbErr> {
    let rows = bookings::Entity::find()
        .filter(bookings::Column::ListingId.eq(listing_id))
        .filter(bookings::Column::Status.ne(BookingStatus::Canceled))
        .order_by_asc(bookings::Column::StartDate)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|b| BookedRange {
            start_date: b.start_date,
            end_date: b.end_date,
        })
        .collect())
}

/// Guarded status transition:
/// `UPDATE ... WHERE id = ? AND version = ? AND status = ?`.
///
/// Returns the refreshed row, or `None` when a concurrent writer got there
/// first (the caller translates that into a conflict instead of overwriting
/// the other actor's transition). The current-status predicate backs up the
/// version check: a terminal row can never be flipped back even if a caller
/// somehow holds a matching version.
pub async fn update_status_guarded(
    db: &DatabaseConnection,
    id: Uuid,
    expected_version: i32,
    expected_status: BookingStatus,
    new_status: BookingStatus,
    new_payment_status: Option<PaymentStatus>,
) -> Result<Option<bookings::Model>, DbErr> {
    let mut update = bookings::Entity::update_many()
        .col_expr(bookings::Column::Status, Expr::value(new_status))
        .col_expr(
            bookings::Column::Version,
            Expr::col(bookings::Column::Version).add(1),
        )
        .col_expr(
            bookings::Column::UpdatedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(bookings::Column::Id.eq(id))
        .filter(bookings::Column::Version.eq(expected_version))
        .filter(bookings::Column::Status.eq(expected_status));

    if let Some(payment_status) = new_payment_status {
        update = update.col_expr(bookings::Column::PaymentStatus, Expr::value(payment_status));
    }

    let result = update.exec(db).await?;
    if result.rows_affected == 0 {
        return Ok(None);
    }

    get_booking_by_id(db, id).await
}

/// Hard-delete a booking.
pub async fn delete_booking(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    bookings::Entity::delete_by_id(id).exec(db).await
}

/// Sweep step (a): pending bookings whose stay has ended are auto-canceled.
/// The status predicate makes re-runs no-ops. The sweep bumps `version` like
/// every other writer, so a guarded update loaded before the sweep ran can no
/// longer resurrect the row.
pub async fn auto_cancel_overdue_pending(
    db: &DatabaseConnection,
    today: Date,
) -> Result<u64, DbErr> {
    let result = bookings::Entity::update_many()
        .col_expr(bookings::Column::Status, Expr::value(BookingStatus::Canceled))
        .col_expr(
            bookings::Column::Version,
            Expr::col(bookings::Column::Version).add(1),
        )
        .col_expr(
            bookings::Column::UpdatedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(bookings::Column::Status.eq(BookingStatus::Pending))
        .filter(bookings::Column::EndDate.lt(today))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Sweep step (b): confirmed bookings whose stay has ended are auto-completed.
pub async fn auto_complete_overdue_confirmed(
    db: &DatabaseConnection,
    today: Date,
) -> Result<u64, DbErr> {
    let result = bookings::Entity::update_many()
        .col_expr(
            bookings::Column::Status,
            Expr::value(BookingStatus::Completed),
        )
        .col_expr(
            bookings::Column::Version,
            Expr::col(bookings::Column::Version).add(1),
        )
        .col_expr(
            bookings::Column::UpdatedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(bookings::Column::Status.eq(BookingStatus::Confirmed))
        .filter(bookings::Column::EndDate.lt(today))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec_ok(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn overdue_transitions_bump_the_version_counter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok(1), exec_ok(1)])
            .into_connection();

        let today = chrono::Utc::now().date_naive();
        auto_cancel_overdue_pending(&db, today).await.unwrap();
        auto_complete_overdue_confirmed(&db, today).await.unwrap();

        // Both updates must write the version column, otherwise a stale
        // guarded confirm/cancel could still match after the sweep ran.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        for txn in log {
            let sql = format!("{txn:?}");
            assert!(
                sql.contains(r#"\"version\""#),
                "sweep update must bump version: {sql}"
            );
        }
    }

    #[tokio::test]
    async fn guarded_update_filters_on_version_and_current_status() {
        let model = bookings::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            guests: 2,
            total_price: 300.0,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            payment_id: Some("pay_1".to_string()),
            payment_order_id: Some("order_1".to_string()),
            version: 1,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok(1)])
            .append_query_results([[model.clone()]])
            .into_connection();

        let updated = update_status_guarded(
            &db,
            model.id,
            0,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            None,
        )
        .await
        .unwrap();
        assert!(updated.is_some());

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains(r#"\"version\""#));
        assert!(sql.contains("pending"));
    }

    #[tokio::test]
    async fn guarded_update_reports_a_lost_race_as_none() {
        // Zero rows matched: another writer (or the sweep) already moved the
        // booking on. No follow-up fetch happens.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok(0)])
            .into_connection();

        let updated = update_status_guarded(
            &db,
            Uuid::new_v4(),
            0,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            None,
        )
        .await
        .unwrap();
        assert!(updated.is_none());
    }
}
