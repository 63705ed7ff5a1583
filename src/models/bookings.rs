use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Booking lifecycle status stored as a lowercase string in the database.
///
/// `pending → confirmed → completed`, with `pending|confirmed → canceled`.
/// `canceled` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// SeaORM entity for the `bookings` table.
///
/// `listing_id` is deliberately not a foreign key: deleting a listing leaves
/// its bookings behind, and the booking flow must tolerate the orphan.
/// `total_price` is frozen at creation time; later listing price edits never
/// touch it. `version` is the optimistic-lock counter bumped on every status
/// update.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub guests: i32,
    #[sea_orm(column_type = "Double")]
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub payment_order_id: Option<String>,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Everything `db::bookings::insert_booking` needs; built by the
/// verify-payment handler after the signature check passes.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub guests: i32,
    pub total_price: f64,
    pub payment_id: String,
    pub payment_order_id: String,
}

/// A booked date range surfaced by `GET /listings/{id}/booked-dates`.
#[derive(Debug, Clone, Serialize)]
pub struct BookedRange {
    pub start_date: Date,
    pub end_date: Date,
}

// ── Stay arithmetic ──
//
// Stays are half-open intervals `[start, end)`: the checkout day is free for
// the next guest's check-in.

/// Half-open interval overlap: `[s1, e1)` conflicts with `[s2, e2)` iff
/// `s1 < e2 && e1 > s2`.
pub fn ranges_overlap(s1: Date, e1: Date, s2: Date, e2: Date) -> bool {
    s1 < e2 && e1 > s2
}

/// Number of nights in a stay. Callers must have validated `end > start`.
pub fn nights(start: Date, end: Date) -> i64 {
    (end - start).num_days()
}

/// Total price of a stay, frozen onto the booking at creation.
pub fn stay_total(nightly_price: f64, nights: i64) -> f64 {
    nightly_price * nights as f64
}

/// Gateway order amount in minor units (paise for INR).
pub fn amount_minor_units(total_price: f64) -> i64 {
    (total_price * 100.0).round() as i64
}

/// Validate a requested stay before any persistence or payment call.
pub fn validate_stay(start: Date, end: Date, guests: i32, today: Date) -> Result<(), ApiError> {
    if end <= start {
        return Err(ApiError::Validation(
            "check-out date must be after check-in date".to_string(),
        ));
    }
    if start < today {
        return Err(ApiError::Validation(
            "check-in date cannot be in the past".to_string(),
        ));
    }
    if guests < 1 {
        return Err(ApiError::Validation(
            "guest count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Whether canceling this booking should attempt a refund.
///
/// Only an owner-initiated cancel of a paid booking refunds; a guest canceling
/// their own stay does not (the marketplace's policy asymmetry).
pub fn refund_due(
    actor_is_listing_owner: bool,
    payment_status: PaymentStatus,
    payment_id: Option<&str>,
) -> bool {
    actor_is_listing_owner && payment_status == PaymentStatus::Paid && payment_id.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn overlap_is_half_open() {
        let s = d(2025, 3, 1);
        let e = d(2025, 3, 4);

        // Straddling ranges conflict.
        assert!(ranges_overlap(s, e, d(2025, 3, 3), d(2025, 3, 5)));
        assert!(ranges_overlap(s, e, d(2025, 2, 27), d(2025, 3, 2)));
        // Fully contained and containing ranges conflict.
        assert!(ranges_overlap(s, e, d(2025, 3, 2), d(2025, 3, 3)));
        assert!(ranges_overlap(s, e, d(2025, 2, 1), d(2025, 4, 1)));
        // Back-to-back stays do not: checkout day equals the next check-in.
        assert!(!ranges_overlap(s, e, d(2025, 3, 4), d(2025, 3, 6)));
        assert!(!ranges_overlap(s, e, d(2025, 2, 25), d(2025, 3, 1)));
        // Disjoint ranges do not.
        assert!(!ranges_overlap(s, e, d(2025, 3, 10), d(2025, 3, 12)));
    }

    #[test]
    fn three_night_stay_at_100_per_night() {
        let start = d(2025, 3, 1);
        let end = d(2025, 3, 4);
        let n = nights(start, end);
        assert_eq!(n, 3);
        let total = stay_total(100.0, n);
        assert_eq!(total, 300.0);
        assert_eq!(amount_minor_units(total), 30000);
    }

    #[test]
    fn validate_rejects_inverted_and_empty_ranges() {
        let today = d(2025, 1, 1);
        assert!(validate_stay(d(2025, 3, 4), d(2025, 3, 1), 2, today).is_err());
        assert!(validate_stay(d(2025, 3, 1), d(2025, 3, 1), 2, today).is_err());
        assert!(validate_stay(d(2025, 3, 1), d(2025, 3, 4), 2, today).is_ok());
    }

    #[test]
    fn validate_rejects_past_checkin_and_zero_guests() {
        let today = d(2025, 3, 2);
        assert!(validate_stay(d(2025, 3, 1), d(2025, 3, 4), 2, today).is_err());
        assert!(validate_stay(d(2025, 3, 2), d(2025, 3, 4), 0, today).is_err());
        assert!(validate_stay(d(2025, 3, 2), d(2025, 3, 4), 1, today).is_ok());
    }

    #[test]
    fn refund_only_for_owner_cancel_of_paid_booking() {
        assert!(refund_due(true, PaymentStatus::Paid, Some("pay_1")));
        // Guest canceling their own booking never refunds automatically.
        assert!(!refund_due(false, PaymentStatus::Paid, Some("pay_1")));
        // Nothing to refund without a captured payment.
        assert!(!refund_due(true, PaymentStatus::Pending, Some("pay_1")));
        assert!(!refund_due(true, PaymentStatus::Refunded, Some("pay_1")));
        assert!(!refund_due(true, PaymentStatus::Paid, None));
    }
}
