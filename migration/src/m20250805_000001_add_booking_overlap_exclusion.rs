use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Closes the double-booking race at the database level.
///
/// Two non-canceled bookings of the same listing must never hold overlapping
/// `[start_date, end_date)` ranges. An availability pre-check alone cannot
/// guarantee that: two concurrent requests can both pass it before either
/// row is written. The exclusion constraint makes the insert itself the
/// authoritative check — `daterange(..)` is half-open by default, so
/// back-to-back stays (checkout day == next check-in) remain bookable.
///
/// Also adds a CHECK that every stay is non-empty.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist")
            .await?;

        db.execute_unprepared(
            "ALTER TABLE bookings ADD CONSTRAINT chk_bookings_stay_nonempty \
             CHECK (end_date > start_date)",
        )
        .await?;

        db.execute_unprepared(
            "ALTER TABLE bookings ADD CONSTRAINT bookings_no_overlap \
             EXCLUDE USING gist ( \
                 listing_id WITH =, \
                 daterange(start_date, end_date) WITH && \
             ) WHERE (status <> 'canceled')",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("ALTER TABLE bookings DROP CONSTRAINT IF EXISTS bookings_no_overlap")
            .await?;
        db.execute_unprepared(
            "ALTER TABLE bookings DROP CONSTRAINT IF EXISTS chk_bookings_stay_nonempty",
        )
        .await?;

        Ok(())
    }
}
