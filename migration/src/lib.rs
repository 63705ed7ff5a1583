pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_users_table;
mod m20250801_000002_create_listings_table;
mod m20250801_000003_create_bookings_table;
mod m20250801_000004_create_notifications_table;
mod m20250805_000001_add_booking_overlap_exclusion;
mod m20250812_000001_add_booking_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_users_table::Migration),
            Box::new(m20250801_000002_create_listings_table::Migration),
            Box::new(m20250801_000003_create_bookings_table::Migration),
            Box::new(m20250801_000004_create_notifications_table::Migration),
            Box::new(m20250805_000001_add_booking_overlap_exclusion::Migration),
            Box::new(m20250812_000001_add_booking_indexes::Migration),
        ]
    }
}
