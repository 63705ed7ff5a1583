use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Bookings {
    Table,
    UserId,
    ListingId,
    Status,
    EndDate,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    UserId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // My-bookings listing.
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_id")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        // Availability probes and owner dashboards.
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_listing_id")
                    .table(Bookings::Table)
                    .col(Bookings::ListingId)
                    .to_owned(),
            )
            .await?;

        // Sweep predicates: status + end_date.
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status_end_date")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_created")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_notifications_user_created")
                    .table(Notifications::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_bookings_status_end_date")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_bookings_listing_id")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_bookings_user_id")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await
    }
}
