use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::notifications;

/// Insert an unread notification for a user.
pub async fn insert_notification(
    db: &DatabaseConnection,
    user_id: Uuid,
    message: &str,
    link: &str,
) -> Result<notifications::Model, DbErr> {
    let new_notification = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        message: Set(message.to_string()),
        link: Set(link.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    new_notification.insert(db).await
}

/// Fetch a user's notifications, newest first.
pub async fn get_notifications_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .all(db)
        .await
}

/// Mark one of the user's notifications as read. Scoped to the owner so one
/// user cannot touch another's notifications.
pub async fn mark_read(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<u64, DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::Id.eq(id))
        .filter(notifications::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Delete one of the user's notifications, scoped to the owner.
pub async fn delete_notification(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<DeleteResult, DbErr> {
    notifications::Entity::delete_many()
        .filter(notifications::Column::Id.eq(id))
        .filter(notifications::Column::UserId.eq(user_id))
        .exec(db)
        .await
}
