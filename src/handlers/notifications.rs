use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::notifications as notification_db;
use crate::error::ApiError;

/// GET /api/notifications — the caller's notifications, newest first.
pub async fn get_notifications(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let notifications =
        notification_db::get_notifications_for_user(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// PATCH /api/notifications/{id}/read — mark one of the caller's own
/// notifications as read.
pub async fn mark_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let affected = notification_db::mark_read(db.get_ref(), id, user.0.id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("Notification {id} not found")));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

/// DELETE /api/notifications/{id} — delete one of the caller's own
/// notifications.
pub async fn delete_notification(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let result = notification_db::delete_notification(db.get_ref(), id, user.0.id).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound(format!("Notification {id} not found")));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
