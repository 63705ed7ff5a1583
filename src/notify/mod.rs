use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::notifications as notification_db;

/// Fire-and-forget notification dispatch. Booking transitions call this and
/// move on; a failed notification must never fail the transition itself, so
/// implementations log and swallow their own errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, message: &str, link: &str);
}

/// Persists notifications so clients can poll `GET /api/notifications`.
pub struct DbNotifier {
    db: DatabaseConnection,
}

impl DbNotifier {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for DbNotifier {
    async fn notify(&self, user_id: Uuid, message: &str, link: &str) {
        if let Err(e) = notification_db::insert_notification(&self.db, user_id, message, link).await
        {
            tracing::warn!(%user_id, error = %e, "failed to record notification");
        }
    }
}
