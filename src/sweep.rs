//! Periodic booking expiry.
//!
//! Pending bookings whose stay has ended are auto-canceled (the owner never
//! confirmed them); confirmed ones past their end date are auto-completed.
//! Both updates carry a status predicate, so re-running over already
//! transitioned rows is a no-op.

use sea_orm::{DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::{error, info};

use crate::db::bookings as booking_db;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub auto_canceled: u64,
    pub auto_completed: u64,
}

/// One sweep pass over the bookings table.
pub async fn run_once(db: &DatabaseConnection) -> Result<SweepOutcome, DbErr> {
    let today = chrono::Utc::now().date_naive();

    let auto_canceled = booking_db::auto_cancel_overdue_pending(db, today).await?;
    let auto_completed = booking_db::auto_complete_overdue_confirmed(db, today).await?;

    Ok(SweepOutcome {
        auto_canceled,
        auto_completed,
    })
}

/// Spawn the sweep loop: one pass immediately, then one per interval, forever.
/// A failed pass is logged and the loop keeps going; nothing here can take the
/// host process down.
pub fn spawn(db: DatabaseConnection, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            // First tick fires immediately, giving the startup pass.
            ticker.tick().await;
            match run_once(&db).await {
                Ok(outcome) => {
                    if outcome.auto_canceled > 0 || outcome.auto_completed > 0 {
                        info!(
                            auto_canceled = outcome.auto_canceled,
                            auto_completed = outcome.auto_completed,
                            "booking sweep applied transitions"
                        );
                    }
                }
                Err(e) => {
                    error!(error = %e, "booking sweep failed; will retry next interval");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn sweep_reports_rows_touched_by_each_step() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                // pending -> canceled
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                },
                // confirmed -> completed
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let outcome = run_once(&db).await.unwrap();
        assert_eq!(
            outcome,
            SweepOutcome {
                auto_canceled: 3,
                auto_completed: 1,
            }
        );
    }

    #[tokio::test]
    async fn sweep_is_a_no_op_when_nothing_is_overdue() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let outcome = run_once(&db).await.unwrap();
        assert_eq!(outcome.auto_canceled, 0);
        assert_eq!(outcome.auto_completed, 0);
    }
}
