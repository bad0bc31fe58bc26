//! Daily cleanup of stale read notifications.

use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;

use crate::services::MongoDb;

const SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;
const RETENTION_DAYS: i64 = 30;

/// Spawn the background task. Unread notifications are never touched.
pub fn spawn_notification_sweeper(db: MongoDb) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(StdDuration::from_secs(SWEEP_INTERVAL_SECS));
        // Skip the immediate first tick so startup is not a sweep.
        interval.tick().await;

        loop {
            interval.tick().await;
            sweep_once(&db).await;
        }
    });
}

async fn sweep_once(db: &MongoDb) {
    let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
    match db.delete_read_notifications_before(cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Swept read notifications");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Notification sweep failed");
        }
    }
}
