// ==================== BLACKLIST SWEEPER ====================
// Drops revoked tokens whose natural expiry has passed. On MongoDB the TTL
// index already does this; the sweep covers the in-memory backend and any
// TTL monitor lag.

use crate::repository::TokenBlacklist;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

pub fn start_blacklist_sweeper(blacklist: Arc<dyn TokenBlacklist>, every_secs: u64) {
    log::info!("🧹 Starting blacklist sweeper (every {}s)", every_secs);

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(every_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            sweep_once(blacklist.as_ref()).await;
        }
    });
}

async fn sweep_once(blacklist: &dyn TokenBlacklist) -> u64 {
    match blacklist.purge_expired().await {
        Ok(0) => {
            log::debug!("🧹 Blacklist sweep: nothing expired");
            0
        }
        Ok(count) => {
            log::info!("🧹 Blacklist sweep removed {} expired token(s)", count);
            count
        }
        Err(e) => {
            log::error!("❌ Blacklist sweep failed: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryBlacklist;
    use chrono::Utc;

    #[tokio::test]
    async fn sweep_reports_removed_entries() {
        let blacklist = MemoryBlacklist::new();
        blacklist.revoke("live", Utc::now() + chrono::Duration::hours(1)).await.unwrap();
        blacklist.revoke("stale", Utc::now() - chrono::Duration::minutes(1)).await.unwrap();

        assert_eq!(sweep_once(&blacklist).await, 1);
        assert_eq!(sweep_once(&blacklist).await, 0);
        assert_eq!(blacklist.len(), 1);
    }
}
