use std::{sync::Arc, time::Duration};

use log::*;
use tokio::task::JoinHandle;

use crate::sessions::SessionStore;

pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(300);

/// Starts the session reaper. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_session_reaper(sessions: Arc<dyn SessionStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Session reaper started");
        loop {
            timer.tick().await;
            let count = sessions.evict_expired();
            if count > 0 {
                info!("🕰️ {count} expired sessions removed");
            } else {
                trace!("🕰️ No expired sessions to remove");
            }
        }
    })
}
