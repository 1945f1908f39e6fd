use std::{sync::Arc, time::Duration as StdDuration};

use chrono::Duration;
use server_api::ApiContext;
use session_store::SessionStore;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
}

/// Periodically drops sessions idle for longer than `ttl`.
pub(crate) fn spawn_session_sweeper(
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    every: StdDuration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl);
            if evicted > 0 {
                info!(evicted, remaining = store.len(), "evicted idle sessions");
            }
        }
    })
}
