use std::time::Duration;

use conversion_engine::traits::KeyValueStore;
use log::*;
use tokio::task::JoinHandle;

pub const DEFAULT_EXPIRY_PERIOD: Duration = Duration::from_secs(60);

/// Starts the store expiry worker, which deletes expired dedup markers and attribution records every `period`.
/// Reads already ignore expired entries, so this only keeps the store small. Do not await the returned JoinHandle, as
/// it will run indefinitely.
pub fn start_expiry_worker<S>(store: S, period: Duration) -> JoinHandle<()>
where S: KeyValueStore + 'static {
    actix_web::rt::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Store expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running store expiry job");
            match store.purge_expired().await {
                Ok(0) => trace!("🕰️ Nothing expired"),
                Ok(count) => info!("🕰️ {count} expired store entries removed"),
                Err(e) => error!("🕰️ Error running the store expiry job: {e}"),
            }
        }
    })
}
