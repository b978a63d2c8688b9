use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::service::ScheduleService;

/// Start the background materializer loop.
///
/// Every `interval_secs` it re-expands recurring patterns across all
/// offices so the forward horizon stays covered as days pass. Returns a
/// CancellationToken that stops the worker when cancelled.
pub fn start(service: Arc<ScheduleService>, interval_secs: u64) -> CancellationToken {
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        let interval = Duration::from_secs(interval_secs);

        tokio::spawn(async move {
            info!("shift materializer started (interval={interval:?})");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("shift materializer stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        debug!("materializer pass");
                        match service.materialize_all() {
                            Ok(0) => {}
                            Ok(n) => info!("materializer: generated {n} shifts"),
                            Err(e) => error!("materializer error: {e}"),
                        }
                    }
                }
            }
        });
    }

    cancel
}
