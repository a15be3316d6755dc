use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::config::ExportConfig;
use crate::export::{
    FlatImage,
    dependencies::ExportDependencies,
    file::FileSaveConfig,
    pipeline::{ExportRequest, perform_export},
    types::{ExportError, ExportOutcome},
};
use crate::geometry::MonitorId;

/// Runs exports on the Tokio runtime and hands outcomes back to the loop.
///
/// Requests are processed one at a time in order. The loop polls
/// [`try_take_outcome`](Self::try_take_outcome) after the waker pings.
pub struct ExportManager {
    request_tx: mpsc::UnboundedSender<ExportRequest>,
    last_outcome: Arc<Mutex<Option<ExportOutcome>>>,
    waker: Arc<std::sync::Mutex<Option<calloop::ping::Ping>>>,
}

impl ExportManager {
    pub fn new(runtime_handle: &tokio::runtime::Handle) -> Self {
        Self::with_dependencies(runtime_handle, ExportDependencies::default())
    }

    /// Create an export manager with custom dependencies (useful for testing).
    pub fn with_dependencies(
        runtime_handle: &tokio::runtime::Handle,
        dependencies: ExportDependencies,
    ) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ExportRequest>();
        let last_outcome = Arc::new(Mutex::new(None));
        let waker: Arc<std::sync::Mutex<Option<calloop::ping::Ping>>> =
            Arc::new(std::sync::Mutex::new(None));
        let dependencies = Arc::new(dependencies);

        let outcome_slot = Arc::clone(&last_outcome);
        let worker_waker = Arc::clone(&waker);

        runtime_handle.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                log::debug!("Processing {:?}", request);
                let notify = request.notify;

                let outcome = match perform_export(request, Arc::clone(&dependencies)).await {
                    Ok(result) => {
                        log::info!("Export finished: {}", result.summary());
                        if notify {
                            dependencies
                                .notifier
                                .notify("Annotations exported", &result.summary())
                                .await;
                        }
                        ExportOutcome::Success(result)
                    }
                    Err(e) => {
                        let message = e.to_string();
                        log::error!("Export failed: {}", message);
                        if notify {
                            dependencies.notifier.notify("Export failed", &message).await;
                        }
                        ExportOutcome::Failed(message)
                    }
                };

                *outcome_slot.lock().await = Some(outcome);
                if let Ok(guard) = worker_waker.lock()
                    && let Some(ping) = guard.as_ref()
                {
                    ping.ping();
                }
            }
        });

        Self {
            request_tx,
            last_outcome,
            waker,
        }
    }

    /// Ping used to wake the event loop when an export finishes.
    pub fn set_waker(&self, ping: calloop::ping::Ping) {
        if let Ok(mut guard) = self.waker.lock() {
            *guard = Some(ping);
        }
    }

    /// Queues an export of `image` using the delivery options in `config`.
    ///
    /// Returns immediately. An empty `save_directory` skips saving.
    pub fn request_export(
        &self,
        monitor: MonitorId,
        image: FlatImage,
        config: &ExportConfig,
    ) -> Result<(), ExportError> {
        let save = FileSaveConfig::from_config(config);
        if save.is_none() && !config.copy_to_clipboard {
            log::warn!("Export has no destination: clipboard is off and save_directory is empty");
        }

        let request = ExportRequest {
            monitor,
            image,
            copy_to_clipboard: config.copy_to_clipboard,
            save,
            notify: config.notify,
        };
        self.request_tx
            .send(request)
            .map_err(|_| ExportError::WorkerGone)
    }

    /// Takes the latest outcome without blocking.
    pub fn try_take_outcome(&self) -> Option<ExportOutcome> {
        self.last_outcome.try_lock().ok().and_then(|mut slot| slot.take())
    }

    #[cfg(test)]
    pub(crate) async fn take_outcome(&self) -> Option<ExportOutcome> {
        self.last_outcome.lock().await.take()
    }
}

#[cfg(test)]
impl ExportManager {
    pub(crate) fn with_closed_channel_for_test() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<ExportRequest>();
        drop(rx);
        Self {
            request_tx: tx,
            last_outcome: Arc::new(Mutex::new(None)),
            waker: Arc::new(std::sync::Mutex::new(None)),
        }
    }
}
