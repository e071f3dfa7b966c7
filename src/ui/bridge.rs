// EventLoopBridge - Marshals UI updates onto the Slint event loop
//
// Slint components may only be touched from the thread running the event loop.
// The clicking task and the render listener live elsewhere (tokio workers and a
// plain std thread), so every window update is queued here and replayed on the
// event loop via upgrade_in_event_loop.

use slint::ComponentHandle;
use tokio::sync::mpsc;

/// Capacity of the pending update queue
const UPDATE_QUEUE_CAPACITY: usize = 100;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Queue an update, dropping it if the queue is full or closed
///
/// Returns whether the update was queued.
fn enqueue<T>(tx: &mpsc::Sender<UiUpdate<T>>, update: UiUpdate<T>) -> bool {
    match tx.try_send(update) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!("UI update channel full - skipping update");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - handler thread has stopped");
            false
        }
    }
}

/// Owns the handler thread that forwards queued updates to the event loop
///
/// # Example
/// ```ignore
/// let ui = MainWindow::new()?;
/// let bridge = EventLoopBridge::new(&ui);
///
/// // From any thread
/// let handle = bridge.clone_handle();
/// handle.update_ui(|ui| ui.set_status_text("Clicking started!".into()));
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create the bridge and start its handler thread
    ///
    /// The thread exits once the event loop stops accepting work or every
    /// sender is dropped.
    pub fn new(ui: &T) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(UPDATE_QUEUE_CAPACITY);

        std::thread::spawn(move || {
            tracing::debug!("EventLoopBridge handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                let result = ui_weak.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("EventLoopBridge handler thread terminated");
        });

        Self { ui_update_tx }
    }

    /// Cloneable handle for presenters and callbacks
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

/// Cloneable sender side of [`EventLoopBridge`]
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a UI update from any thread
    ///
    /// The update runs on the next event loop iteration.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        enqueue(&self.ui_update_tx, Box::new(update));
    }
}
