use enigo::{Enigo, MouseButton, MouseControllable};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// "Perform one click now."
///
/// Implementations must return quickly and swallow their own failures; the
/// scheduler treats a click as infallible.
pub trait ClickAction: Send + Sync {
    fn click(&self);
}

static ENIGO: Lazy<Mutex<Enigo>> = Lazy::new(|| Mutex::new(Enigo::new()));

/// Left click at the current cursor position through `enigo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnigoClicker;

impl EnigoClicker {
    pub fn new() -> Self {
        Self
    }
}

impl ClickAction for EnigoClicker {
    fn click(&self) {
        ENIGO.lock().mouse_click(MouseButton::Left);
    }
}

/// Counts clicks without injecting any input.
///
/// Used by tests and by dry runs.
#[derive(Debug, Default)]
pub struct NoopClicker {
    clicks: AtomicU64,
}

impl NoopClicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::SeqCst)
    }
}

impl ClickAction for NoopClicker {
    fn click(&self) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        tracing::trace!("noop click");
    }
}
