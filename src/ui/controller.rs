// GUI Controller - Wires the Slint window to the clicking core
//
// The window never touches state directly. Button presses become
// CommandDispatcher calls; state comes back through SlintPresenter, which
// copies a snapshot onto the window via the EventLoopBridge.

use crate::metrics::Metrics;
use crate::models::{AppState, Theme};
use crate::services::{ClickScheduler, CommandDispatcher, Presenter};
use crate::state::StateManager;
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread::JoinHandle;

// Include the generated Slint code
slint::include_modules!();

fn to_color(rgb: u32) -> slint::Color {
    slint::Color::from_rgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Everything the window shows, derived from one snapshot
#[derive(Debug, Clone, PartialEq)]
struct WindowView {
    rate_label: String,
    mode_label: String,
    status_text: String,
    is_active: bool,
    background: u32,
    foreground: u32,
}

impl WindowView {
    fn from_state(state: &AppState) -> Self {
        Self {
            rate_label: state.rate_label(),
            mode_label: state.mode_label(),
            status_text: state.status_line(),
            is_active: state.clicking.is_active(),
            background: state.theme.background_rgb(),
            foreground: state.theme.foreground_rgb(),
        }
    }

    fn apply(self, ui: &MainWindow) {
        ui.set_rate_label(self.rate_label.into());
        ui.set_mode_label(self.mode_label.into());
        ui.set_status_text(self.status_text.into());
        ui.set_is_active(self.is_active);
        ui.set_surface_color(to_color(self.background));
        ui.set_text_color(to_color(self.foreground));
    }
}

/// [`Presenter`] that draws onto the Slint window
///
/// Safe to call from any thread; updates are queued onto the event loop.
pub struct SlintPresenter {
    bridge: EventLoopBridgeHandle<MainWindow>,
}

impl SlintPresenter {
    pub fn new(bridge: EventLoopBridgeHandle<MainWindow>) -> Self {
        Self { bridge }
    }
}

impl Presenter for SlintPresenter {
    fn render(&self, snapshot: &AppState) {
        let view = WindowView::from_state(snapshot);
        tracing::trace!("Rendering {:?}", view);
        self.bridge.update_ui(move |ui| view.apply(ui));
    }

    fn recolor_background(&self, theme: Theme) {
        let background = to_color(theme.background_rgb());
        let foreground = to_color(theme.foreground_rgb());
        self.bridge.update_ui(move |ui| {
            ui.set_surface_color(background);
            ui.set_text_color(foreground);
        });
    }
}

/// GUI Controller that owns the window and its dispatcher
///
/// # Example
/// ```ignore
/// let controller = GuiController::new(state, scheduler, metrics)?;
/// let dispatcher = controller.dispatcher();
/// controller.run()?;  // Blocks until window is closed
/// dispatcher.shutdown();
/// ```
pub struct GuiController {
    ui: MainWindow,

    /// Keeps the update handler thread alive
    _bridge: EventLoopBridge<MainWindow>,

    /// Redraws on changes made by the clicking task; lives as long as the process
    _render_listener: JoinHandle<()>,

    dispatcher: Arc<CommandDispatcher>,
}

impl GuiController {
    /// Create the window, wire its callbacks and paint the first frame
    pub fn new(
        state: StateManager,
        scheduler: Arc<ClickScheduler>,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        let bridge = EventLoopBridge::new(&ui);

        let presenter: Arc<dyn Presenter> = Arc::new(SlintPresenter::new(bridge.clone_handle()));
        let dispatcher = Arc::new(CommandDispatcher::new(state, scheduler, presenter, metrics));

        Self::setup_callbacks(&ui, &dispatcher);

        // Countdown ticks and the switch to Running arrive from the clicking task
        let render_listener = dispatcher.spawn_render_listener();

        dispatcher.refresh();

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            _render_listener: render_listener,
            dispatcher,
        })
    }

    /// Shared handle to the dispatcher, usable after [`GuiController::run`]
    pub fn dispatcher(&self) -> Arc<CommandDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Run the GUI (blocks until window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    fn setup_callbacks(ui: &MainWindow, dispatcher: &Arc<CommandDispatcher>) {
        let d = Arc::clone(dispatcher);
        ui.on_set_cps_confirmed(move |text| {
            tracing::debug!("Rate prompt confirmed with {:?}", text.as_str());
            let _ = d.set_rate(Some(text.as_str()));
        });

        let d = Arc::clone(dispatcher);
        ui.on_set_cps_cancelled(move || {
            tracing::debug!("Rate prompt dismissed");
            let _ = d.set_rate(None);
        });

        let d = Arc::clone(dispatcher);
        ui.on_toggle_theme(move || {
            d.toggle_theme();
        });

        let d = Arc::clone(dispatcher);
        ui.on_start_clicking(move || {
            tracing::info!("Start button clicked");
            d.start();
        });

        let d = Arc::clone(dispatcher);
        ui.on_stop_clicking(move || {
            tracing::info!("Stop button clicked");
            d.stop();
        });
    }
}
