use std::fmt;
use std::time::Duration;

/// Lowest accepted rate, in clicks per second.
pub const MIN_CPS: f64 = 1.0;

/// Highest accepted rate, in clicks per second.
///
/// The effective rate is still capped by [`MIN_DELAY_SECS`]; anything above
/// 1000 CPS is accepted but sleeps for the floor interval.
pub const MAX_CPS: f64 = 10_000.0;

/// Inter-click delay used when nothing has been persisted (10 CPS).
pub const DEFAULT_DELAY_SECS: f64 = 0.1;

/// Floor applied to every sleep between clicks and to loaded delays.
pub const MIN_DELAY_SECS: f64 = 0.001;

/// Number of one-second steps between Start and the first click.
pub const DEFAULT_COUNTDOWN_STEPS: u32 = 5;

/// Status shown before any command has run.
pub const INITIAL_STATUS: &str = "Ready";

/// Click rate, stored as the delay between two clicks.
///
/// Construct through [`ClickRate::from_cps`] for user input (range checked)
/// or [`ClickRate::from_delay_secs`] for persisted values (floor applied).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickRate {
    delay_secs: f64,
}

impl ClickRate {
    /// Build a rate from a clicks-per-second value.
    ///
    /// Returns `None` when `cps` is outside `[MIN_CPS, MAX_CPS]` or not finite.
    pub fn from_cps(cps: f64) -> Option<Self> {
        if (MIN_CPS..=MAX_CPS).contains(&cps) {
            Some(Self {
                delay_secs: 1.0 / cps,
            })
        } else {
            None
        }
    }

    /// Build a rate from a stored delay, clamping it to [`MIN_DELAY_SECS`].
    ///
    /// Returns `None` for non-finite or non-positive delays.
    pub fn from_delay_secs(delay_secs: f64) -> Option<Self> {
        if delay_secs.is_finite() && delay_secs > 0.0 {
            Some(Self {
                delay_secs: delay_secs.max(MIN_DELAY_SECS),
            })
        } else {
            None
        }
    }

    /// Raw delay between clicks in seconds.
    pub fn delay_secs(&self) -> f64 {
        self.delay_secs
    }

    /// Sleep interval actually used by the click cycle.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs.max(MIN_DELAY_SECS))
    }

    /// Clicks per second implied by the stored delay.
    pub fn cps(&self) -> f64 {
        1.0 / self.delay_secs
    }

    /// Clicks per second rounded half-to-even for display.
    pub fn display_cps(&self) -> u64 {
        self.cps().round_ties_even() as u64
    }
}

impl Default for ClickRate {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_DELAY_SECS,
        }
    }
}

/// Phase of the clicking state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClickingState {
    #[default]
    Idle,
    Countdown {
        remaining: u32,
    },
    Running,
}

impl ClickingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// True while a countdown or click cycle is in flight.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl fmt::Display for ClickingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Countdown { remaining } => write!(f, "Countdown ({remaining})"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Display preference. Dark is the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human readable mode name, e.g. "Dark Mode".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dark => "Dark Mode",
            Self::Light => "Light Mode",
        }
    }

    /// Window background as `0xRRGGBB`.
    pub fn background_rgb(&self) -> u32 {
        match self {
            Self::Dark => 0x1E1E1E,
            Self::Light => 0xF0F0F0,
        }
    }

    /// Text colour as `0xRRGGBB`.
    pub fn foreground_rgb(&self) -> u32 {
        match self {
            Self::Dark => 0xFFFFFF,
            Self::Light => 0x000000,
        }
    }
}

/// Single source of truth for the clicker.
///
/// # Thread Safety
///
/// `AppState` is owned by [`crate::state::StateManager`], which guards it
/// with a lock and emits [`crate::state::StateChange`] events. The command
/// context and the clicking task both go through the manager; nothing holds
/// a reference to `AppState` across a suspension point.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub theme: Theme,
    pub rate: ClickRate,
    pub clicking: ClickingState,
    pub status: String,

    /// Generation of the current (or last) Start; lets a clicking task tell
    /// whether the state it is about to touch still belongs to it.
    pub run_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            rate: ClickRate::default(),
            clicking: ClickingState::Idle,
            status: INITIAL_STATUS.to_string(),
            run_id: 0,
        }
    }
}

impl AppState {
    /// Label shown next to the rate, e.g. "Clicks Per Second (1 - 1000): 10".
    pub fn rate_label(&self) -> String {
        format!("Clicks Per Second (1 - 1000): {}", self.rate.display_cps())
    }

    /// Label shown next to the theme toggle, e.g. "Current Mode: Dark Mode".
    pub fn mode_label(&self) -> String {
        format!("Current Mode: {}", self.theme.label())
    }

    /// Status line as rendered, e.g. "Status: Ready".
    pub fn status_line(&self) -> String {
        format!("Status: {}", self.status)
    }

    /// True when `run_id` is the current run and the machine is still active.
    pub fn owns_run(&self, run_id: u64) -> bool {
        self.run_id == run_id && self.clicking.is_active()
    }
}
