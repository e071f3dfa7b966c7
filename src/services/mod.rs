//! Services module - the clicking core.
//!
//! Everything here is **framework-agnostic**: no Slint, no window code. The
//! GUI talks to the core only through [`CommandDispatcher`] and receives
//! snapshots through the [`Presenter`] trait.
//!
//! # Components
//!
//! - [`ClickAction`]: "perform one click now". [`EnigoClicker`] injects a real
//!   left click; [`NoopClicker`] only counts.
//! - [`ClickScheduler`]: the `Idle -> Countdown -> Running -> Idle` machine.
//!   Each Start spawns one tokio task that announces the countdown, then
//!   clicks and sleeps until stopped. Sleeps race a `watch` cancellation
//!   channel, so Stop takes effect without waiting out the interval.
//! - [`CommandDispatcher`]: SetRate / ToggleTheme / Start / Stop, plus the
//!   re-render requests that follow each of them.
//!
//! # Usage Example
//!
//! ```ignore
//! use autoclicker::services::{ClickScheduler, CommandDispatcher, NoopClicker, SchedulerConfig};
//!
//! let scheduler = Arc::new(ClickScheduler::new(
//!     state.clone(),
//!     Arc::new(NoopClicker::new()),
//!     metrics.clone(),
//!     runtime.handle().clone(),
//!     SchedulerConfig::default(),
//! ));
//! let dispatcher = CommandDispatcher::new(state, scheduler, presenter, metrics);
//!
//! dispatcher.set_rate(Some("500"))?;
//! dispatcher.start(); // "Starting in 5..." ... "Clicking started!"
//! dispatcher.stop();  // "Clicking stopped."
//! ```

pub mod click_action;
pub mod dispatcher;
pub mod scheduler;

pub use click_action::{ClickAction, EnigoClicker, NoopClicker};
pub use dispatcher::{CommandDispatcher, CommandError, Presenter, parse_rate};
pub use scheduler::{ClickScheduler, SchedulerConfig};
