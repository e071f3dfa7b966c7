// UI module - Slint window and event loop bridge
//
// This module contains:
// - EventLoopBridge: Queues window updates from worker threads onto the Slint event loop
// - GuiController: Creates the window and routes its callbacks to the CommandDispatcher
// - SlintPresenter: Presenter implementation that draws state snapshots on the window

pub mod bridge;
pub mod controller;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::{GuiController, SlintPresenter};
