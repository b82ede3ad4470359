//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Spawned backend calls and panic capture
//! - `render` - Layout, tab bar and overlays
//! - `dashboard` - Global trends chart
//! - `list` - Source lists and the detail overlay
//! - `favorites`, `history`, `settings` - The remaining tabs
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod dashboard;
mod events;
mod favorites;
mod help;
mod helpers;
mod history;
mod input;
mod list;
mod loop_runner;
mod render;
mod settings;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
