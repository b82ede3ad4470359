//! Terminal dashboard over a trending-content backend.
//!
//! The library holds everything that does not touch the terminal: the HTTP
//! client, the per-source entry types with favorite reconciliation and local
//! filtering, the chart transform, configuration and theming. The binary
//! adds the event loop and views.

pub mod api;
pub mod chart;
pub mod config;
pub mod preferences;
pub mod settings;
pub mod sources;
pub mod theme;
pub mod util;
