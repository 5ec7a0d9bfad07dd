//! Live-shopping stream coordinator.
//!
//! Tracks a single shared broadcast session, arbitrates the admin role among
//! connected WebSocket clients and fans state-change events out to all of them.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
