//! Multi-monitor screen annotation overlay for Wayland compositors.
//!
//! The binary is a thin shell around [`backend::run_wayland`]; the drawing
//! model, geometry, layout and configuration are exposed so that tools such as
//! the schema dumper can share them.

pub mod backend;
pub mod config;
pub mod draw;
pub mod effects;
pub mod export;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod notification;
pub mod ui;
pub mod util;

pub use config::Config;
