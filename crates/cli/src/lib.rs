//! Stackview CLI library
//!
//! Drawing, configuration and the live terminal surface, shared by the
//! `stackview` binary and its tests.

pub mod draw;
pub mod surface;
pub mod system_config;
pub mod util;
