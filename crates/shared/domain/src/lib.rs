//! # Domain Models
//!
//! Configuration model, locales and wizard-wide constants, with `serde` as the only dependency.
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod locale;
