//! # tickdesk Worker Library
//!
//! Background processing for tickdesk. The worker's single job is the
//! deadline-expiry sweep: every cycle, pending tickets whose deadline has
//! passed are transitioned to `missed`.
//!
//! ## Modules
//!
//! - `sweep`: the periodic expiry sweeper

pub mod sweep;
