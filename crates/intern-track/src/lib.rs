//! Core library for the internship application service.
//!
//! The interesting machinery lives under [`workflows::internship`]: the
//! requirement catalog that stamps out per-application requirement instances,
//! the approval state machine those instances move through, the aggregate
//! application status machine, and the working-day calendar that schedules an
//! internship's end date. Everything date-driven receives "today" as a value
//! so the engine stays deterministic under test.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
