//! Overtime allocation engine.
//!
//! This crate turns weekly timesheet exports into a long-format payroll
//! transaction ledger. Raw rows are normalized into canonical records,
//! resolved to a jurisdiction, routed to the daily-cap or weekly-cap
//! overtime engine, and pivoted into one ledger line per hour type with
//! a complete audit trace of every decision.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
