//! HTTP API module for the overtime ledger engine.
//!
//! This module exposes the batch pipeline as a REST endpoint: a batch of
//! timesheet rows goes in, the processed ledger with its audit trace comes
//! back.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::LedgerRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
