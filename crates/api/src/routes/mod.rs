//! Route Handlers

pub mod ingestion;
pub mod stats;

use serde::Serialize;

/// Single-key JSON message: `{"Success": "..."}` or `{"Error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ApiMessage {
    Success(&'static str),
    Error(&'static str),
}
