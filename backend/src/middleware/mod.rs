//! Request middleware.
//!
//! Purpose: define middleware for request lifecycle concerns such as trace
//! correlation and access logging.

pub mod trace;

pub use trace::{RequestTrace, TRACE_ID_HEADER, TraceId};
