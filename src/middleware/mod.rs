//! Middleware for the proxy
//!
//! Contains the request gate (identity check + pre-flight) and cross-origin headers.

pub mod cors;
pub mod gate;
