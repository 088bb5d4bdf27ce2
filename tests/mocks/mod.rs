//! Mock infrastructure for the upstream providers
//!
//! - Chat-completion provider (atomic JSON and SSE bodies)
//! - OCR provider (token endpoint and recognition endpoints)
//!
//! Mocks mounted with an expectation are verified when the server is dropped,
//! which is how tests assert that an upstream was never called.

pub mod ocr_provider;

pub use chat_provider::*;
pub use ocr_provider::*;
