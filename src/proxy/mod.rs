//! Proxy module
//!
//! Handles request forwarding to the upstream chat and OCR providers.

pub mod chat;
pub mod headers;
pub mod logging;
pub mod ocr;
pub mod transport;

pub use chat::ChatClient;
pub use logging::RequestContext;
pub use ocr::{OcrClient, OcrEndpoint};
pub use transport::{
    BoxError, ByteStream, HttpTransport, UpstreamBody, UpstreamRequest, UpstreamResponse,
    UpstreamTransport,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
