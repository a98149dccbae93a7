//! HTTP transport for the remote API.

mod http;

pub use http::HttpTransport;
