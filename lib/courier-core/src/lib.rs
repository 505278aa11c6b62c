//! Core types and traits for the courier HTTP request pipeline.
//!
//! This crate provides the foundational types used by courier:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - requests handed to the transport
//! - [`Response`] - raw response handle
//! - [`HeadersInit`] and [`HeaderList`] - request header shapes and their
//!   normalized form, used for content negotiation
//! - [`Error`] and [`Result`] - Error handling
//! - [`HttpClient`] - Transport trait consumed by the pipeline

mod body;
mod client;
mod error;
mod headers;
mod method;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, from_json_value, to_json};
pub use client::HttpClient;
pub use error::{Error, Result};
pub use headers::{CONTENT_TYPE, HeaderList, HeadersInit, NameMatching};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types used in public signatures
pub use http::{Extensions, HeaderMap, StatusCode, header};
