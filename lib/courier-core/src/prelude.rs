//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    ContentType, Error, HeadersInit, HttpClient, Method, Request, RequestBuilder, Response,
    Result, from_json, to_json,
};
