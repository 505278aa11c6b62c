//! Commonly used types, for glob importing:
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::{
    ClientConfig, ContentType, EffectiveConfig, Error, HeadersInit, HttpClient, HyperClient,
    Method, Options, Outcome, Pipeline, Request, RequestFn, Response, Result, StatusCode,
    from_json, to_json,
};
pub use serde::{Deserialize, Serialize};
