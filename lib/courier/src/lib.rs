//! Configurable HTTP request pipeline.
//!
//! A [`Pipeline`] holds instance-level [`Options`] and a transport. Binding a
//! method with [`Pipeline::create`] yields a [`RequestFn`] that merges
//! call-level options, runs the before-send interceptors, serializes the
//! payload, sends the request, and routes the result through the success or
//! error interceptors.
//!
//! # Example
//!
//! ```ignore
//! use courier::prelude::*;
//!
//! let pipeline = Pipeline::new(
//!     HyperClient::new(),
//!     Options::new()
//!         .base_url("https://api.example.com/")?
//!         .headers(HeadersInit::map([("Content-Type", "application/json")]))
//!         .before_send(|mut config| {
//!             config.set_header("Authorization", "Bearer token")?;
//!             Ok(config)
//!         }),
//! );
//!
//! let create_user = pipeline.create(Method::Post);
//! let outcome = create_user
//!     .call("users", Some(serde_json::json!({ "name": "Ada" })), None)
//!     .await?;
//! ```

mod client;
mod config;
mod connector;
mod interceptor;
mod options;
mod outcome;
mod pipeline;
pub mod prelude;
mod singleton;

pub use client::{BoxedService, HyperClient, HyperClientBuilder};
pub use config::ClientConfig;
pub use interceptor::{
    BeforeSendFn, ErrorFn, Interceptor, SuccessFn, TransformData, TransformFn, run_before_send,
};
pub use options::{EffectiveConfig, Options, merge};
pub use outcome::Outcome;
pub use pipeline::{Pipeline, RequestFn};
pub use singleton::SingletonRegistry;

// Re-export tower for layer composition
pub use tower;

pub use courier_core::{
    CONTENT_TYPE, ContentType, Error, Extensions, HeaderList, HeaderMap, HeadersInit,
    HttpClient, Method, NameMatching, Request, RequestBuilder, Response, Result, StatusCode,
    from_json, from_json_value, header, to_json,
};

pub use url;
