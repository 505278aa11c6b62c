//! Interceptor slots of the pipeline.
//!
//! Each slot holds an [`Interceptor`]: either [`Interceptor::Identity`],
//! which passes its input through, or a user function. Returning `Err`
//! from a user function propagates the error out of the call.
//!
//! | Slot | Input | Identity result |
//! |------|-------|-----------------|
//! | `before_send` | [`EffectiveConfig`] | the config, unchanged |
//! | `on_send_error` | [`Error`] | `Ok(Outcome::Error(err))` |
//! | `on_response_success` | [`Outcome`] | the outcome, unchanged |
//! | `on_response_error` | [`Error`] | `Ok(Outcome::Error(err))` |
//!
//! Body serialization uses [`TransformData`], which defaults to JSON.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::{EffectiveConfig, Error, Outcome, Result};

/// Signature of a before-send interceptor.
pub type BeforeSendFn = dyn Fn(EffectiveConfig) -> Result<EffectiveConfig> + Send + Sync;

/// Signature of the send-error and response-error interceptors.
pub type ErrorFn = dyn Fn(Error) -> Result<Outcome> + Send + Sync;

/// Signature of the response-success interceptor.
pub type SuccessFn = dyn Fn(Outcome) -> Result<Outcome> + Send + Sync;

/// Signature of a custom body transform.
pub type TransformFn = dyn Fn(Option<&Value>) -> Result<Option<Bytes>> + Send + Sync;

/// An interceptor slot value.
pub enum Interceptor<F: ?Sized> {
    /// Pass the input through.
    Identity,
    /// User-supplied function.
    Custom(Arc<F>),
}

impl<F: ?Sized> Clone for Interceptor<F> {
    fn clone(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<F: ?Sized> Default for Interceptor<F> {
    fn default() -> Self {
        Self::Identity
    }
}

impl<F: ?Sized> fmt::Debug for Interceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<F: ?Sized> Interceptor<F> {
    /// Whether this slot holds the identity interceptor.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

impl Interceptor<BeforeSendFn> {
    /// Wrap a before-send function.
    pub fn before_send<F>(f: F) -> Self
    where
        F: Fn(EffectiveConfig) -> Result<EffectiveConfig> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Run the interceptor on `config`.
    pub fn apply(&self, config: EffectiveConfig) -> Result<EffectiveConfig> {
        match self {
            Self::Identity => Ok(config),
            Self::Custom(f) => f(config),
        }
    }
}

impl Interceptor<ErrorFn> {
    /// Wrap an error handler.
    pub fn on_error<F>(f: F) -> Self
    where
        F: Fn(Error) -> Result<Outcome> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Turn `error` into the call outcome.
    pub fn handle(&self, error: Error) -> Result<Outcome> {
        match self {
            Self::Identity => Ok(Outcome::Error(error)),
            Self::Custom(f) => f(error),
        }
    }
}

impl Interceptor<SuccessFn> {
    /// Wrap a success handler.
    pub fn on_success<F>(f: F) -> Self
    where
        F: Fn(Outcome) -> Result<Outcome> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Run the interceptor on a successful outcome.
    pub fn handle(&self, outcome: Outcome) -> Result<Outcome> {
        match self {
            Self::Identity => Ok(outcome),
            Self::Custom(f) => f(outcome),
        }
    }
}

/// Fold a chain of before-send interceptors over `config`, first to last.
///
/// `None` entries are skipped.
pub fn run_before_send<'a>(
    chain: impl IntoIterator<Item = Option<&'a Interceptor<BeforeSendFn>>>,
    config: EffectiveConfig,
) -> Result<EffectiveConfig> {
    chain
        .into_iter()
        .flatten()
        .try_fold(config, |config, interceptor| interceptor.apply(config))
}

/// Payload-to-body transform.
#[derive(Clone, Default)]
pub enum TransformData {
    /// Serialize the payload as JSON; no payload means no body.
    #[default]
    Json,
    /// User-supplied transform.
    Custom(Arc<TransformFn>),
}

impl fmt::Debug for TransformData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("Json"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl TransformData {
    /// Wrap a custom transform.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<Option<Bytes>> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Produce the request body for `data`.
    pub fn apply(&self, data: Option<&Value>) -> Result<Option<Bytes>> {
        match self {
            Self::Json => data.map(courier_core::to_json).transpose(),
            Self::Custom(f) => f(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::Method;

    fn marker(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
    ) -> Interceptor<BeforeSendFn> {
        let log = Arc::clone(log);
        Interceptor::<BeforeSendFn>::before_send(move |config| {
            log.lock().expect("log lock").push(name);
            Ok(config)
        })
    }

    #[test]
    fn chain_runs_in_order_and_skips_missing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = marker(&log, "instance");
        let second = marker(&log, "call");

        run_before_send(
            [Some(&first), None, Some(&second)],
            EffectiveConfig::default(),
        )
        .expect("chain");

        assert_eq!(*log.lock().expect("log lock"), ["instance", "call"]);
    }

    #[test]
    fn chain_threads_config_through() {
        let post = Interceptor::<BeforeSendFn>::before_send(|mut config: EffectiveConfig| {
            config.method = Method::Post;
            Ok(config)
        });
        let put_if_post = Interceptor::<BeforeSendFn>::before_send(|mut config: EffectiveConfig| {
            if config.method == Method::Post {
                config.method = Method::Put;
            }
            Ok(config)
        });

        let config = run_before_send([Some(&post), Some(&put_if_post)], EffectiveConfig::default())
            .expect("chain");
        check!(config.method == Method::Put);
    }

    #[test]
    fn chain_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = Interceptor::<BeforeSendFn>::before_send(|_| Err(Error::interceptor("no token")));
        let after = marker(&log, "after");

        let result = run_before_send([Some(&failing), Some(&after)], EffectiveConfig::default());

        let_assert!(Err(Error::Interceptor(message)) = result);
        check!(message == "no token");
        check!(log.lock().expect("log lock").is_empty());
    }

    #[test]
    fn identity_error_handler_returns_error_value() {
        let handler = Interceptor::<ErrorFn>::Identity;
        let_assert!(Ok(Outcome::Error(err)) = handler.handle(Error::Timeout));
        check!(err.is_timeout());
    }

    #[test]
    fn json_transform_serializes_payload() {
        let body = TransformData::Json
            .apply(Some(&json!({ "id": 1 })))
            .expect("serialize");
        check!(body.as_deref() == Some(&br#"{"id":1}"#[..]));

        check!(TransformData::Json.apply(None).expect("no payload") == None);
    }

    #[test]
    fn custom_transform_can_fail() {
        let transform = TransformData::custom(|_| Err(Error::interceptor("unsupported payload")));
        check!(transform.apply(Some(&json!(1))).is_err());
    }

    #[test]
    fn debug_hides_functions() {
        let custom = Interceptor::<SuccessFn>::on_success(Ok);
        check!(format!("{custom:?}") == "Custom(..)");
        check!(format!("{:?}", Interceptor::<SuccessFn>::Identity) == "Identity");
    }
}
