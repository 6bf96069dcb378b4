//! Entry dispatcher.
//!
//! Classifies an inbound request by method and query shape:
//! - `OPTIONS` → fixed pre-flight response
//! - `GET`/`HEAD` with a non-empty `target` → audio relay
//! - `GET`/`HEAD` otherwise → API relay
//! - anything else → 405

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use crate::error::{RelayError, RelayResult};
use crate::http::response::preflight;
use crate::relay::query::QueryParams;
use crate::relay::Relay;

/// Where an inbound request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Audio {
        target: String,
        source: Option<String>,
    },
    Api(QueryParams),
}

/// Decide the route for a request.
pub fn classify(method: &Method, query: Option<&str>) -> RelayResult<Route> {
    if method == Method::OPTIONS {
        return Ok(Route::Preflight);
    }
    if method != Method::GET && method != Method::HEAD {
        return Err(RelayError::MethodNotAllowed);
    }

    let params = QueryParams::parse(query);
    match params.get_non_empty("target") {
        Some(target) => Ok(Route::Audio {
            target: target.to_string(),
            source: params.get("source").map(str::to_string),
        }),
        None => Ok(Route::Api(params)),
    }
}

impl Relay {
    /// Produce the response for one inbound request.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        let route = match classify(&method, request.uri().query()) {
            Ok(route) => route,
            Err(e) => {
                tracing::debug!(method = %method, "Method not allowed");
                return e.into_response();
            }
        };

        let inbound = request.headers();
        let result = match route {
            Route::Preflight => return preflight(),
            Route::Audio { target, source } => {
                self.relay_audio(method, &target, source.as_deref(), inbound).await
            }
            Route::Api(params) => self.relay_api(&params, inbound).await,
        };

        result.unwrap_or_else(|e| e.into_response())
    }
}
