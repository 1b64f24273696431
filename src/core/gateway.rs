//! Core gateway orchestration service.
//!
//! The `GatewayService` ties together the immutable routing table and the
//! dispatcher. For every inbound request it:
//! * resolves the route (or answers `/health` / a routing miss locally)
//! * applies the route's body rule, short-circuiting with a 400 on failure
//! * dispatches upstream with retries
//! * normalizes the outcome into the caller-facing response
//!
//! The service holds no mutable state, so one instance is shared by all
//! concurrently running requests.
use std::sync::Arc;

use hyper::Method;

use crate::{
    config::GatewayConfig,
    core::{
        dispatcher::Dispatcher,
        error::GatewayError,
        responder::{self, NormalizedResponse},
        router::{RouteMatch, RouteTable},
    },
    ports::http_client::HttpClient,
};

pub struct GatewayService {
    routes: RouteTable,
    dispatcher: Dispatcher,
}

impl GatewayService {
    /// Build the routing table and dispatcher from configuration and the
    /// shared upstream client.
    pub fn new(config: &GatewayConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            routes: RouteTable::new(config),
            dispatcher: Dispatcher::new(http_client, config.retry_policy()),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one inbound request end to end. Never fails: every path ends in
    /// a `NormalizedResponse`.
    pub async fn handle(&self, method: &Method, path: &str, body: &[u8]) -> NormalizedResponse {
        let route = match self.routes.resolve(method, path) {
            RouteMatch::Health => return NormalizedResponse::health(),
            RouteMatch::Miss => {
                tracing::info!("No route for {} {}", method, path);
                return GatewayError::RoutingMiss {
                    method: method.to_string(),
                    path: path.to_string(),
                }
                .to_response();
            }
            RouteMatch::Forward(route) => route,
        };

        let payload = match route.body_rule().prepare(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::info!("Rejected {} {}: {}", method, path, e);
                return e.to_response();
            }
        };

        let target = route.target();
        let outcome = self.dispatcher.dispatch(target, payload).await;
        tracing::debug!(
            upstream = target.upstream().label(),
            outcome = outcome.kind(),
            "Dispatch finished for {} {}",
            method,
            path
        );

        responder::respond(target.upstream(), outcome)
    }
}
