//! Static routing table from external (method, path) pairs to upstream targets.
//!
//! The table is built once from [`GatewayConfig`] and never changes. Lookups
//! are exact on the path and never touch the network.
use hyper::Method;

use crate::{
    config::GatewayConfig,
    core::{
        body::BodyRule,
        upstream::{Upstream, UpstreamMethod, UpstreamTarget},
    },
};

use BodyRule::{Empty, IntegerValue, PassThroughJson};
use Upstream::{Graph, LinkedList, Stack};
use UpstreamMethod::{Get, Post};

/// Path served locally by the gateway itself.
pub const HEALTH_PATH: &str = "/health";

struct RouteDef {
    method: UpstreamMethod,
    path: &'static str,
    upstream: Upstream,
    upstream_path: &'static str,
    body: BodyRule,
}

const fn route(
    method: UpstreamMethod,
    path: &'static str,
    upstream: Upstream,
    upstream_path: &'static str,
    body: BodyRule,
) -> RouteDef {
    RouteDef {
        method,
        path,
        upstream,
        upstream_path,
        body,
    }
}

const ROUTE_DEFS: &[RouteDef] = &[
    route(Get, "/stack/data", Stack, "/stack", Empty),
    route(Post, "/stack/push", Stack, "/push", IntegerValue),
    route(Post, "/stack/pop", Stack, "/pop", Empty),
    route(Get, "/list/data", LinkedList, "/list", Empty),
    route(Post, "/list/add", LinkedList, "/add", PassThroughJson),
    route(Post, "/list/delete", LinkedList, "/delete", PassThroughJson),
    route(Post, "/list/remove-head", LinkedList, "/remove-head", Empty),
    route(Get, "/graph/data", Graph, "/data", Empty),
    route(Post, "/graph/add-node", Graph, "/add-node", PassThroughJson),
    route(Post, "/graph/add-edge", Graph, "/add-edge", PassThroughJson),
    route(Post, "/graph/delete-node", Graph, "/delete-node", PassThroughJson),
    route(Post, "/graph/delete-edge", Graph, "/delete-edge", PassThroughJson),
];

/// A resolved external route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: UpstreamMethod,
    path: &'static str,
    target: UpstreamTarget,
    body: BodyRule,
}

impl Route {
    pub fn method(&self) -> UpstreamMethod {
        self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    pub fn body_rule(&self) -> BodyRule {
        self.body
    }
}

/// Result of a routing lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// `GET /health`, answered locally
    Health,
    Forward(&'a Route),
    Miss,
}

/// Immutable routing table shared by all requests.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(config: &GatewayConfig) -> Self {
        let routes = ROUTE_DEFS
            .iter()
            .map(|def| {
                let base_url = match def.upstream {
                    Upstream::Stack => &config.stack_url,
                    Upstream::LinkedList => &config.linkedlist_url,
                    Upstream::Graph => &config.graph_url,
                };
                Route {
                    method: def.method,
                    path: def.path,
                    target: UpstreamTarget::new(
                        def.upstream,
                        base_url.as_str(),
                        def.upstream_path,
                        def.method,
                    ),
                    body: def.body,
                }
            })
            .collect();

        Self { routes }
    }

    /// Resolve an inbound request. Unknown paths and known paths with the
    /// wrong method are both misses.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        if path == HEALTH_PATH && *method == Method::GET {
            return RouteMatch::Health;
        }

        self.routes
            .iter()
            .find(|route| route.path == path && route.method.matches(method))
            .map_or(RouteMatch::Miss, RouteMatch::Forward)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
