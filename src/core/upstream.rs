use std::fmt;

use hyper::Method;

/// The three backend services the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Stack,
    LinkedList,
    Graph,
}

impl Upstream {
    /// Human readable name used in caller-facing error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Upstream::Stack => "Stack",
            Upstream::LinkedList => "LinkedList",
            Upstream::Graph => "Graph",
        }
    }

    /// Short lowercase label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Upstream::Stack => "stack",
            Upstream::LinkedList => "linkedlist",
            Upstream::Graph => "graph",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Methods the gateway forwards upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamMethod {
    Get,
    Post,
}

impl UpstreamMethod {
    pub fn as_method(&self) -> Method {
        match self {
            UpstreamMethod::Get => Method::GET,
            UpstreamMethod::Post => Method::POST,
        }
    }

    pub fn matches(&self, method: &Method) -> bool {
        *method == self.as_method()
    }
}

impl fmt::Display for UpstreamMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamMethod::Get => f.write_str("GET"),
            UpstreamMethod::Post => f.write_str("POST"),
        }
    }
}

/// Where a routed request goes: fixed at startup, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    upstream: Upstream,
    base_url: String,
    path: &'static str,
    method: UpstreamMethod,
}

impl UpstreamTarget {
    pub fn new(
        upstream: Upstream,
        base_url: impl Into<String>,
        path: &'static str,
        method: UpstreamMethod,
    ) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            path,
            method,
        }
    }

    pub fn upstream(&self) -> Upstream {
        self.upstream
    }

    pub fn method(&self) -> UpstreamMethod {
        self.method
    }

    /// Full upstream URL (`base_url` + `path`).
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}
