pub mod body;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod outcome;
pub mod responder;
pub mod retry;
pub mod router;
pub mod upstream;

pub use dispatcher::Dispatcher;
pub use error::GatewayError;
pub use gateway::GatewayService;
pub use outcome::UpstreamOutcome;
pub use responder::NormalizedResponse;
pub use retry::RetryPolicy;
pub use router::RouteTable;
pub use upstream::{Upstream, UpstreamTarget};
