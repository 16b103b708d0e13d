//! Shared JSON-RPC-over-HTTP/SSE substrate used by every service in the
//! federation, both as the surface each process exposes (`server`) and as
//! the client each process uses to call its peers (`client`).

pub mod client;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;

pub use client::RpcClient;
pub use envelope::{JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};
pub use error::{FrameworkError, RpcClientError, ToolError};
pub use registry::{ToolFn, ToolFuture, ToolRegistry};
pub use server::{build_router, ServiceState};
pub use session::SessionRegistry;
