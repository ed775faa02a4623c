//! HTTP layer: request model, transport, and the token-aware client

mod client;
pub mod flow;
#[cfg(test)]
pub(crate) mod mock;
mod request;
mod transport;

pub use client::{RequestClient, DEFAULT_MUTATION_TIMEOUT, DEFAULT_REFRESH_PATH};
pub use request::{ApiRequest, ApiResponse, FilePart, Method, MultipartForm, RequestBody};
pub use transport::{HttpTransport, Transport, TransportError};
