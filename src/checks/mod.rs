//! Connection pipeline for sslexpiry
//!
//! Port resolution, STARTTLS negotiation and TLS chain retrieval.

pub mod port;
pub mod starttls;
pub mod tls;

pub use port::PortInfo;
pub use starttls::{negotiate, LineStream, StarttlsProtocol};
pub use tls::{fetch_chain, ConnectRequest};
