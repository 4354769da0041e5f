//! IPC (Inter-Process Communication) module
//!
//! This module provides the Unix socket query interface through which a
//! presentation process reads the current snapshot and analysis.
//!
//! # Protocol
//!
//! Messages are length-prefixed protobuf:
//! - 4 bytes: message length (little-endian u32)
//! - N bytes: protobuf-encoded [`Message`] or [`Response`]
//!
//! Requests are routed by `(service, command)`; see [`default_router`] for
//! the full table.
//!
//! # Example
//!
//! ```no_run
//! use ospf_monitor::ipc::IpcClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IpcClient::new("/var/run/ospf-monitor/analyzer.sock");
//!
//! let response = client.request("ospf", "neighbors").await?;
//! println!("{}: {}", response.status, response.message);
//! # Ok(())
//! # }
//! ```

mod handler;
mod protocol;
mod router;
mod server;

pub use handler::{default_router, IpcHandler, NO_ANALYSIS_MESSAGE, NO_SNAPSHOT_MESSAGE};
pub use protocol::{
    decode_message, encode_message, param_value, read_frame, response_value, write_frame, Message,
    ParamValue, Response, ResponseValue, LENGTH_PREFIX_SIZE, MAX_MESSAGE_SIZE, STATUS_ERROR,
    STATUS_SUCCESS,
};
pub use router::{Handler, RequestContext, Router, ServerControl};
pub use server::{IpcClient, IpcServer};
