//! Static FRR configuration
//!
//! Turns the router's `frr.conf` into a [`NetworkConfig`](crate::model::NetworkConfig).

mod parser;

pub use parser::{parse_config, parse_config_str};
