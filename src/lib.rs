//! # bbsnet - node-to-node packet staging for BBS networks
//!
//! bbsnet is the messaging backbone between bulletin board nodes: it frames
//! outbound mail and posts into the binary network packet format, stages the
//! packets in a network's data directory using the pending-file convention,
//! and decides per recipient whether a packet is for this node's own inbound
//! queue or for the transport agent that carries packets to other nodes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bbsnet::net::{send_network, MainType, Network, NetworkDescriptor, PacketHeader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let net = Network::new("testnet", "./data/testnet", 1);
//!     let header = PacketHeader::now(MainType::Email.code(), net.node, 0);
//!     let report = send_network(
//!         net.data_directory(),
//!         &net,
//!         &header,
//!         &[1, 5, 9],
//!         b"Hello from node 1",
//!         "SYSOP #1 @1",
//!         "Greetings",
//!     )?;
//!     for p in report.into_result()? {
//!         println!("staged {}", p.file_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`net`] - packet header, encoder, pending files, dispatcher, field scanner
//! - [`config`] - TOML configuration (BBS identity, logging, networks)
//! - [`validation`] - checks on title and sender fields before framing
//! - [`logutil`] - single-line escaping for logged message text
//! - [`metrics`] - process-wide staging counters

pub mod config;
pub mod logutil;
pub mod metrics;
pub mod net;
pub mod validation;
