//! # Network packet core
//!
//! Encodes outbound messages into binary packets and stages them in a
//! network's data directory, where either the local queue loader (local
//! packets) or an external transport agent (remote packets) picks them up.
//!
//! ```text
//! caller ─▶ dispatch ─▶ packet (encode) ─▶ pending (claim, publish) ─▶ consumer
//!              │
//!              └─ message (frame title / sender / date / body, via scanner)
//! ```
//!
//! Everything here is synchronous and takes the network it works on as a
//! parameter; there is no global state besides the pending-name sequence
//! and the counters in [`crate::metrics`].

pub mod dispatch;
pub mod errors;
pub mod header;
pub mod message;
pub mod network;
pub mod packet;
pub mod pending;
pub mod scanner;
pub mod types;

pub use dispatch::{dispatch_message, send_local, send_network, DispatchReport, StagedPacket};
pub use errors::{NetError, Result};
pub use header::{PacketHeader, BROADCAST_NODE, HEADER_SIZE};
pub use message::NetMessage;
pub use network::{Network, NetworkDescriptor};
pub use packet::{read_packets, write_packet, Packet};
pub use pending::{create_pend, rename_pend, PendingName};
pub use scanner::{Field, FieldScanner};
pub use types::{main_type_name, net_info_minor_type_name, MainType, NetInfoMinor};
