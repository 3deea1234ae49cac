//! Fixed 24-byte packet header.
//!
//! Layout (all little-endian):
//!
//! ```text
//!  0 u16 destination_node   12 u16 list_len
//!  2 u16 to_user            14 u32 timestamp (unix seconds)
//!  4 u16 origin_node        18 u32 payload_length
//!  6 u16 from_user          22 u16 method
//!  8 u16 message_type
//! 10 u16 minor_type
//! ```
use bytes::{Buf, BufMut};
use chrono::Utc;
use serde::Serialize;

use super::errors::{NetError, Result};
use super::network::NetworkDescriptor;

pub const HEADER_SIZE: usize = 24;

/// `destination_node` value meaning "every node in the recipient list".
pub const BROADCAST_NODE: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PacketHeader {
    pub destination_node: u16,
    pub to_user: u16,
    pub origin_node: u16,
    pub from_user: u16,
    pub message_type: u16,
    pub minor_type: u16,
    pub list_len: u16,
    pub timestamp: u32,
    pub payload_length: u32,
    /// Compression method; 0 means plain text.
    pub method: u16,
}

impl PacketHeader {
    pub fn new(message_type: u16, origin_node: u16, destination_node: u16, timestamp: u32) -> Self {
        PacketHeader {
            destination_node,
            origin_node,
            message_type,
            timestamp,
            ..Default::default()
        }
    }

    /// Same as [`PacketHeader::new`] stamped with the current time.
    pub fn now(message_type: u16, origin_node: u16, destination_node: u16) -> Self {
        let ts = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        Self::new(message_type, origin_node, destination_node, ts)
    }

    pub fn is_broadcast(&self) -> bool {
        self.destination_node == BROADCAST_NODE
    }

    /// Check node ids against the network's address space.
    pub fn validate<N: NetworkDescriptor + ?Sized>(&self, network: &N) -> Result<()> {
        let max = network.max_node();
        if self.origin_node == 0 || self.origin_node > max {
            return Err(NetError::InvalidNode { node: self.origin_node, max });
        }
        if !self.is_broadcast() && self.destination_node > max {
            return Err(NetError::InvalidNode { node: self.destination_node, max });
        }
        Ok(())
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        out.put_u16_le(self.destination_node);
        out.put_u16_le(self.to_user);
        out.put_u16_le(self.origin_node);
        out.put_u16_le(self.from_user);
        out.put_u16_le(self.message_type);
        out.put_u16_le(self.minor_type);
        out.put_u16_le(self.list_len);
        out.put_u32_le(self.timestamp);
        out.put_u32_le(self.payload_length);
        out.put_u16_le(self.method);
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        self.encode(&mut &mut raw[..]);
        raw
    }

    /// Decode a header from the front of `buf`, consuming 24 bytes.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < HEADER_SIZE {
            return Err(NetError::Malformed(format!(
                "header needs {} bytes, {} available",
                HEADER_SIZE,
                buf.remaining()
            )));
        }
        Ok(PacketHeader {
            destination_node: buf.get_u16_le(),
            to_user: buf.get_u16_le(),
            origin_node: buf.get_u16_le(),
            from_user: buf.get_u16_le(),
            message_type: buf.get_u16_le(),
            minor_type: buf.get_u16_le(),
            list_len: buf.get_u16_le(),
            timestamp: buf.get_u32_le(),
            payload_length: buf.get_u32_le(),
            method: buf.get_u16_le(),
        })
    }

    pub fn from_bytes(mut raw: &[u8]) -> Result<Self> {
        Self::decode(&mut raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::network::Network;

    #[test]
    fn byte_layout_is_pinned() {
        let h = PacketHeader {
            destination_node: 0x0102,
            to_user: 0x0304,
            origin_node: 0x0506,
            from_user: 0x0708,
            message_type: 0x0002,
            minor_type: 0x0009,
            list_len: 0x0003,
            timestamp: 0x11223344,
            payload_length: 0x00000100,
            method: 0x0000,
        };
        let raw = h.to_bytes();
        assert_eq!(
            raw,
            [
                0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07, 0x02, 0x00, 0x09, 0x00, 0x03,
                0x00, 0x44, 0x33, 0x22, 0x11, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00
            ]
        );
        assert_eq!(PacketHeader::from_bytes(&raw).unwrap(), h);
    }

    #[test]
    fn short_input_is_malformed() {
        let err = PacketHeader::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, NetError::Malformed(_)));
    }

    #[test]
    fn validate_checks_node_range() {
        let mut net = Network::new("testnet", "/tmp/unused", 1);
        net.max_node = 100;
        assert!(PacketHeader::new(2, 1, 50, 0).validate(&net).is_ok());
        assert!(PacketHeader::new(2, 1, BROADCAST_NODE, 0).validate(&net).is_ok());
        assert!(matches!(
            PacketHeader::new(2, 0, 5, 0).validate(&net),
            Err(NetError::InvalidNode { node: 0, max: 100 })
        ));
        assert!(matches!(
            PacketHeader::new(2, 1, 101, 0).validate(&net),
            Err(NetError::InvalidNode { node: 101, .. })
        ));
    }
}
