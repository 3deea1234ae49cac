//! Local/remote dispatch of outbound messages.
//!
//! Each recipient goes one of two ways:
//! - the local node id is staged as a local pending file (`p0-*`) in the
//!   network's data directory, for the local queue loader;
//! - every other id is staged as a remote pending file (`p1-*`) for the
//!   transport agent, either as one list-encoded packet (for types that
//!   support lists) or as one packet per node.
//!
//! A failure on one destination never undoes the others; the report says
//! which destinations made it.
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::errors::{NetError, Result};
use super::header::{PacketHeader, BROADCAST_NODE};
use super::message::NetMessage;
use super::network::NetworkDescriptor;
use super::packet::write_packet;
use super::pending::{create_pend, discard_pend, rename_pend};
use super::types::{main_type_name, MainType};
use crate::logutil::escape_log;
use crate::metrics;

/// A published pending file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedPacket {
    pub file_name: String,
    pub path: PathBuf,
    pub local: bool,
    /// Nodes this file delivers to.
    pub recipients: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDestination {
    pub recipients: Vec<u16>,
    pub error: String,
}

/// Outcome of one dispatch: every destination is in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub staged: Vec<StagedPacket>,
    pub failed: Vec<FailedDestination>,
}

impl DispatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn staged_nodes(&self) -> Vec<u16> {
        self.staged.iter().flat_map(|p| p.recipients.iter().copied()).collect()
    }

    pub fn failed_nodes(&self) -> Vec<u16> {
        self.failed.iter().flat_map(|f| f.recipients.iter().copied()).collect()
    }

    /// `Ok` with the staged files when nothing failed, otherwise
    /// `PartialDispatchFailure`. Staged files stay staged either way.
    pub fn into_result(self) -> Result<Vec<StagedPacket>> {
        if self.failed.is_empty() {
            return Ok(self.staged);
        }
        let succeeded = self.staged_nodes();
        let failed = self
            .failed
            .into_iter()
            .flat_map(|f| {
                let error = f.error;
                f.recipients.into_iter().map(move |n| (n, error.clone()))
            })
            .collect();
        Err(NetError::PartialDispatchFailure { succeeded, failed })
    }

    fn record(&mut self, recipients: Vec<u16>, outcome: Result<StagedPacket>) {
        match outcome {
            Ok(p) => self.staged.push(p),
            Err(e) => {
                warn!("Dispatch to {:?} failed: {}", recipients, e);
                self.failed.push(FailedDestination { recipients, error: e.to_string() });
            }
        }
    }
}

/// Drop repeated node ids, keeping the first occurrence of each.
pub fn dedup_recipients(list: &[u16]) -> Vec<u16> {
    let mut seen = std::collections::HashSet::with_capacity(list.len());
    list.iter().copied().filter(|n| seen.insert(*n)).collect()
}

/// Stage a message for the local node in the network's data directory.
pub fn send_local<N: NetworkDescriptor + ?Sized>(
    network: &N,
    header: &PacketHeader,
    text: &[u8],
    byname: &str,
    title: &str,
) -> Result<StagedPacket> {
    let message = NetMessage::new(title, byname, header.timestamp, text);
    check_addressee(header, &message)?;
    let framed = message.encode()?;
    stage_local(network, header, &framed)
}

/// Stage a message for `recipients` with remote packets written to `path`.
/// An empty `recipients` means the header's destination is the only one.
///
/// Name-addressed email needs an addressee name in its text and is refused
/// here; build a [`NetMessage`] with `with_to_name` and use
/// [`dispatch_message`].
pub fn send_network<N: NetworkDescriptor + ?Sized>(
    path: &Path,
    network: &N,
    header: &PacketHeader,
    recipients: &[u16],
    text: &[u8],
    byname: &str,
    title: &str,
) -> Result<DispatchReport> {
    let message = NetMessage::new(title, byname, header.timestamp, text);
    dispatch_message(path, network, header, recipients, &message)
}

/// [`send_network`] for an already assembled message (e.g. one carrying an
/// addressee name).
pub fn dispatch_message<N: NetworkDescriptor + ?Sized>(
    path: &Path,
    network: &N,
    header: &PacketHeader,
    recipients: &[u16],
    message: &NetMessage,
) -> Result<DispatchReport> {
    check_addressee(header, message)?;
    let framed = message.encode()?;
    if header.origin_node == 0 || header.origin_node > network.max_node() {
        return Err(NetError::InvalidNode { node: header.origin_node, max: network.max_node() });
    }

    let mut targets = dedup_recipients(recipients);
    if targets.is_empty() {
        if header.destination_node == BROADCAST_NODE {
            return Err(NetError::InvalidDestination("no recipients".to_string()));
        }
        targets.push(header.destination_node);
    }
    info!(
        "Dispatching {} \"{}\" on {} to {:?}",
        main_type_name(header.message_type),
        escape_log(&message.title),
        network.name(),
        targets
    );

    let max = network.max_node();
    let mut report = DispatchReport::default();
    let (targets, out_of_range): (Vec<u16>, Vec<u16>) = targets.into_iter().partition(|n| (1..=max).contains(n));
    for node in out_of_range {
        report.record(vec![node], Err(NetError::InvalidNode { node, max }));
    }

    let local_id = network.local_node_id();
    let (local, remote): (Vec<u16>, Vec<u16>) = targets.into_iter().partition(|n| *n == local_id);

    if !local.is_empty() {
        report.record(local, stage_local(network, header, &framed));
    }

    let list_capable = MainType::from_code(header.message_type).map_or(false, |t| t.supports_list());
    if list_capable && remote.len() > 1 {
        let mut h = *header;
        h.destination_node = BROADCAST_NODE;
        let outcome = stage(path, network, &h, &remote, &framed, false);
        report.record(remote, outcome);
    } else {
        for node in remote {
            let mut h = *header;
            h.destination_node = node;
            report.record(vec![node], stage(path, network, &h, &[], &framed, false));
        }
    }

    if !report.is_complete() {
        warn!(
            "Dispatch on {} incomplete: staged {:?}, failed {:?}",
            network.name(),
            report.staged_nodes(),
            report.failed_nodes()
        );
    }
    Ok(report)
}

/// The text starts with `to_name \0` exactly when the type is name-addressed
/// email; readers pick the layout from the type alone.
fn check_addressee(header: &PacketHeader, message: &NetMessage) -> Result<()> {
    let name_addressed = header.message_type == MainType::EmailName.code();
    match (name_addressed, message.to_name.is_some()) {
        (true, false) => Err(NetError::AddresseeMismatch(format!(
            "{} needs an addressee name; use dispatch_message with NetMessage::with_to_name",
            main_type_name(header.message_type)
        ))),
        (false, true) => Err(NetError::AddresseeMismatch(format!(
            "{} cannot carry an addressee name",
            main_type_name(header.message_type)
        ))),
        _ => Ok(()),
    }
}

fn stage_local<N: NetworkDescriptor + ?Sized>(network: &N, header: &PacketHeader, framed: &[u8]) -> Result<StagedPacket> {
    let mut h = *header;
    h.destination_node = network.local_node_id();
    h.list_len = 0;
    stage(network.data_directory(), network, &h, &[], framed, true)
}

/// Encode one packet under a fresh in-progress name and publish it.
fn stage<N: NetworkDescriptor + ?Sized>(
    dir: &Path,
    network: &N,
    header: &PacketHeader,
    recipients: &[u16],
    framed: &[u8],
    is_local: bool,
) -> Result<StagedPacket> {
    let mut h = *header;
    h.payload_length = u32::try_from(framed.len()).map_err(|_| NetError::EncodingInconsistency {
        declared: u64::from(u32::MAX),
        actual: framed.len() as u64,
    })?;

    let pend = create_pend(dir, is_local, network.app_id())?;
    let published = write_packet(&dir.join(&pend), network, &h, recipients, framed)
        .and_then(|_| rename_pend(dir, &pend, network.app_id()));
    match published {
        Ok(file_name) => {
            metrics::inc_staged(is_local);
            let delivered = if recipients.is_empty() { vec![h.destination_node] } else { recipients.to_vec() };
            Ok(StagedPacket { path: dir.join(&file_name), file_name, local: is_local, recipients: delivered })
        }
        Err(e) => {
            metrics::inc_stage_failures();
            if let Err(cleanup) = discard_pend(dir, &pend) {
                warn!("Could not remove {}: {}", dir.join(&pend).display(), cleanup);
            }
            Err(e)
        }
    }
}
