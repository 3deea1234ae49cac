//! Packet file encoding and decoding.
//!
//! A packet is the 24-byte header, then `list_len` little-endian u16 node
//! ids, then exactly `payload_length` bytes of text. Files may hold several
//! packets back to back; readers only need the header to skip from one to
//! the next.
use bytes::{Buf, BufMut, BytesMut};
use log::{debug, error, warn};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::errors::{NetError, Result};
use super::header::{PacketHeader, HEADER_SIZE};
use super::network::NetworkDescriptor;

/// One decoded packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packet {
    pub header: PacketHeader,
    pub recipients: Vec<u16>,
    #[serde(serialize_with = "serialize_text")]
    pub text: Vec<u8>,
}

impl Packet {
    /// Decode one packet from the front of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let header = PacketHeader::decode(buf)?;
        let list_bytes = header.list_len as usize * 2;
        if buf.remaining() < list_bytes {
            return Err(NetError::Malformed(format!(
                "recipient list needs {} bytes, {} available",
                list_bytes,
                buf.remaining()
            )));
        }
        let recipients = (0..header.list_len).map(|_| buf.get_u16_le()).collect();
        let text_len = header.payload_length as usize;
        if buf.remaining() < text_len {
            return Err(NetError::Malformed(format!(
                "text needs {} bytes, {} available",
                text_len,
                buf.remaining()
            )));
        }
        let text = buf.copy_to_bytes(text_len).to_vec();
        Ok(Packet { header, recipients, text })
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.recipients.len() * 2 + self.text.len()
    }
}

/// Serialize header, recipient list and text into one buffer. The header's
/// `list_len` is taken from `recipients`.
pub fn encode_packet(header: &PacketHeader, recipients: &[u16], text: &[u8]) -> Result<BytesMut> {
    let list_len = u16::try_from(recipients.len()).map_err(|_| {
        NetError::InvalidDestination(format!("{} recipients exceed the list limit", recipients.len()))
    })?;
    let mut h = *header;
    h.list_len = list_len;
    let mut out = BytesMut::with_capacity(HEADER_SIZE + recipients.len() * 2 + text.len());
    h.encode(&mut out);
    for node in recipients {
        out.put_u16_le(*node);
    }
    out.extend_from_slice(text);
    Ok(out)
}

/// Decode every packet in `path`, in file order.
pub fn read_packets(path: &Path) -> Result<Vec<Packet>> {
    let raw = fs::read(path)?;
    let mut buf = &raw[..];
    let mut packets = Vec::new();
    while buf.has_remaining() {
        packets.push(Packet::decode(&mut buf)?);
    }
    Ok(packets)
}

/// Write one packet to `path`. The bytes go to a private temporary file in
/// the same directory which is renamed onto `path` only after every byte is
/// written and synced; on any failure the temporary file is removed and
/// `path` is left as it was.
pub fn write_packet<N: NetworkDescriptor + ?Sized>(
    path: &Path,
    network: &N,
    header: &PacketHeader,
    recipients: &[u16],
    text: &[u8],
) -> Result<()> {
    write_packet_via(path, network, header, recipients, text, |f| f)
}

/// [`write_packet`] with the temporary file wrapped by `wrap` before writing.
pub(crate) fn write_packet_via<N, W, F>(
    path: &Path,
    network: &N,
    header: &PacketHeader,
    recipients: &[u16],
    text: &[u8],
    wrap: F,
) -> Result<()>
where
    N: NetworkDescriptor + ?Sized,
    W: Write,
    F: FnOnce(File) -> W,
{
    if header.payload_length as usize != text.len() {
        error!(
            "Error writing packet, expected length: {} and actual length: {}",
            header.payload_length,
            text.len()
        );
        return Err(NetError::EncodingInconsistency {
            declared: header.payload_length as u64,
            actual: text.len() as u64,
        });
    }
    if header.is_broadcast() && recipients.is_empty() {
        return Err(NetError::InvalidDestination(
            "broadcast destination with an empty recipient list".to_string(),
        ));
    }
    header.validate(network)?;
    let max = network.max_node();
    if let Some(bad) = recipients.iter().find(|n| **n == 0 || **n > max) {
        return Err(NetError::InvalidNode { node: *bad, max });
    }

    let bytes = encode_packet(header, recipients, text)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_space(dir, bytes.len() as u64)?;

    let (tmp_path, file) = create_temp(dir, path)?;
    let sync = file.try_clone();
    let mut out = CountingWriter { inner: wrap(file), written: 0 };
    let written = out
        .write_all(&bytes)
        .and_then(|_| out.flush())
        .and_then(|_| sync.and_then(|f| f.sync_all()));
    let count = out.written;
    drop(out);
    if let Err(e) = written {
        warn!("Write to {} failed after {} bytes: {}", tmp_path.display(), count, e);
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if count != bytes.len() as u64 {
        let _ = fs::remove_file(&tmp_path);
        return Err(NetError::EncodingInconsistency { declared: bytes.len() as u64, actual: count });
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(d) = File::open(dir) {
        let _ = d.sync_all();
    }
    debug!(
        "Wrote packet type {} from {} to {} ({} bytes) to {}",
        header.message_type,
        header.origin_node,
        header.destination_node,
        count,
        path.display()
    );
    Ok(())
}

fn create_temp(dir: &Path, path: &Path) -> Result<(PathBuf, File)> {
    let base = path.file_name().and_then(|s| s.to_str()).unwrap_or("packet");
    let mut counter = 0u32;
    loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(f) => return Ok((candidate, f)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && counter < u32::MAX => {
                counter += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn ensure_space(dir: &Path, needed: u64) -> Result<()> {
    check_space(dir, needed, fs2::available_space(dir))
}

fn check_space(dir: &Path, needed: u64, available: io::Result<u64>) -> Result<()> {
    match available {
        Ok(free) if free < needed => Err(NetError::Io(io::Error::new(
            ErrorKind::StorageFull,
            format!("{} needs {} bytes, {} free", dir.display(), needed, free),
        ))),
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Free space check unavailable for {}: {}", dir.display(), e);
            Ok(())
        }
    }
}

struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn serialize_text<S: serde::Serializer>(t: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(t))
}
