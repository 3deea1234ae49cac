//! Pending-file naming and publishing.
//!
//! Packets are written under a private in-progress name and then published
//! under a final name that consumers scan for:
//!
//! ```text
//! p{flag}-{app}-{pid}-{seq}.pnd   in progress, never picked up
//! p{flag}-{app}-{n}.net           published, n in 0..1000
//! ```
//!
//! `flag` is `0` for packets the local queue loader owns and `1` for packets
//! the transport agent owns. A published file is always complete: the final
//! name is created by a hard link that fails if the name is taken, so no
//! existing file is ever replaced and no half-written file is ever visible.
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use super::errors::{NetError, Result};
use crate::metrics;

/// Size of the published name space per (flag, app) pair.
pub const MAX_PEND_NAMES: u32 = 1000;

const IN_PROGRESS_EXT: &str = "pnd";
const PUBLISHED_EXT: &str = "net";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A parsed pending filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingName {
    InProgress { local: bool, app_id: u8, pid: u32, seq: u64 },
    Published { local: bool, app_id: u8, number: u32 },
}

impl PendingName {
    /// Classify a filename; `None` for anything that is not a pending file.
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, ext) = name.strip_prefix('p')?.rsplit_once('.')?;
        let parts: Vec<&str> = stem.split('-').collect();
        let local = match *parts.first()? {
            "0" => true,
            "1" => false,
            _ => return None,
        };
        let app_id = parts.get(1)?.parse().ok()?;
        match (ext, parts.len()) {
            (IN_PROGRESS_EXT, 4) => Some(PendingName::InProgress {
                local,
                app_id,
                pid: parts[2].parse().ok()?,
                seq: parts[3].parse().ok()?,
            }),
            (PUBLISHED_EXT, 3) => Some(PendingName::Published {
                local,
                app_id,
                number: parts[2].parse().ok()?,
            }),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        match self {
            PendingName::InProgress { local, .. } | PendingName::Published { local, .. } => *local,
        }
    }

    pub fn app_id(&self) -> u8 {
        match self {
            PendingName::InProgress { app_id, .. } | PendingName::Published { app_id, .. } => *app_id,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PendingName::Published { .. })
    }

    pub fn file_name(&self) -> String {
        match self {
            PendingName::InProgress { local, app_id, pid, seq } => {
                format!("p{}-{}-{}-{}.{}", flag(*local), app_id, pid, seq, IN_PROGRESS_EXT)
            }
            PendingName::Published { local, app_id, number } => {
                format!("p{}-{}-{}.{}", flag(*local), app_id, number, PUBLISHED_EXT)
            }
        }
    }
}

fn flag(local: bool) -> u8 {
    if local {
        0
    } else {
        1
    }
}

/// Claim a fresh in-progress name in `directory` and return it. The file is
/// created empty with create-new, so the name cannot already exist.
pub fn create_pend(directory: &Path, is_local: bool, app_id: u8) -> Result<String> {
    let pid = std::process::id();
    for _ in 0..MAX_PEND_NAMES {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let name = PendingName::InProgress { local: is_local, app_id, pid, seq }.file_name();
        match OpenOptions::new().write(true).create_new(true).open(directory.join(&name)) {
            Ok(_) => {
                debug!("Created pending file: {}", name);
                return Ok(name);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                metrics::inc_name_collisions();
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(exhausted(directory))
}

/// Publish the in-progress file `filename` under the first free final name
/// and return that name. The local/remote flag is read from `filename`.
pub fn rename_pend(directory: &Path, filename: &str, app_id: u8) -> Result<String> {
    let local = match PendingName::parse(filename) {
        Some(PendingName::InProgress { local, .. }) => local,
        _ => {
            return Err(NetError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                format!("not an in-progress pending name: {}", filename),
            )))
        }
    };
    let src = directory.join(filename);
    if !src.exists() {
        return Err(NetError::Io(io::Error::new(
            ErrorKind::NotFound,
            format!("pending file does not exist: {}", src.display()),
        )));
    }

    for number in 0..MAX_PEND_NAMES {
        let name = PendingName::Published { local, app_id, number }.file_name();
        match publish(&src, &directory.join(&name)) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&src) {
                    warn!("Published {} but could not remove {}: {}", name, filename, e);
                }
                if let Ok(dir) = File::open(directory) {
                    let _ = dir.sync_all();
                }
                info!("renamed file to: {}", directory.join(&name).display());
                return Ok(name);
            }
            Err(NetError::NameCollision { .. }) => {
                metrics::inc_name_collisions();
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(exhausted(directory))
}

/// Remove an in-progress file left by a failed encode. Missing is fine.
pub fn discard_pend(directory: &Path, filename: &str) -> Result<()> {
    match fs::remove_file(directory.join(filename)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Published pending files in `directory`, ordered local first, then by app
/// id and number.
pub fn list_pending(directory: &Path) -> Result<Vec<PendingName>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str().and_then(PendingName::parse) {
            if name.is_published() {
                out.push(name);
            }
        }
    }
    out.sort_by_key(|n| match n {
        PendingName::Published { local, app_id, number } => (!*local, *app_id, *number),
        PendingName::InProgress { .. } => (true, u8::MAX, u32::MAX),
    });
    Ok(out)
}

/// Make `dst` refer to the complete file at `src` without replacing anything.
fn publish(src: &Path, dst: &Path) -> Result<()> {
    publish_via(src, dst, |s, d| fs::hard_link(s, d))
}

fn publish_via<L>(src: &Path, dst: &Path, link: L) -> Result<()>
where
    L: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let name = || dst.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if dst.exists() {
        return Err(NetError::NameCollision { name: name() });
    }
    match link(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(NetError::NameCollision { name: name() }),
        // No hard links here (vfat reports EPERM). Best effort: the exists()
        // check above is the only guard against replacing a racing writer.
        Err(e) if matches!(e.kind(), ErrorKind::Unsupported | ErrorKind::PermissionDenied) => {
            debug!("hard link unavailable for {} ({}), renaming", dst.display(), e);
            fs::rename(src, dst)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn exhausted(directory: &Path) -> NetError {
    warn!("all pending file names are used in {}, hit {}", directory.display(), MAX_PEND_NAMES);
    NetError::Io(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free pending name in {}", directory.display()),
    ))
}
