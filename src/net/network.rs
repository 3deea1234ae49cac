//! Read-only view of one configured network.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest node number accepted when a network does not configure one.
pub const DEFAULT_MAX_NODE: u16 = 32767;

/// What the packet core needs to know about a network. Implemented by the
/// configuration record below; other hosts can implement it over their own
/// network store.
pub trait NetworkDescriptor {
    fn name(&self) -> &str;
    /// Directory holding this network's pending files.
    fn data_directory(&self) -> &Path;
    fn local_node_id(&self) -> u16;
    /// Network application id, used to keep co-resident network programs
    /// from colliding on pending names.
    fn app_id(&self) -> u8;
    fn max_node(&self) -> u16 {
        DEFAULT_MAX_NODE
    }
}

/// A network entry from the `[[networks]]` config table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Network {
    pub name: String,
    pub dir: PathBuf,
    pub node: u16,
    #[serde(default = "default_app_id")]
    pub app_id: u8,
    #[serde(default = "default_max_node")]
    pub max_node: u16,
}

fn default_app_id() -> u8 {
    2
}

fn default_max_node() -> u16 {
    DEFAULT_MAX_NODE
}

impl Network {
    pub fn new(name: &str, dir: impl Into<PathBuf>, node: u16) -> Self {
        Network {
            name: name.to_string(),
            dir: dir.into(),
            node,
            app_id: default_app_id(),
            max_node: DEFAULT_MAX_NODE,
        }
    }
}

impl NetworkDescriptor for Network {
    fn name(&self) -> &str {
        &self.name
    }
    fn data_directory(&self) -> &Path {
        &self.dir
    }
    fn local_node_id(&self) -> u16 {
        self.node
    }
    fn app_id(&self) -> u8 {
        self.app_id
    }
    fn max_node(&self) -> u16 {
        self.max_node
    }
}
