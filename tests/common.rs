//! Shared fixtures for the integration tests.

use bbsnet::net::Network;
use std::path::Path;

/// A network rooted at `dir` whose local node is `node`.
#[allow(dead_code)] // not every test binary uses every helper
pub fn network_in(dir: &Path, node: u16) -> Network {
    Network::new("testnet", dir, node)
}

/// Published pending file names in `dir`, sorted.
#[allow(dead_code)]
pub fn published(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".net"))
        .collect();
    names.sort();
    names
}

/// Any leftover in-progress or temporary files in `dir`.
#[allow(dead_code)]
pub fn leftovers(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".pnd") || n.contains(".tmp-"))
        .collect()
}
