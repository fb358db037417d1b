//! Image enumeration: walks a folder tree and feeds supported image paths
//! into the pipeline's path channel.

use log::{info, warn};
use std::path::Path;
use std::sync::mpsc::SyncSender;
use walkdir::WalkDir;

/// Extensions the format dispatch has a reader for.
pub fn is_supported_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "arw" | "raf")
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Recursively enumerates supported images under `root` into `paths`,
/// returning how many were sent. Hidden files are skipped; unreadable
/// directory entries are logged and skipped. Stops early when the receiving
/// side of the channel is gone.
pub fn scan_images(root: &Path, paths: &SyncSender<std::path::PathBuf>) -> u64 {
    let mut sent = 0u64;
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || is_hidden(path) || !is_supported_file(path) {
            continue;
        }
        if paths.send(path.to_path_buf()).is_err() {
            info!("path channel closed, stopping scan");
            break;
        }
        sent += 1;
    }
    sent
}
