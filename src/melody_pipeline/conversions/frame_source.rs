use std::path::{Path, PathBuf};

use tracing::debug;

use crate::melody_pipeline::common::error::{MelodyError, Result};

/// Lists the frames of an image sequence directory.
///
/// Regular files only, hidden files excluded, sorted by file name so the frame
/// order does not depend on the filesystem. Sorting is bytewise: number frames
/// with zero padding (`frame_009`, `frame_010`) to keep them in sequence.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| MelodyError::InputReadError(format!("{}: {}", dir.display(), e)))?;

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        if hidden || !path.is_file() {
            continue;
        }
        frames.push(path);
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} frames in {}", frames.len(), dir.display());
    Ok(frames)
}
