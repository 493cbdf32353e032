use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::filename::{get_extension, natural_order};

/// Extensions picked up by a scan, compared case-insensitively
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Container format of a video file, decided once from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoKind {
    Mp4,
    Mkv,
    Unsupported,
}

impl VideoKind {
    pub fn from_path(path: &Path) -> Self {
        match get_extension(path) {
            Some(ext) if ext.eq_ignore_ascii_case("mp4") => VideoKind::Mp4,
            Some(ext) if ext.eq_ignore_ascii_case("mkv") => VideoKind::Mkv,
            _ => VideoKind::Unsupported,
        }
    }
}

impl fmt::Display for VideoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoKind::Mp4 => write!(f, "MP4"),
            VideoKind::Mkv => write!(f, "MKV"),
            VideoKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub kind: VideoKind,
}

impl VideoFile {
    pub fn new(path: PathBuf) -> Self {
        let kind = VideoKind::from_path(&path);
        VideoFile { path, kind }
    }

    /// The file name used for ordering
    fn sort_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List the video files directly inside `dir`, in natural order
pub fn list_video_files(dir: &Path) -> Result<Vec<VideoFile>, ScanError> {
    list_files_with_extensions(dir, VIDEO_EXTENSIONS)
}

/// List regular files directly inside `dir` whose extension is in `extensions`,
/// ordered naturally by file name. Subdirectories are not descended into.
pub fn list_files_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<VideoFile>, ScanError> {
    let metadata = fs::metadata(dir).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ScanError::NotFound(dir.to_path_buf()),
        _ => ScanError::Unreadable {
            path: dir.to_path_buf(),
            source,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry_result in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                // Failing to list the directory itself is fatal; a bad entry is not
                if err.depth() == 0 || err.path() == Some(dir) {
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
                    return Err(ScanError::Unreadable {
                        path: dir.to_path_buf(),
                        source,
                    });
                }
                match err.path() {
                    Some(path) => warn!("Failed to access {}: {}", path.display(), err),
                    None => warn!("WalkDir error: {}", err),
                }
                continue;
            }
        };

        let path = entry.path();

        // Skip if not a file
        if !path.is_file() {
            continue;
        }

        let matches = get_extension(path)
            .map(|ext| extensions.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        files.push(VideoFile::new(path.to_path_buf()));
    }

    files.sort_by(|a, b| natural_order(&a.sort_name(), &b.sort_name()));

    debug!("Found {} video files in {}", files.len(), dir.display());
    Ok(files)
}
