use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::filename::{display_name, episode_label};
use crate::scanner::{VideoFile, VideoKind};
use crate::tags::write_descriptor;
use crate::tools::{command_line, CommandRunner, ToolError, ToolPaths, EXIFTOOL, MKVPROPEDIT};

/// Stand-in for the descriptor path when simulating
const SIMULATED_DESCRIPTOR: &str = "<tags.xml>";

/// Metadata to write to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest<'a> {
    pub file: &'a Path,
    pub title: String,
    pub album: &'a str,
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("failed to write tag descriptor: {0}")]
    Descriptor(#[source] io::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ToolMissing { kind: VideoKind, tool: &'static str },
    Unsupported,
}

#[derive(Debug)]
pub enum FileOutcome {
    Updated,
    /// Simulate mode: the command that would have run
    Simulated(String),
    Skipped(SkipReason),
    Failed(TagError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub label: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    /// The console line for this file
    pub fn message(&self, album: &str) -> String {
        let name = display_name(&self.path);
        match &self.outcome {
            FileOutcome::Updated => format!(
                "Updated '{}' -> Title: '{}', Album: '{}'",
                name, self.label, album
            ),
            FileOutcome::Simulated(command) => format!("[SIMULATE] Would run: {}", command),
            FileOutcome::Skipped(SkipReason::ToolMissing { kind, tool }) => {
                format!("Skipping {} ({} not found): {}", kind, tool, name)
            }
            FileOutcome::Skipped(SkipReason::Unsupported) => {
                format!("Skipping unsupported file type: {}", name)
            }
            FileOutcome::Failed(e) => format!("Error updating '{}': {}", name, e),
        }
    }
}

/// Writes episode labels to video files one at a time
#[derive(Debug)]
pub struct Tagger<R: CommandRunner> {
    tools: ToolPaths,
    runner: R,
    simulate: bool,
    scratch_dir: Option<PathBuf>,
}

impl<R: CommandRunner> Tagger<R> {
    pub fn new(tools: ToolPaths, runner: R, simulate: bool) -> Self {
        Tagger {
            tools,
            runner,
            simulate,
            scratch_dir: None,
        }
    }

    /// Create tag descriptors in `dir` instead of the system temp directory
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Tag every file in order; position `i` (1-based) becomes `EpNN`.
    /// A failing file never stops the batch.
    pub fn tag_all(&mut self, files: &[VideoFile], album: &str) -> Vec<FileReport> {
        let mut reports = Vec::with_capacity(files.len());

        for (idx, file) in files.iter().enumerate() {
            let request = TagRequest {
                file: &file.path,
                title: episode_label(idx + 1),
                album,
            };
            let outcome = self.tag_file(file.kind, &request);

            let report = FileReport {
                path: file.path.clone(),
                label: request.title,
                outcome,
            };
            println!("{}", report.message(album));
            reports.push(report);
        }

        reports
    }

    /// Dispatch one request on the file's container format
    pub fn tag_file(&mut self, kind: VideoKind, request: &TagRequest<'_>) -> FileOutcome {
        match kind {
            VideoKind::Mp4 => match self.tools.exiftool.clone() {
                Some(program) => self.tag_mp4(&program, request),
                None => FileOutcome::Skipped(SkipReason::ToolMissing {
                    kind,
                    tool: EXIFTOOL,
                }),
            },
            VideoKind::Mkv => match self.tools.mkvpropedit.clone() {
                Some(program) => self.tag_mkv(&program, request),
                None => FileOutcome::Skipped(SkipReason::ToolMissing {
                    kind,
                    tool: MKVPROPEDIT,
                }),
            },
            VideoKind::Unsupported => FileOutcome::Skipped(SkipReason::Unsupported),
        }
    }

    fn tag_mp4(&mut self, program: &Path, request: &TagRequest<'_>) -> FileOutcome {
        let args = exiftool_args(request);
        self.invoke(program, &args)
    }

    fn tag_mkv(&mut self, program: &Path, request: &TagRequest<'_>) -> FileOutcome {
        if self.simulate {
            let args = mkvpropedit_args(request.file, Path::new(SIMULATED_DESCRIPTOR));
            return FileOutcome::Simulated(command_line(program, &args));
        }

        let descriptor =
            match write_descriptor(&request.title, request.album, self.scratch_dir.as_deref()) {
                Ok(path) => path,
                Err(e) => return FileOutcome::Failed(TagError::Descriptor(e)),
            };

        let args = mkvpropedit_args(request.file, &descriptor);
        let outcome = self.invoke(program, &args);

        // Dropping the guard also deletes it; close() just surfaces the error
        let descriptor_path = descriptor.to_path_buf();
        if let Err(e) = descriptor.close() {
            warn!(
                "Failed to remove tag descriptor {}: {}",
                descriptor_path.display(),
                e
            );
        }

        outcome
    }

    fn invoke(&mut self, program: &Path, args: &[OsString]) -> FileOutcome {
        let line = command_line(program, args);
        if self.simulate {
            return FileOutcome::Simulated(line);
        }

        debug!("Running: {}", line);
        match self.runner.run(program, args) {
            Ok(()) => FileOutcome::Updated,
            Err(e) => FileOutcome::Failed(e.into()),
        }
    }
}

fn exiftool_args(request: &TagRequest<'_>) -> Vec<OsString> {
    vec![
        OsString::from("-overwrite_original"),
        OsString::from(format!("-Album={}", request.album)),
        OsString::from(format!("-Title={}", request.title)),
        request.file.as_os_str().to_os_string(),
    ]
}

fn mkvpropedit_args(file: &Path, descriptor: &Path) -> Vec<OsString> {
    let mut tags = OsString::from("all:");
    tags.push(descriptor.as_os_str());

    vec![
        file.as_os_str().to_os_string(),
        OsString::from("--tags"),
        tags,
    ]
}
