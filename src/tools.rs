use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::debug;

pub const EXIFTOOL: &str = "exiftool";
pub const MKVPROPEDIT: &str = "mkvpropedit";

/// Locations of the external tagging tools, resolved once at startup.
/// A `None` entry means the tool was not found and its format is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPaths {
    pub exiftool: Option<PathBuf>,
    pub mkvpropedit: Option<PathBuf>,
}

/// Result of resolving the tools: what was found, and the names that were not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDiscovery {
    pub tools: ToolPaths,
    pub missing: Vec<String>,
}

impl ToolPaths {
    /// Resolve both tools through the search path. An override may be a bare
    /// program name or a path; either way it must point at an executable.
    pub fn discover(exiftool: Option<&Path>, mkvpropedit: Option<&Path>) -> ToolDiscovery {
        let mut missing = Vec::new();
        let tools = ToolPaths {
            exiftool: find_tool(EXIFTOOL, exiftool, &mut missing),
            mkvpropedit: find_tool(MKVPROPEDIT, mkvpropedit, &mut missing),
        };
        ToolDiscovery { tools, missing }
    }
}

fn find_tool(name: &str, override_path: Option<&Path>, missing: &mut Vec<String>) -> Option<PathBuf> {
    let wanted = override_path
        .map(|p| p.as_os_str().to_os_string())
        .unwrap_or_else(|| OsString::from(name));

    match which::which(&wanted) {
        Ok(path) => {
            debug!("Using {} at {}", name, path.display());
            Some(path)
        }
        Err(e) => {
            debug!("{} lookup failed: {}", name, e);
            missing.push(wanted.to_string_lossy().into_owned());
            None
        }
    }
}

/// Failure of a single external invocation
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {diagnostic}", .program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        diagnostic: String,
    },
}

/// Runs one external command to completion
pub trait CommandRunner {
    fn run(&mut self, program: &Path, args: &[OsString]) -> Result<(), ToolError>;
}

/// Spawns real processes, one at a time, capturing their output
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &Path, args: &[OsString]) -> Result<(), ToolError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(ToolError::Failed {
            program: program.to_path_buf(),
            status: output.status,
            diagnostic: diagnostic_text(&output.stderr, &output.stdout),
        })
    }
}

/// Prefer stderr; some tools only report problems on stdout
fn diagnostic_text(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    let stdout = String::from_utf8_lossy(stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        "no diagnostic output".to_string()
    } else {
        stdout.to_string()
    }
}

/// Render a command line for display, quoting arguments with spaces
pub fn command_line(program: &Path, args: &[OsString]) -> String {
    let mut line = quote(&program.to_string_lossy());
    for arg in args {
        line.push(' ');
        line.push_str(&quote(&arg.to_string_lossy()));
    }
    line
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}
