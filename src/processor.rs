use anyhow::{Context, Result};
use std::io::{self, BufRead};

use crate::args::Settings;
use crate::prompt::confirm;
use crate::scanner::list_video_files;
use crate::tagger::{FileReport, Tagger};
use crate::tools::CommandRunner;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// No MP4 or MKV files in the directory
    NothingToDo,
    /// The user declined at the prompt
    Cancelled,
    Completed(Vec<FileReport>),
}

/// Drives one run: scan, confirm, tag
#[derive(Debug)]
pub struct Processor<R: CommandRunner> {
    settings: Settings,
    tagger: Tagger<R>,
}

impl<R: CommandRunner> Processor<R> {
    pub fn new(settings: Settings, tagger: Tagger<R>) -> Self {
        Processor { settings, tagger }
    }

    pub fn tagger(&self) -> &Tagger<R> {
        &self.tagger
    }

    /// Run the batch, reading the confirmation answer from `input`
    pub fn run<I: BufRead>(&mut self, input: &mut I) -> Result<RunOutcome> {
        let directory = &self.settings.directory;
        println!("Current directory: {}", directory.display());
        println!("Setting Album name as: '{}'", self.settings.album);

        let files = list_video_files(directory)
            .with_context(|| format!("Failed to scan {}", directory.display()))?;

        if files.is_empty() {
            println!("No MP4 or MKV files found in this directory. Nothing to do.");
            return Ok(RunOutcome::NothingToDo);
        }

        if !self.settings.assume_yes {
            let proceed = confirm(input, &mut io::stdout(), files.len())
                .context("Failed to read confirmation")?;
            if !proceed {
                println!("Operation cancelled.");
                return Ok(RunOutcome::Cancelled);
            }
        }

        println!("\nUpdating metadata...");
        let reports = self.tagger.tag_all(&files, &self.settings.album);
        println!("\nDone.");

        Ok(RunOutcome::Completed(reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::FileOutcome;
    use crate::tools::test_support::RecordingRunner;
    use crate::tools::ToolPaths;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings(dir: &TempDir, simulate: bool) -> Settings {
        Settings {
            album: "Show".to_string(),
            directory: dir.path().to_path_buf(),
            simulate,
            assume_yes: false,
            exiftool: None,
            mkvpropedit: None,
        }
    }

    fn tools() -> ToolPaths {
        ToolPaths {
            exiftool: Some(PathBuf::from("exiftool")),
            mkvpropedit: Some(PathBuf::from("mkvpropedit")),
        }
    }

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["ep10.mkv", "ep2.mp4", "ep1.mkv", "readme.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    fn processor(settings: Settings, scratch: &TempDir) -> Processor<RecordingRunner> {
        let tagger = Tagger::new(tools(), RecordingRunner::default(), settings.simulate)
            .with_scratch_dir(scratch.path().to_path_buf());
        Processor::new(settings, tagger)
    }

    #[test]
    fn test_cancel_invokes_nothing() {
        let dir = library();
        let scratch = TempDir::new().unwrap();
        let mut processor = processor(settings(&dir, false), &scratch);

        let outcome = processor.run(&mut Cursor::new(b"n\n".to_vec())).unwrap();

        assert!(matches!(outcome, RunOutcome::Cancelled));
        assert!(processor.tagger().runner().calls.is_empty());
    }

    #[test]
    fn test_confirmed_run_tags_in_natural_order() {
        let dir = library();
        let scratch = TempDir::new().unwrap();
        let mut processor = processor(settings(&dir, false), &scratch);

        let outcome = processor.run(&mut Cursor::new(b"YES\n".to_vec())).unwrap();

        let reports = match outcome {
            RunOutcome::Completed(reports) => reports,
            other => panic!("expected completed run, got {:?}", other),
        };
        let order: Vec<(String, String)> = reports
            .iter()
            .map(|r| {
                (
                    r.path.file_name().unwrap().to_string_lossy().into_owned(),
                    r.label.clone(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("ep1.mkv".to_string(), "Ep01".to_string()),
                ("ep2.mp4".to_string(), "Ep02".to_string()),
                ("ep10.mkv".to_string(), "Ep03".to_string()),
            ]
        );
        assert!(reports
            .iter()
            .all(|r| matches!(r.outcome, FileOutcome::Updated)));
        assert_eq!(processor.tagger().runner().calls.len(), 3);
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        let dir = library();
        let scratch = TempDir::new().unwrap();
        let mut settings = settings(&dir, false);
        settings.assume_yes = true;
        let mut processor = processor(settings, &scratch);

        let outcome = processor.run(&mut Cursor::new(Vec::new())).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(_)));
    }

    #[test]
    fn test_simulate_run_leaves_no_trace() {
        let dir = library();
        let scratch = TempDir::new().unwrap();
        let mut processor = processor(settings(&dir, true), &scratch);

        let outcome = processor.run(&mut Cursor::new(b"y\n".to_vec())).unwrap();

        match outcome {
            RunOutcome::Completed(reports) => assert!(reports
                .iter()
                .all(|r| matches!(r.outcome, FileOutcome::Simulated(_)))),
            other => panic!("expected completed run, got {:?}", other),
        }
        assert!(processor.tagger().runner().calls.is_empty());
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_directory_is_nothing_to_do() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let mut processor = processor(settings(&dir, false), &scratch);

        let outcome = processor.run(&mut Cursor::new(b"y\n".to_vec())).unwrap();

        assert!(matches!(outcome, RunOutcome::NothingToDo));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let mut settings = settings(&dir, false);
        settings.directory = dir.path().join("missing");
        let mut processor = processor(settings, &scratch);

        let err = processor.run(&mut Cursor::new(Vec::new())).unwrap_err();
        assert!(format!("{:#}", err).contains("Directory does not exist"));
    }
}
