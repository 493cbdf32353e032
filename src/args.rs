use anyhow::{bail, Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Long options that take the following word as their value
const VALUE_OPTIONS: &[&str] = &["--dir", "--exiftool", "--mkvpropedit"];

/// Short flags that take no value
const SHORT_FLAGS: &str = "syvhV";

/// Set episode titles and the album name on every MP4/MKV file in a directory
#[derive(Parser, Debug)]
#[command(name = "set-anime-title", version)]
#[command(after_help = "Example:\n  set-anime-title Cowboy Bebop --simulate")]
pub struct Args {
    /// Series title, written as the album; words are joined with spaces
    #[arg(value_name = "TITLE")]
    pub title: Vec<String>,

    /// Print what would be done without touching any file
    #[arg(short, long, visible_alias = "dry-run")]
    pub simulate: bool,

    /// Directory to scan (defaults to the current directory)
    #[arg(short, long, env = "SET_ANIME_TITLE_DIR", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// exiftool program to use for MP4 files
    #[arg(long, env = "SET_ANIME_TITLE_EXIFTOOL", value_name = "PATH")]
    pub exiftool: Option<PathBuf>,

    /// mkvpropedit program to use for MKV files
    #[arg(long, env = "SET_ANIME_TITLE_MKVPROPEDIT", value_name = "PATH")]
    pub mkvpropedit: Option<PathBuf>,

    /// Log every command before it runs
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub album: String,
    pub directory: PathBuf,
    pub simulate: bool,
    pub assume_yes: bool,
    pub exiftool: Option<PathBuf>,
    pub mkvpropedit: Option<PathBuf>,
}

impl Args {
    /// Parse a command line where any word that is not an option belongs to
    /// the title, so titles like `Re:Zero -Starting Life-` survive intact
    pub fn try_parse_words<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(arrange_title_last(argv))
    }

    /// Validate the arguments and resolve defaults
    pub fn into_settings(self) -> Result<Settings> {
        if self.title.is_empty() {
            bail!("Usage: set-anime-title <Anime Title> [--simulate]");
        }

        let album = join_title(&self.title);
        if album.is_empty() {
            bail!("Anime title cannot be empty.");
        }

        let directory = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        Ok(Settings {
            album,
            directory,
            simulate: self.simulate,
            assume_yes: self.yes,
            exiftool: self.exiftool,
            mkvpropedit: self.mkvpropedit,
        })
    }
}

/// Move title words behind a `--` so clap never reads them as options.
/// Options are words starting with `--` (plus the value of `--dir` and the
/// tool overrides), `-d <DIR>`, and clusters of the value-less short flags.
fn arrange_title_last<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut words = argv.into_iter().map(Into::into);
    let mut options: Vec<OsString> = words.next().into_iter().collect();
    let mut title = Vec::new();

    while let Some(word) = words.next() {
        let text = word.to_string_lossy().into_owned();

        if text == "--" {
            title.extend(words.by_ref());
            break;
        }

        let takes_value = VALUE_OPTIONS.contains(&text.as_str()) || text == "-d";
        if text.starts_with("--") || text == "-d" || is_short_flag_cluster(&text) {
            options.push(word);
            if takes_value {
                options.extend(words.next());
            }
        } else {
            title.push(word);
        }
    }

    if !title.is_empty() {
        options.push(OsString::from("--"));
        options.extend(title);
    }
    options
}

fn is_short_flag_cluster(text: &str) -> bool {
    match text.strip_prefix('-') {
        Some(flags) => !flags.is_empty() && flags.chars().all(|c| SHORT_FLAGS.contains(c)),
        None => false,
    }
}

/// Join title words with single spaces, dropping blank words
fn join_title(words: &[String]) -> String {
    words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_words(std::iter::once("set-anime-title").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_title_words_are_joined() {
        let settings = parse(&["Cowboy", "Bebop", "--dir", "/tmp"])
            .into_settings()
            .unwrap();
        assert_eq!(settings.album, "Cowboy Bebop");
        assert_eq!(settings.directory, PathBuf::from("/tmp"));
        assert!(!settings.simulate);
    }

    #[test]
    fn test_simulate_flag_and_dry_run_alias() {
        assert!(parse(&["Show", "--simulate"]).simulate);
        assert!(parse(&["Show", "-s"]).simulate);
        assert!(parse(&["--dry-run", "Show"]).simulate);
    }

    #[test]
    fn test_missing_title_is_an_error() {
        assert!(parse(&["--simulate"]).into_settings().is_err());
    }

    #[test]
    fn test_blank_title_is_an_error() {
        let err = parse(&["  ", ""]).into_settings().unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_defaults_to_current_directory() {
        let settings = parse(&["Show"]).into_settings().unwrap();
        assert_eq!(settings.directory, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_tool_overrides() {
        let args = parse(&["Show", "--exiftool", "/opt/exiftool", "-y"]);
        assert_eq!(args.exiftool, Some(PathBuf::from("/opt/exiftool")));
        assert!(args.yes);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_words(["set-anime-title", "Show", "--bogus"]).is_err());
    }

    #[test]
    fn test_hyphenated_title_words_are_kept() {
        let settings = parse(&["Re:Zero", "-Starting", "Life-", "--simulate"])
            .into_settings()
            .unwrap();
        assert_eq!(settings.album, "Re:Zero -Starting Life-");
        assert!(settings.simulate);
    }

    #[test]
    fn test_title_may_start_with_a_hyphen() {
        let args = parse(&["-Starting", "--dir", "/media/show", "Over"]);
        assert_eq!(args.title, vec!["-Starting", "Over"]);
        assert_eq!(args.dir, Some(PathBuf::from("/media/show")));
    }

    #[test]
    fn test_short_flags_still_parse() {
        let args = parse(&["-sy", "Show", "-d", "/media/show", "-v"]);
        assert!(args.simulate);
        assert!(args.yes);
        assert!(args.verbose);
        assert_eq!(args.dir, Some(PathBuf::from("/media/show")));
        assert_eq!(args.title, vec!["Show"]);
    }

    #[test]
    fn test_words_after_double_dash_are_title() {
        let args = parse(&["--", "--simulate", "Show"]);
        assert!(!args.simulate);
        assert_eq!(args.title, vec!["--simulate", "Show"]);
    }

    #[test]
    fn test_arrange_title_last() {
        let argv = arrange_title_last(["prog", "A", "-B", "--dir", "x", "C", "-s"]);
        let argv: Vec<String> = argv
            .into_iter()
            .map(|w| w.to_string_lossy().into_owned())
            .collect();
        assert_eq!(argv, vec!["prog", "--dir", "x", "-s", "--", "A", "-B", "C"]);
    }
}
