use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, writing to stderr so it never
/// mixes with the per-file report on stdout.
///
/// `--verbose` forces debug output for this crate; otherwise `RUST_LOG`
/// applies, defaulting to warnings only.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("set_anime_title=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
