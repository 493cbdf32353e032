use set_anime_title::args::Args;
use set_anime_title::logging;
use set_anime_title::processor::Processor;
use set_anime_title::tagger::Tagger;
use set_anime_title::tools::{SystemRunner, ToolPaths};

fn main() {
    let args = match Args::try_parse_words(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            // --help and --version print to stdout and succeed
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = args.into_settings()?;

    if settings.simulate {
        println!("[SIMULATE] Simulation mode active. No files will be modified.");
    }

    // Resolve tools once; a missing one only disables its format
    let discovery =
        ToolPaths::discover(settings.exiftool.as_deref(), settings.mkvpropedit.as_deref());
    for tool in &discovery.missing {
        println!("Warning: {} not found in PATH. Some files may fail to update.", tool);
    }
    let tagger = Tagger::new(discovery.tools, SystemRunner, settings.simulate);

    let mut processor = Processor::new(settings, tagger);
    processor.run(&mut std::io::stdin().lock())?;

    Ok(())
}
