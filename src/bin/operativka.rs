// Binary entry point for the command-line application.
use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use operativka::cli::{self, Cli};
use operativka::config::Config;
use operativka::context::StandardContext;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

fn main() -> Result<()> {
    let args = Cli::parse();
    let ctx = StandardContext::new(args.root.clone());
    let config = Config::load(&ctx)?;

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        config.level_filter().unwrap_or(LevelFilter::Warn)
    };
    // Already initialized is fine.
    let _ = TermLogger::init(
        level,
        ConfigBuilder::new().build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    log::debug!("Config: {}", Config::get_path_string(&ctx)?);

    let output = cli::execute(args.command, &ctx, &config, chrono::Local::now())?;
    println!("{}", output);
    Ok(())
}
