use clap::Parser;

use release_scribe::{Args, Command, Result, command};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("release_scribe")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    match cli_args.command {
        Command::Update { .. } => command::update::execute(&cli_args).await?,
        Command::Sync { .. } => command::sync::execute(&cli_args).await?,
        Command::Validate { .. } => command::validate::execute(&cli_args)?,
    }

    Ok(())
}
