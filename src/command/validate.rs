//! Changelog validation command implementation.
use log::*;

use crate::{
    Result,
    changelog::schema::validate_file,
    cli,
    command::common,
    config::Config,
    error::ReleaseScribeError,
};

/// Execute the validate command. Paths default to the configured ones; the
/// configuration file itself is optional here.
pub fn execute(args: &cli::Args) -> Result<()> {
    let cli::Command::Validate { changelog, schema } = &args.command else {
        return Err(ReleaseScribeError::InvalidArgs(
            "expected the validate command".into(),
        ));
    };

    let config = if args.config.exists() {
        common::load_configuration(args)?
    } else {
        debug!(
            "{} not found: using default paths",
            args.config.display()
        );
        Config::default()
    };

    let root = common::working_root();

    let changelog = changelog
        .clone()
        .unwrap_or_else(|| root.join(&config.changelog_path));

    let schema = schema
        .clone()
        .or_else(|| config.schema_path.as_ref().map(|p| root.join(p)));

    validate_file(&changelog, schema.as_deref())?;

    Ok(())
}
