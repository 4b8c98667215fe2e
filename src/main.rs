mod cli;
mod logging;

use crate::cli::Cli;
use clap::Parser;
use mediaopt_config::ConfigLoader;
use mediaopt_library::{Context, Options};
use miette::IntoDiagnostic;
use std::fmt::Debug;
use tracing::warn;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let (args, unknown) = cli::partition_args(std::env::args());
    let cli = Cli::parse_from(args);
    logging::init(cli.verbose);
    for flag in unknown {
        warn!("Ignoring unknown flag {flag}");
    }

    let cwd = std::env::current_dir().into_diagnostic()?;
    let root = match &cli.root {
        Some(root) => mediaopt_storage::normalize_path(cwd.join(root)),
        None => cwd.clone(),
    };
    let mut loader = ConfigLoader::new(&root);
    if let Some(file) = &cli.config {
        loader = loader.with_file(cwd.join(file));
    }
    let config = loader.load().map_err(report)?;

    let options = Options { force: cli.force, dry_run: cli.dry_run };
    let ctx = Context::new(root, &config, options).with_working_dir(cwd);
    mediaopt_library::run(&ctx, &cli.paths).await.map_err(report)?;
    Ok(())
}

/// Render a fatal error tree, with locations, for the terminal.
fn report(err: impl Debug) -> miette::Report {
    miette::miette!("{err:?}")
}
