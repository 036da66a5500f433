use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use erroraway_metadata::{DescriptionStore, RuleMetadataGenerator};
use erroraway_rules::CheckerRegistry;

/// Generates the rule and repository descriptor files bundled with the
/// analysis plugin.
#[derive(Debug, Parser)]
#[command(name = "erroraway-metadata", version)]
struct Args {
    /// Directory the descriptor tree is written to.
    #[arg(long)]
    output_dir: PathBuf,

    /// Root of the bundled Markdown rule descriptions. Defaults to the
    /// descriptions shipped with this crate.
    #[arg(long)]
    descriptions_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let descriptions_dir = args.descriptions_dir.unwrap_or_else(|| {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/bugpattern"))
    });

    let descriptions = DescriptionStore::new(&descriptions_dir);
    let registry = CheckerRegistry::with_bundled_plugins();
    let generator = RuleMetadataGenerator::new(&args.output_dir, &descriptions);

    generator
        .generate_all(&registry)
        .with_context(|| format!("generating rule metadata into {}", args.output_dir.display()))?;

    info!("rule metadata written to {}", args.output_dir.display());
    Ok(())
}
