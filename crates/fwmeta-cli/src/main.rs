//! fw-meta - firmware metadata CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fwmeta_cli::cmd;
use fwmeta_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON and C output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenBuildInfo(args) => cmd::gen_build_info::gen_build_info(args),
        Commands::GetBuildInfo { manifest, output } => cmd::get_build_info::get_build_info(
            &manifest,
            output.json_output.as_ref(),
            output.c_output.as_ref(),
        ),
        Commands::CreateManifest(args) => cmd::create_manifest::create_manifest(args),
        Commands::CreateFw {
            manifest,
            output,
            src_dir,
        } => cmd::create_fw::create_fw(&manifest, &output, src_dir.as_deref()),
        Commands::Get { json_file, keys } => cmd::get::get(&json_file, &keys),
    }
}
