//! fw-meta - firmware metadata tool
//!
//! Generates build identity (timestamp, version, VCS-derived build id),
//! assembles firmware manifests with per-part checksums, and packages a
//! manifest plus its files into a zip archive.
//!
//! Command and flag names keep their underscore spelling
//! (`gen_build_info`, `--json_output`) for compatibility with existing build
//! scripts; kebab-case aliases are accepted too.
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]

pub mod cmd;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use fwmeta_core::build_info::DirtyPolicy;
use fwmeta_core::output::Sink;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fw-meta")]
#[command(author, version = env!("FW_META_VERSION"), about = "FW metadata tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate build info
    #[command(name = "gen_build_info", alias = "gen-build-info")]
    GenBuildInfo(GenBuildInfoArgs),

    /// Extract build info from manifest
    #[command(name = "get_build_info", alias = "get-build-info")]
    GetBuildInfo {
        /// Manifest to read
        #[arg(short, long)]
        manifest: PathBuf,
        #[command(flatten)]
        output: BuildInfoOutput,
    },

    /// Create manifest
    #[command(name = "create_manifest", alias = "create-manifest")]
    CreateManifest(CreateManifestArgs),

    /// Create firmware ZIP
    #[command(name = "create_fw", alias = "create-fw")]
    CreateFw {
        /// Manifest describing the firmware
        #[arg(short, long)]
        manifest: PathBuf,
        /// Archive to write
        #[arg(short, long)]
        output: PathBuf,
        /// Base directory for part sources
        #[arg(long = "src_dir", alias = "src-dir", env = "FW_META_SRC_DIR")]
        src_dir: Option<PathBuf>,
    },

    /// Extract keys from a JSON file
    Get {
        /// JSON document
        json_file: PathBuf,
        /// Dotted key paths, e.g. `parts.boot.src`
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

/// Where build info goes. Each destination is a path or `-` for stdout.
#[derive(Debug, Args)]
pub struct BuildInfoOutput {
    /// Write build info as JSON
    #[arg(long = "json_output", alias = "json-output", value_name = "PATH|-")]
    pub json_output: Option<Sink>,
    /// Write build info as C constants
    #[arg(long = "c_output", alias = "c-output", value_name = "PATH|-")]
    pub c_output: Option<Sink>,
}

#[derive(Debug, Args)]
pub struct GenBuildInfoArgs {
    /// Build timestamp (default: now, UTC; empty string omits)
    #[arg(short, long)]
    pub timestamp: Option<String>,
    /// Build version (default: tag or YYYYMMDDHHMMSS; empty string omits)
    #[arg(short, long)]
    pub version: Option<String>,
    /// Build id (default: derived from git; empty string omits)
    #[arg(short, long)]
    pub id: Option<String>,
    /// Mark the build id dirty
    #[arg(long, value_enum, default_value_t = DirtyArg::Auto)]
    pub dirty: DirtyArg,
    /// Use a tag on the current commit as the version
    #[arg(
        long = "tag_as_version",
        alias = "tag-as-version",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub tag_as_version: bool,
    /// Directory inside the git repository (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
    #[command(flatten)]
    pub output: BuildInfoOutput,
}

#[derive(Debug, Args)]
pub struct CreateManifestArgs {
    /// Firmware name
    #[arg(short, long)]
    pub name: String,
    /// Target platform
    #[arg(short, long)]
    pub platform: String,
    /// Build info: a JSON file, or inline JSON
    #[arg(short = 'i', long = "build_info", alias = "build-info")]
    pub build_info: String,
    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Comma-separated checksum algorithms (empty disables)
    #[arg(long, default_value = "sha1")]
    pub checksums: String,
    /// Base directory for part sources
    #[arg(long = "src_dir", alias = "src-dir", env = "FW_META_SRC_DIR")]
    pub src_dir: Option<PathBuf>,
    /// Manifest destination (default: stdout)
    #[arg(short, long, value_name = "PATH|-")]
    pub output: Option<Sink>,
    /// Parts as name:key=value[,key=value...]
    #[arg(required = true)]
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirtyArg {
    Auto,
    #[value(name = "true")]
    True,
    #[value(name = "false")]
    False,
}

impl From<DirtyArg> for DirtyPolicy {
    fn from(arg: DirtyArg) -> Self {
        match arg {
            DirtyArg::Auto => Self::Auto,
            DirtyArg::True => Self::Dirty,
            DirtyArg::False => Self::Clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn underscore_and_kebab_spellings() {
        for argv in [
            ["fw-meta", "gen_build_info", "--json_output", "-"],
            ["fw-meta", "gen-build-info", "--json-output", "-"],
        ] {
            let cli = Cli::try_parse_from(argv).unwrap();
            let Commands::GenBuildInfo(args) = cli.command else {
                panic!("expected gen_build_info");
            };
            assert_eq!(args.output.json_output, Some(Sink::Stdout));
            assert_eq!(args.dirty, DirtyArg::Auto);
            assert!(!args.tag_as_version);
        }
    }

    #[test]
    fn empty_version_is_kept_distinct_from_absent() {
        let cli = Cli::try_parse_from(["fw-meta", "gen_build_info", "--version", ""]).unwrap();
        let Commands::GenBuildInfo(args) = cli.command else {
            panic!("expected gen_build_info");
        };
        assert_eq!(args.version.as_deref(), Some(""));
        assert_eq!(args.timestamp, None);
    }

    #[test]
    fn tag_as_version_flag_forms() {
        for (argv, expected) in [
            (vec!["fw-meta", "gen_build_info", "--tag_as_version"], true),
            (vec!["fw-meta", "gen_build_info", "--tag_as_version", "true"], true),
            (vec!["fw-meta", "gen_build_info", "--tag_as_version=false"], false),
        ] {
            let cli = Cli::try_parse_from(argv).unwrap();
            let Commands::GenBuildInfo(args) = cli.command else {
                panic!("expected gen_build_info");
            };
            assert_eq!(args.tag_as_version, expected);
        }
    }

    #[test]
    fn create_manifest_requires_parts() {
        let result = Cli::try_parse_from([
            "fw-meta",
            "create_manifest",
            "-n",
            "demo",
            "-p",
            "esp8266",
            "-i",
            "{}",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn dirty_values() {
        let cli = Cli::try_parse_from(["fw-meta", "gen_build_info", "--dirty", "true"]).unwrap();
        let Commands::GenBuildInfo(args) = cli.command else {
            panic!("expected gen_build_info");
        };
        assert_eq!(DirtyPolicy::from(args.dirty), DirtyPolicy::Dirty);
        assert!(Cli::try_parse_from(["fw-meta", "gen_build_info", "--dirty", "maybe"]).is_err());
    }
}
