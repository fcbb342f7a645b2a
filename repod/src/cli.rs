//! The command line interface of `repod`.

use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use repod_types::Architecture;
use url::Url;

use crate::Error;

/// An assignment of a source URL to a pkgbase (`pkgbase=URL`).
#[derive(Clone, Debug)]
pub struct PkgbaseUrl {
    /// The name of the pkgbase.
    pub pkgbase: String,
    /// The source URL of the pkgbase.
    pub url: Url,
}

impl FromStr for PkgbaseUrl {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (pkgbase, url) = input.split_once('=').ok_or_else(|| {
            Error::Validation(format!(
                "The pkgbase URL assignment '{input}' is not of the form 'pkgbase=URL'"
            ))
        })?;
        Ok(PkgbaseUrl {
            pkgbase: pkgbase.to_string(),
            url: Url::parse(url)
                .map_err(|error| Error::Validation(format!("Invalid URL '{url}': {error}")))?,
        })
    }
}

/// Collects a list of [`PkgbaseUrl`] assignments into a map.
pub fn pkgbase_url_map(urls: &[PkgbaseUrl]) -> BTreeMap<String, Url> {
    urls.iter()
        .map(|entry| (entry.pkgbase.clone(), entry.url.clone()))
        .collect()
}

/// Arguments selecting a target repository.
#[derive(Args, Clone, Debug)]
pub struct RepoArgs {
    /// The name of the target repository
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// The CPU architecture of the target repository
    #[arg(env = "REPOD_ARCHITECTURE", long, short, value_name = "ARCHITECTURE")]
    pub architecture: Option<Architecture>,

    /// Target the debug flavor of the repository
    #[arg(long)]
    pub debug: bool,

    /// Target the staging flavor of the repository
    #[arg(long)]
    pub staging: bool,

    /// Target the testing flavor of the repository
    #[arg(long)]
    pub testing: bool,
}

/// The command line interface of the repository manager.
#[derive(Clone, Debug, Parser)]
#[command(about, author, name = "repod", version)]
pub struct Cli {
    /// The path of a configuration file to use
    #[arg(env = "REPOD_CONFIG", global = true, long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The verbosity of the log output
    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available commands.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Add packages to a repository
    ///
    /// Validates the provided package files, updates the management
    /// records of the repository and atomically publishes the package
    /// files and sync databases. On any failure no file is changed.
    Add {
        /// The repository to add the packages to
        #[command(flatten)]
        repo: RepoArgs,

        /// The package files to add
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Also add the detached signature of every package file
        #[arg(long, short = 's')]
        with_signature: bool,

        /// Only print the would-be management records as JSON
        #[arg(long, short = 'n')]
        dry_run: bool,

        /// Provide the source URL of a pkgbase (pkgbase=URL, may be given
        /// multiple times)
        #[arg(long, short = 'u', value_name = "PKGBASE=URL")]
        url: Vec<PkgbaseUrl>,
    },

    /// Write the sync databases of a repository
    ///
    /// Regenerates the default and files sync databases from the current
    /// management records and atomically replaces the published ones.
    WriteSyncDbs {
        /// The repository to write the sync databases for
        #[command(flatten)]
        repo: RepoArgs,
    },

    /// Inspect a metadata file
    ///
    /// Parses a BUILDINFO, PKGINFO, MTREE or SRCINFO file, validates it and
    /// prints its canonical representation. The file kind is derived from
    /// the file name.
    Inspect {
        /// The metadata file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn pkgbase_url_from_str() -> TestResult {
        let entry = PkgbaseUrl::from_str("foo=https://example.org/")?;
        assert_eq!(entry.pkgbase, "foo");
        assert_eq!(entry.url.as_str(), "https://example.org/");
        assert!(PkgbaseUrl::from_str("foo").is_err());
        assert!(PkgbaseUrl::from_str("foo=not a url").is_err());
        Ok(())
    }
}
