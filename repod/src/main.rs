//! The `repod` executable.

use clap::Parser;
use repod::{
    cli::{pkgbase_url_map, Cli, Command, RepoArgs},
    config::{RepoFlavor, Settings, SYSTEM_SETTINGS_LOCATION},
    workflow::{self, exit_on_error, RepoTarget},
    Error,
};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Loads the settings from the explicitly provided or default locations.
fn load_settings(config: Option<&std::path::Path>) -> Result<Settings, Error> {
    if let Some(config) = config {
        return Settings::from_file(config);
    }

    if let Some(user_config) = repod::config::user_settings_location() {
        if user_config.exists() {
            return Settings::from_file(user_config);
        }
    }

    let system_config = std::path::Path::new(SYSTEM_SETTINGS_LOCATION);
    if system_config.exists() {
        return Settings::from_file(system_config);
    }

    Err(Error::Validation(
        "No configuration file found (and none provided)".to_string(),
    ))
}

/// Creates a [`RepoTarget`] from repository arguments.
fn repo_target(repo: &RepoArgs) -> Result<RepoTarget, Error> {
    Ok(RepoTarget {
        name: repo.repo.clone(),
        architecture: repo.architecture,
        flavor: RepoFlavor::from_flags(repo.debug, repo.staging, repo.testing)?,
    })
}

/// Runs the selected command.
///
/// Settings are only loaded for the commands operating on a repository;
/// `inspect` works on plain metadata files.
fn run_command(cli: Cli) -> Result<(), Error> {
    let Cli {
        config, command, ..
    } = cli;

    match command {
        Command::Add {
            repo,
            files,
            with_signature,
            dry_run,
            url,
        } => {
            let settings = load_settings(config.as_deref())?;
            let target = repo_target(&repo)?;
            let pkgbase_urls = pkgbase_url_map(&url);
            if dry_run {
                workflow::add_packages_dryrun(
                    &settings,
                    files,
                    &target,
                    with_signature,
                    pkgbase_urls,
                )
            } else {
                workflow::add_packages(&settings, files, &target, with_signature, pkgbase_urls)
            }
        }
        Command::WriteSyncDbs { repo } => {
            let settings = load_settings(config.as_deref())?;
            let target = repo_target(&repo)?;
            workflow::write_sync_databases(&settings, &target)
        }
        Command::Inspect { file } => inspect(&file),
    }
}

/// Parses a metadata file and prints its canonical representation.
fn inspect(file: &std::path::Path) -> Result<(), Error> {
    use repod_common::MetadataFile;

    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::FileNotFound(file.to_path_buf()))?;

    match file_name {
        ".BUILDINFO" => {
            print!("{}", repod_buildinfo::BuildInfo::from_file(file)?);
        }
        ".PKGINFO" => {
            print!("{}", repod_pkginfo::PackageInfo::from_file(file)?);
        }
        ".MTREE" => {
            let mtree = repod_mtree::Mtree::from_file(file)?;
            for entry in mtree.entries() {
                println!("{entry:?}");
            }
        }
        ".SRCINFO" => {
            let source_info = repod_srcinfo::SourceInfo::from_file(file)?;
            println!(
                "pkgbase: {} {}",
                source_info
                    .base()
                    .name
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                source_info.version()?
            );
            for package in source_info.merged_packages()? {
                println!("pkgname: {}", package.name);
            }
        }
        _ => {
            return Err(Error::Validation(format!(
                "The file name '{file_name}' does not denote a known metadata file"
            )));
        }
    }

    Ok(())
}

/// The main entry point of the `repod` executable.
fn main() {
    let cli = Cli::parse();

    if TermLogger::init(
        cli.verbosity.log_level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_err()
    {
        exit_on_error("Failed initializing the logger");
    }

    if let Err(error) = run_command(cli) {
        exit_on_error(&error.to_string());
    }
}
