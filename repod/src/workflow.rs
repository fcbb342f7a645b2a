//! Top-level workflows over the task engine.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    path::PathBuf,
    rc::Rc,
};

use log::debug;
use repod_repo_db::desc::RepoDescSchema;
use repod_types::Architecture;
use url::Url;

use crate::{
    config::{RepoDirKind, RepoFlavor, Settings},
    repo_file::RepoFileKind,
    task::{
        run, undo, ActionState, AddToRepo, ConsolidateOutputPackageBases,
        CreateOutputPackageBases, FilesToRepoDir, MoveTmpFiles, PrintOutputPackageBases,
        RemoveBackupFiles, RemoveOutdatedRepoFiles, SharedMoves, SharedPaths, SharedPkgbases,
        Task, WriteOutputPackageBasesToTmpFileInDir, WriteSyncDbsToTmpFilesInDir,
    },
    verification::{PacmanKeyVerifier, SignatureVerifier, VerificationType},
    Error,
};

/// Prints `message` to stderr and exits with return code 1.
///
/// The single exit point used by the command line front-end on workflow
/// failure.
pub fn exit_on_error(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

/// The target repository of a workflow invocation.
#[derive(Clone, Debug)]
pub struct RepoTarget {
    /// The name of the repository.
    pub name: String,
    /// The optional architecture of the repository.
    pub architecture: Option<Architecture>,
    /// The flavor of the repository.
    pub flavor: RepoFlavor,
}

/// The directories resolved for a [`RepoTarget`].
#[derive(Clone, Debug)]
struct TargetDirs {
    management_dir: PathBuf,
    package_repo_dir: PathBuf,
    package_pool_dir: PathBuf,
}

/// Resolves and creates the directories of `target`.
fn resolve_target_dirs(settings: &Settings, target: &RepoTarget) -> Result<TargetDirs, Error> {
    let management_dir = settings.get_repo_path(
        RepoDirKind::Management,
        &target.name,
        target.architecture,
        target.flavor,
    )?;
    let package_repo_dir = settings.get_repo_path(
        RepoDirKind::Package,
        &target.name,
        target.architecture,
        target.flavor,
    )?;
    let package_pool_dir = settings.get_repo_path(
        RepoDirKind::PackagePool,
        &target.name,
        target.architecture,
        target.flavor,
    )?;

    for dir in [&management_dir, &package_repo_dir, &package_pool_dir] {
        std::fs::create_dir_all(dir).map_err(|source| Error::File {
            path: dir.clone(),
            context: "creating a repository directory",
            source,
        })?;
    }

    Ok(TargetDirs {
        management_dir,
        package_repo_dir,
        package_pool_dir,
    })
}

/// Returns the signature verifier configured in `settings`, if signatures
/// are used.
fn configured_verifier(
    settings: &Settings,
    with_signature: bool,
) -> Result<Option<Box<dyn SignatureVerifier>>, Error> {
    if !with_signature {
        return Ok(None);
    }
    match settings.package_verification {
        Some(VerificationType::PacmanKey) => {
            Ok(Some(Box::new(PacmanKeyVerifier::new()?)))
        }
        None => Ok(None),
    }
}

/// Adds packages to a repository.
///
/// Builds and runs the task graph that parses the packages, consolidates
/// them against the current management state, stages and atomically moves
/// the management records, copies package (and signature) files into the
/// pool and repository directories and republishes the sync databases.
///
/// On any failure the whole graph is undone; no new file is observably
/// present in any destination afterwards. On success, backup files and the
/// repository files of replaced package versions are removed.
///
/// # Errors
///
/// Returns an error if resolving the target repository fails or if the
/// task graph does not end in success.
pub fn add_packages(
    settings: &Settings,
    files: Vec<PathBuf>,
    target: &RepoTarget,
    with_signature: bool,
    pkgbase_urls: BTreeMap<String, Url>,
) -> Result<(), Error> {
    debug!("Adding packages: {files:?}");

    let repo = settings.get_repo(&target.name, target.architecture)?;
    let url_validation = repo.package_url_validation.clone();
    let architecture = settings.get_repo_architecture(&target.name, target.architecture)?;
    let compression =
        settings.get_repo_database_compression(&target.name, target.architecture)?;
    let dirs = resolve_target_dirs(settings, target)?;
    let verifier = configured_verifier(settings, with_signature)?;

    let pkgbases: SharedPkgbases = Rc::new(RefCell::new(Vec::new()));
    let outdated_files: SharedPaths = Rc::new(RefCell::new(Vec::new()));
    let management_tmp_files: SharedPaths = Rc::new(RefCell::new(Vec::new()));
    let database_tmp_files: SharedPaths = Rc::new(RefCell::new(Vec::new()));
    let management_moves: SharedMoves = Rc::new(RefCell::new(Vec::new()));
    let database_moves: SharedMoves = Rc::new(RefCell::new(Vec::new()));

    let create = CreateOutputPackageBases::new(
        files.clone(),
        with_signature,
        architecture,
        target.flavor == RepoFlavor::Debug,
        pkgbase_urls,
        verifier,
        pkgbases.clone(),
    );
    let consolidate = ConsolidateOutputPackageBases::new(
        dirs.management_dir.clone(),
        dirs.package_repo_dir.clone(),
        url_validation,
        pkgbases.clone(),
        outdated_files.clone(),
        vec![Box::new(create)],
    );
    let write_management = WriteOutputPackageBasesToTmpFileInDir::new(
        dirs.management_dir.clone(),
        pkgbases.clone(),
        management_tmp_files.clone(),
        Vec::new(),
    );
    let move_management = MoveTmpFiles::new(
        vec![management_tmp_files],
        management_moves.clone(),
        vec![Box::new(consolidate), Box::new(write_management)],
    );

    let package_files = FilesToRepoDir::new(
        files.clone(),
        RepoFileKind::Package,
        dirs.package_repo_dir.clone(),
        dirs.package_pool_dir.clone(),
    );

    let write_databases = WriteSyncDbsToTmpFilesInDir::new(
        target.name.clone(),
        dirs.management_dir.clone(),
        dirs.package_repo_dir.clone(),
        compression,
        RepoDescSchema::default(),
        database_tmp_files.clone(),
    );
    let move_databases = MoveTmpFiles::new(
        vec![database_tmp_files],
        database_moves.clone(),
        vec![Box::new(write_databases)],
    );

    let mut dependencies: Vec<Box<dyn Task>> =
        vec![Box::new(move_management), Box::new(package_files)];
    if with_signature {
        let signature_files = files
            .iter()
            .map(|file| PathBuf::from(format!("{}.sig", file.display())))
            .collect();
        dependencies.push(Box::new(FilesToRepoDir::new(
            signature_files,
            RepoFileKind::PackageSignature,
            dirs.package_repo_dir.clone(),
            dirs.package_pool_dir.clone(),
        )));
    }
    dependencies.push(Box::new(move_databases));

    let mut add_to_repo = AddToRepo::new(dependencies);
    if run(&mut add_to_repo) != ActionState::Success {
        undo(&mut add_to_repo);
        return Err(Error::Task(
            "An error occurred while trying to add packages to a repository".to_string(),
        ));
    }

    let mut remove_backups = RemoveBackupFiles::new(vec![management_moves, database_moves]);
    run(&mut remove_backups);
    let mut remove_outdated = RemoveOutdatedRepoFiles::new(outdated_files);
    run(&mut remove_outdated);

    Ok(())
}

/// Prints the management records that adding packages would produce.
///
/// Only the record creation runs; the file system is not touched.
///
/// # Errors
///
/// Returns an error if resolving the target repository fails or if
/// creating the records fails.
pub fn add_packages_dryrun(
    settings: &Settings,
    files: Vec<PathBuf>,
    target: &RepoTarget,
    with_signature: bool,
    pkgbase_urls: BTreeMap<String, Url>,
) -> Result<(), Error> {
    debug!("Adding packages in a dry-run: {files:?}");

    let architecture = settings.get_repo_architecture(&target.name, target.architecture)?;
    let verifier = configured_verifier(settings, with_signature)?;

    let pkgbases: SharedPkgbases = Rc::new(RefCell::new(Vec::new()));
    let create = CreateOutputPackageBases::new(
        files,
        with_signature,
        architecture,
        target.flavor == RepoFlavor::Debug,
        pkgbase_urls,
        verifier,
        pkgbases.clone(),
    );
    let mut print = PrintOutputPackageBases::new(pkgbases, vec![Box::new(create)]);

    if run(&mut print) != ActionState::Success {
        undo(&mut print);
        return Err(Error::Task(
            "An error occurred while trying to add packages to a repository in a dry-run"
                .to_string(),
        ));
    }

    Ok(())
}

/// Writes the sync databases of a repository from its current management
/// records.
///
/// # Errors
///
/// Returns an error if resolving the target repository fails or if the
/// task graph does not end in success.
pub fn write_sync_databases(settings: &Settings, target: &RepoTarget) -> Result<(), Error> {
    let compression =
        settings.get_repo_database_compression(&target.name, target.architecture)?;
    let dirs = resolve_target_dirs(settings, target)?;

    let database_tmp_files: SharedPaths = Rc::new(RefCell::new(Vec::new()));
    let database_moves: SharedMoves = Rc::new(RefCell::new(Vec::new()));

    let write_databases = WriteSyncDbsToTmpFilesInDir::new(
        target.name.clone(),
        dirs.management_dir,
        dirs.package_repo_dir,
        compression,
        RepoDescSchema::default(),
        database_tmp_files.clone(),
    );
    let mut move_databases = MoveTmpFiles::new(
        vec![database_tmp_files],
        database_moves.clone(),
        vec![Box::new(write_databases)],
    );

    if run(&mut move_databases) != ActionState::Success {
        undo(&mut move_databases);
        return Err(Error::Task(
            "An error occurred while trying to write a repository's sync databases".to_string(),
        ));
    }

    let mut remove_backups = RemoveBackupFiles::new(vec![database_moves]);
    run(&mut remove_backups);

    Ok(())
}
