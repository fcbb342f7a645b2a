//! The task engine: idempotent, undoable units of work.
//!
//! Tasks form a directed acyclic graph through their dependencies. The
//! engine ([`run`], [`undo`]) implements the universal execution protocol:
//! dependencies first, then pre-checks, the task operation, post-checks.
//! Undoing reverses the task operation and then the dependencies in
//! reverse order.
//!
//! Tasks own their dependencies. Data that flows between sibling tasks is
//! passed through shared handles created by the workflow layer.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, info};
use repod_management::{
    stream_management_dir_to_database, OutputPackageBase, PackageIndex, PACKAGE_INDEX_FILE_NAME,
};
use repod_package::Package;
use repod_repo_db::{db::DatabaseKind, desc::RepoDescSchema};
use repod_types::{Architecture, CompressionType, Name};
use url::Url;

use crate::{
    check::{
        Check, CheckState, DebugPackagesCheck, MatchingArchitectureCheck,
        PackagesNewOrUpdatedCheck, PacmanKeyPackagesSignatureVerificationCheck, PkgbaseSnapshot,
        PkgbasesVersionUpdateCheck, SourceUrlCheck,
    },
    config::UrlValidationSettings,
    repo_file::{RepoFile, RepoFileKind},
    verification::SignatureVerifier,
    Error,
};

/// The suffix of temporary files staged for an atomic move.
const TMP_SUFFIX: &str = ".tmp";

/// The suffix of backup files created before an atomic move.
const BACKUP_SUFFIX: &str = ".bkp";

/// The state of a task.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ActionState {
    /// The task has not been started yet.
    #[default]
    NotStarted,
    /// The task has been started.
    Started,
    /// The task operation has been started.
    StartedTask,
    /// The task operation succeeded.
    SuccessTask,
    /// The task operation failed.
    FailedTask,
    /// A pre-check of the task failed.
    FailedPreCheck,
    /// A post-check of the task failed.
    FailedPostCheck,
    /// A dependency of the task failed.
    FailedDependency,
    /// The task (including all checks) succeeded.
    Success,
    /// Undoing the task operation failed.
    FailedUndoTask,
    /// Undoing a dependency of the task failed.
    FailedUndoDependency,
}

/// An interface for idempotent, undoable units of work.
///
/// Implementations provide their dependencies, checks and the actual
/// operation ([`Task::do_task`]) together with its reversal
/// ([`Task::undo_task`]). The execution protocol itself is implemented by
/// the free functions [`run`] and [`undo`].
pub trait Task {
    /// Returns the dependencies of the task.
    fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut []
    }

    /// Returns the pre-checks of the task.
    fn pre_checks_mut(&mut self) -> &mut [Box<dyn Check>] {
        &mut []
    }

    /// Returns the post-checks of the task.
    fn post_checks_mut(&mut self) -> &mut [Box<dyn Check>] {
        &mut []
    }

    /// Returns the current state of the task.
    fn state(&self) -> ActionState;

    /// Sets the state of the task.
    fn set_state(&mut self, state: ActionState);

    /// Runs the operation of the task.
    ///
    /// Returns [`ActionState::SuccessTask`] on success and
    /// [`ActionState::FailedTask`] otherwise. Implementations set their own
    /// state accordingly and never propagate errors.
    fn do_task(&mut self) -> ActionState;

    /// Reverses the operation of the task.
    ///
    /// Returns [`ActionState::NotStarted`] on success and
    /// [`ActionState::FailedUndoTask`] otherwise.
    fn undo_task(&mut self) -> ActionState;
}

/// Runs a task according to the universal execution protocol.
///
/// 1. All dependencies are run in order. The first dependency that does not
///    end in [`ActionState::Success`] fails the task with
///    [`ActionState::FailedDependency`] without running any checks or the
///    operation.
/// 2. A task that is already [`ActionState::Success`] returns immediately.
/// 3. Pre-checks run in order; the first failure yields
///    [`ActionState::FailedPreCheck`].
/// 4. The task operation runs; anything but [`ActionState::SuccessTask`]
///    ends the run with the state the operation set.
/// 5. Post-checks run in order; the first failure yields
///    [`ActionState::FailedPostCheck`].
pub fn run(task: &mut dyn Task) -> ActionState {
    let mut dependency_failed = false;
    for dependency in task.dependencies_mut() {
        if run(dependency.as_mut()) != ActionState::Success {
            dependency_failed = true;
            break;
        }
    }
    if dependency_failed {
        task.set_state(ActionState::FailedDependency);
        return task.state();
    }

    if task.state() == ActionState::Success {
        return task.state();
    }

    task.set_state(ActionState::Started);

    let mut check_failed = false;
    for check in task.pre_checks_mut() {
        if check.run() != CheckState::Success {
            check_failed = true;
            break;
        }
    }
    if check_failed {
        task.set_state(ActionState::FailedPreCheck);
        return task.state();
    }

    if task.do_task() != ActionState::SuccessTask {
        return task.state();
    }

    let mut check_failed = false;
    for check in task.post_checks_mut() {
        if check.run() != CheckState::Success {
            check_failed = true;
            break;
        }
    }
    if check_failed {
        task.set_state(ActionState::FailedPostCheck);
        return task.state();
    }

    task.set_state(ActionState::Success);
    task.state()
}

/// Undoes a task and its dependencies in reverse order.
///
/// The terminal success state is [`ActionState::NotStarted`]. If undoing
/// any dependency fails, the task ends in
/// [`ActionState::FailedUndoDependency`].
pub fn undo(task: &mut dyn Task) -> ActionState {
    task.undo_task();

    let mut dependency_failed = false;
    for dependency in task.dependencies_mut().iter_mut().rev() {
        if undo(dependency.as_mut()) != ActionState::NotStarted {
            dependency_failed = true;
        }
    }
    if dependency_failed {
        task.set_state(ActionState::FailedUndoDependency);
    }

    task.state()
}

/// A shared handle over the management records produced by a workflow.
pub type SharedPkgbases = Rc<RefCell<Vec<OutputPackageBase>>>;

/// A shared handle over a list of staged temporary files.
pub type SharedPaths = Rc<RefCell<Vec<PathBuf>>>;

/// A shared handle over the moves performed by a [`MoveTmpFiles`] task.
pub type SharedMoves = Rc<RefCell<Vec<SourceDestination>>>;

/// A source and destination of an atomic file move, plus its backup state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceDestination {
    /// The source file (must carry the `.tmp` suffix).
    pub source: PathBuf,
    /// The destination file.
    pub destination: PathBuf,
    /// The backup location of the destination (carries the `.bkp` suffix).
    pub destination_backup: PathBuf,
    /// Whether a backup of the destination has been created.
    pub backup_done: bool,
}

impl SourceDestination {
    /// Creates a new [`SourceDestination`] from a `.tmp` source.
    ///
    /// The destination is the source with the `.tmp` suffix stripped, the
    /// backup is the destination with a `.bkp` suffix appended.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not absolute or does not carry the
    /// `.tmp` suffix, or if the destination carries the `.bkp` suffix.
    pub fn from_tmp_source(source: PathBuf) -> Result<Self, Error> {
        let source_str = source.to_string_lossy();
        if !source.is_absolute() {
            return Err(Error::Validation(format!(
                "The source path '{source_str}' must be absolute"
            )));
        }
        let Some(destination) = source_str.strip_suffix(TMP_SUFFIX) else {
            return Err(Error::Validation(format!(
                "The source path '{source_str}' must end in '{TMP_SUFFIX}'"
            )));
        };
        if destination.ends_with(BACKUP_SUFFIX) {
            return Err(Error::Validation(format!(
                "The destination path '{destination}' must not end in '{BACKUP_SUFFIX}'"
            )));
        }

        Ok(SourceDestination {
            destination: PathBuf::from(destination),
            destination_backup: PathBuf::from(format!("{destination}{BACKUP_SUFFIX}")),
            source,
            backup_done: false,
        })
    }
}

/// A task creating management records from a list of package files.
///
/// The resulting [`OutputPackageBase`] values are published through a
/// shared handle for downstream tasks.
pub struct CreateOutputPackageBases {
    package_paths: Vec<(PathBuf, Option<PathBuf>)>,
    pkgbase_urls: BTreeMap<String, Url>,
    architecture: Architecture,
    debug_repo: bool,
    pkgbases: SharedPkgbases,
    pre_checks: Vec<Box<dyn Check>>,
    post_checks: Vec<Box<dyn Check>>,
    state: ActionState,
}

impl std::fmt::Debug for CreateOutputPackageBases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateOutputPackageBases")
            .field("package_paths", &self.package_paths)
            .field("architecture", &self.architecture)
            .field("debug_repo", &self.debug_repo)
            .field("state", &self.state)
            .finish()
    }
}

impl CreateOutputPackageBases {
    /// Creates a new [`CreateOutputPackageBases`] task.
    ///
    /// With `with_signature`, a `.sig` companion path is derived for every
    /// file. If a `verifier` is provided, signature verification runs as a
    /// pre-check.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        files: Vec<PathBuf>,
        with_signature: bool,
        architecture: Architecture,
        debug_repo: bool,
        pkgbase_urls: BTreeMap<String, Url>,
        verifier: Option<Box<dyn SignatureVerifier>>,
        pkgbases: SharedPkgbases,
    ) -> Self {
        debug!("Initializing task to create management records from {files:?}...");

        let package_paths: Vec<(PathBuf, Option<PathBuf>)> = files
            .into_iter()
            .map(|file| {
                let signature = with_signature
                    .then(|| PathBuf::from(format!("{}.sig", file.display())));
                (file, signature)
            })
            .collect();

        let pre_checks: Vec<Box<dyn Check>> = verifier
            .map(|verifier| {
                Box::new(PacmanKeyPackagesSignatureVerificationCheck::new(
                    package_paths.clone(),
                    verifier,
                )) as Box<dyn Check>
            })
            .into_iter()
            .collect();

        CreateOutputPackageBases {
            package_paths,
            pkgbase_urls,
            architecture,
            debug_repo,
            pkgbases,
            pre_checks,
            post_checks: Vec::new(),
            state: ActionState::default(),
        }
    }

    /// Returns the shared handle over the created management records.
    pub fn pkgbases(&self) -> SharedPkgbases {
        self.pkgbases.clone()
    }
}

impl Task for CreateOutputPackageBases {
    fn pre_checks_mut(&mut self) -> &mut [Box<dyn Check>] {
        &mut self.pre_checks
    }

    fn post_checks_mut(&mut self) -> &mut [Box<dyn Check>] {
        &mut self.post_checks
    }

    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        debug!("Running task to create management records...");
        self.state = ActionState::StartedTask;

        let mut packages: Vec<Package> = Vec::new();
        for (package_path, signature) in &self.package_paths {
            match Package::from_file(package_path, signature.clone()) {
                Ok(package) => packages.push(package),
                Err(error) => {
                    info!("{error}");
                    self.state = ActionState::FailedTask;
                    return self.state;
                }
            }
        }

        // homogeneity and architecture constraints are verified after the
        // task operation
        self.post_checks.push(Box::new(DebugPackagesCheck::new(
            packages
                .iter()
                .map(|package| {
                    (
                        package.package_info().name().to_string(),
                        package.package_info().package_type(),
                    )
                })
                .collect(),
            self.debug_repo,
        )));
        self.post_checks.push(Box::new(MatchingArchitectureCheck::new(
            self.architecture,
            packages
                .iter()
                .map(|package| {
                    (
                        package.package_info().name().to_string(),
                        package.package_info().architecture(),
                    )
                })
                .collect(),
        )));

        // group the packages by pkgbase, preserving input order
        let mut groups: Vec<(Name, Vec<Package>)> = Vec::new();
        for package in packages {
            let base = package.package_info().base().clone();
            match groups.iter_mut().find(|(name, _)| *name == base) {
                Some((_, group)) => group.push(package),
                None => groups.push((base, vec![package])),
            }
        }

        for (base, group) in groups {
            debug!("Creating management record for pkgbase {base}...");
            match OutputPackageBase::from_packages(&group) {
                Ok(mut pkgbase) => {
                    pkgbase.set_source_url(
                        self.pkgbase_urls.get(base.inner()).cloned(),
                    );
                    self.pkgbases.borrow_mut().push(pkgbase);
                }
                Err(error) => {
                    info!("{error}");
                    self.state = ActionState::FailedTask;
                    return self.state;
                }
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        debug!("Undoing task to create management records...");
        self.pkgbases.borrow_mut().clear();
        self.post_checks.clear();
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task loading the current management records affected by an update.
///
/// Attaches the version, provision and source URL checks covering the
/// update as post-checks.
pub struct ConsolidateOutputPackageBases {
    management_dir: PathBuf,
    package_repo_dir: PathBuf,
    url_validation: Option<UrlValidationSettings>,
    new_pkgbases: SharedPkgbases,
    outdated_files: SharedPaths,
    dependencies: Vec<Box<dyn Task>>,
    post_checks: Vec<Box<dyn Check>>,
    state: ActionState,
}

impl std::fmt::Debug for ConsolidateOutputPackageBases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsolidateOutputPackageBases")
            .field("management_dir", &self.management_dir)
            .field("state", &self.state)
            .finish()
    }
}

impl ConsolidateOutputPackageBases {
    /// Creates a new [`ConsolidateOutputPackageBases`] task.
    ///
    /// The repository file paths of packages that an update replaces are
    /// published through the `outdated_files` handle, from which a
    /// [`RemoveOutdatedRepoFiles`] task clears them after overall success.
    pub fn new(
        management_dir: PathBuf,
        package_repo_dir: PathBuf,
        url_validation: Option<UrlValidationSettings>,
        new_pkgbases: SharedPkgbases,
        outdated_files: SharedPaths,
        dependencies: Vec<Box<dyn Task>>,
    ) -> Self {
        ConsolidateOutputPackageBases {
            management_dir,
            package_repo_dir,
            url_validation,
            new_pkgbases,
            outdated_files,
            dependencies,
            post_checks: Vec::new(),
            state: ActionState::default(),
        }
    }
}

impl Task for ConsolidateOutputPackageBases {
    fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut self.dependencies
    }

    fn post_checks_mut(&mut self) -> &mut [Box<dyn Check>] {
        &mut self.post_checks
    }

    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        debug!("Running task to consolidate management records...");
        self.state = ActionState::StartedTask;

        let new_pkgbases = self.new_pkgbases.borrow();

        let index = match PackageIndex::from_dir(&self.management_dir) {
            Ok(index) => index,
            Err(error) => {
                info!("{error}");
                self.state = ActionState::FailedTask;
                return self.state;
            }
        };

        // load the records that the update affects: the updated pkgbases
        // themselves and the current owners of all updated package names
        let mut affected: Vec<String> = new_pkgbases
            .iter()
            .map(|pkgbase| pkgbase.base().to_string())
            .collect();
        for pkgbase in new_pkgbases.iter() {
            for name in pkgbase.package_names() {
                if let Some(owner) = index.pkgbase_of(name.inner()) {
                    affected.push(owner.to_string());
                }
            }
        }
        affected.sort();
        affected.dedup();

        let mut current_pkgbases: Vec<OutputPackageBase> = Vec::new();
        for base in affected {
            let path = self.management_dir.join(format!("{base}.json"));
            if !path.exists() {
                continue;
            }
            match OutputPackageBase::from_file(&path) {
                Ok(pkgbase) => current_pkgbases.push(pkgbase),
                Err(error) => {
                    info!("{error}");
                    self.state = ActionState::FailedTask;
                    return self.state;
                }
            }
        }

        self.post_checks
            .push(Box::new(PkgbasesVersionUpdateCheck::from_pkgbases(
                &new_pkgbases,
                &current_pkgbases,
            )));
        self.post_checks.push(Box::new(PackagesNewOrUpdatedCheck::new(
            new_pkgbases.iter().map(PkgbaseSnapshot::from).collect(),
            current_pkgbases
                .iter()
                .map(|pkgbase| (pkgbase.base().to_string(), pkgbase.version().to_string()))
                .collect(),
            new_pkgbases
                .iter()
                .flat_map(|pkgbase| pkgbase.package_names())
                .filter_map(|name| {
                    index
                        .pkgbase_of(name.inner())
                        .map(|owner| (name.to_string(), owner.to_string()))
                })
                .collect(),
        )));
        self.post_checks.push(Box::new(SourceUrlCheck::new(
            new_pkgbases
                .iter()
                .map(|pkgbase| (pkgbase.base().to_string(), pkgbase.source_url().cloned()))
                .collect(),
            current_pkgbases
                .iter()
                .map(|pkgbase| (pkgbase.base().to_string(), pkgbase.source_url().cloned()))
                .collect(),
            self.url_validation.clone(),
        )));

        // record the repository files of packages that the update replaces
        let new_file_names: Vec<String> = new_pkgbases
            .iter()
            .flat_map(|pkgbase| pkgbase.packages())
            .map(|package| package.filename.to_string())
            .collect();
        let mut outdated_files = self.outdated_files.borrow_mut();
        for current in &current_pkgbases {
            if !new_pkgbases
                .iter()
                .any(|pkgbase| pkgbase.base() == current.base())
            {
                continue;
            }
            for package in current.packages() {
                let file_name = package.filename.to_string();
                if new_file_names.contains(&file_name) {
                    continue;
                }
                outdated_files.push(self.package_repo_dir.join(&file_name));
                if package.pgpsig.is_some() {
                    outdated_files.push(
                        self.package_repo_dir
                            .join(package.filename.signature_file_name()),
                    );
                }
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        debug!("Undoing task to consolidate management records...");
        self.post_checks.clear();
        self.outdated_files.borrow_mut().clear();
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task removing the repository files of packages replaced by an update.
///
/// Run after overall success of an update. Pool files are retained (the
/// pool is append-only), only the repository-visible symlinks are removed.
/// The reversal is a no-op.
#[derive(Debug)]
pub struct RemoveOutdatedRepoFiles {
    outdated_files: SharedPaths,
    state: ActionState,
}

impl RemoveOutdatedRepoFiles {
    /// Creates a new [`RemoveOutdatedRepoFiles`] task.
    pub fn new(outdated_files: SharedPaths) -> Self {
        RemoveOutdatedRepoFiles {
            outdated_files,
            state: ActionState::default(),
        }
    }
}

impl Task for RemoveOutdatedRepoFiles {
    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::StartedTask;
        debug!("Running task to remove outdated repository files...");

        for path in self.outdated_files.borrow().iter() {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => {
                    info!("Can not remove outdated repository file {path:?}: {error}");
                    self.state = ActionState::FailedTask;
                    return self.state;
                }
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task writing management records as temporary JSON files.
///
/// Additionally stages an updated package name index. The staged file
/// paths are published through a shared handle for a downstream
/// [`MoveTmpFiles`] task.
pub struct WriteOutputPackageBasesToTmpFileInDir {
    directory: PathBuf,
    pkgbases: SharedPkgbases,
    tmp_files: SharedPaths,
    dependencies: Vec<Box<dyn Task>>,
    state: ActionState,
}

impl std::fmt::Debug for WriteOutputPackageBasesToTmpFileInDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteOutputPackageBasesToTmpFileInDir")
            .field("directory", &self.directory)
            .field("state", &self.state)
            .finish()
    }
}

impl WriteOutputPackageBasesToTmpFileInDir {
    /// Creates a new [`WriteOutputPackageBasesToTmpFileInDir`] task.
    pub fn new(
        directory: PathBuf,
        pkgbases: SharedPkgbases,
        tmp_files: SharedPaths,
        dependencies: Vec<Box<dyn Task>>,
    ) -> Self {
        debug!("Initializing task to write management records to {directory:?}...");
        WriteOutputPackageBasesToTmpFileInDir {
            directory,
            pkgbases,
            tmp_files,
            dependencies,
            state: ActionState::default(),
        }
    }

    /// Returns the shared handle over the staged temporary files.
    pub fn tmp_files(&self) -> SharedPaths {
        self.tmp_files.clone()
    }

    /// Writes `data` to `path` and records it as a staged file.
    fn write_tmp_file(&self, path: &Path, data: &str) -> Result<(), Error> {
        std::fs::write(path, data).map_err(|source| Error::File {
            path: path.to_path_buf(),
            context: "writing a temporary management file",
            source,
        })?;
        self.tmp_files.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

impl Task for WriteOutputPackageBasesToTmpFileInDir {
    fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut self.dependencies
    }

    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        debug!("Running task to write management records to {:?}...", self.directory);
        self.state = ActionState::StartedTask;

        let result = (|| -> Result<(), Error> {
            let pkgbases = self.pkgbases.borrow();

            for pkgbase in pkgbases.iter() {
                let path = self
                    .directory
                    .join(format!("{}{TMP_SUFFIX}", pkgbase.file_name()));
                self.write_tmp_file(&path, &pkgbase.to_json()?)?;
            }

            // stage the updated package name index alongside the records
            let mut index = PackageIndex::from_dir(&self.directory)?;
            for pkgbase in pkgbases.iter() {
                index.update_pkgbase(pkgbase);
            }
            let index_path = self
                .directory
                .join(format!("{PACKAGE_INDEX_FILE_NAME}{TMP_SUFFIX}"));
            self.write_tmp_file(&index_path, &index.to_json()?)?;

            Ok(())
        })();

        match result {
            Ok(()) => self.state = ActionState::SuccessTask,
            Err(error) => {
                info!("{error}");
                self.state = ActionState::FailedTask;
            }
        }
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        debug!("Undoing task to write management records...");
        for path in self.tmp_files.borrow_mut().drain(..) {
            if let Err(error) = std::fs::remove_file(&path) {
                if error.kind() != std::io::ErrorKind::NotFound {
                    info!("Can not remove temporary file {path:?}: {error}");
                    self.state = ActionState::FailedUndoTask;
                    return self.state;
                }
            }
        }
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task atomically moving staged temporary files to their destinations.
///
/// For every destination that already exists, a backup is created strictly
/// before the rename. The performed moves are published through a shared
/// handle, from which a [`RemoveBackupFiles`] task clears the backups
/// after overall success.
pub struct MoveTmpFiles {
    staged: Vec<SharedPaths>,
    moves: SharedMoves,
    dependencies: Vec<Box<dyn Task>>,
    state: ActionState,
}

impl std::fmt::Debug for MoveTmpFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveTmpFiles")
            .field("moves", &self.moves.borrow())
            .field("state", &self.state)
            .finish()
    }
}

impl MoveTmpFiles {
    /// Creates a new [`MoveTmpFiles`] task over staged file handles.
    pub fn new(
        staged: Vec<SharedPaths>,
        moves: SharedMoves,
        dependencies: Vec<Box<dyn Task>>,
    ) -> Self {
        MoveTmpFiles {
            staged,
            moves,
            dependencies,
            state: ActionState::default(),
        }
    }

    /// Returns the shared handle over the performed moves.
    pub fn moves(&self) -> SharedMoves {
        self.moves.clone()
    }

    /// Moves a single staged file, creating a backup of the destination
    /// first.
    fn move_one(entry: &mut SourceDestination) -> Result<(), Error> {
        if entry.destination.exists() {
            debug!(
                "Backing up {:?} to {:?}...",
                entry.destination, entry.destination_backup
            );
            std::fs::copy(&entry.destination, &entry.destination_backup).map_err(|source| {
                Error::File {
                    path: entry.destination_backup.clone(),
                    context: "backing up a destination file",
                    source,
                }
            })?;
            entry.backup_done = true;
        }

        debug!("Moving {:?} to {:?}...", entry.source, entry.destination);
        std::fs::rename(&entry.source, &entry.destination).map_err(|source| Error::File {
            path: entry.destination.clone(),
            context: "moving a temporary file to its destination",
            source,
        })
    }
}

impl Task for MoveTmpFiles {
    fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut self.dependencies
    }

    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::StartedTask;

        // derive the moves from the files staged by the dependencies
        let mut moves = self.moves.borrow_mut();
        for staged in &self.staged {
            for source in staged.borrow().iter() {
                match SourceDestination::from_tmp_source(source.clone()) {
                    Ok(entry) => moves.push(entry),
                    Err(error) => {
                        info!("{error}");
                        self.state = ActionState::FailedTask;
                        return self.state;
                    }
                }
            }
        }

        debug!("Running task to move {} staged files...", moves.len());
        for entry in moves.iter_mut() {
            if let Err(error) = Self::move_one(entry) {
                info!("{error}");
                self.state = ActionState::FailedTask;
                return self.state;
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        if matches!(
            self.state,
            ActionState::NotStarted | ActionState::FailedDependency
        ) {
            info!("Can not undo moving of files, as it never took place.");
            self.state = ActionState::NotStarted;
            return self.state;
        }

        let mut moves = self.moves.borrow_mut();
        let mut failed = false;
        for entry in moves.iter_mut() {
            let source_exists = entry.source.exists();
            let destination_exists = entry.destination.exists();
            let backup_exists = entry.destination_backup.exists();

            let result = if !source_exists && destination_exists {
                // the rename happened: move the destination back and
                // restore the backup
                debug!(
                    "Moving {:?} back to {:?}...",
                    entry.destination, entry.source
                );
                std::fs::rename(&entry.destination, &entry.source).and_then(|_| {
                    if entry.backup_done && backup_exists {
                        debug!(
                            "Restoring {:?} to {:?}...",
                            entry.destination_backup, entry.destination
                        );
                        std::fs::rename(&entry.destination_backup, &entry.destination)
                    } else {
                        Ok(())
                    }
                })
            } else if source_exists && entry.backup_done && backup_exists {
                // the backup was created but the rename did not happen
                debug!(
                    "Removing backup {:?} of destination {:?}...",
                    entry.destination_backup, entry.destination
                );
                std::fs::remove_file(&entry.destination_backup)
            } else if source_exists {
                // nothing happened for this entry
                Ok(())
            } else {
                info!(
                    "Can not undo the move of {:?}: the file system state is inconsistent!",
                    entry.source
                );
                failed = true;
                continue;
            };

            if let Err(error) = result {
                info!("Can not undo the move of {:?}: {error}", entry.source);
                failed = true;
            } else {
                entry.backup_done = false;
            }
        }

        if failed {
            self.state = ActionState::FailedUndoTask;
        } else {
            moves.clear();
            self.state = ActionState::NotStarted;
        }
        self.state
    }
}

/// A task copying files to a package pool and linking them into a package
/// repository directory.
#[derive(Debug)]
pub struct FilesToRepoDir {
    files: Vec<PathBuf>,
    file_kind: RepoFileKind,
    package_repo_dir: PathBuf,
    package_pool_dir: PathBuf,
    repo_files: Vec<RepoFile>,
    state: ActionState,
}

impl FilesToRepoDir {
    /// Creates a new [`FilesToRepoDir`] task.
    pub fn new(
        files: Vec<PathBuf>,
        file_kind: RepoFileKind,
        package_repo_dir: PathBuf,
        package_pool_dir: PathBuf,
    ) -> Self {
        debug!("Initializing task to move {files:?} to {package_repo_dir:?}...");
        FilesToRepoDir {
            files,
            file_kind,
            package_repo_dir,
            package_pool_dir,
            repo_files: Vec::new(),
            state: ActionState::default(),
        }
    }
}

impl Task for FilesToRepoDir {
    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::StartedTask;
        debug!(
            "Running task to move {:?} to {:?}...",
            self.files, self.package_repo_dir
        );

        for file_path in &self.files {
            let Some(file_name) = file_path.file_name() else {
                info!("The path {file_path:?} does not point at a file!");
                self.state = ActionState::FailedTask;
                return self.state;
            };

            let repo_file = match RepoFile::new(
                self.file_kind,
                self.package_pool_dir.join(file_name),
                self.package_repo_dir.join(file_name),
            ) {
                Ok(repo_file) => repo_file,
                Err(error) => {
                    info!("{error}");
                    self.state = ActionState::FailedTask;
                    return self.state;
                }
            };
            self.repo_files.push(repo_file.clone());

            if let Err(error) = repo_file
                .copy_from(file_path)
                .and_then(|_| repo_file.link(true))
            {
                info!("{error}");
                self.state = ActionState::FailedTask;
                return self.state;
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        if self.state == ActionState::NotStarted {
            info!("Can not undo moving of files to a repository, as it never took place.");
            return self.state;
        }

        for repo_file in self.repo_files.drain(..) {
            if let Err(error) = repo_file.remove(true, true) {
                info!("{error}");
                self.state = ActionState::FailedUndoTask;
                return self.state;
            }
        }

        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task rendering the sync databases of a repository into staged
/// temporary files.
///
/// Both the default database and the files database are rendered from the
/// current set of management records. The staged file paths are published
/// through a shared handle for a downstream [`MoveTmpFiles`] task.
#[derive(Debug)]
pub struct WriteSyncDbsToTmpFilesInDir {
    repo_name: String,
    management_dir: PathBuf,
    package_repo_dir: PathBuf,
    compression: CompressionType,
    desc_schema: RepoDescSchema,
    tmp_files: SharedPaths,
    state: ActionState,
}

impl WriteSyncDbsToTmpFilesInDir {
    /// Creates a new [`WriteSyncDbsToTmpFilesInDir`] task.
    pub fn new(
        repo_name: String,
        management_dir: PathBuf,
        package_repo_dir: PathBuf,
        compression: CompressionType,
        desc_schema: RepoDescSchema,
        tmp_files: SharedPaths,
    ) -> Self {
        WriteSyncDbsToTmpFilesInDir {
            repo_name,
            management_dir,
            package_repo_dir,
            compression,
            desc_schema,
            tmp_files,
            state: ActionState::default(),
        }
    }

    /// Returns the shared handle over the staged temporary files.
    pub fn tmp_files(&self) -> SharedPaths {
        self.tmp_files.clone()
    }
}

impl Task for WriteSyncDbsToTmpFilesInDir {
    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::StartedTask;
        debug!(
            "Running task to write sync databases of {} to {:?}...",
            self.repo_name, self.package_repo_dir
        );

        for kind in [DatabaseKind::Default, DatabaseKind::Files] {
            let file_name = format!(
                "{}{TMP_SUFFIX}",
                kind.db_file_name(&self.repo_name, self.compression)
            );
            let path = self.package_repo_dir.join(file_name);

            if let Err(error) = stream_management_dir_to_database(
                &self.management_dir,
                &path,
                kind,
                self.compression,
                self.desc_schema,
            ) {
                info!("{error}");
                self.state = ActionState::FailedTask;
                return self.state;
            }
            self.tmp_files.borrow_mut().push(path);
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        debug!("Undoing task to write sync databases...");
        for path in self.tmp_files.borrow_mut().drain(..) {
            if let Err(error) = std::fs::remove_file(&path) {
                if error.kind() != std::io::ErrorKind::NotFound {
                    info!("Can not remove temporary file {path:?}: {error}");
                    self.state = ActionState::FailedUndoTask;
                    return self.state;
                }
            }
        }
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// An aggregating task marking the atomic commit boundary of an update.
///
/// The task has no operation of its own; it exists to tie all tasks of an
/// update together, so that a single [`run`]/[`undo`] covers them.
pub struct AddToRepo {
    dependencies: Vec<Box<dyn Task>>,
    state: ActionState,
}

impl std::fmt::Debug for AddToRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddToRepo")
            .field("dependencies", &self.dependencies.len())
            .field("state", &self.state)
            .finish()
    }
}

impl AddToRepo {
    /// Creates a new [`AddToRepo`] task over `dependencies`.
    pub fn new(dependencies: Vec<Box<dyn Task>>) -> Self {
        AddToRepo {
            dependencies,
            state: ActionState::default(),
        }
    }
}

impl Task for AddToRepo {
    fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut self.dependencies
    }

    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task removing the backup files created by [`MoveTmpFiles`] tasks.
///
/// Run after overall success of an update; its reversal is a no-op, as the
/// backups are consumed intentionally.
#[derive(Debug)]
pub struct RemoveBackupFiles {
    moves: Vec<SharedMoves>,
    state: ActionState,
}

impl RemoveBackupFiles {
    /// Creates a new [`RemoveBackupFiles`] task over the moves of one or
    /// more [`MoveTmpFiles`] tasks.
    pub fn new(moves: Vec<SharedMoves>) -> Self {
        RemoveBackupFiles {
            moves,
            state: ActionState::default(),
        }
    }
}

impl Task for RemoveBackupFiles {
    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::StartedTask;
        debug!("Running task to remove backup files...");

        for moves in &self.moves {
            for entry in moves.borrow().iter() {
                if entry.backup_done && entry.destination_backup.exists() {
                    if let Err(error) = std::fs::remove_file(&entry.destination_backup) {
                        info!(
                            "Can not remove backup file {:?}: {error}",
                            entry.destination_backup
                        );
                        self.state = ActionState::FailedTask;
                        return self.state;
                    }
                }
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        self.state = ActionState::NotStarted;
        self.state
    }
}

/// A task printing management records to stdout as JSON.
///
/// Used by the dry-run mode of adding packages.
pub struct PrintOutputPackageBases {
    pkgbases: SharedPkgbases,
    dependencies: Vec<Box<dyn Task>>,
    state: ActionState,
}

impl std::fmt::Debug for PrintOutputPackageBases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintOutputPackageBases")
            .field("state", &self.state)
            .finish()
    }
}

impl PrintOutputPackageBases {
    /// Creates a new [`PrintOutputPackageBases`] task.
    pub fn new(pkgbases: SharedPkgbases, dependencies: Vec<Box<dyn Task>>) -> Self {
        PrintOutputPackageBases {
            pkgbases,
            dependencies,
            state: ActionState::default(),
        }
    }
}

impl Task for PrintOutputPackageBases {
    fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut self.dependencies
    }

    fn state(&self) -> ActionState {
        self.state
    }

    fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    fn do_task(&mut self) -> ActionState {
        self.state = ActionState::StartedTask;

        for pkgbase in self.pkgbases.borrow().iter() {
            match pkgbase.to_json() {
                Ok(json) => print!("{json}"),
                Err(error) => {
                    info!("{error}");
                    self.state = ActionState::FailedTask;
                    return self.state;
                }
            }
        }

        self.state = ActionState::SuccessTask;
        self.state
    }

    fn undo_task(&mut self) -> ActionState {
        self.state = ActionState::NotStarted;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;

    /// A task recording how often its operation ran.
    #[derive(Default)]
    struct CountingTask {
        runs: Rc<RefCell<usize>>,
        fail: bool,
        dependencies: Vec<Box<dyn Task>>,
        state: ActionState,
    }

    impl Task for CountingTask {
        fn dependencies_mut(&mut self) -> &mut [Box<dyn Task>] {
            &mut self.dependencies
        }

        fn state(&self) -> ActionState {
            self.state
        }

        fn set_state(&mut self, state: ActionState) {
            self.state = state;
        }

        fn do_task(&mut self) -> ActionState {
            *self.runs.borrow_mut() += 1;
            self.state = if self.fail {
                ActionState::FailedTask
            } else {
                ActionState::SuccessTask
            };
            self.state
        }

        fn undo_task(&mut self) -> ActionState {
            self.state = ActionState::NotStarted;
            self.state
        }
    }

    #[rstest]
    fn run_is_idempotent() {
        let runs = Rc::new(RefCell::new(0));
        let mut task = CountingTask {
            runs: runs.clone(),
            ..Default::default()
        };

        assert_eq!(run(&mut task), ActionState::Success);
        assert_eq!(run(&mut task), ActionState::Success);
        assert_eq!(*runs.borrow(), 1);
    }

    #[rstest]
    fn run_failed_dependency() {
        let runs = Rc::new(RefCell::new(0));
        let failing = CountingTask {
            runs: runs.clone(),
            fail: true,
            ..Default::default()
        };
        let mut task = CountingTask {
            runs: runs.clone(),
            dependencies: vec![Box::new(failing)],
            ..Default::default()
        };

        assert_eq!(run(&mut task), ActionState::FailedDependency);
        // only the dependency ran
        assert_eq!(*runs.borrow(), 1);
    }

    #[rstest]
    fn undo_reverses_dependencies() {
        let runs = Rc::new(RefCell::new(0));
        let dependency = CountingTask {
            runs: runs.clone(),
            ..Default::default()
        };
        let mut task = CountingTask {
            runs: runs.clone(),
            dependencies: vec![Box::new(dependency)],
            ..Default::default()
        };

        assert_eq!(run(&mut task), ActionState::Success);
        assert_eq!(undo(&mut task), ActionState::NotStarted);
        assert_eq!(task.state(), ActionState::NotStarted);
    }

    #[rstest]
    fn source_destination_from_tmp_source() -> TestResult {
        let entry = SourceDestination::from_tmp_source(PathBuf::from("/dir/foo.json.tmp"))?;
        assert_eq!(entry.destination, PathBuf::from("/dir/foo.json"));
        assert_eq!(entry.destination_backup, PathBuf::from("/dir/foo.json.bkp"));
        assert!(!entry.backup_done);
        Ok(())
    }

    #[rstest]
    #[case("/dir/foo.json")]
    #[case("dir/foo.json.tmp")]
    #[case("/dir/foo.bkp.tmp")]
    fn source_destination_invalid(#[case] source: &str) {
        assert!(SourceDestination::from_tmp_source(PathBuf::from(source)).is_err());
    }

    /// Sets up a directory with a staged tmp file and an existing
    /// destination.
    fn stage(dir: &Path, name: &str, tmp_content: &str, current_content: Option<&str>) -> TestResult<PathBuf> {
        let tmp_path = dir.join(format!("{name}{TMP_SUFFIX}"));
        let mut file = File::create(&tmp_path)?;
        file.write_all(tmp_content.as_bytes())?;
        if let Some(current_content) = current_content {
            let mut file = File::create(dir.join(name))?;
            file.write_all(current_content.as_bytes())?;
        }
        Ok(tmp_path)
    }

    #[rstest]
    fn move_tmp_files_with_backup() -> TestResult {
        let dir = TempDir::new()?;
        let tmp_path = stage(dir.path(), "foo.json", "new", Some("old"))?;

        let staged: SharedPaths = Rc::new(RefCell::new(vec![tmp_path.clone()]));
        let moves: SharedMoves = Rc::new(RefCell::new(Vec::new()));
        let mut task = MoveTmpFiles::new(vec![staged], moves.clone(), Vec::new());

        assert_eq!(run(&mut task), ActionState::Success);
        assert!(!tmp_path.exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("foo.json"))?, "new");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("foo.json.bkp"))?,
            "old"
        );

        // undoing restores the previous state
        assert_eq!(undo(&mut task), ActionState::NotStarted);
        assert_eq!(std::fs::read_to_string(dir.path().join("foo.json"))?, "old");
        assert!(tmp_path.exists());
        assert!(!dir.path().join("foo.json.bkp").exists());
        Ok(())
    }

    #[rstest]
    fn move_tmp_files_partial_failure_restores_all() -> TestResult {
        let dir = TempDir::new()?;
        let first = stage(dir.path(), "a.json", "new a", Some("old a"))?;
        // the second staged file is removed before the move to inject an
        // error between backup creation and rename
        let second = stage(dir.path(), "b.json", "new b", Some("old b"))?;
        let third = stage(dir.path(), "c.json", "new c", Some("old c"))?;
        std::fs::remove_file(&second)?;

        let staged: SharedPaths = Rc::new(RefCell::new(vec![first, second, third]));
        let moves: SharedMoves = Rc::new(RefCell::new(Vec::new()));
        let mut task = MoveTmpFiles::new(vec![staged], moves, Vec::new());

        assert_eq!(run(&mut task), ActionState::FailedTask);
        assert_eq!(undo(&mut task), ActionState::NotStarted);

        for (name, content) in [("a.json", "old a"), ("b.json", "old b"), ("c.json", "old c")] {
            assert_eq!(std::fs::read_to_string(dir.path().join(name))?, content);
            assert!(!dir.path().join(format!("{name}{BACKUP_SUFFIX}")).exists());
        }
        Ok(())
    }

    #[rstest]
    fn remove_backup_files() -> TestResult {
        let dir = TempDir::new()?;
        let tmp_path = stage(dir.path(), "foo.json", "new", Some("old"))?;

        let staged: SharedPaths = Rc::new(RefCell::new(vec![tmp_path]));
        let moves: SharedMoves = Rc::new(RefCell::new(Vec::new()));
        let mut move_task = MoveTmpFiles::new(vec![staged], moves.clone(), Vec::new());
        assert_eq!(run(&mut move_task), ActionState::Success);
        assert!(dir.path().join("foo.json.bkp").exists());

        let mut cleanup = RemoveBackupFiles::new(vec![moves]);
        assert_eq!(run(&mut cleanup), ActionState::Success);
        assert!(!dir.path().join("foo.json.bkp").exists());
        Ok(())
    }

    #[rstest]
    fn files_to_repo_dir_round_trip() -> TestResult {
        let dir = TempDir::new()?;
        let pool_dir = dir.path().join("pool/test");
        let repo_dir = dir.path().join("repo/test/any");
        std::fs::create_dir_all(&pool_dir)?;
        std::fs::create_dir_all(&repo_dir)?;

        let package = dir.path().join("foo-1:1.0.0-1-any.pkg.tar.zst");
        File::create(&package)?;

        let mut task = FilesToRepoDir::new(
            vec![package],
            RepoFileKind::Package,
            repo_dir.clone(),
            pool_dir.clone(),
        );

        assert_eq!(run(&mut task), ActionState::Success);
        assert!(pool_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst").exists());
        assert!(repo_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst").exists());

        assert_eq!(undo(&mut task), ActionState::NotStarted);
        assert!(!pool_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst").exists());
        assert!(repo_dir
            .join("foo-1:1.0.0-1-any.pkg.tar.zst")
            .symlink_metadata()
            .is_err());
        Ok(())
    }
}
