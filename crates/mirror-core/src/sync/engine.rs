//! SyncEngine implementation
//!
//! The SyncEngine ties one profile together: it reads the desired items from
//! the library, loads the stored index, plans, executes and persists the new
//! index. At most one run per profile executes at a time.

use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use mirror_fs::link::ensure_dir;
use mirror_fs::{NormalizedPath, ProfilePath};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::check::{CheckReport, DriftItem, DriftKind};
use super::executor::{EntryPrimitives, ExecOptions, NativePrimitives, SyncResult, execute};
use crate::catalog::{ItemSource, LibraryCatalog};
use crate::config::MirrorConfig;
use crate::index::{IndexLedger, LibraryIndex, SyncIndex};
use crate::item::{Item, SyncMode};
use crate::plan::{SyncPlan, compute_plan, compute_replacement_plan};
use crate::{Error, Result};

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute the plan but leave the target directory and index untouched
    pub dry_run: bool,
}

/// Report from a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub dry_run: bool,
    /// The plan that was (or would have been) executed
    pub plan: SyncPlan,
    /// Absent for dry runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SyncResult>,
}

impl SyncReport {
    /// Whether the run finished without per-item errors
    pub fn success(&self) -> bool {
        self.result.as_ref().is_none_or(|result| !result.has_errors())
    }
}

/// Exclusive run lock, released on drop
struct RunLock {
    file: File,
}

impl RunLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.try_lock_exclusive().map_err(|_| Error::RunInProgress {
            path: path.to_path_buf(),
        })?;
        Ok(Self { file })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Engine for reconciling one profile's target directory
pub struct SyncEngine {
    profile_dir: PathBuf,
    /// Configuration with absolute paths
    config: MirrorConfig,
    primitives: Box<dyn EntryPrimitives>,
}

impl SyncEngine {
    /// Create an engine for `profile_dir`.
    ///
    /// Relative paths in `config` are resolved against the profile's parent
    /// directory.
    pub fn new(
        profile_dir: impl Into<PathBuf>,
        config: MirrorConfig,
        primitives: Box<dyn EntryPrimitives>,
    ) -> Self {
        let profile_dir = profile_dir.into();
        let config = config.resolved(&profile_dir);
        Self {
            profile_dir,
            config,
            primitives,
        }
    }

    /// Create an engine that operates on the host filesystem
    pub fn native(profile_dir: impl Into<PathBuf>, config: MirrorConfig) -> Self {
        Self::new(profile_dir, config, Box::new(NativePrimitives))
    }

    /// Load the profile's config and create a native engine
    pub fn open(profile_dir: impl Into<PathBuf>) -> Result<Self> {
        let profile_dir = profile_dir.into();
        let config = MirrorConfig::load(&profile_dir)?;
        Ok(Self::native(profile_dir, config))
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    pub fn mode(&self) -> SyncMode {
        self.config.mirror.mode
    }

    pub fn target_dir(&self) -> NormalizedPath {
        NormalizedPath::new(&self.config.mirror.target_dir)
    }

    /// Get the path to the index ledger
    pub fn index_path(&self) -> PathBuf {
        self.profile_dir.join(ProfilePath::Index.as_str())
    }

    fn run_lock_path(&self) -> PathBuf {
        self.profile_dir.join(ProfilePath::RunLock.as_str())
    }

    /// Ledger key of the configured library
    pub fn library_key(&self) -> String {
        IndexLedger::key_for(&self.config.library.path)
    }

    /// Load the ledger, or an empty one if none was saved yet
    pub fn load_ledger(&self) -> Result<IndexLedger> {
        IndexLedger::load_or_default(&self.index_path())
    }

    /// Stored index for the configured library
    pub fn stored_index(&self) -> Result<Option<LibraryIndex>> {
        Ok(self.load_ledger()?.get(&self.library_key()).cloned())
    }

    /// Items of the configured library that pass the configured filter, in
    /// catalog order.
    pub fn desired_items(&self) -> Result<Vec<Item>> {
        let catalog = LibraryCatalog::open(&self.config.library.path)?;
        self.desired_items_from(&catalog)
    }

    /// Filter the entries of any item source
    pub fn desired_items_from(&self, source: &dyn ItemSource) -> Result<Vec<Item>> {
        let entries = source.entries()?;
        let items = self.config.filter.select(&entries);
        debug!(
            catalog = entries.len(),
            selected = items.len(),
            "Selected desired items"
        );
        Ok(items)
    }

    /// Compute the plan for `items` without side effects.
    pub fn preview(&self, items: &[Item]) -> Result<SyncPlan> {
        let ledger = self.load_ledger()?;
        let (plan, _) = self.plan_against(&ledger, items);
        Ok(plan)
    }

    /// Plan against the stored index, returning the plan and the index the
    /// executor should start from.
    ///
    /// An index produced under another mode or target directory is stale:
    /// every one of its entries is removed and every item created afresh.
    /// Paths an earlier run failed to remove are planned for removal again.
    fn plan_against(&self, ledger: &IndexLedger, items: &[Item]) -> (SyncPlan, SyncIndex) {
        let Some(stored) = ledger.get(&self.library_key()) else {
            let plan = compute_plan(items, &SyncIndex::new(), self.mode(), &self.target_dir());
            return (plan, SyncIndex::new());
        };

        let (mut plan, previous) = self.plan_against_stored(stored, items);
        let held: HashSet<&NormalizedPath> = previous.paths().collect();
        let retries = stored
            .pending_removals
            .iter()
            .filter(|path| !held.contains(path))
            .cloned();
        plan.to_remove.extend(retries);
        (plan, previous)
    }

    fn plan_against_stored(&self, stored: &LibraryIndex, items: &[Item]) -> (SyncPlan, SyncIndex) {
        let mode = self.mode();
        let target_dir = self.target_dir();

        let plan = if stored.is_stale_for(mode, &target_dir) {
            info!(
                stored_mode = %stored.mode,
                stored_target = %stored.target_dir,
                mode = %mode,
                target = %target_dir,
                "Stored index is stale, rebuilding mirror"
            );
            compute_replacement_plan(items, &stored.index, mode, &target_dir)
        } else {
            compute_plan(items, &stored.index, mode, &target_dir)
        };
        (plan, stored.index.clone())
    }

    /// Reconcile the target directory with `items`.
    ///
    /// # Errors
    ///
    /// Fails before touching any entry when another run holds the lock, the
    /// target directory can not be created, or the ledger can not be read.
    /// Per-item failures are reported in the returned [`SyncResult`].
    pub fn run(&self, items: &[Item], options: SyncOptions) -> Result<SyncReport> {
        let _lock = RunLock::acquire(&self.run_lock_path())?;

        let target_dir = self.target_dir();
        if !options.dry_run {
            ensure_dir(&target_dir.to_native()).map_err(|source| {
                Error::TargetDirUnavailable {
                    path: target_dir.to_native(),
                    source,
                }
            })?;
        }

        let mut ledger = self.load_ledger()?;
        let (plan, previous) = self.plan_against(&ledger, items);

        if options.dry_run {
            info!(
                create = plan.to_create.len(),
                remove = plan.to_remove.len(),
                "Dry run, nothing applied"
            );
            return Ok(SyncReport {
                dry_run: true,
                plan,
                result: None,
            });
        }

        let exec_options = ExecOptions::new(self.primitives.as_ref())
            .with_library_root(self.config.library.path.as_path())
            .with_link_type(self.config.mirror.link_type);
        let result = execute(&plan, self.mode(), &previous, &exec_options);

        let mut library = LibraryIndex::new(self.mode(), target_dir, result.new_index.clone());
        library.last_synced = Some(Utc::now());
        library.pending_removals = result.unremoved_paths();
        if !library.pending_removals.is_empty() {
            warn!(
                count = library.pending_removals.len(),
                "Some entries could not be removed, retrying next run"
            );
        }
        ledger.set(self.library_key(), library);
        ledger.save(&self.index_path())?;

        Ok(SyncReport {
            dry_run: false,
            plan,
            result: Some(result),
        })
    }

    /// Compare the stored index with what is on disk.
    ///
    /// Read only: problems are reported, never repaired.
    pub fn check(&self) -> Result<CheckReport> {
        let ledger = match self.load_ledger() {
            Ok(ledger) => ledger,
            Err(e) => return Ok(CheckReport::broken(format!("Failed to load index: {}", e))),
        };

        let Some(stored) = ledger.get(&self.library_key()) else {
            return Ok(CheckReport::healthy(0).with_message("No index stored for this library"));
        };

        let sources = if stored.mode == SyncMode::Copy {
            self.media_paths()
        } else {
            HashMap::new()
        };

        let mut problems = Vec::new();
        for (id, path) in stored.index.iter() {
            if let Some(problem) = self.inspect_entry(id, path, stored.mode, sources.get(id)) {
                problems.push(problem);
            }
        }

        let mut report = CheckReport::from_items(stored.index.len(), problems);
        if !stored.pending_removals.is_empty() {
            report = report.with_message(format!(
                "{} entries from earlier runs still await removal",
                stored.pending_removals.len()
            ));
        }
        if stored.is_stale_for(self.mode(), &self.target_dir()) {
            return Ok(report.with_message(format!(
                "Index was produced with mode {} in {}; the next sync rebuilds the mirror",
                stored.mode, stored.target_dir
            )));
        }
        Ok(report)
    }

    /// Media file per item id, used to detect drifted copies
    fn media_paths(&self) -> HashMap<String, PathBuf> {
        let entries = LibraryCatalog::open(&self.config.library.path)
            .and_then(|catalog| catalog.entries());
        match entries {
            Ok(entries) => entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry.media_path()))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Library unavailable, skipping copy comparison");
                HashMap::new()
            }
        }
    }

    fn inspect_entry(
        &self,
        id: &str,
        path: &NormalizedPath,
        mode: SyncMode,
        source: Option<&PathBuf>,
    ) -> Option<DriftItem> {
        let native = path.to_native();
        let problem = |kind: DriftKind, description: String| DriftItem {
            id: id.to_string(),
            path: path.clone(),
            kind,
            description,
        };

        if !self.primitives.entry_exists(&native) {
            return Some(problem(DriftKind::Missing, "Entry not found".to_string()));
        }
        if mirror_fs::link::is_dangling_link(&native) {
            return Some(problem(DriftKind::Dangling, "Link target no longer exists".to_string()));
        }
        if mode != SyncMode::Copy {
            return None;
        }

        let source = source?;
        match mirror_fs::checksum::files_match(source, &native) {
            Ok(true) => None,
            Ok(false) => Some(problem(
                DriftKind::Drifted,
                format!("Content differs from {}", source.display()),
            )),
            Err(e) => Some(problem(
                DriftKind::Drifted,
                format!("Failed to compare with {}: {}", source.display(), e),
            )),
        }
    }
}
