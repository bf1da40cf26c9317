//! Unit-of-work contract and an in-memory implementation.
//!
//! All versioning operations run inside a transaction boundary supplied by
//! the caller. The engine never commits anything itself: it reads the
//! working set through [`UnitOfWork`], hands mutated rows back through
//! [`UnitOfWork::upsert`], and the caller persists the accumulated changes
//! in one atomic commit (or discards them by aborting).
//!
//! [`MemoryUnitOfWork`] is both the test double and the working set the
//! storage layer fills from the database before running a transition.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::entity::VersionedEntity;
use crate::types::{RootId, Timestamp, VersionId};

/// The transaction-scoped view of the version store the engine computes
/// against.
pub trait UnitOfWork<E: VersionedEntity> {
    /// Every version under `root`, newest version number first, regardless
    /// of status. Callers filter through the selector functions.
    fn versions_of_root(&self, root: RootId) -> Vec<E>;

    /// Fetch one version by id.
    fn get(&self, id: VersionId) -> Option<E>;

    /// Record a created or mutated version for the final commit.
    fn upsert(&mut self, entity: E);

    /// Allocate a new unific root identity.
    fn create_root(&mut self) -> RootId;

    /// The editor on whose behalf this unit of work runs; stamped into
    /// audit fields.
    fn user(&self) -> &str;

    /// Transaction timestamp; every stamp within one operation uses it.
    fn now(&self) -> Timestamp;
}

/// In-memory unit of work with change tracking.
#[derive(Debug, Clone)]
pub struct MemoryUnitOfWork<E> {
    versions: BTreeMap<VersionId, E>,
    roots: BTreeSet<RootId>,
    changed: BTreeSet<VersionId>,
    created_roots: Vec<RootId>,
    user: String,
    now: Timestamp,
}

impl<E: VersionedEntity> MemoryUnitOfWork<E> {
    pub fn new(user: impl Into<String>, now: Timestamp) -> Self {
        Self {
            versions: BTreeMap::new(),
            roots: BTreeSet::new(),
            changed: BTreeSet::new(),
            created_roots: Vec::new(),
            user: user.into(),
            now,
        }
    }

    /// Seed the working set with rows already persisted elsewhere. These do
    /// not count as changes.
    pub fn seed(&mut self, entity: E) {
        if let Some(root) = entity.root_id() {
            self.roots.insert(root);
        }
        self.versions.insert(entity.version_id(), entity);
    }

    /// All versions currently in the working set.
    pub fn versions(&self) -> impl Iterator<Item = &E> {
        self.versions.values()
    }

    /// Versions created or mutated since the last drain, for persisting.
    /// Clears the change set.
    pub fn drain_changes(&mut self) -> Vec<E> {
        let changed = std::mem::take(&mut self.changed);
        changed
            .into_iter()
            .filter_map(|id| self.versions.get(&id).cloned())
            .collect()
    }

    /// Roots allocated since the last drain, for persisting.
    pub fn drain_created_roots(&mut self) -> Vec<RootId> {
        std::mem::take(&mut self.created_roots)
    }

    pub fn is_dirty(&self) -> bool {
        !self.changed.is_empty() || !self.created_roots.is_empty()
    }
}

impl<E: VersionedEntity> UnitOfWork<E> for MemoryUnitOfWork<E> {
    fn versions_of_root(&self, root: RootId) -> Vec<E> {
        let mut versions: Vec<E> = self
            .versions
            .values()
            .filter(|v| v.root_id() == Some(root))
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version().cmp(&a.version()));
        versions
    }

    fn get(&self, id: VersionId) -> Option<E> {
        self.versions.get(&id).cloned()
    }

    fn upsert(&mut self, entity: E) {
        if let Some(root) = entity.root_id() {
            self.roots.insert(root);
        }
        self.changed.insert(entity.version_id());
        self.versions.insert(entity.version_id(), entity);
    }

    fn create_root(&mut self) -> RootId {
        let root = Uuid::new_v4();
        self.roots.insert(root);
        self.created_roots.push(root);
        root
    }

    fn user(&self) -> &str {
        &self.user
    }

    fn now(&self) -> Timestamp {
        self.now
    }
}
