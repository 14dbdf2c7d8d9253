//! In-memory table of all currently known unique SVGs.
//!
//! The loader writes here during module transforms. The orchestrator snapshots
//! the entries for each compile pass. Entries are keyed by originating file
//! path; re-registration of a path replaces its entry, never duplicates it.
//!
//! Every successful registration bumps a version counter. The counter is the
//! recompile trigger: deliberately conservative, so a re-import with identical
//! content still marks the sprite dirty (inputs cannot be assumed pure).

use std::path::Path;
use std::sync::{Mutex, RwLock};

use crate::plugin::symbol_id::SymbolIdPolicy;
use crate::utils::content_hash;
use crate::SpriteError;

// ---------------------------------------------------------------------------
// AssetItem
// ---------------------------------------------------------------------------

/// One registered SVG.
#[derive(Debug, Clone)]
pub struct AssetItem {
    /// Export id, unique within one compile snapshot.
    pub identifier: String,
    /// Content fingerprint; present only when content was captured.
    pub content_hash: Option<u64>,
    /// Absolute originating file path — the registry key.
    pub source_path: String,
    /// Raw SVG source; absent for content-free submissions, in which case the
    /// compiler reads it from `source_path`.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// AssetSink
// ---------------------------------------------------------------------------

/// Submission handle injected into the module transform.
///
/// The transform step receives this explicitly instead of finding methods
/// attached to an ambient host context.
pub trait AssetSink: Send + Sync {
    /// Register an asset and return its symbol identifier.
    fn submit(
        &self,
        source_path: &str,
        content: Option<&str>,
        default_id: Option<&str>,
    ) -> Result<String, SpriteError>;
}

// ---------------------------------------------------------------------------
// AssetRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RegistryInner {
    entries: Vec<AssetItem>,
    version: u64,
}

/// The registry of unique SVGs collected during one build process.
///
/// Grows or replaces entries only; nothing is evicted until process exit.
#[derive(Debug)]
pub struct AssetRegistry {
    inner: RwLock<RegistryInner>,
    policy: Mutex<SymbolIdPolicy>,
}

impl AssetRegistry {
    pub fn new(policy: SymbolIdPolicy) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            policy: Mutex::new(policy),
        }
    }

    /// Register an asset, returning its symbol identifier.
    ///
    /// When content is present and an existing entry shares its fingerprint,
    /// the existing identifier is reused and no new entry is minted. A stale
    /// entry for the same path (content changed to duplicate another icon) is
    /// dropped, leaving that path with no entry of its own; its imports keep
    /// resolving through the returned identifier, and snapshots stay
    /// identifier-unique.
    pub fn register(
        &self,
        source_path: &str,
        content: Option<&str>,
        default_id: Option<&str>,
    ) -> Result<String, SpriteError> {
        if source_path.is_empty() || !Path::new(source_path).is_absolute() {
            return Err(SpriteError::InvalidSourcePath(source_path.to_string()));
        }

        let hash = content.map(|c| content_hash(c.as_bytes()));
        let mut inner = self.inner.write().expect("asset registry poisoned");

        // Content dedup: a second submission with identical bytes reuses the
        // first submission's identifier.
        if let Some(hash) = hash {
            if let Some(existing) = inner.entries.iter().find(|e| e.content_hash == Some(hash)) {
                let identifier = existing.identifier.clone();
                let existing_path = existing.source_path.clone();
                if existing_path != source_path {
                    inner.entries.retain(|e| e.source_path != source_path);
                }
                inner.version += 1;
                return Ok(identifier);
            }
        }

        let identifier = {
            let mut policy = self.policy.lock().expect("symbol id policy poisoned");
            policy.resolve(source_path, hash, content, default_id)
        };

        // Replace any prior entry for the same path.
        inner.entries.retain(|e| e.source_path != source_path);
        inner.entries.push(AssetItem {
            identifier: identifier.clone(),
            content_hash: hash,
            source_path: source_path.to_string(),
            content: content.map(str::to_string),
        });
        inner.version += 1;

        Ok(identifier)
    }

    /// Cloned ordered entry list plus the version it represents.
    ///
    /// Compiles operate on this immutable copy; a registration arriving while
    /// a compile is in flight bumps the live version without touching the
    /// captured snapshot.
    pub fn snapshot(&self) -> (Vec<AssetItem>, u64) {
        let inner = self.inner.read().expect("asset registry poisoned");
        (inner.entries.clone(), inner.version)
    }

    /// Current version counter. Bumped by every successful registration.
    pub fn version(&self) -> u64 {
        self.inner.read().expect("asset registry poisoned").version
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("asset registry poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetSink for AssetRegistry {
    fn submit(
        &self,
        source_path: &str,
        content: Option<&str>,
        default_id: Option<&str>,
    ) -> Result<String, SpriteError> {
        self.register(source_path, content, default_id)
    }
}
