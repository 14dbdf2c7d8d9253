//! # svg-sprite-pipeline
//!
//! Build-time SVG sprite pipeline. The host build tool's module-transform
//! step submits imported SVG files here; the pipeline deduplicates them by
//! content fingerprint, assigns each a stable symbol identifier, compiles the
//! unique set into one inline `<svg>` sprite of `<symbol>` elements, and
//! splices that sprite into the host's generated HTML.
//!
//! Importers receive `export default '#<identifier>'`, usable at runtime as a
//! `<use href="#id">` target — one sprite request instead of one per icon.
//!
//! # Architecture
//!
//! ```text
//! module transform → SvgLoader → AssetRegistry.register
//!                                       │ (version bump → dirty)
//! HTML emission → SpritePlugin.process_html
//!                    ├─ dirty: SpriteCompiler.compile(snapshot) → cache
//!                    └─ HtmlInjector.inject(html, sprite)
//! ```
//!
//! The sprite compile runs once per distinct registry state; repeated HTML
//! emissions in a watch build reuse the cached sprite.

pub mod html;
pub mod plugin;
pub mod sprite;
pub mod utils;

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use html::{HtmlInjector, InjectMode};
pub use plugin::registry::{AssetItem, AssetRegistry, AssetSink};
pub use plugin::svg_loader::{loader_source_path, SvgLoader};
pub use plugin::symbol_id::{filename_symbol_id, SymbolIdFn, SymbolIdPolicy};
pub use plugin::{BuildHost, HtmlEmitEvent, SpriteOptions, SpritePlugin};
pub use sprite::symbol_engine::InlineSymbolEngine;
pub use sprite::{ShapeSource, SpriteCompiler, SpriteEngine};

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A structured diagnostic emitted by the pipeline.
///
/// Non-fatal conditions (zero-match include patterns, missing host hook
/// points, failed compiles) are reported here instead of aborting the build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// Shared diagnostics channel.
///
/// The plugin and its collaborators push records here; the host drains them
/// after a build step. Cloning shares the underlying buffer.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    inner: Arc<RwLock<Vec<Diagnostic>>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        let mut buf = self.inner.write().expect("diagnostic sink poisoned");
        buf.push(diagnostic);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(Diagnostic {
            level: DiagnosticLevel::Warning,
            message: message.into(),
            context: None,
        });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Diagnostic {
            level: DiagnosticLevel::Error,
            message: message.into(),
            context: None,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Diagnostic {
            level: DiagnosticLevel::Info,
            message: message.into(),
            context: None,
        });
    }

    /// Remove and return all collected diagnostics.
    pub fn drain(&self) -> Vec<Diagnostic> {
        let mut buf = self.inner.write().expect("diagnostic sink poisoned");
        std::mem::take(&mut *buf)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("diagnostic sink poisoned").is_empty()
    }
}

// ---------------------------------------------------------------------------
// SpriteError
// ---------------------------------------------------------------------------

/// Errors surfaced by the sprite pipeline.
///
/// Wiring and configuration errors abort the build immediately; compile-time
/// errors are consumed by the orchestrator and converted to diagnostics.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// The module transform ran without a plugin-injected submission handle.
    /// Signals the loader was wired without its companion plugin.
    #[error("svg loader invoked without a sprite plugin attached — add SpritePlugin to the host configuration")]
    LoaderNotWired,

    #[error("source path must be a non-empty absolute path, got `{0}`")]
    InvalidSourcePath(String),

    #[error("invalid include pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The engine emitted a file the compile snapshot does not know about —
    /// the snapshot and the engine's file list have desynchronized.
    #[error("sprite engine emitted `{path}` which has no matching registry entry")]
    SnapshotDesync { path: String },

    #[error("failed to read `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sprite engine failed: {0}")]
    Engine(#[from] anyhow::Error),
}
