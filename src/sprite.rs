//! Sprite compilation.
//!
//! `SpriteCompiler` turns a registry snapshot into the compiled sprite markup
//! string. The actual symbol assembly is behind the [`SpriteEngine`] seam —
//! the compiler's job is to materialize content for every item (reading from
//! disk when it wasn't captured at registration), hand the engine
//! `(path, content)` shapes plus an identifier-resolution hook, and classify
//! failures.
//!
//! The hook maps each engine-emitted path back to its snapshot item with
//! last-match semantics, protecting against stale duplicate entries. A path
//! the snapshot does not know about means the caller's snapshot and the
//! engine's file list have desynchronized, and fails that compile.

pub mod symbol_engine;

use std::fmt;
use std::sync::Arc;

use crate::plugin::registry::AssetItem;
use crate::sprite::symbol_engine::InlineSymbolEngine;
use crate::SpriteError;

// ---------------------------------------------------------------------------
// Engine seam
// ---------------------------------------------------------------------------

/// One file handed to the engine.
#[derive(Debug, Clone)]
pub struct ShapeSource {
    pub path: String,
    pub content: String,
}

/// The underlying sprite-generation collaborator, configured for inline
/// symbol output.
///
/// `resolve_id` must be consulted for every emitted file so the compiled
/// sprite reuses the registry's assigned identifiers.
pub trait SpriteEngine: Send + Sync {
    fn compile(
        &self,
        shapes: &[ShapeSource],
        resolve_id: &dyn Fn(&str) -> Result<String, SpriteError>,
    ) -> Result<String, SpriteError>;
}

// ---------------------------------------------------------------------------
// SpriteCompiler
// ---------------------------------------------------------------------------

pub struct SpriteCompiler {
    engine: Arc<dyn SpriteEngine>,
}

impl fmt::Debug for SpriteCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteCompiler").finish_non_exhaustive()
    }
}

impl Default for SpriteCompiler {
    fn default() -> Self {
        Self::new(Arc::new(InlineSymbolEngine::default()))
    }
}

impl SpriteCompiler {
    pub fn new(engine: Arc<dyn SpriteEngine>) -> Self {
        Self { engine }
    }

    /// Compile a snapshot into sprite markup.
    ///
    /// Engine failures (malformed SVG included) propagate as `Err`; the
    /// orchestrator logs them without retrying.
    pub async fn compile(&self, snapshot: &[AssetItem]) -> Result<String, SpriteError> {
        let mut shapes = Vec::with_capacity(snapshot.len());
        for item in snapshot {
            let content = match &item.content {
                Some(content) => content.clone(),
                None => tokio::fs::read_to_string(&item.source_path)
                    .await
                    .map_err(|source| SpriteError::Io {
                        path: item.source_path.clone(),
                        source,
                    })?,
            };
            shapes.push(ShapeSource {
                path: item.source_path.clone(),
                content,
            });
        }

        let resolve_id = |path: &str| -> Result<String, SpriteError> {
            snapshot
                .iter()
                .rev()
                .find(|item| item.source_path == path)
                .map(|item| item.identifier.clone())
                .ok_or_else(|| SpriteError::SnapshotDesync {
                    path: path.to_string(),
                })
        };

        self.engine.compile(&shapes, &resolve_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(identifier: &str, path: &str, content: Option<&str>) -> AssetItem {
        AssetItem {
            identifier: identifier.to_string(),
            content_hash: content.map(|c| crate::utils::content_hash(c.as_bytes())),
            source_path: path.to_string(),
            content: content.map(str::to_string),
        }
    }

    /// Engine that records what it was fed and echoes resolved ids.
    struct ProbeEngine;

    impl SpriteEngine for ProbeEngine {
        fn compile(
            &self,
            shapes: &[ShapeSource],
            resolve_id: &dyn Fn(&str) -> Result<String, SpriteError>,
        ) -> Result<String, SpriteError> {
            let ids = shapes
                .iter()
                .map(|s| resolve_id(&s.path))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids.join(","))
        }
    }

    #[tokio::test]
    async fn compiler_feeds_captured_content_and_resolves_ids() {
        let compiler = SpriteCompiler::new(Arc::new(ProbeEngine));
        let snapshot = vec![
            item("star", "/icons/star.svg", Some("<svg>s</svg>")),
            item("moon", "/icons/moon.svg", Some("<svg>m</svg>")),
        ];
        let out = compiler.compile(&snapshot).await.unwrap();
        assert_eq!(out, "star,moon");
    }

    #[tokio::test]
    async fn missing_content_is_read_from_disk() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".svg").tempfile().unwrap();
        file.write_all(b"<svg>disk</svg>").unwrap();
        let path = file.path().to_string_lossy().to_string();

        struct ContentEcho;
        impl SpriteEngine for ContentEcho {
            fn compile(
                &self,
                shapes: &[ShapeSource],
                _resolve_id: &dyn Fn(&str) -> Result<String, SpriteError>,
            ) -> Result<String, SpriteError> {
                Ok(shapes[0].content.clone())
            }
        }

        let compiler = SpriteCompiler::new(Arc::new(ContentEcho));
        let snapshot = vec![item("disk", &path, None)];
        let out = compiler.compile(&snapshot).await.unwrap();
        assert_eq!(out, "<svg>disk</svg>");
    }

    #[tokio::test]
    async fn unreadable_path_is_an_io_error() {
        let compiler = SpriteCompiler::new(Arc::new(ProbeEngine));
        let snapshot = vec![item("gone", "/nonexistent/icon.svg", None)];
        let err = compiler.compile(&snapshot).await.unwrap_err();
        assert!(matches!(err, SpriteError::Io { .. }));
    }

    #[tokio::test]
    async fn unknown_engine_path_is_a_desync() {
        struct RogueEngine;
        impl SpriteEngine for RogueEngine {
            fn compile(
                &self,
                _shapes: &[ShapeSource],
                resolve_id: &dyn Fn(&str) -> Result<String, SpriteError>,
            ) -> Result<String, SpriteError> {
                resolve_id("/not/in/snapshot.svg")
            }
        }

        let compiler = SpriteCompiler::new(Arc::new(RogueEngine));
        let snapshot = vec![item("a", "/icons/a.svg", Some("<svg/>"))];
        let err = compiler.compile(&snapshot).await.unwrap_err();
        assert!(matches!(err, SpriteError::SnapshotDesync { .. }));
    }

    #[tokio::test]
    async fn id_resolution_uses_last_match_per_path() {
        struct FirstShape;
        impl SpriteEngine for FirstShape {
            fn compile(
                &self,
                shapes: &[ShapeSource],
                resolve_id: &dyn Fn(&str) -> Result<String, SpriteError>,
            ) -> Result<String, SpriteError> {
                resolve_id(&shapes[0].path)
            }
        }

        // Two entries for the same path: the later one wins.
        let compiler = SpriteCompiler::new(Arc::new(FirstShape));
        let snapshot = vec![
            item("stale", "/icons/a.svg", Some("<svg>old</svg>")),
            item("fresh", "/icons/a.svg", Some("<svg>new</svg>")),
        ];
        let out = compiler.compile(&snapshot).await.unwrap();
        assert_eq!(out, "fresh");
    }
}
