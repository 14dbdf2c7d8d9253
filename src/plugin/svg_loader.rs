//! SVG loader — the module-transform companion of `SpritePlugin`.
//!
//! The host invokes [`SvgLoader::transform`] for every imported SVG module.
//! The loader submits the asset through its injected [`AssetSink`] handle and
//! returns the emittable module code `export default '#<identifier>'`.
//!
//! A loader constructed without a sink (the plugin missing from the host
//! configuration) fails loudly on first use instead of passing content
//! through silently.

use std::fmt;
use std::sync::Arc;

use crate::plugin::registry::AssetSink;
use crate::utils::export_snippet;
use crate::SpriteError;

#[derive(Clone)]
pub struct SvgLoader {
    sink: Option<Arc<dyn AssetSink>>,
}

impl fmt::Debug for SvgLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvgLoader")
            .field("wired", &self.sink.is_some())
            .finish()
    }
}

impl SvgLoader {
    /// A loader with its submission handle attached. Handed out by the plugin.
    pub(crate) fn wired(sink: Arc<dyn AssetSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A loader without a plugin behind it. Any transform call errors.
    pub fn unwired() -> Self {
        Self { sink: None }
    }

    fn sink(&self) -> Result<&Arc<dyn AssetSink>, SpriteError> {
        self.sink.as_ref().ok_or(SpriteError::LoaderNotWired)
    }

    /// Content-bearing transform: submits the raw SVG source for dedup and
    /// later compilation, returns the export snippet.
    pub fn transform(&self, resource_path: &str, source: &str) -> Result<String, SpriteError> {
        let identifier = self.sink()?.submit(resource_path, Some(source), None)?;
        Ok(export_snippet(&identifier))
    }

    /// Content-free transform: pure side-channel notification. An identifier
    /// is still needed, but no dedup-by-content is possible; the compiler
    /// reads the file from disk when the sprite is built.
    pub fn transform_content_free(&self, resource_path: &str) -> Result<String, SpriteError> {
        let identifier = self.sink()?.submit(resource_path, None, None)?;
        Ok(export_snippet(&identifier))
    }
}

/// Absolute source path of the loader module, for host configuration that
/// wires the transform step without hardcoding a path. Anchored to the crate
/// manifest directory so it resolves regardless of the process working
/// directory.
pub fn loader_source_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/src/plugin/svg_loader.rs")
}
