//! SpritePlugin — the build-tool-facing façade of the pipeline.
//!
//! Owns the pieces and the cycle:
//! 1. Hands the module-transform step a wired [`SvgLoader`]
//! 2. Collects submissions in the [`AssetRegistry`]
//! 3. On each HTML emission, recompiles the sprite only if the registry
//!    changed since the last compile, then splices it into the document
//!
//! HTML may be emitted many times in a watch build; the comparatively
//! expensive sprite compile runs once per distinct registry state.

pub mod registry;
pub mod svg_loader;
pub mod symbol_id;

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::html::{HtmlInjector, InjectMode};
use crate::plugin::registry::{AssetRegistry, AssetSink};
use crate::plugin::svg_loader::SvgLoader;
use crate::plugin::symbol_id::{filename_symbol_id, SymbolIdFn, SymbolIdPolicy};
use crate::sprite::{SpriteCompiler, SpriteEngine};
use crate::{DiagnosticSink, SpriteError};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Plugin configuration.
#[derive(Default)]
pub struct SpriteOptions {
    /// Custom symbol id generator `(path, hash, content) -> id`. Overrides
    /// the default identifier policy entirely.
    pub generate_symbol_id: Option<Arc<SymbolIdFn>>,
    /// Glob patterns registered at construction time, without a javascript
    /// import. Ids derive from the file names.
    pub include_files: Vec<String>,
    /// Append the sprite before `</body>` instead of prepending after
    /// `<body>`. Defaults to prepend.
    pub append: bool,
    /// Override the sprite-generation engine. Defaults to the inline symbol
    /// engine.
    pub engine: Option<Arc<dyn SpriteEngine>>,
}

impl fmt::Debug for SpriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteOptions")
            .field(
                "generate_symbol_id",
                &self.generate_symbol_id.as_ref().map(|_| "<fn>"),
            )
            .field("include_files", &self.include_files)
            .field("append", &self.append)
            .field("engine", &self.engine.as_ref().map(|_| "<engine>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Host seam
// ---------------------------------------------------------------------------

/// Event payload for one HTML emission.
#[derive(Debug, Clone)]
pub struct HtmlEmitEvent {
    pub html: String,
}

/// The surface the plugin expects from the host build tool.
///
/// `register_html_hook` reports whether the host actually has an HTML
/// emission hook point; older or differently configured hosts may not.
pub trait BuildHost {
    /// Wire the module transform for files with the given extension.
    fn register_transform(&mut self, extension: &str, loader: SvgLoader);

    /// Wire the HTML emission hook. Returns `false` when the host API
    /// surface has no such hook point.
    fn register_html_hook(&mut self, plugin: Arc<SpritePlugin>) -> bool;
}

// ---------------------------------------------------------------------------
// SpritePlugin
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CompileState {
    cached_sprite: String,
    /// Registry version the cached sprite was compiled from. `None` until
    /// the first successful compile, so the plugin starts dirty.
    compiled_version: Option<u64>,
}

pub struct SpritePlugin {
    registry: Arc<AssetRegistry>,
    compiler: SpriteCompiler,
    injector: HtmlInjector,
    state: RwLock<CompileState>,
    diagnostics: DiagnosticSink,
}

impl fmt::Debug for SpritePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpritePlugin")
            .field("registry", &self.registry)
            .field("injector", &self.injector)
            .finish_non_exhaustive()
    }
}

impl SpritePlugin {
    /// Build the plugin and register any `include_files` up front.
    ///
    /// A pattern matching zero files is a warning, not an error; an invalid
    /// pattern or an unreadable matched file is a configuration error and
    /// fails construction.
    pub fn new(options: SpriteOptions) -> Result<Self, SpriteError> {
        let policy = SymbolIdPolicy::new(options.generate_symbol_id.clone());
        let compiler = match &options.engine {
            Some(engine) => SpriteCompiler::new(Arc::clone(engine)),
            None => SpriteCompiler::default(),
        };
        let mode = if options.append {
            InjectMode::Append
        } else {
            InjectMode::Prepend
        };

        let plugin = Self {
            registry: Arc::new(AssetRegistry::new(policy)),
            compiler,
            injector: HtmlInjector::new(mode),
            state: RwLock::new(CompileState::default()),
            diagnostics: DiagnosticSink::new(),
        };

        plugin.import_files(&options.include_files)?;
        Ok(plugin)
    }

    /// Include files in the sprite without a javascript import.
    fn import_files(&self, patterns: &[String]) -> Result<(), SpriteError> {
        for pattern in patterns {
            let matches = glob::glob(pattern).map_err(|source| SpriteError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;

            let mut matched = 0usize;
            for entry in matches {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        self.diagnostics
                            .warn(format!("skipping unreadable match for `{}`: {}", pattern, e));
                        continue;
                    }
                };
                if !path.is_file() {
                    continue;
                }
                matched += 1;

                let absolute =
                    std::fs::canonicalize(&path).map_err(|source| SpriteError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                let content =
                    std::fs::read_to_string(&absolute).map_err(|source| SpriteError::Io {
                        path: absolute.display().to_string(),
                        source,
                    })?;

                let source_path = absolute.to_string_lossy();
                let default_id = filename_symbol_id(&source_path);
                self.registry
                    .register(&source_path, Some(&content), Some(&default_id))?;
            }

            if matched == 0 {
                self.diagnostics
                    .warn(format!("no file matched include pattern `{}`", pattern));
            }
        }
        Ok(())
    }

    /// A module-transform loader wired to this plugin's registry.
    pub fn loader(&self) -> SvgLoader {
        SvgLoader::wired(Arc::clone(&self.registry) as Arc<dyn AssetSink>)
    }

    /// Register this plugin's steps on the host.
    ///
    /// When the host exposes no HTML emission hook, injection is skipped for
    /// the build with a warning; asset collection still functions.
    pub fn apply(self: &Arc<Self>, host: &mut dyn BuildHost) {
        host.register_transform("svg", self.loader());
        if !host.register_html_hook(Arc::clone(self)) {
            self.diagnostics.warn(
                "host exposes no HTML emission hook point — sprite injection disabled, \
                 asset collection still active",
            );
        }
    }

    /// Handle one HTML emission event.
    ///
    /// Compiles the sprite only when the registry changed since the last
    /// successful compile, then injects the (fresh or cached) sprite into
    /// `event.html`. Compile failures are recorded as diagnostics and leave
    /// the HTML unmodified and the state dirty; the next emission retries
    /// with the then-current registry state. Returns exactly once per event.
    pub async fn process_html(&self, event: &mut HtmlEmitEvent) {
        // Snapshot at compile start. A registration arriving mid-compile
        // bumps the live version, leaving the state dirty for the next cycle
        // without mutating this snapshot.
        let (snapshot, version) = self.registry.snapshot();

        let needs_compile = {
            let state = self.state.read().expect("compile state poisoned");
            state.compiled_version != Some(version)
        };

        if needs_compile {
            match self.compiler.compile(&snapshot).await {
                Ok(sprite) => {
                    let mut state = self.state.write().expect("compile state poisoned");
                    state.cached_sprite = sprite;
                    state.compiled_version = Some(version);
                }
                Err(err) => {
                    self.diagnostics
                        .error(format!("sprite compilation failed: {}", err));
                    return;
                }
            }
        }

        let sprite = {
            let state = self.state.read().expect("compile state poisoned");
            state.cached_sprite.clone()
        };
        event.html = self.injector.inject(&event.html, &sprite);
    }

    /// Direct registration entry point, equivalent to a loader submission.
    pub fn register(
        &self,
        source_path: &str,
        content: Option<&str>,
    ) -> Result<String, SpriteError> {
        self.registry.register(source_path, content, None)
    }

    pub fn registry(&self) -> Arc<AssetRegistry> {
        Arc::clone(&self.registry)
    }

    /// Collaborator diagnostics channel (shared handle).
    pub fn diagnostics(&self) -> DiagnosticSink {
        self.diagnostics.clone()
    }

    /// Remove and return all diagnostics collected so far.
    pub fn drain_diagnostics(&self) -> Vec<crate::Diagnostic> {
        self.diagnostics.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticLevel;

    #[test]
    fn new_with_defaults_is_empty_and_dirty() {
        let plugin = SpritePlugin::new(SpriteOptions::default()).unwrap();
        assert!(plugin.registry().is_empty());
        assert!(plugin.state.read().unwrap().compiled_version.is_none());
    }

    #[test]
    fn zero_match_pattern_warns_and_leaves_registry_untouched() {
        let plugin = SpritePlugin::new(SpriteOptions {
            include_files: vec!["/nonexistent/dir/**/*.svg".to_string()],
            ..Default::default()
        })
        .unwrap();

        assert!(plugin.registry().is_empty());
        let diagnostics = plugin.drain_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, DiagnosticLevel::Warning);
        assert!(diagnostics[0].message.contains("no file matched"));
    }

    #[test]
    fn invalid_pattern_fails_construction() {
        let result = SpritePlugin::new(SpriteOptions {
            include_files: vec!["/icons/[".to_string()],
            ..Default::default()
        });
        assert!(matches!(result, Err(SpriteError::InvalidPattern { .. })));
    }

    #[test]
    fn include_files_register_with_filename_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("star.svg"), "<svg>s</svg>").unwrap();
        std::fs::write(dir.path().join("moon.svg"), "<svg>m</svg>").unwrap();

        let pattern = format!("{}/*.svg", dir.path().display());
        let plugin = SpritePlugin::new(SpriteOptions {
            include_files: vec![pattern],
            ..Default::default()
        })
        .unwrap();

        let (snapshot, _) = plugin.registry().snapshot();
        let mut ids: Vec<_> = snapshot.iter().map(|i| i.identifier.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["moon", "star"]);
        assert!(plugin.drain_diagnostics().is_empty());
    }

    struct RecordingHost {
        transforms: Vec<String>,
        has_html_hook: bool,
        html_hook: Option<Arc<SpritePlugin>>,
    }

    impl BuildHost for RecordingHost {
        fn register_transform(&mut self, extension: &str, _loader: SvgLoader) {
            self.transforms.push(extension.to_string());
        }

        fn register_html_hook(&mut self, plugin: Arc<SpritePlugin>) -> bool {
            if self.has_html_hook {
                self.html_hook = Some(plugin);
            }
            self.has_html_hook
        }
    }

    #[test]
    fn apply_wires_transform_and_html_hook() {
        let plugin = Arc::new(SpritePlugin::new(SpriteOptions::default()).unwrap());
        let mut host = RecordingHost {
            transforms: vec![],
            has_html_hook: true,
            html_hook: None,
        };
        plugin.apply(&mut host);
        assert_eq!(host.transforms, vec!["svg"]);
        assert!(host.html_hook.is_some());
        assert!(plugin.drain_diagnostics().is_empty());
    }

    #[test]
    fn missing_html_hook_warns_but_collection_still_works() {
        let plugin = Arc::new(SpritePlugin::new(SpriteOptions::default()).unwrap());
        let mut host = RecordingHost {
            transforms: vec![],
            has_html_hook: false,
            html_hook: None,
        };
        plugin.apply(&mut host);

        let diagnostics = plugin.drain_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, DiagnosticLevel::Warning);

        // Collection keeps functioning without the hook.
        let loader = plugin.loader();
        assert!(loader.transform("/icons/a.svg", "<svg/>").is_ok());
    }
}
