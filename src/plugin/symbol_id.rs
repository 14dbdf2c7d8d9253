//! Symbol identifier policy.
//!
//! Decides the export identifier for a registered asset. Resolution order:
//!
//! 1. A custom generator callback supplied at construction always wins, even
//!    over a default identifier passed with the registration call.
//! 2. A default identifier supplied with the call is used verbatim.
//! 3. Fallback: an internally generated sequential base-10 id from `"0"`.
//!
//! The sequential counter is an instance field, threaded through registry
//! construction. No static state.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Custom id generator: `(source_path, content_hash, content) -> identifier`.
///
/// Content-free submissions call the generator with hash `0` and an empty
/// content string.
pub type SymbolIdFn = dyn Fn(&str, u64, &str) -> String + Send + Sync;

pub struct SymbolIdPolicy {
    generator: Option<Arc<SymbolIdFn>>,
    next_sequential: u64,
}

impl fmt::Debug for SymbolIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolIdPolicy")
            .field("generator", &self.generator.as_ref().map(|_| "<fn>"))
            .field("next_sequential", &self.next_sequential)
            .finish()
    }
}

impl SymbolIdPolicy {
    pub fn new(generator: Option<Arc<SymbolIdFn>>) -> Self {
        Self {
            generator,
            next_sequential: 0,
        }
    }

    /// Resolve the identifier for one asset.
    pub fn resolve(
        &mut self,
        source_path: &str,
        content_hash: Option<u64>,
        content: Option<&str>,
        default_id: Option<&str>,
    ) -> String {
        if let Some(generator) = &self.generator {
            return generator(
                source_path,
                content_hash.unwrap_or(0),
                content.unwrap_or(""),
            );
        }
        if let Some(id) = default_id {
            return id.to_string();
        }
        let id = self.next_sequential.to_string();
        self.next_sequential += 1;
        id
    }
}

impl Default for SymbolIdPolicy {
    fn default() -> Self {
        Self::new(None)
    }
}

// ---------------------------------------------------------------------------
// Filename-derived identifiers
// ---------------------------------------------------------------------------

/// Derive a symbol id from a file name by dropping its final 4 characters.
///
/// Assumes a 3-character extension plus the separating dot. Known constraint:
/// differently sized extensions get truncated names (`icon.jpeg` becomes
/// `icon.`), pinned by tests rather than silently fixed.
pub fn filename_symbol_id(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let keep = name.chars().count().saturating_sub(4);
    name.chars().take(keep).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_fallback_counts_from_zero() {
        let mut policy = SymbolIdPolicy::default();
        assert_eq!(policy.resolve("/a.svg", None, None, None), "0");
        assert_eq!(policy.resolve("/b.svg", None, None, None), "1");
        assert_eq!(policy.resolve("/c.svg", None, None, None), "2");
    }

    #[test]
    fn default_id_used_verbatim_without_generator() {
        let mut policy = SymbolIdPolicy::default();
        assert_eq!(
            policy.resolve("/a.svg", Some(7), Some("<svg/>"), Some("logo")),
            "logo"
        );
        // The counter did not advance.
        assert_eq!(policy.resolve("/b.svg", None, None, None), "0");
    }

    #[test]
    fn generator_overrides_default_id() {
        let mut policy = SymbolIdPolicy::new(Some(Arc::new(|path, hash, _content| {
            format!("{}-{}", path.rsplit('/').next().unwrap_or(""), hash)
        })));
        let id = policy.resolve("/icons/star.svg", Some(42), Some("<svg/>"), Some("ignored"));
        assert_eq!(id, "star.svg-42");
    }

    #[test]
    fn filename_id_strips_three_char_extension() {
        assert_eq!(filename_symbol_id("/icons/icon.svg"), "icon");
        assert_eq!(filename_symbol_id("arrow-left.svg"), "arrow-left");
    }

    #[test]
    fn filename_id_truncation_is_fixed_width() {
        // Known constraint: the strip is 4 characters, not extension-aware.
        assert_eq!(filename_symbol_id("/icons/icon.jpeg"), "icon.");
        assert_eq!(filename_symbol_id("/icons/a.sv"), "");
    }
}
