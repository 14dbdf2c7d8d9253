//! Utility functions for the pipeline.
//!
//! - Content fingerprinting for dedup
//! - The emittable export snippet returned to module importers

use std::hash::Hasher;

use rustc_hash::FxHasher;

// ---------------------------------------------------------------------------
// Content Fingerprint
// ---------------------------------------------------------------------------

/// Compute the content fingerprint of raw SVG bytes.
///
/// Fast and non-cryptographic; used only to detect identical icon content
/// imported from different files. Collision-tolerant, not collision-proof.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Export Snippet
// ---------------------------------------------------------------------------

/// Build the module code handed back to the host transform step.
///
/// The importing module receives the symbol reference as its default export,
/// ready for `<use href>`.
pub fn export_snippet(identifier: &str) -> String {
    format!("export default '#{}'", identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_equal_content() {
        let a = content_hash(b"<svg><path d=\"M0 0\"/></svg>");
        let b = content_hash(b"<svg><path d=\"M0 0\"/></svg>");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_for_different_content() {
        let a = content_hash(b"<svg/>");
        let b = content_hash(b"<svg ></svg>");
        assert_ne!(a, b);
    }

    #[test]
    fn export_snippet_shape() {
        assert_eq!(export_snippet("icon"), "export default '#icon'");
        assert_eq!(export_snippet("0"), "export default '#0'");
    }
}
