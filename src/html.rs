//! HTML injection.
//!
//! Splices the compiled sprite into a raw HTML string by scanning for the
//! body tag markers. Deliberately not a full HTML parse: marker scanning is
//! fast and tolerates malformed fragments. Everything outside the splice
//! point is preserved byte-exact.
//!
//! Offsets come from `str::find` on a UTF-8 `String`; both markers are pure
//! ASCII, so every insertion point is a char boundary.

use serde::{Deserialize, Serialize};

const BODY_TAG_BEGIN: &str = "<body";
const BODY_TAG_END: char = '>';
const BODY_TAG_CLOSE: &str = "</body";

/// Where the sprite lands relative to the body content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InjectMode {
    /// Immediately after the `<body ...>` opening tag.
    #[default]
    Prepend,
    /// Immediately before the `</body>` closing tag.
    Append,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlInjector {
    mode: InjectMode,
}

impl HtmlInjector {
    pub fn new(mode: InjectMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> InjectMode {
        self.mode
    }

    /// Splice `sprite` into `html` at the body insertion point.
    ///
    /// A document without the relevant body marker is returned unchanged — a
    /// valid, if unusual, condition this component tolerates silently.
    pub fn inject(&self, html: &str, sprite: &str) -> String {
        let insertion_point = match self.mode {
            InjectMode::Append => html.find(BODY_TAG_CLOSE),
            InjectMode::Prepend => html.find(BODY_TAG_BEGIN).and_then(|start| {
                // Skip past attributes inside the opening tag.
                html[start..].find(BODY_TAG_END).map(|end| start + end + 1)
            }),
        };

        match insertion_point {
            Some(at) => {
                let mut out = String::with_capacity(html.len() + sprite.len());
                out.push_str(&html[..at]);
                out.push_str(sprite);
                out.push_str(&html[at..]);
                out
            }
            None => html.to_string(),
        }
    }
}
