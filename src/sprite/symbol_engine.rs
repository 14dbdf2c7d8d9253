//! Inline symbol engine.
//!
//! Default [`SpriteEngine`](crate::SpriteEngine) implementation. Streams each
//! icon through a quick-xml event rewrite: the root `<svg>` element becomes a
//! `<symbol>` carrying the resolved identifier (and the root's `viewBox` /
//! `preserveAspectRatio`), its children are copied through untouched, and all
//! symbols are wrapped in one hidden inline `<svg>` root.
//!
//! XML declarations, doctypes, and processing instructions are stripped; the
//! symbol bodies are otherwise emitted byte-for-byte as parsed.

use std::io::Cursor;

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::sprite::{ShapeSource, SpriteEngine};
use crate::SpriteError;

/// Root attributes matching the inline-sprite convention: hidden from
/// assistive tech and collapsed to zero size so the sprite never renders
/// on its own.
const DEFAULT_ROOT_ATTRIBUTES: &[(&str, &str)] = &[
    ("xmlns", "http://www.w3.org/2000/svg"),
    ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
    ("aria-hidden", "true"),
    ("style", "position:absolute; width:0; height:0; overflow:hidden"),
];

/// Root-level attributes carried over from each icon onto its symbol.
const CARRIED_ATTRIBUTES: &[&[u8]] = &[b"viewBox", b"preserveAspectRatio"];

pub struct InlineSymbolEngine {
    root_attributes: Vec<(String, String)>,
}

impl Default for InlineSymbolEngine {
    fn default() -> Self {
        Self {
            root_attributes: DEFAULT_ROOT_ATTRIBUTES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl InlineSymbolEngine {
    /// Replace the sprite root's attribute set.
    pub fn with_root_attributes(mut self, attributes: Vec<(String, String)>) -> Self {
        self.root_attributes = attributes;
        self
    }

    fn build(&self, shapes: &[ShapeSource], ids: &[String]) -> Result<String> {
        let capacity: usize = shapes.iter().map(|s| s.content.len()).sum();
        let mut writer = Writer::new(Cursor::new(Vec::with_capacity(capacity + 256)));

        let mut root = BytesStart::new("svg");
        for (key, value) in &self.root_attributes {
            root.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(root))?;

        for (shape, id) in shapes.iter().zip(ids) {
            append_symbol(&mut writer, shape, id)
                .with_context(|| format!("while compiling `{}`", shape.path))?;
        }

        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).context("sprite output was not valid UTF-8")
    }
}

impl SpriteEngine for InlineSymbolEngine {
    fn compile(
        &self,
        shapes: &[ShapeSource],
        resolve_id: &dyn Fn(&str) -> Result<String, SpriteError>,
    ) -> Result<String, SpriteError> {
        // Resolve every identifier up front so a desync fails the compile
        // before any markup is produced.
        let ids = shapes
            .iter()
            .map(|shape| resolve_id(&shape.path))
            .collect::<Result<Vec<_>, SpriteError>>()?;

        self.build(shapes, &ids).map_err(SpriteError::Engine)
    }
}

/// Rewrite one icon into a `<symbol>` under the sprite root.
fn append_symbol(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    shape: &ShapeSource,
    id: &str,
) -> Result<()> {
    let mut reader = Reader::from_str(&shape.content);
    let mut in_root = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if !in_root => {
                if elem.name().as_ref() != b"svg" {
                    bail!(
                        "expected <svg> root element, found <{}>",
                        String::from_utf8_lossy(elem.name().as_ref())
                    );
                }
                writer.write_event(Event::Start(symbol_open(&elem, id)?))?;
                in_root = true;
                depth = 1;
            }
            Ok(Event::Empty(elem)) if !in_root => {
                if elem.name().as_ref() != b"svg" {
                    bail!(
                        "expected <svg> root element, found <{}/>",
                        String::from_utf8_lossy(elem.name().as_ref())
                    );
                }
                writer.write_event(Event::Start(symbol_open(&elem, id)?))?;
                writer.write_event(Event::End(BytesEnd::new("symbol")))?;
                return Ok(());
            }
            Ok(Event::Start(elem)) => {
                depth += 1;
                writer.write_event(Event::Start(elem))?;
            }
            Ok(Event::End(_)) if !in_root => {
                bail!("unexpected closing tag before <svg> root");
            }
            Ok(Event::End(elem)) => {
                depth -= 1;
                if depth == 0 {
                    writer.write_event(Event::End(BytesEnd::new("symbol")))?;
                    return Ok(());
                }
                writer.write_event(Event::End(elem))?;
            }
            // Prolog noise is dropped from the sprite.
            Ok(Event::Decl(_) | Event::DocType(_) | Event::PI(_)) => {}
            Ok(Event::Eof) => {
                if in_root {
                    bail!("unclosed <svg> root element");
                }
                bail!("no <svg> root element found");
            }
            Ok(event) if in_root => writer.write_event(event)?,
            // Text or comments before the root element.
            Ok(_) => {}
            Err(e) => bail!(
                "malformed SVG at position {}: {}",
                reader.error_position(),
                e
            ),
        }
    }
}

/// Build the `<symbol>` opening tag from the icon's `<svg>` root.
fn symbol_open(root: &BytesStart<'_>, id: &str) -> Result<BytesStart<'static>> {
    let mut symbol = BytesStart::new("symbol");
    symbol.push_attribute(("id", id));
    for attr in root.attributes() {
        let attr = attr.context("invalid attribute on <svg> root")?;
        if CARRIED_ATTRIBUTES.contains(&attr.key.as_ref()) {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr.unescape_value()?;
            symbol.push_attribute((key, value.as_ref()));
        }
    }
    Ok(symbol)
}
