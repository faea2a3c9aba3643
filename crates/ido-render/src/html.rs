/*
 * html.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Static HTML capability tables.
//!
//! The renderer consults these tables instead of checking tag names ad hoc:
//! whether a tag is known, whether it is a void element, and whether an
//! attribute name may be emitted.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// The literal declaration emitted for a `doctype` node.
pub const DOCTYPE_DECLARATION: &str = "<!DOCTYPE html>";

/// How a known tag is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Has a closing tag and may have children.
    Normal,
    /// Closed in its opening tag (`<br/>`); never has children.
    Void,
}

static VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

static NORMAL_TAGS: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote", "body",
    "button", "canvas", "caption", "cite", "code", "colgroup", "data", "datalist", "dd", "del",
    "details", "dfn", "dialog", "div", "dl", "dt", "em", "fieldset", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "html", "i",
    "iframe", "ins", "kbd", "label", "legend", "li", "main", "map", "mark", "menu", "meter", "nav",
    "noscript", "object", "ol", "optgroup", "option", "output", "p", "picture", "pre", "progress",
    "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section", "select", "slot",
    "small", "span", "strong", "style", "sub", "summary", "sup", "table", "tbody", "td",
    "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "u", "ul", "var",
    "video", "svg", "path", "circle", "rect", "line", "polyline", "polygon", "g", "use", "defs",
    "symbol",
];

static KNOWN_ATTRIBUTES: &[&str] = &[
    // Global attributes
    "accesskey", "autocapitalize", "autofocus", "class", "contenteditable", "dir", "draggable",
    "enterkeyhint", "hidden", "id", "inert", "inputmode", "is", "itemid", "itemprop", "itemref",
    "itemscope", "itemtype", "lang", "nonce", "part", "popover", "role", "slot", "spellcheck",
    "style", "tabindex", "title", "translate",
    // Links and resources
    "href", "hreflang", "target", "rel", "download", "ping", "referrerpolicy", "media", "type",
    "src", "srcset", "sizes", "alt", "width", "height", "loading", "decoding", "fetchpriority",
    "crossorigin", "integrity", "as", "async", "defer", "nomodule", "usemap", "ismap",
    // Document metadata
    "charset", "content", "http-equiv", "name", "property", "manifest",
    // Forms
    "accept", "accept-charset", "action", "autocomplete", "checked", "cols", "dirname",
    "disabled", "enctype", "for", "form", "formaction", "formenctype", "formmethod",
    "formnovalidate", "formtarget", "list", "max", "maxlength", "method", "min", "minlength",
    "multiple", "novalidate", "pattern", "placeholder", "readonly", "required", "rows",
    "selected", "size", "step", "value", "wrap", "label", "high", "low", "optimum",
    // Tables
    "colspan", "rowspan", "headers", "scope", "span",
    // Media
    "autoplay", "controls", "loop", "muted", "playsinline", "poster", "preload", "kind",
    "srclang", "default",
    // Embedded content
    "allow", "allowfullscreen", "sandbox", "srcdoc", "data", "coords", "shape",
    // Text-level and interactive
    "cite", "datetime", "open", "reversed", "start", "summary", "abbr", "high",
    // SVG presentation
    "viewbox", "viewBox", "xmlns", "fill", "stroke", "stroke-width", "d", "cx", "cy", "r", "x",
    "y", "x1", "y1", "x2", "y2", "points", "transform",
];

static TAG_TABLE: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NORMAL_TAGS.iter().chain(VOID_TAGS).copied().collect());

static VOID_TABLE: Lazy<HashSet<&'static str>> = Lazy::new(|| VOID_TAGS.iter().copied().collect());

static ATTRIBUTE_TABLE: Lazy<HashSet<&'static str>> =
    Lazy::new(|| KNOWN_ATTRIBUTES.iter().copied().collect());

/// Look up a tag in the capability table.
///
/// Returns `None` for tags the renderer does not know.
pub fn tag_kind(tag: &str) -> Option<TagKind> {
    if VOID_TABLE.contains(tag) {
        Some(TagKind::Void)
    } else if TAG_TABLE.contains(tag) {
        Some(TagKind::Normal)
    } else {
        None
    }
}

/// Whether an attribute name may be emitted.
///
/// Known HTML attributes pass, as does anything starting with `data-` or
/// `aria-`. Event handler attributes (`on*`) are not in the table.
pub fn attribute_allowed(name: &str) -> bool {
    ATTRIBUTE_TABLE.contains(name) || name.starts_with("data-") || name.starts_with("aria-")
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build an HTML comment, keeping the text from terminating it early.
pub fn comment(text: &str) -> String {
    format!("<!-- {} -->", text.replace("--", "- -").replace('>', "&gt;"))
}
