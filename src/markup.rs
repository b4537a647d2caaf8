//! Image reference rewriting.
//!
//! Two text → text passes, always run in this order:
//!
//! 1. [`annotate_tags`]: `<img …>` tags without both `width=` and `height=`
//!    get the pair inserted before the closing `>` (or `/>`).
//! 2. [`convert_links`]: Markdown `![alt](src)` images become
//!    `<img src alt width height>` tags.
//!
//! Neither pass touches the filesystem. Looking up a source is delegated to
//! a caller-supplied closure returning a [`Probe`], so the passes stay pure
//! and each can be tested on its own.
//!
//! Tag matching is a boundary heuristic, not an HTML parser: a tag runs from
//! `<img` plus whitespace to the next `>`. A `>` inside a quoted attribute
//! value ends the match early, and such a tag is rewritten as if it ended
//! there.
//!
//! ```text
//! <img src="/pics/a.png" alt="x">   →  <img src="/pics/a.png" alt="x" width="400" height="300">
//! <img src="/pics/a.png" />         →  <img src="/pics/a.png" width="400" height="300" />
//! ![cat](/img/cat.jpg)              →  <img src="/img/cat.jpg" alt="cat" width="100" height="100">
//! ```

use crate::imaging::Dimensions;
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::LazyLock;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img\s+[^>]+>").expect("valid img tag pattern"));

static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src=["']([^"']+)["']"#).expect("valid src pattern"));

static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("valid markdown image pattern"));

/// Outcome of looking up a local image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The resolved path does not exist.
    Missing(PathBuf),
    /// The file exists but its dimensions could not be read.
    Failed { path: PathBuf, reason: String },
    Found(Dimensions),
}

/// Something a pass did or declined to do, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteEvent {
    TagUpdated {
        src: String,
        width: u32,
        height: u32,
    },
    /// Only tag-style references report missing files.
    TagImageMissing { path: PathBuf },
    LinkConverted {
        src: String,
        width: u32,
        height: u32,
    },
    ProbeFailed { path: PathBuf, reason: String },
}

/// Result of running one or both passes over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub changed: bool,
    pub events: Vec<RewriteEvent>,
}

/// Remote sources are never rewritten.
///
/// Anything starting with `http` counts, which also covers `https` (and, as
/// a side effect, a local file literally named `http…`).
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http") || src.starts_with("//")
}

/// A tag that already mentions both attributes is left alone.
fn has_dimensions(tag: &str) -> bool {
    tag.contains("width=") && tag.contains("height=")
}

/// Insert `width`/`height` before the closing marker of `tag`.
///
/// Self-closing tags keep their `/>` (normalized to ` />`).
pub fn inject_dimensions(tag: &str, dims: Dimensions) -> Option<String> {
    let (base, suffix) = if let Some(base) = tag.strip_suffix("/>") {
        (base.trim_end(), " />")
    } else if let Some(base) = tag.strip_suffix('>') {
        (base.trim_end(), ">")
    } else {
        return None;
    };
    Some(format!(
        r#"{base} width="{}" height="{}"{suffix}"#,
        dims.width, dims.height
    ))
}

/// Pass 1: add dimensions to `<img>` tags.
pub fn annotate_tags<F>(text: &str, probe: &mut F) -> Rewrite
where
    F: FnMut(&str) -> Probe,
{
    let mut changed = false;
    let mut events = Vec::new();

    let rewritten = IMG_TAG.replace_all(text, |caps: &Captures| {
        let tag = &caps[0];
        if has_dimensions(tag) {
            return tag.to_string();
        }
        let Some(src) = SRC_ATTR.captures(tag).map(|c| c[1].to_string()) else {
            return tag.to_string();
        };
        if is_remote(&src) {
            return tag.to_string();
        }

        let dims = match probe(&src) {
            Probe::Found(dims) => dims,
            Probe::Missing(path) => {
                events.push(RewriteEvent::TagImageMissing { path });
                return tag.to_string();
            }
            Probe::Failed { path, reason } => {
                events.push(RewriteEvent::ProbeFailed { path, reason });
                return tag.to_string();
            }
        };

        match inject_dimensions(tag, dims) {
            Some(new_tag) => {
                events.push(RewriteEvent::TagUpdated {
                    src,
                    width: dims.width,
                    height: dims.height,
                });
                changed = true;
                new_tag
            }
            None => tag.to_string(),
        }
    });

    Rewrite {
        text: rewritten.into_owned(),
        changed,
        events,
    }
}

/// Pass 2: turn `![alt](src)` into a dimensioned `<img>` tag.
///
/// Missing files are skipped without an event. Alt text and source are
/// copied verbatim.
pub fn convert_links<F>(text: &str, probe: &mut F) -> Rewrite
where
    F: FnMut(&str) -> Probe,
{
    let mut changed = false;
    let mut events = Vec::new();

    let rewritten = MD_IMAGE.replace_all(text, |caps: &Captures| {
        let alt = &caps[1];
        let src = &caps[2];
        if is_remote(src) {
            return caps[0].to_string();
        }

        match probe(src) {
            Probe::Found(dims) => {
                events.push(RewriteEvent::LinkConverted {
                    src: src.to_string(),
                    width: dims.width,
                    height: dims.height,
                });
                changed = true;
                format!(
                    r#"<img src="{src}" alt="{alt}" width="{}" height="{}">"#,
                    dims.width, dims.height
                )
            }
            Probe::Missing(_) => caps[0].to_string(),
            Probe::Failed { path, reason } => {
                events.push(RewriteEvent::ProbeFailed { path, reason });
                caps[0].to_string()
            }
        }
    });

    Rewrite {
        text: rewritten.into_owned(),
        changed,
        events,
    }
}

/// Run both passes: tags first, then Markdown images over the result.
///
/// Tags produced by the second pass are not revisited.
pub fn rewrite_document<F>(text: &str, probe: &mut F) -> Rewrite
where
    F: FnMut(&str) -> Probe,
{
    let tags = annotate_tags(text, probe);
    let links = convert_links(&tags.text, probe);

    let mut events = tags.events;
    events.extend(links.events);
    Rewrite {
        text: links.text,
        changed: tags.changed || links.changed,
        events,
    }
}
