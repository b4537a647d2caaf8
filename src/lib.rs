//! # folio-prep
//!
//! Build helpers for a portfolio site whose pages are Markdown files under
//! `projects/`. Two independent batch jobs, each a straight pipeline:
//!
//! ```text
//! dimensions   projects/**/*.md  →  same files, <img> tags carry width/height
//! bundle       projects/**/*.md  →  projects/projects-cache-static-export.js
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`annotate`] | Dimension job: walk, rewrite, write back changed files |
//! | [`markup`] | The two pure rewrite passes (`<img>` tags, then `![alt](src)`) |
//! | [`imaging`] | [`imaging::DimensionResolver`] trait and the header-reading backend |
//! | [`bundle`] | Bundle job: key → content table, JS escaping, script rendering |
//! | [`scan`] | Deterministic traversal shared by both jobs |
//! | [`naming`] | Markdown extension matching and key derivation |
//! | [`config`] | `prep.toml` loading, merging and validation |
//! | [`types`] | [`types::ContentDocument`] |
//! | [`output`] | Diagnostic line formatting |
//!
//! # Design Decisions
//!
//! ## Pure Passes, Injected Lookups
//!
//! The rewrite passes never touch the filesystem. They ask a closure for a
//! [`markup::Probe`] per source and return the new text, a changed flag and
//! a list of events. The annotator supplies a closure that checks existence
//! and calls the resolver; tests supply fixed answers.
//!
//! ## Pattern Matching, Not Parsing
//!
//! `<img` tags are found with a boundary regex and Markdown images with a
//! lazy bracket/paren regex. Anything the patterns can't read is left as is.
//! This keeps the rewrite byte-exact everywhere outside the matched spans.
//!
//! ## Sources Resolve Against One Base
//!
//! `src="/pics/a.png"` means `<image_base>/pics/a.png` for every document,
//! however deeply nested. The site serves `projects/` and `pics/` from the
//! same root, so this matches what the browser will request.

pub mod annotate;
pub mod bundle;
pub mod config;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
