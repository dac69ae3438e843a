//! The library code for the `microblog` static site generator. A build is a
//! single pass over a tree of markdown files:
//!
//! 1. Loading the templates ([`crate::template`])
//! 2. Parsing each source file into a post ([`crate::post`]), which walks the
//!    markdown once ([`crate::markdown`]) to pull out the metadata block
//!    ([`crate::metadata`]) and the title while rendering the HTML body
//! 3. Writing each post or page with its template ([`crate::write`])
//! 4. Writing the homepage from the metadata of every page, most recent
//!    first
//!
//! The homepage is either generated from the `index.tmpl` template alone or,
//! when the source tree has a root `index.md`, from that document: its
//! rendered HTML is executed as a template against the list of pages and the
//! result is wrapped in its own template. [`crate::build`] drives the whole
//! thing.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod markdown;
pub mod metadata;
pub mod post;
pub mod template;
pub mod value;
pub mod write;
