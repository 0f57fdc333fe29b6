//! The library code for the `quire` static site generator. A build is one
//! linear pass:
//!
//! 1. Parsing posts from Markdown source files on disk ([`crate::post`] and
//!    [`crate::frontmatter`]) and rendering each one to an HTML page
//!    ([`crate::markdown`], [`crate::template`])
//! 2. Refreshing the aggregator pages (the blog index and the home page's
//!    "Latest Posts" section) from the collected [`crate::post::PostEntry`]s
//!    ([`crate::listing`], [`crate::region`])
//! 3. Optionally writing an Atom feed ([`crate::feed`])
//!
//! [`crate::build`] stitches these steps together. The aggregator pages are
//! hand-written HTML files; only a single marker region in each of them is
//! regenerated, everything else passes through untouched.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod feed;
pub mod frontmatter;
pub mod listing;
pub mod markdown;
pub mod post;
pub mod region;
pub mod template;
