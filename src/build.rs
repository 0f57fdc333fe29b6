//! Exports the [`SiteBuilder`] type and the [`build_site`] function which
//! stitches together the high-level steps of building the site: parsing the
//! posts and rendering their pages ([`SiteBuilder::build_all`]), refreshing
//! the blog index and the home page ([`SiteBuilder::update_blog_index`],
//! [`SiteBuilder::update_home_page`]), and writing the Atom feed.
//!
//! Every step is a pure function of the current sources followed by an
//! overwrite, so a failed build is fixed by re-running it.

use crate::config::{self, Config};
use crate::feed::{self, FeedConfig};
use crate::listing;
use crate::markdown;
use crate::post::{self, Post, PostEntry, Skipped};
use crate::region::{self, Region};
use crate::template::{self, Templates};
use gtmpl::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The outcome of a build: the entries for every rendered post (in the order
/// they were processed, not yet sorted) and the source files that were left
/// out.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub entries: Vec<PostEntry>,
    pub skipped: Vec<Skipped>,
}

/// What happened to an aggregator page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionUpdate {
    /// The marker region was regenerated and the file rewritten.
    Replaced,

    /// The page has no marker region; it was left untouched.
    Missing,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`SiteBuilder::build_all`], [`SiteBuilder::update_blog_index`],
/// [`SiteBuilder::update_home_page`], and [`SiteBuilder::write_feed`] which do
/// the heavy-lifting.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    let templates = Templates::load(
        &config.post_template,
        &config.blog_entry_template,
        &config.home_entry_template,
    )?;
    let builder = SiteBuilder::new(config, templates);

    let report = builder.build_all()?;
    builder.update_blog_index(&report.entries)?;
    builder.update_home_page(&report.entries)?;
    builder.write_feed(&report.entries)?;
    Ok(report)
}

/// Renders post pages and refreshes aggregator pages for one [`Config`].
pub struct SiteBuilder<'a> {
    config: &'a Config,
    templates: Templates,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(config: &'a Config, templates: Templates) -> SiteBuilder<'a> {
        SiteBuilder { config, templates }
    }

    /// Renders every post in the posts source directory to
    /// `{posts_output_directory}/{slug}.html` and returns the collected
    /// entries. Only `.md` files directly inside the source directory are
    /// considered; they're processed in file name order. Files that aren't
    /// posts (see [`Post::parse`]) are skipped with a warning. Any I/O
    /// failure aborts the build.
    pub fn build_all(&self) -> Result<BuildReport> {
        let source_directory = &self.config.posts_source_directory;
        let output_directory = &self.config.posts_output_directory;
        log::info!(
            "Building posts from '{}' into '{}'",
            source_directory.display(),
            output_directory.display()
        );

        let mut report = BuildReport::default();
        let mut output_ready = false;
        for result in WalkDir::new(source_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = result?;
            if !output_ready {
                create_output_directory(output_directory)?;
                output_ready = true;
            }
            if entry.file_type().is_dir() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            let slug = match post::slug(&file_name) {
                Some(slug) => slug,
                None => continue,
            };

            let path = entry.path();
            let contents = fs::read_to_string(path).map_err(|err| Error::ReadSource {
                path: path.to_owned(),
                err,
            })?;
            match Post::parse(slug, &contents, self.config.preview_length) {
                Ok(post) => {
                    self.write_post(&post)?;
                    report.entries.push(post.entry);
                }
                Err(reason) => {
                    let skipped = Skipped {
                        path: path.to_owned(),
                        reason,
                    };
                    log::warn!("Skipping {}", skipped);
                    report.skipped.push(skipped);
                }
            }
        }
        if !output_ready {
            create_output_directory(output_directory)?;
        }
        Ok(report)
    }

    fn write_post(&self, post: &Post) -> Result<()> {
        let mut body = String::new();
        markdown::to_html(&mut body, post.body);

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "site_name".to_owned(),
            Value::String(self.config.site_name.clone()),
        );
        m.insert(
            "title".to_owned(),
            Value::String(markdown::escape_html(&post.entry.title)),
        );
        m.insert(
            "date".to_owned(),
            Value::String(markdown::escape_html(post.entry.date.as_str())),
        );
        m.insert("body".to_owned(), Value::String(body));
        m.insert("footer".to_owned(), Value::String(self.config.footer.clone()));
        m.insert("nav".to_owned(), self.config.nav_value());
        let html = template::render(&self.templates.post, Value::Object(m))?;

        let path = self
            .config
            .posts_output_directory
            .join(format!("{}.html", post.entry.slug));
        log::debug!("Writing '{}'", path.display());
        write(&path, html)
    }

    /// Replaces the `<main>` region of the blog index with a listing of every
    /// entry, newest first.
    pub fn update_blog_index(&self, entries: &[PostEntry]) -> Result<RegionUpdate> {
        let fragments = listing::blog_index(&self.templates, entries)?;
        update_region(&self.config.blog_index, region::BLOG_INDEX, &fragments)
    }

    /// Replaces the home page's "Latest Posts" section with the newest
    /// entries.
    pub fn update_home_page(&self, entries: &[PostEntry]) -> Result<RegionUpdate> {
        let fragments =
            listing::home_page(&self.templates, entries, self.config.latest_posts)?;
        update_region(&self.config.home_page, region::LATEST_POSTS, &fragments)
    }

    /// Writes the Atom feed if one is configured. Returns whether a feed was
    /// written.
    pub fn write_feed(&self, entries: &[PostEntry]) -> Result<bool> {
        let (settings, path) = match (&self.config.feed, &self.config.feed_file) {
            (Some(settings), Some(path)) => (settings, path),
            _ => return Ok(false),
        };

        let posts_url = settings.site_url.join(&posts_url_path(self.config))?;
        let feed_config = FeedConfig {
            title: settings
                .title
                .clone()
                .unwrap_or_else(|| self.config.site_name.clone()),
            home_page: settings.site_url.clone(),
            posts_url,
            author: settings.author.clone(),
        };
        let file = File::create(path).map_err(|err| Error::WriteOutput {
            path: path.to_owned(),
            err,
        })?;
        feed::write_feed(&feed_config, &listing::newest_first(entries), file)?;
        log::info!("Wrote feed '{}'", path.display());
        Ok(true)
    }
}

fn create_output_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| Error::WriteOutput {
        path: path.to_owned(),
        err,
    })
}

// Reads an aggregator page, splices `fragments` into its region, and writes it
// back. A page without the region is left alone.
fn update_region(path: &Path, region: Region, fragments: &str) -> Result<RegionUpdate> {
    let text = fs::read_to_string(path).map_err(|err| Error::ReadAggregator {
        path: path.to_owned(),
        err,
    })?;
    match region.splice(&text, fragments) {
        Some(updated) => {
            write(path, updated)?;
            log::info!("Updated '{}'", path.display());
            Ok(RegionUpdate::Replaced)
        }
        None => {
            log::warn!(
                "Leaving '{}' untouched: no marker region found",
                path.display()
            );
            Ok(RegionUpdate::Missing)
        }
    }
}

fn write(path: &Path, contents: String) -> Result<()> {
    fs::write(path, contents).map_err(|err| Error::WriteOutput {
        path: path.to_owned(),
        err,
    })
}

// The posts output directory relative to the project root, as a URL path with
// a trailing slash (so `Url::join` treats it as a directory).
fn posts_url_path(config: &Config) -> String {
    let relative = config
        .posts_output_directory
        .strip_prefix(&config.root_directory)
        .unwrap_or_else(|_| Path::new("posts"));
    let mut s = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    s.push('/');
    s
}

/// The result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during reading sources,
/// templating, writing outputs, loading configuration, and writing the feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when the posts source directory can't be listed.
    ReadDirectory(walkdir::Error),

    /// Returned when a post source file can't be read.
    ReadSource { path: PathBuf, err: std::io::Error },

    /// Returned when an aggregator page can't be read.
    ReadAggregator { path: PathBuf, err: std::io::Error },

    /// Returned when an output file or directory can't be written.
    WriteOutput { path: PathBuf, err: std::io::Error },

    /// Returned for errors loading, parsing, or executing templates.
    Template(template::Error),

    /// Returned for errors loading the project configuration.
    Config(config::Error),

    /// Returned for errors writing the feed.
    Feed(feed::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadDirectory(err) => write!(f, "Listing posts: {}", err),
            Error::ReadSource { path, err } => {
                write!(f, "Reading post '{}': {}", path.display(), err)
            }
            Error::ReadAggregator { path, err } => {
                write!(f, "Reading page '{}': {}", path.display(), err)
            }
            Error::WriteOutput { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Template(err) => err.fmt(f),
            Error::Config(err) => err.fmt(f),
            Error::Feed(err) => write!(f, "Writing feed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadDirectory(err) => Some(err),
            Error::ReadSource { path: _, err } => Some(err),
            Error::ReadAggregator { path: _, err } => Some(err),
            Error::WriteOutput { path: _, err } => Some(err),
            Error::Template(err) => Some(err),
            Error::Config(err) => Some(err),
            Error::Feed(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator while listing the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::ReadDirectory(err)
    }
}

impl From<template::Error> for Error {
    /// Converts [`template::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl From<config::Error> for Error {
    /// Converts [`config::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}

impl From<feed::Error> for Error {
    /// Converts [`feed::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`] via [`feed::Error`]; URLs
    /// are only built for the feed.
    fn from(err: url::ParseError) -> Error {
        Error::Feed(feed::Error::UrlParse(err))
    }
}
