//! Support for creating Atom feeds from a list of post entries.

use crate::config::Author;
use crate::post::PostEntry;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,

    /// The site's home page; used as the feed id and its alternate link.
    pub home_page: Url,

    /// The base URL of the rendered post pages. Should end in a trailing
    /// slash.
    pub posts_url: Url,

    pub author: Option<Author>,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`PostEntry`]s (expected newest first) and writes the result to a
/// [`std::io::Write`]. Entries whose date can't be parsed are left out, since
/// Atom requires a timestamp on every entry. The feed's `updated` stamp is the
/// newest entry's date so that rebuilding unchanged posts yields an identical
/// feed.
pub fn write_feed<W: Write>(config: &FeedConfig, entries: &[&PostEntry], w: W) -> Result<()> {
    feed(config, entries)?.write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, entries: &[&PostEntry]) -> Result<Feed> {
    let entries = feed_entries(config, entries)?;
    let updated = entries
        .iter()
        .map(|entry| *entry.updated())
        .max()
        .unwrap_or_else(|| DateTime::<Utc>::default().into());

    let mut feed = Feed::default();
    feed.set_title(Text::plain(config.title.clone()));
    feed.set_id(config.home_page.to_string());
    feed.set_updated(updated);
    feed.set_authors(author_to_people(&config.author));
    feed.set_links(vec![alternate(config.home_page.to_string())]);
    feed.set_entries(entries);
    Ok(feed)
}

fn feed_entries(config: &FeedConfig, entries: &[&PostEntry]) -> Result<Vec<Entry>> {
    let mut feed_entries: Vec<Entry> = Vec::with_capacity(entries.len());
    for post in entries {
        let date = match post.date.parsed() {
            Some(date) => utc(date),
            None => {
                log::warn!(
                    "Leaving `{}` out of the feed: can't parse date `{}`",
                    post.slug,
                    post.date
                );
                continue;
            }
        };
        let url = config.posts_url.join(&format!("{}.html", post.slug))?;

        let mut entry = Entry::default();
        entry.set_id(url.to_string());
        entry.set_title(Text::plain(post.title.clone()));
        entry.set_updated(date);
        entry.set_published(Some(date));
        entry.set_authors(author_to_people(&config.author));
        entry.set_links(vec![alternate(url.to_string())]);
        entry.set_summary(Some(Text::plain(post.preview.clone())));
        feed_entries.push(entry);
    }
    Ok(feed_entries)
}

// Post dates carry no zone; they're read as UTC.
fn utc(date: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&date).into()
}

fn alternate(href: String) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

fn author_to_people(author: &Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name.clone());
            person.set_email(author.email.clone());
            vec![person]
        }
        None => Vec::new(),
    }
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include Atom and URL
/// issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is an Atom-related error (including I/O errors
    /// while writing).
    Atom(AtomError),

    /// Returned when a post URL can't be built.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Atom(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Atom(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use
    /// the `?` operator for URL joining.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::date::PostDate;

    fn entry(slug: &str, date: &str) -> PostEntry {
        PostEntry {
            title: format!("Title {}", slug),
            date: PostDate::parse(date),
            slug: slug.to_owned(),
            preview: format!("Preview {}...", slug),
        }
    }

    fn config() -> FeedConfig {
        FeedConfig {
            title: String::from("Field Notes"),
            home_page: Url::parse("https://example.org/").unwrap(),
            posts_url: Url::parse("https://example.org/posts/").unwrap(),
            author: Some(Author {
                name: String::from("Jo"),
                email: None,
            }),
        }
    }

    fn render(entries: &[&PostEntry]) -> String {
        let mut out: Vec<u8> = Vec::new();
        write_feed(&config(), entries, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_feed() {
        let newer = entry("newer", "2025-03-01");
        let older = entry("older", "2025-01-01");
        let undated = entry("undated", "someday");
        let xml = render(&[&newer, &older, &undated]);

        assert!(xml.contains(">Field Notes</title>"));
        assert!(xml.contains("<id>https://example.org/posts/newer.html</id>"));
        assert!(xml.contains("<id>https://example.org/posts/older.html</id>"));
        assert!(!xml.contains("undated"));
        assert!(xml.contains("<updated>2025-03-01T00:00:00+00:00</updated>"));
        assert!(xml.contains("<name>Jo</name>"));
    }

    #[test]
    fn test_write_feed_is_deterministic() {
        let post = entry("post", "2025-02-01");
        assert_eq!(render(&[&post]), render(&[&post]));
    }

    #[test]
    fn test_empty_feed_uses_epoch() {
        assert!(render(&[]).contains("<updated>1970-01-01T00:00:00+00:00</updated>"));
    }
}
