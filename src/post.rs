//! Defines the [`Post`], [`PostEntry`], and [`SkipReason`] types along with the
//! logic for turning a post source file's contents into them. See
//! [`PostEntry::to_value`] for how an entry is exposed to templates.

use crate::date::PostDate;
use crate::frontmatter;
use crate::markdown::escape_html;
use gtmpl::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

pub const MARKDOWN_EXTENSION: &str = ".md";

/// The number of body lines the preview is built from.
const PREVIEW_LINES: usize = 2;

const ELLIPSIS: &str = "...";

/// The summary record of a post. One entry is created per valid source file on
/// every build; the full set of entries drives the aggregator pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostEntry {
    pub title: String,
    pub date: PostDate,

    /// The source file name without its `.md` extension. Also the output file
    /// stem and the anchor id on the blog index.
    pub slug: String,

    /// The first two lines of the raw body, joined with a space, cut to the
    /// preview length and suffixed with `...`.
    pub preview: String,
}

impl PostEntry {
    /// Converts the entry into a [`Value::Object`] with the fields `title`,
    /// `date`, `slug`, and `preview`. The values are HTML-escaped, so text
    /// such as a literal `</main>` in a preview can't end a marker region
    /// early.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(escape_html(&self.title)));
        m.insert(
            "date".to_owned(),
            Value::String(escape_html(self.date.as_str())),
        );
        m.insert("slug".to_owned(), Value::String(escape_html(&self.slug)));
        m.insert(
            "preview".to_owned(),
            Value::String(escape_html(&self.preview)),
        );
        Value::Object(m)
    }
}

/// A parsed post: its [`PostEntry`] plus the unconverted Markdown body.
#[derive(Debug)]
pub struct Post<'a> {
    pub entry: PostEntry,
    pub body: &'a str,
}

impl<'a> Post<'a> {
    /// Parses a post source file. `slug` is the file name without extension.
    /// Files without a front matter block, or whose front matter lacks a
    /// `title` or a `date`, aren't posts; the [`SkipReason`] says why.
    pub fn parse(
        slug: &str,
        input: &'a str,
        preview_length: usize,
    ) -> Result<Post<'a>, SkipReason> {
        let (front_matter, body) =
            frontmatter::split(input).ok_or(SkipReason::MissingFrontMatter)?;
        let title = front_matter.get("title").ok_or(SkipReason::MissingTitle)?;
        let date = front_matter.get("date").ok_or(SkipReason::MissingDate)?;

        Ok(Post {
            entry: PostEntry {
                title: title.to_owned(),
                date: PostDate::parse(date),
                slug: slug.to_owned(),
                preview: preview(body, preview_length),
            },
            body,
        })
    }
}

/// Returns the slug for a post source file name, or [`None`] if the file isn't
/// a Markdown file.
pub fn slug(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(MARKDOWN_EXTENSION)
        .filter(|stem| !stem.is_empty())
}

/// Builds the preview text from a raw (unconverted) body. The cut is made at
/// `length` characters regardless of word or markup boundaries, and the
/// ellipsis is appended even when nothing was cut.
pub fn preview(body: &str, length: usize) -> String {
    let joined = body
        .split('\n')
        .take(PREVIEW_LINES)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<&str>>()
        .join(" ");
    let mut preview: String = joined.chars().take(length).collect();
    preview.push_str(ELLIPSIS);
    preview
}

/// Why a source file was left out of the build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The file doesn't start with a `---` fence or the closing fence is
    /// missing.
    MissingFrontMatter,

    /// The front matter has no `title:` line (or its value is blank).
    MissingTitle,

    /// The front matter has no `date:` line (or its value is blank).
    MissingDate,
}

impl fmt::Display for SkipReason {
    /// Displays a [`SkipReason`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::MissingFrontMatter => {
                write!(f, "missing `---` front matter fences")
            }
            SkipReason::MissingTitle => write!(f, "front matter has no `title`"),
            SkipReason::MissingDate => write!(f, "front matter has no `date`"),
        }
    }
}

/// A source file that was left out of the build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}
