use pulldown_cmark::{escape, html, CowStr, Event, LinkType, Options, Parser, Tag};
use url::{ParseError, Url};

const MARKDOWN_EXTENSION: &str = ".md";
const HTML_EXTENSION: &str = ".html";

/// Converts markdown to HTML, appending the result onto `w`. Relative links
/// to other Markdown sources (e.g., `other-post.md#intro`) are rewritten to
/// point at their rendered pages (`other-post.html#intro`) since posts are
/// rendered side by side into the same directory.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(w, Parser::new_ext(markdown, options).map(convert));
}

/// Escapes plain text (`<`, `>`, `&`, `"`) for interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a `String` can't fail.
    let _ = escape::escape_html(&mut escaped, text);
    escaped
}

fn convert(ev: Event) -> Event {
    match ev {
        Event::Start(tag) => Event::Start(convert_tag(tag)),
        _ => ev,
    }
}

fn convert_tag(tag: Tag) -> Tag {
    match tag {
        // Autolinks and email links are always absolute, so only the
        // remaining link types can point at another post.
        Tag::Link(
            link @ (LinkType::Inline
            | LinkType::Reference
            | LinkType::ReferenceUnknown
            | LinkType::Shortcut
            | LinkType::ShortcutUnknown
            | LinkType::Collapsed
            | LinkType::CollapsedUnknown),
            dest,
            title,
        ) => match convert_link(&dest) {
            Some(converted) => Tag::Link(
                link,
                CowStr::Boxed(converted.into_boxed_str()),
                title,
            ),
            None => Tag::Link(link, dest, title),
        },
        _ => tag,
    }
}

/// Returns the rewritten destination if `dest` is a relative link to a
/// Markdown file, otherwise [`None`].
fn convert_link(dest: &str) -> Option<String> {
    match Url::parse(dest) {
        Err(ParseError::RelativeUrlWithoutBase) => {}
        _ => return None,
    }
    if dest.starts_with("//") {
        return None;
    }

    let suffix_start = dest.find(&['#', '?'][..]).unwrap_or(dest.len());
    let (path, suffix) = dest.split_at(suffix_start);
    path.strip_suffix(MARKDOWN_EXTENSION)
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{}{}{}", stem, HTML_EXTENSION, suffix))
}
