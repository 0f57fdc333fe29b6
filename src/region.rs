//! Splicing of generated content into hand-written HTML pages. A [`Region`]
//! is the single span of an aggregator page that gets regenerated; the rest
//! of the page is passed through byte-for-byte.

/// A span of text that starts with a sequence of opening tokens (separated by
/// optional whitespace) and ends at the first closing token after them.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    open: &'static [&'static str],
    close: &'static str,
}

/// The `<main>` region of the blog index.
pub const BLOG_INDEX: Region = Region {
    open: &["<main>"],
    close: "</main>",
};

/// The home page's `<section>` region introduced by a "Latest Posts" heading.
pub const LATEST_POSTS: Region = Region {
    open: &["<section>", "<h2>Latest Posts</h2>"],
    close: "</section>",
};

impl Region {
    /// Returns the byte range of the first occurrence of the region in
    /// `text`, markers included.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        let (first, rest) = self.open.split_first()?;
        let mut from = 0;
        while let Some(offset) = text[from..].find(first) {
            let start = from + offset;
            if let Some(open_end) = match_tokens(text, start + first.len(), rest) {
                let close = text[open_end..].find(self.close)?;
                return Some((start, open_end + close + self.close.len()));
            }
            from = start + first.len();
        }
        None
    }

    /// Rebuilds the region around `inner`: the opening tokens one per line,
    /// then `inner`, then the closing token.
    pub fn wrap(&self, inner: &str) -> String {
        let mut s = String::new();
        for token in self.open {
            s.push_str(token);
            s.push('\n');
        }
        s.push_str(inner);
        s.push_str(self.close);
        s
    }

    /// Returns `text` with its first occurrence of the region replaced by
    /// [`Region::wrap`]ped `inner`, or [`None`] if the region isn't present.
    pub fn splice(&self, text: &str, inner: &str) -> Option<String> {
        let (start, end) = self.find(text)?;
        let mut s = String::with_capacity(text.len() + inner.len());
        s.push_str(&text[..start]);
        s.push_str(&self.wrap(inner));
        s.push_str(&text[end..]);
        Some(s)
    }
}

/// Matches `tokens` in order starting at `at`, skipping whitespace before
/// each one. Returns the offset just past the last token.
fn match_tokens(text: &str, mut at: usize, tokens: &[&str]) -> Option<usize> {
    for token in tokens {
        let rest = &text[at..];
        let trimmed = rest.trim_start();
        if !trimmed.starts_with(token) {
            return None;
        }
        at += rest.len() - trimmed.len() + token.len();
    }
    Some(at)
}
