//! Orders [`PostEntry`]s for the aggregator pages and renders their listing
//! fragments.

use crate::post::PostEntry;
use crate::template::{self, Templates};
use gtmpl::Template;

/// Returns the entries newest first. The sort is stable, so entries with equal
/// dates (including any two unparseable dates) keep their relative order.
pub fn newest_first(entries: &[PostEntry]) -> Vec<&PostEntry> {
    let mut sorted: Vec<&PostEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.date.parsed().cmp(&a.date.parsed()));
    sorted
}

/// Renders the blog index listing: one fragment per entry, newest first.
pub fn blog_index(templates: &Templates, entries: &[PostEntry]) -> template::Result<String> {
    render_each(&templates.blog_entry, newest_first(entries))
}

/// Renders the home page listing: the `latest` newest entries.
pub fn home_page(
    templates: &Templates,
    entries: &[PostEntry],
    latest: usize,
) -> template::Result<String> {
    let mut sorted = newest_first(entries);
    sorted.truncate(latest);
    render_each(&templates.home_entry, sorted)
}

fn render_each(template: &Template, entries: Vec<&PostEntry>) -> template::Result<String> {
    let mut s = String::new();
    for entry in entries {
        s.push_str(&template::render(template, entry.to_value())?);
    }
    Ok(s)
}
