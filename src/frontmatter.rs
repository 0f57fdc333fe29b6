//! Splits a post source file into its front matter block and its body. The
//! front matter is delimited by a fence line (`---`) that appears twice: the
//! first line of the file opens the block and the next fence line closes it.
//! Everything after the closing fence line is the body.
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 2021-04-16
//! ---
//! # Hello
//! ```

const FENCE: &str = "---";

/// The lines between the two fences, with line endings removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    lines: Vec<&'a str>,
}

impl<'a> FrontMatter<'a> {
    /// Returns the value of the first line that starts with `{key}:`, trimmed
    /// of surrounding whitespace. A key whose value is blank counts as
    /// missing.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.lines
            .iter()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix(':'))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Splits `input` into its [`FrontMatter`] and body. Returns [`None`] if the
/// first line isn't a fence or if the closing fence is missing.
pub fn split(input: &str) -> Option<(FrontMatter<'_>, &str)> {
    let mut lines = input.split_inclusive('\n');
    let mut offset = match lines.next() {
        Some(first) if is_fence(first) => first.len(),
        _ => return None,
    };

    let mut front_matter = FrontMatter::default();
    for line in lines {
        offset += line.len();
        if is_fence(line) {
            return Some((front_matter, &input[offset..]));
        }
        front_matter.lines.push(trim_line_ending(line));
    }
    None
}

fn is_fence(line: &str) -> bool {
    trim_line_ending(line) == FENCE
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split() {
        let (front_matter, body) =
            split("---\ntitle: Hello\ndate: 2021-04-16\n---\n# Hello\n\nWorld\n")
                .unwrap();
        assert_eq!(Some("Hello"), front_matter.get("title"));
        assert_eq!(Some("2021-04-16"), front_matter.get("date"));
        assert_eq!("# Hello\n\nWorld\n", body);
    }

    #[test]
    fn test_split_crlf() {
        let (front_matter, body) =
            split("---\r\ntitle: Hello\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(Some("Hello"), front_matter.get("title"));
        assert_eq!("body\r\n", body);
    }

    #[test]
    fn test_split_missing_start_fence() {
        assert_eq!(None, split("title: Hello\n---\nbody"));
        assert_eq!(None, split("\n---\ntitle: Hello\n---\nbody"));
    }

    #[test]
    fn test_split_missing_end_fence() {
        assert_eq!(None, split("---\ntitle: Hello\ndate: 2021-04-16\n"));
    }

    #[test]
    fn test_split_fence_at_end_of_file() {
        let (front_matter, body) = split("---\ntitle: Hello\n---").unwrap();
        assert_eq!(Some("Hello"), front_matter.get("title"));
        assert_eq!("", body);
    }

    #[test]
    fn test_body_keeps_later_fences() {
        let (_, body) = split("---\ntitle: a\n---\none\n---\ntwo\n").unwrap();
        assert_eq!("one\n---\ntwo\n", body);
    }

    #[test]
    fn test_get_trims_and_takes_first_match() {
        let (front_matter, _) =
            split("---\ntitle:   Spaced out  \ntitle: Second\n---\n").unwrap();
        assert_eq!(Some("Spaced out"), front_matter.get("title"));
    }

    #[test]
    fn test_get_missing_or_blank() {
        let (front_matter, _) =
            split("---\ntitle:\nsubtitle: nope\n tags: x\n---\n").unwrap();
        assert_eq!(None, front_matter.get("title"));
        assert_eq!(None, front_matter.get("date"));
        assert_eq!(None, front_matter.get("tags"));
    }
}
