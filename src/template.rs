//! Loads and executes the [`gtmpl`] templates used to render post pages and
//! aggregator fragments. Each template has a built-in default; a theme can
//! replace any of them with one or more files which are concatenated in order
//! before parsing.
//!
//! Template values:
//!
//! * post pages get `site_name`, `title`, `date`, `body`, `footer` and `nav`
//!   (a list of objects with `label` and `href`);
//! * blog index and home page fragments get one entry each, see
//!   [`crate::post::PostEntry::to_value`].

use gtmpl::{Context, Template, Value};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// The built-in post page template.
pub const POST_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{.title}} - {{.site_name}}</title>
<link rel="stylesheet" href="../styles.css">
</head>
<body>
<header>
<h1>{{.title}}</h1>
<nav>
{{range .nav}}<a href="{{.href}}">{{.label}}</a>
{{end}}</nav>
</header>
<main>
<article>
<p class="date">{{.date}}</p>
{{.body}}
</article>
</main>
<footer>
<p>{{.footer}}</p>
</footer>
</body>
</html>
"#;

/// The built-in blog index fragment, rendered once per post.
pub const BLOG_ENTRY_TEMPLATE: &str = r#"<article id="{{.slug}}" class="post-summary">
<h2>{{.title}}</h2>
<p class="date">{{.date}}</p>
<p>{{.preview}}</p>
<a href="posts/{{.slug}}.html" class="read-more">Read more</a>
</article>
"#;

/// The built-in home page fragment, rendered once per latest post.
pub const HOME_ENTRY_TEMPLATE: &str = r#"<article class="post-preview">
<h3>{{.title}}</h3>
<p>{{.preview}}</p>
<a href="posts/{{.slug}}.html" class="read-more">Read more</a>
</article>
"#;

/// The parsed set of templates for one build.
pub struct Templates {
    pub post: Template,
    pub blog_entry: Template,
    pub home_entry: Template,
}

impl Templates {
    /// Parses the built-in templates.
    pub fn builtin() -> Result<Templates> {
        Ok(Templates {
            post: parse(POST_TEMPLATE)?,
            blog_entry: parse(BLOG_ENTRY_TEMPLATE)?,
            home_entry: parse(HOME_ENTRY_TEMPLATE)?,
        })
    }

    /// Parses each template from its theme files, falling back to the
    /// built-in template when no files are given.
    pub fn load(
        post: &[PathBuf],
        blog_entry: &[PathBuf],
        home_entry: &[PathBuf],
    ) -> Result<Templates> {
        Ok(Templates {
            post: parse_files_or(post, POST_TEMPLATE)?,
            blog_entry: parse_files_or(blog_entry, BLOG_ENTRY_TEMPLATE)?,
            home_entry: parse_files_or(home_entry, HOME_ENTRY_TEMPLATE)?,
        })
    }
}

fn parse(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(contents).map_err(Error::Parse)?;
    Ok(template)
}

fn parse_files_or(files: &[PathBuf], builtin: &str) -> Result<Template> {
    if files.is_empty() {
        parse(builtin)
    } else {
        parse_files(files.iter())
    }
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_files<P: AsRef<Path>>(files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for file in files {
        let file = file.as_ref();
        File::open(file)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|err| Error::Open {
                path: file.to_owned(),
                err,
            })?;
        contents.push(' ');
    }
    parse(&contents)
}

/// Executes `template` against `value` and returns the output.
pub fn render(template: &Template, value: Value) -> Result<String> {
    let context = Context::from(value).map_err(Error::Render)?;
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &context).map_err(Error::Render)?;
    String::from_utf8(out).map_err(|err| Error::Render(err.to_string()))
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading, parsing, or executing a template.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading template files.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template text.
    Parse(String),

    /// Returned for errors executing a template.
    Render(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "Parsing template: {}", err),
            Error::Render(err) => write!(f, "Rendering template: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(_) => None,
            Error::Render(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn object(pairs: &[(&str, &str)]) -> Value {
        let m: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Value::Object(m)
    }

    #[test]
    fn test_builtin_templates_parse() -> Result<()> {
        Templates::builtin().map(|_| ())
    }

    #[test]
    fn test_render_blog_entry() -> Result<()> {
        let templates = Templates::builtin()?;
        let out = render(
            &templates.blog_entry,
            object(&[
                ("title", "Hello"),
                ("date", "2025-01-01"),
                ("slug", "hello"),
                ("preview", "Hi there..."),
            ]),
        )?;
        assert_eq!(
            "<article id=\"hello\" class=\"post-summary\">\n<h2>Hello</h2>\n<p class=\"date\">2025-01-01</p>\n<p>Hi there...</p>\n<a href=\"posts/hello.html\" class=\"read-more\">Read more</a>\n</article>\n",
            out,
        );
        Ok(())
    }

    #[test]
    fn test_load_concatenates_theme_files() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|err| Error::Render(err.to_string()))?;
        let head = dir.path().join("head.html");
        let tail = dir.path().join("tail.html");
        for (path, text) in &[(&head, "<h3>{{.title}}</h3>"), (&tail, "<p>{{.preview}}</p>")] {
            File::create(path)
                .and_then(|mut f| f.write_all(text.as_bytes()))
                .map_err(|err| Error::Render(err.to_string()))?;
        }

        let templates = Templates::load(&[], &[], &[head, tail])?;
        let out = render(
            &templates.home_entry,
            object(&[("title", "T"), ("preview", "P...")]),
        )?;
        assert_eq!("<h3>T</h3> <p>P...</p> ", out);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let missing = PathBuf::from("/nonexistent/quire/post.html");
        match Templates::load(&[missing.clone()], &[], &[]) {
            Err(Error::Open { path, err: _ }) => assert_eq!(missing, path),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected an error"),
        }
    }
}
