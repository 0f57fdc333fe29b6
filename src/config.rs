//! Loads the build [`Config`]. A project may carry a `quire.yaml` file; when it
//! doesn't, every setting takes its default and the project directory is the
//! root. Relative paths in the project file resolve against the directory the
//! file lives in.
//!
//! ```yaml
//! site_name: Field Notes
//! blog_index: blog.html
//! latest_posts: 5
//! nav:
//!   - label: Home
//!     href: ../index.html
//! feed:
//!   site_url: https://example.org/
//!   author:
//!     name: Jo
//! ```

use gtmpl::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "quire.yaml";

#[derive(Deserialize)]
struct LatestPosts(usize);
impl Default for LatestPosts {
    fn default() -> Self {
        LatestPosts(3)
    }
}

#[derive(Deserialize)]
struct PreviewLength(usize);
impl Default for PreviewLength {
    fn default() -> Self {
        PreviewLength(150)
    }
}

#[derive(Deserialize)]
struct SiteName(String);
impl Default for SiteName {
    fn default() -> Self {
        SiteName(String::from("My Blog"))
    }
}

#[derive(Deserialize)]
struct PostsSourceDirectory(PathBuf);
impl Default for PostsSourceDirectory {
    fn default() -> Self {
        PostsSourceDirectory(PathBuf::from("content/posts"))
    }
}

#[derive(Deserialize)]
struct PostsOutputDirectory(PathBuf);
impl Default for PostsOutputDirectory {
    fn default() -> Self {
        PostsOutputDirectory(PathBuf::from("posts"))
    }
}

#[derive(Deserialize)]
struct BlogIndex(PathBuf);
impl Default for BlogIndex {
    fn default() -> Self {
        BlogIndex(PathBuf::from("blog.html"))
    }
}

#[derive(Deserialize)]
struct HomePage(PathBuf);
impl Default for HomePage {
    fn default() -> Self {
        HomePage(PathBuf::from("index.html"))
    }
}

#[derive(Deserialize)]
struct Nav(Vec<NavLink>);
impl Default for Nav {
    fn default() -> Self {
        Nav(vec![
            NavLink {
                label: String::from("Home"),
                href: String::from("../index.html"),
            },
            NavLink {
                label: String::from("Blog"),
                href: String::from("../blog.html"),
            },
        ])
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    site_name: SiteName,

    #[serde(default)]
    footer: Option<String>,

    #[serde(default)]
    nav: Nav,

    #[serde(default)]
    posts_source_directory: PostsSourceDirectory,

    #[serde(default)]
    posts_output_directory: PostsOutputDirectory,

    #[serde(default)]
    blog_index: BlogIndex,

    #[serde(default)]
    home_page: HomePage,

    #[serde(default)]
    latest_posts: LatestPosts,

    #[serde(default)]
    preview_length: PreviewLength,

    #[serde(default)]
    theme: Theme,

    #[serde(default)]
    feed: Option<Feed>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Theme {
    #[serde(default)]
    post_template: Vec<PathBuf>,

    #[serde(default)]
    blog_entry_template: Vec<PathBuf>,

    #[serde(default)]
    home_entry_template: Vec<PathBuf>,
}

/// A link in the navigation bar of every post page.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl From<&NavLink> for Value {
    /// Converts [`NavLink`]s into [`Value`]s for templating.
    fn from(link: &NavLink) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("label".to_owned(), Value::String(link.label.clone()));
        m.insert("href".to_owned(), Value::String(link.href.clone()));
        Value::Object(m)
    }
}

/// The author credited in the Atom feed.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Feed settings. The feed is only written when this section is present.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Feed {
    /// The public URL of the site root; post URLs in the feed are resolved
    /// against it.
    pub site_url: Url,

    /// Defaults to the site name.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub author: Option<Author>,
}

/// The settings for one build. All paths are absolute or relative to the
/// current directory (i.e., already resolved against the project root).
#[derive(Clone, Debug)]
pub struct Config {
    pub root_directory: PathBuf,
    pub site_name: String,
    pub footer: String,
    pub nav: Vec<NavLink>,
    pub posts_source_directory: PathBuf,
    pub posts_output_directory: PathBuf,
    pub blog_index: PathBuf,
    pub home_page: PathBuf,

    /// The number of posts listed on the home page.
    pub latest_posts: usize,

    /// The number of characters kept in a post's preview.
    pub preview_length: usize,

    pub post_template: Vec<PathBuf>,
    pub blog_entry_template: Vec<PathBuf>,
    pub home_entry_template: Vec<PathBuf>,

    /// The Atom feed file, if a feed is configured.
    pub feed_file: Option<PathBuf>,
    pub feed: Option<Feed>,
}

impl Config {
    /// Finds the project file in `dir` or the nearest ancestor that has one
    /// and loads it. Without a project file, the defaults apply and `dir` is
    /// the project root. `dir` is made absolute first, so a relative path
    /// like `.` still reaches its ancestors.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = fs::canonicalize(dir).map_err(|err| Error::ProjectDirectory {
            path: dir.to_owned(),
            err,
        })?;
        match dir
            .ancestors()
            .map(|ancestor| ancestor.join(PROJECT_FILE))
            .find(|path| path.is_file())
        {
            Some(path) => Config::from_project_file(&path),
            None => Ok(Config::from_project(&dir, Project::default())),
        }
    }

    /// Loads the project file at `path`. The file's directory is the project
    /// root.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project =
            serde_yaml::from_reader(file).map_err(|err| Error::Parse {
                path: path.to_owned(),
                err,
            })?;
        match path.parent() {
            None => Err(Error::NoProjectRoot(path.to_owned())),
            Some(root) => Ok(Config::from_project(root, project)),
        }
    }

    fn from_project(root: &Path, project: Project) -> Config {
        let resolve_all = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths.iter().map(|relpath| root.join(relpath)).collect()
        };
        let site_name = project.site_name.0;
        Config {
            root_directory: root.to_owned(),
            footer: project
                .footer
                .unwrap_or_else(|| format!("© {}", site_name)),
            nav: project.nav.0,
            posts_source_directory: root.join(project.posts_source_directory.0),
            posts_output_directory: root.join(project.posts_output_directory.0),
            blog_index: root.join(project.blog_index.0),
            home_page: root.join(project.home_page.0),
            latest_posts: project.latest_posts.0,
            preview_length: project.preview_length.0,
            post_template: resolve_all(project.theme.post_template),
            blog_entry_template: resolve_all(project.theme.blog_entry_template),
            home_entry_template: resolve_all(project.theme.home_entry_template),
            feed_file: project.feed.as_ref().map(|_| root.join("feed.atom")),
            feed: project.feed,
            site_name,
        }
    }

    /// The navigation links as a [`Value::Array`] for templating.
    pub fn nav_value(&self) -> Value {
        Value::Array(self.nav.iter().map(Value::from).collect())
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project directory can't be resolved (e.g., it
    /// doesn't exist).
    ProjectDirectory { path: PathBuf, err: std::io::Error },

    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or has unknown or
    /// mistyped fields.
    Parse { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the project file path has no parent directory.
    NoProjectRoot(PathBuf),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectDirectory { path, err } => {
                write!(f, "Resolving project directory '{}': {}", path.display(), err)
            }
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::NoProjectRoot(path) => write!(
                f,
                "Can't get parent directory for project file '{}'",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectDirectory { path: _, err } => Some(err),
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::NoProjectRoot(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_project(dir: &Path, yaml: &str) {
        File::create(dir.join(PROJECT_FILE))
            .and_then(|mut f| f.write_all(yaml.as_bytes()))
            .unwrap();
    }

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let tmp = tempfile::tempdir().unwrap();
        let dir = &tmp.path().canonicalize().unwrap();
        let config = Config::from_directory(dir)?;
        assert_eq!(dir, &config.root_directory);
        assert_eq!("My Blog", config.site_name);
        assert_eq!("© My Blog", config.footer);
        assert_eq!(dir.join("content/posts"), config.posts_source_directory);
        assert_eq!(dir.join("posts"), config.posts_output_directory);
        assert_eq!(dir.join("blog.html"), config.blog_index);
        assert_eq!(dir.join("index.html"), config.home_page);
        assert_eq!(3, config.latest_posts);
        assert_eq!(150, config.preview_length);
        assert_eq!(2, config.nav.len());
        assert!(config.post_template.is_empty());
        assert_eq!(None, config.feed);
        assert_eq!(None, config.feed_file);
        Ok(())
    }

    #[test]
    fn test_project_file_overrides() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        write_project(
            dir.path(),
            r#"
site_name: Field Notes
posts_source_directory: src/posts
latest_posts: 5
nav:
  - label: Start
    href: /
theme:
  post_template: [theme/head.html, theme/post.html]
feed:
  site_url: https://example.org/
  author:
    name: Jo
"#,
        );

        let root = dir.path().canonicalize().unwrap();
        let config = Config::from_directory(dir.path())?;
        assert_eq!("Field Notes", config.site_name);
        assert_eq!("© Field Notes", config.footer);
        assert_eq!(root.join("src/posts"), config.posts_source_directory);
        assert_eq!(root.join("blog.html"), config.blog_index);
        assert_eq!(5, config.latest_posts);
        assert_eq!(
            vec![NavLink {
                label: String::from("Start"),
                href: String::from("/"),
            }],
            config.nav,
        );
        assert_eq!(
            vec![
                root.join("theme/head.html"),
                root.join("theme/post.html"),
            ],
            config.post_template,
        );
        let feed = config.feed.unwrap();
        assert_eq!("https://example.org/", feed.site_url.as_str());
        assert_eq!(Some(String::from("Jo")), feed.author.map(|a| a.name));
        assert_eq!(Some(root.join("feed.atom")), config.feed_file);
        Ok(())
    }

    #[test]
    fn test_project_file_in_ancestor() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "site_name: Up Here\n");
        let nested = dir.path().join("content").join("posts");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested)?;
        assert_eq!("Up Here", config.site_name);
        assert_eq!(dir.path().canonicalize().unwrap(), config.root_directory);
        Ok(())
    }

    #[test]
    fn test_project_file_in_ancestor_of_relative_path() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "site_name: Up Here\n");
        let nested = dir.path().join("content").join("posts");
        std::fs::create_dir_all(&nested).unwrap();

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();
        let result = Config::from_directory(Path::new("."));
        std::env::set_current_dir(original).unwrap();

        let config = result?;
        assert_eq!("Up Here", config.site_name);
        assert_eq!(dir.path().canonicalize().unwrap(), config.root_directory);
        Ok(())
    }

    #[test]
    fn test_missing_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        match Config::from_directory(&dir.path().join("nowhere")) {
            Err(Error::ProjectDirectory { .. }) => {}
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "site_nmae: Typo\n");
        match Config::from_directory(dir.path()) {
            Err(Error::Parse { .. }) => {}
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected a parse error"),
        }
    }
}
