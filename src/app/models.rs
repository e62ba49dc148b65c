use std::path::PathBuf;

/// Direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Tabs become runs of spaces.
    ToSpaces,
    /// Runs of spaces become tabs.
    ToTabs,
}

/// Immutable settings handed to the transformer for one invocation.
///
/// A size of zero disables the pass that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub operation: Operation,
    /// Spaces per tab for leading indentation.
    pub indent_size: usize,
    /// Spaces per tab for in-line runs.
    pub tab_size: usize,
    /// Leave in-line runs untouched.
    pub indent_only: bool,
}

impl Settings {
    pub fn new(operation: Operation, indent_size: usize, tab_size: usize, indent_only: bool) -> Self {
        Self {
            operation,
            indent_size,
            tab_size,
            indent_only,
        }
    }
}

/// Which part of the tree an invocation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Selection,
    File,
    Folder,
    Project,
    Solution,
}

pub const DEFAULT_EXTENSIONS: &str =
    ".cpp, .c, .h, .hpp, .cs, .js, .vb, .txt, .scss, .coffee, .ts, .jsx, .markdown, .md, .config, .css";

/// Case-insensitive whitelist of name suffixes a leaf must end with to be visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions {
    suffixes: Vec<String>,
}

impl Extensions {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut suffixes: Vec<String> = Vec::new();
        for item in items {
            let suffix = item.as_ref().trim().to_lowercase();
            if suffix.is_empty() || suffixes.contains(&suffix) {
                continue;
            }
            suffixes.push(suffix);
        }
        Self { suffixes }
    }

    /// Parses a comma separated list such as `".rs, .toml"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self::parse(DEFAULT_EXTENSIONS)
    }
}

/// A node of the document tree handed to the traverser.
///
/// `L` is whatever the host uses to identify a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<L> {
    Leaf(L),
    Container { name: String, children: Vec<Node<L>> },
}

impl<L> Node<L> {
    pub fn container(name: impl Into<String>, children: Vec<Node<L>>) -> Self {
        Node::Container {
            name: name.into(),
            children,
        }
    }
}

/// A top-level collection of containers, e.g. a solution made of projects.
///
/// Loose leaves are allowed and count only as documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<L> {
    pub name: String,
    pub members: Vec<Node<L>>,
}

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub operation: Operation,
    pub scope: Scope,
    pub paths: Vec<PathBuf>,
    pub indent_size: usize,
    pub tab_size: usize,
    pub indent_only: bool,
    pub extensions: Extensions,
    pub exclude: Vec<String>,
    /// 1-based inclusive line range for selection scope.
    pub lines: Option<(usize, usize)>,
    pub dry_run: bool,
}

impl RuntimeConfig {
    pub fn settings(&self) -> Settings {
        Settings::new(
            self.operation,
            self.indent_size,
            self.tab_size,
            self.indent_only,
        )
    }
}
