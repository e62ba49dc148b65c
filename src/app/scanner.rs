use crate::app::models::{Collection, Node};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Files whose presence marks a directory as a project root.
const PROJECT_MARKERS: &[&str] = &[".git", "Cargo.toml", "package.json"];
/// Extensions of project/solution files that mark a project root.
const PROJECT_FILE_EXTENSIONS: &[&str] = &["csproj", "vcxproj", "vbproj", "sln"];

/// Builds the document tree below a directory, honouring `.gitignore` and
/// the configured exclude globs.
pub struct Scanner {
    root: PathBuf,
    exclude_set: GlobSet,
}

enum Entry {
    File(PathBuf),
    Dir(BTreeMap<String, Entry>),
}

impl Scanner {
    pub fn new(root: PathBuf, exclude: &[String]) -> Result<Self> {
        Ok(Self {
            root,
            exclude_set: build_globset(exclude)?,
        })
    }

    /// Walks the root and returns it as a single container.
    pub fn scan(&self) -> Node<PathBuf> {
        let name = display_name(&self.root);
        Node::container(name, into_nodes(self.collect()))
    }

    /// Walks the root and returns its immediate children as a collection:
    /// sub-directories become containers, loose files stay leaves.
    pub fn scan_collection(&self) -> Collection<PathBuf> {
        Collection {
            name: display_name(&self.root),
            members: into_nodes(self.collect()),
        }
    }

    fn collect(&self) -> BTreeMap<String, Entry> {
        let root = self.root.clone();
        let exclude_set = self.exclude_set.clone();

        // Standard ignore walker; pruning excluded directories keeps their
        // contents out of the walk entirely.
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .filter_entry(move |entry| !is_excluded(&root, &exclude_set, entry.path()))
            .build();

        let mut tree = BTreeMap::new();
        for result in walker {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if path == self.root {
                        continue;
                    }
                    let Some(relative) = diff_paths(path, &self.root) else {
                        continue;
                    };
                    let components: Vec<Component<'_>> = relative.components().collect();
                    insert_path(&mut tree, &components, path, path.is_dir());
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }
        tree
    }
}

fn is_excluded(root: &Path, exclude_set: &GlobSet, path: &Path) -> bool {
    // The walker is run with hidden files on, so the git directory is dropped here.
    if path.file_name().is_some_and(|n| n == ".git") {
        return true;
    }
    match diff_paths(path, root) {
        Some(relative) if !relative.as_os_str().is_empty() => exclude_set.is_match(&relative),
        _ => false,
    }
}

fn insert_path(
    level: &mut BTreeMap<String, Entry>,
    components: &[Component<'_>],
    path: &Path,
    is_dir: bool,
) {
    let Some((first, rest)) = components.split_first() else {
        return;
    };
    let name = first.as_os_str().to_string_lossy().into_owned();

    if rest.is_empty() {
        let entry = if is_dir {
            Entry::Dir(BTreeMap::new())
        } else {
            Entry::File(path.to_path_buf())
        };
        level.entry(name).or_insert(entry);
        return;
    }

    // Parents are always yielded before children, but an ignored parent can
    // still leave a child behind, so create missing directories on the way.
    let entry = level
        .entry(name)
        .or_insert_with(|| Entry::Dir(BTreeMap::new()));
    if let Entry::Dir(children) = entry {
        insert_path(children, rest, path, is_dir);
    }
}

fn into_nodes(level: BTreeMap<String, Entry>) -> Vec<Node<PathBuf>> {
    level
        .into_iter()
        .map(|(name, entry)| match entry {
            Entry::File(path) => Node::Leaf(path),
            Entry::Dir(children) => Node::container(name, into_nodes(children)),
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Nearest ancestor of `start` (itself included) that holds a project marker.
///
/// Relative paths are resolved against the current directory first.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    project_root_from(&cwd, start)
}

fn project_root_from(cwd: &Path, start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(cwd.join(start)).ok()?;
    let start = if start.is_file() { start.parent()? } else { &start };
    start
        .ancestors()
        .find(|dir| is_project_root(dir))
        .map(Path::to_path_buf)
}

fn is_project_root(dir: &Path) -> bool {
    if PROJECT_MARKERS.iter().any(|m| dir.join(m).exists()) {
        return true;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| {
                PROJECT_FILE_EXTENSIONS
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(e))
            })
    })
}

/// Helper to build efficient glob sets
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}
