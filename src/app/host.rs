//! Document I/O the traverser relies on, and the filesystem implementation of it.
//!
//! The traverser never touches files directly. It asks a [`DocumentHost`] to
//! open, read, write and save leaves, and an [`ActiveDocument`] for the
//! selection mode.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, #[source] io::Error),
    #[error("Failed to write {0}: {1}")]
    Write(PathBuf, #[source] io::Error),
    #[error("Document {0} is not open")]
    NotOpen(PathBuf),
    #[error("Lines {start}:{end} are outside {name}, which has {available} line(s)")]
    SelectionOutOfRange {
        name: String,
        start: usize,
        end: usize,
        available: usize,
    },
}

/// Document I/O provided by whatever owns the documents.
pub trait DocumentHost {
    /// Identifies a document in the tree.
    type Leaf;
    /// Returned by [`DocumentHost::open`] and consumed by [`DocumentHost::close`].
    type Handle;

    fn name(&self, leaf: &Self::Leaf) -> String;
    fn is_open(&self, leaf: &Self::Leaf) -> bool;
    /// `Ok(None)` means the leaf has no document behind it.
    fn open(&mut self, leaf: &Self::Leaf) -> Result<Option<Self::Handle>, HostError>;
    fn close(&mut self, handle: Self::Handle) -> Result<(), HostError>;
    /// `None` when the open document has no text representation.
    fn read_text(&self, leaf: &Self::Leaf) -> Option<String>;
    fn write_text(&mut self, leaf: &Self::Leaf, text: String) -> Result<(), HostError>;
    fn is_saved(&self, leaf: &Self::Leaf) -> bool;
    fn save(&mut self, leaf: &Self::Leaf) -> Result<(), HostError>;
}

/// Current selection in the active document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    /// Byte offset of the selection in the document.
    pub start: usize,
}

/// The document the user is working in, for selection scope.
pub trait ActiveDocument {
    fn name(&self) -> String;
    /// `None` when the document has no text representation.
    fn selection(&self) -> Option<Selection>;
    fn full_text(&self) -> Option<String>;
    fn replace_range(&mut self, start: usize, len: usize, text: &str) -> Result<(), HostError>;
}

#[derive(Debug)]
struct Buffer {
    text: Option<String>,
    dirty: bool,
}

/// Opens files into memory buffers and writes them back on save.
///
/// With `dry_run` set saving only marks the buffer clean.
#[derive(Debug, Default)]
pub struct FsHost {
    buffers: HashMap<PathBuf, Buffer>,
    dry_run: bool,
}

impl FsHost {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }
}

impl DocumentHost for FsHost {
    type Leaf = PathBuf;
    type Handle = PathBuf;

    fn name(&self, leaf: &PathBuf) -> String {
        leaf.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn is_open(&self, leaf: &PathBuf) -> bool {
        self.buffers.contains_key(leaf)
    }

    fn open(&mut self, leaf: &PathBuf) -> Result<Option<PathBuf>, HostError> {
        if !leaf.is_file() {
            return Ok(None);
        }
        let bytes = match fs::read(leaf) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HostError::Read(leaf.clone(), e)),
        };
        let text = String::from_utf8(bytes).ok();
        self.buffers
            .insert(leaf.clone(), Buffer { text, dirty: false });
        Ok(Some(leaf.clone()))
    }

    fn close(&mut self, handle: PathBuf) -> Result<(), HostError> {
        match self.buffers.remove(&handle) {
            Some(buffer) if buffer.dirty => {
                log::warn!("Closed {} with unsaved changes", handle.display());
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(HostError::NotOpen(handle)),
        }
    }

    fn read_text(&self, leaf: &PathBuf) -> Option<String> {
        self.buffers.get(leaf).and_then(|b| b.text.clone())
    }

    fn write_text(&mut self, leaf: &PathBuf, text: String) -> Result<(), HostError> {
        let buffer = self
            .buffers
            .get_mut(leaf)
            .ok_or_else(|| HostError::NotOpen(leaf.clone()))?;
        buffer.text = Some(text);
        buffer.dirty = true;
        Ok(())
    }

    fn is_saved(&self, leaf: &PathBuf) -> bool {
        self.buffers.get(leaf).map_or(true, |b| !b.dirty)
    }

    fn save(&mut self, leaf: &PathBuf) -> Result<(), HostError> {
        let buffer = self
            .buffers
            .get_mut(leaf)
            .ok_or_else(|| HostError::NotOpen(leaf.clone()))?;
        if !buffer.dirty {
            return Ok(());
        }
        if !self.dry_run {
            if let Some(text) = &buffer.text {
                fs::write(leaf, text).map_err(|e| HostError::Write(leaf.clone(), e))?;
            }
        }
        buffer.dirty = false;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File(PathBuf),
    Stdin,
}

/// A single document read from a file (or stdin) with an optional line range
/// standing in for the editor selection.
#[derive(Debug)]
pub struct FileSelection {
    source: Source,
    text: Option<String>,
    /// Input kept as read when it is not UTF-8, so a filter still echoes it.
    raw: Vec<u8>,
    selected: Range<usize>,
    dirty: bool,
}

impl FileSelection {
    /// Reads `path`, or stdin when `path` is `-`. `lines` is 1-based and inclusive.
    pub fn load(path: &Path, lines: Option<(usize, usize)>) -> Result<Self, HostError> {
        let (source, bytes) = if path == Path::new("-") {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| HostError::Read(path.to_path_buf(), e))?;
            (Source::Stdin, bytes)
        } else {
            let bytes = fs::read(path).map_err(|e| HostError::Read(path.to_path_buf(), e))?;
            (Source::File(path.to_path_buf()), bytes)
        };
        Self::from_bytes(source, bytes, lines)
    }

    fn from_bytes(
        source: Source,
        bytes: Vec<u8>,
        lines: Option<(usize, usize)>,
    ) -> Result<Self, HostError> {
        let (text, raw) = match String::from_utf8(bytes) {
            Ok(text) => (Some(text), Vec::new()),
            Err(e) => (None, e.into_bytes()),
        };
        let selected = match (&text, lines) {
            (Some(text), Some((start, end))) => {
                line_span(text, start, end).ok_or_else(|| HostError::SelectionOutOfRange {
                    name: source_name(&source),
                    start,
                    end,
                    available: text.lines().count(),
                })?
            }
            _ => 0..0,
        };
        Ok(Self {
            source,
            text,
            raw,
            selected,
            dirty: false,
        })
    }

    pub fn is_stdin(&self) -> bool {
        self.source == Source::Stdin
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Writes the document back: to its file when changed, to stdout always
    /// for stdin input so it works as a filter.
    pub fn save(&mut self, dry_run: bool) -> Result<(), HostError> {
        self.save_to(&mut io::stdout().lock(), dry_run)
    }

    fn save_to<W: Write>(&mut self, out: &mut W, dry_run: bool) -> Result<(), HostError> {
        match &self.source {
            Source::Stdin => {
                let bytes = self.text.as_ref().map_or(&self.raw[..], |t| t.as_bytes());
                out.write_all(bytes)
                    .and_then(|_| out.flush())
                    .map_err(|e| HostError::Write(PathBuf::from("-"), e))?;
            }
            Source::File(path) => {
                if let Some(text) = self.text.as_ref().filter(|_| self.dirty && !dry_run) {
                    fs::write(path, text).map_err(|e| HostError::Write(path.clone(), e))?;
                }
            }
        }
        self.dirty = false;
        Ok(())
    }
}

impl ActiveDocument for FileSelection {
    fn name(&self) -> String {
        source_name(&self.source)
    }

    fn selection(&self) -> Option<Selection> {
        let text = self.text.as_ref()?;
        Some(Selection {
            text: text[self.selected.clone()].to_string(),
            start: self.selected.start,
        })
    }

    fn full_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn replace_range(&mut self, start: usize, len: usize, text: &str) -> Result<(), HostError> {
        let path = match &self.source {
            Source::File(path) => path.clone(),
            Source::Stdin => PathBuf::from("-"),
        };
        let current = self.text.as_mut().ok_or(HostError::NotOpen(path))?;
        current.replace_range(start..start + len, text);
        self.selected = start..start + text.len();
        self.dirty = true;
        Ok(())
    }
}

fn source_name(source: &Source) -> String {
    match source {
        Source::File(path) => path.display().to_string(),
        Source::Stdin => "<stdin>".to_string(),
    }
}

/// Byte range covering lines `start..=end` (1-based), trailing newline included.
fn line_span(text: &str, start: usize, end: usize) -> Option<Range<usize>> {
    if start == 0 || end < start || end > text.lines().count() {
        return None;
    }
    let mut line_starts = vec![0];
    line_starts.extend(
        text.bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i + 1),
    );
    let first = line_starts[start - 1];
    let last = line_starts.get(end).copied().unwrap_or(text.len());
    Some(first..last)
}
