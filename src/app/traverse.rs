//! Recursive application of the transformer over a document tree.
//!
//! Children are visited one at a time in the order they were supplied, and
//! each finished subtree is folded into its parent straight away. A host
//! failure on one leaf is recorded and that leaf contributes nothing; its
//! siblings carry on.

use crate::app::host::{ActiveDocument, DocumentHost, HostError};
use crate::app::models::{Collection, Extensions, Node};
use crate::app::tally::Tally;
use crate::app::transform::Transformer;

/// A leaf whose processing failed in the host.
#[derive(Debug)]
pub struct LeafFailure {
    pub name: String,
    pub error: HostError,
}

pub struct Traverser<'a, H: DocumentHost> {
    transformer: &'a Transformer,
    extensions: &'a Extensions,
    host: &'a mut H,
    failures: Vec<LeafFailure>,
}

impl<'a, H: DocumentHost> Traverser<'a, H> {
    pub fn new(transformer: &'a Transformer, extensions: &'a Extensions, host: &'a mut H) -> Self {
        Self {
            transformer,
            extensions,
            host,
            failures: Vec::new(),
        }
    }

    pub fn failures(&self) -> &[LeafFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<LeafFailure> {
        self.failures
    }

    pub fn traverse(&mut self, node: &Node<H::Leaf>) -> Tally {
        match node {
            Node::Leaf(leaf) => self.visit_leaf(leaf),
            Node::Container { name, children } => {
                log::debug!("Entering {}", name);
                let mut tally = Tally::default();
                for child in children {
                    tally.fold(&self.traverse(child));
                }
                tally.close_container()
            }
        }
    }

    /// Containers of the collection count as projects: `containers` in the
    /// result is the number of members that changed, not of nested folders.
    pub fn traverse_collection(&mut self, collection: &Collection<H::Leaf>) -> Tally {
        log::debug!("Entering collection {}", collection.name);
        let mut tally = Tally::default();
        for member in &collection.members {
            let member_tally = self.traverse(member);
            match member {
                Node::Leaf(_) => tally.fold(&member_tally),
                Node::Container { .. } => tally.fold_project(&member_tally),
            }
        }
        tally
    }

    fn visit_leaf(&mut self, leaf: &H::Leaf) -> Tally {
        let name = self.host.name(leaf);
        if !self.extensions.matches(name.trim()) {
            log::debug!("Skipping {}: extension not eligible", name);
            return Tally::default();
        }
        match self.convert_leaf(leaf) {
            Ok(tally) => {
                if !tally.is_zero() {
                    log::info!("Changed {} indent(s) in {}", tally.indents, name);
                }
                tally
            }
            Err(error) => {
                log::warn!("Failed to process {}: {}", name, error);
                self.failures.push(LeafFailure { name, error });
                Tally::default()
            }
        }
    }

    fn convert_leaf(&mut self, leaf: &H::Leaf) -> Result<Tally, HostError> {
        let handle = if self.host.is_open(leaf) {
            None
        } else {
            match self.host.open(leaf)? {
                Some(handle) => Some(handle),
                None => {
                    log::debug!("Skipping {}: no document", self.host.name(leaf));
                    return Ok(Tally::default());
                }
            }
        };

        let result = self.convert_open(leaf);

        // Put the document back the way it was found even when conversion failed.
        if let Some(handle) = handle {
            let closed = self.host.close(handle);
            let tally = result?;
            closed?;
            return Ok(tally);
        }
        result
    }

    fn convert_open(&mut self, leaf: &H::Leaf) -> Result<Tally, HostError> {
        let Some(text) = self.host.read_text(leaf) else {
            log::debug!("Skipping {}: no text", self.host.name(leaf));
            return Ok(Tally::default());
        };
        let was_saved = self.host.is_saved(leaf);
        let converted = self.transformer.apply(&text);
        if converted.indents > 0 {
            self.host.write_text(leaf, converted.text)?;
            // Saving a document that already had edits would commit those too.
            if was_saved {
                self.host.save(leaf)?;
            }
        }
        Ok(Tally::for_document(converted.indents))
    }
}

/// Converts the selection of `doc`, or the whole document when nothing is
/// selected. A changed selection counts as one document.
pub fn apply_to_selection<D: ActiveDocument>(
    transformer: &Transformer,
    doc: &mut D,
) -> Result<Tally, HostError> {
    let Some(selection) = doc.selection() else {
        log::debug!("Skipping {}: no text", doc.name());
        return Ok(Tally::default());
    };
    let (start, text) = if selection.text.is_empty() {
        match doc.full_text() {
            Some(text) => (0, text),
            None => return Ok(Tally::default()),
        }
    } else {
        (selection.start, selection.text)
    };

    let converted = transformer.apply(&text);
    if converted.indents > 0 {
        doc.replace_range(start, text.len(), &converted.text)?;
    }
    Ok(Tally::for_document(converted.indents))
}
