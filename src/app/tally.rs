use std::fmt;

/// Counts of work done at each level of the tree.
///
/// A scope only ever adds itself to a parent's counters when it did some
/// work, so folding in a zero tally is always a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub indents: usize,
    pub documents: usize,
    pub containers: usize,
}

impl Tally {
    /// Tally of a single document that had `indents` replacements.
    pub fn for_document(indents: usize) -> Self {
        Self {
            indents,
            documents: usize::from(indents > 0),
            containers: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.indents == 0
    }

    /// Adds a child's counts into this one if the child did any work.
    pub fn fold(&mut self, child: &Tally) {
        if child.is_zero() {
            return;
        }
        self.indents += child.indents;
        self.documents += child.documents;
        self.containers += child.containers;
    }

    /// Adds a whole project: its indents and documents, and one to the
    /// container count however many folders inside it changed.
    pub fn fold_project(&mut self, project: &Tally) {
        if project.is_zero() {
            return;
        }
        self.indents += project.indents;
        self.documents += project.documents;
        self.containers += 1;
    }

    /// Closes a container scope: the container counts itself once if any
    /// descendant changed.
    pub fn close_container(mut self) -> Self {
        if !self.is_zero() {
            self.containers += 1;
        }
        self
    }
}

fn pluralize(number: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", number, if number == 1 { singular } else { plural })
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Changed {} in {}.",
            pluralize(self.indents, "indent", "indents"),
            pluralize(self.documents, "file", "files")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tally_is_identity() {
        let mut tally = Tally::for_document(3);
        tally.fold(&Tally::default());
        assert_eq!(tally, Tally::for_document(3));
    }

    #[test]
    fn unchanged_document_does_not_count() {
        let mut parent = Tally::default();
        parent.fold(&Tally::for_document(0));
        assert_eq!(parent, Tally::default());
        assert_eq!(parent.close_container(), Tally::default());
    }

    #[test]
    fn containers_count_themselves_once() {
        let mut inner = Tally::default();
        inner.fold(&Tally::for_document(2));
        inner.fold(&Tally::for_document(1));
        let inner = inner.close_container();
        assert_eq!(
            inner,
            Tally {
                indents: 3,
                documents: 2,
                containers: 1
            }
        );

        let mut outer = Tally::default();
        outer.fold(&inner);
        outer.fold(&Tally::default().close_container());
        let outer = outer.close_container();
        assert_eq!(
            outer,
            Tally {
                indents: 3,
                documents: 2,
                containers: 2
            }
        );
    }

    #[test]
    fn projects_count_once_regardless_of_nesting() {
        let mut src = Tally::default();
        src.fold(&Tally::for_document(1));
        let mut alpha = Tally::default();
        alpha.fold(&src.close_container());
        let alpha = alpha.close_container();
        assert_eq!(alpha.containers, 2);

        let mut solution = Tally::default();
        solution.fold_project(&alpha);
        solution.fold_project(&Tally::for_document(2).close_container());
        solution.fold_project(&Tally::default().close_container());
        assert_eq!(
            solution,
            Tally {
                indents: 3,
                documents: 2,
                containers: 2
            }
        );
    }

    #[test]
    fn fold_order_does_not_matter() {
        let a = Tally::for_document(1);
        let b = Tally::for_document(5).close_container();

        let mut left = Tally::default();
        left.fold(&a);
        left.fold(&b);
        let mut right = Tally::default();
        right.fold(&b);
        right.fold(&a);
        assert_eq!(left, right);
    }

    #[test]
    fn summary_is_pluralized() {
        assert_eq!(
            Tally::for_document(1).to_string(),
            "Changed 1 indent in 1 file."
        );
        let mut tally = Tally::for_document(2);
        tally.fold(&Tally::for_document(3));
        assert_eq!(tally.to_string(), "Changed 5 indents in 2 files.");
        assert_eq!(Tally::default().to_string(), "Changed 0 indents in 0 files.");
    }
}
