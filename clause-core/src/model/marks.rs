//! Marks applied to text leaves

use super::node::Attrs;
use serde::Serialize;

/// Mark types. Unknown mark names are kept as `Other` and ignored by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Other(String),
}

impl MarkKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "bold" | "strong" => MarkKind::Bold,
            "italic" | "em" => MarkKind::Italic,
            "underline" => MarkKind::Underline,
            "strike" | "strikethrough" => MarkKind::Strike,
            other => MarkKind::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strike => "strike",
            MarkKind::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MarkKind::Other(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub kind: MarkKind,
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
        }
    }
}

/// Ordered set of marks, keyed by kind.
///
/// Insertion order is preserved and is the order marks nest in at render time (first mark is the
/// outermost wrapper). Re-inserting a kind already present is a no-op.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marks(Vec<Mark>);

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_kinds<I: IntoIterator<Item = MarkKind>>(kinds: I) -> Self {
        let mut marks = Self::new();
        for kind in kinds {
            marks.insert(Mark::new(kind));
        }
        marks
    }

    /// Returns `false` if a mark of the same kind was already present.
    pub fn insert(&mut self, mark: Mark) -> bool {
        if self.contains(&mark.kind) {
            return false;
        }
        self.0.push(mark);
        true
    }

    pub fn remove(&mut self, kind: &MarkKind) -> bool {
        let before = self.0.len();
        self.0.retain(|m| &m.kind != kind);
        self.0.len() != before
    }

    /// Adds the mark if absent, removes it otherwise. Returns whether it is now present.
    pub fn toggle(&mut self, kind: MarkKind) -> bool {
        if self.remove(&kind) {
            false
        } else {
            self.0.push(Mark::new(kind));
            true
        }
    }

    pub fn contains(&self, kind: &MarkKind) -> bool {
        self.0.iter().any(|m| &m.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Marks {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut marks = Marks::new();
        assert!(marks.insert(Mark::new(MarkKind::Bold)));
        assert!(!marks.insert(Mark::new(MarkKind::Bold)));
        assert_eq!(marks.len(), 1);
    }

    #[test]
    fn test_order_of_first_insertion_is_kept() {
        let marks = Marks::from_kinds([MarkKind::Italic, MarkKind::Bold, MarkKind::Italic]);
        let kinds: Vec<_> = marks.iter().map(|m| m.kind.clone()).collect();
        assert_eq!(kinds, vec![MarkKind::Italic, MarkKind::Bold]);
    }

    #[test]
    fn test_toggle() {
        let mut marks = Marks::new();
        assert!(marks.toggle(MarkKind::Underline));
        assert!(!marks.toggle(MarkKind::Underline));
        assert!(marks.is_empty());
    }

    #[test]
    fn test_aliases() {
        assert_eq!(MarkKind::from_type_name("strikethrough"), MarkKind::Strike);
        assert_eq!(MarkKind::from_type_name("strong"), MarkKind::Bold);
        assert_eq!(
            MarkKind::from_type_name("textStyle"),
            MarkKind::Other("textStyle".to_string())
        );
    }
}
