use std::collections::BTreeMap;

/// Index of a segment inside its [`SegmentTree`](crate::services::hierarchy::SegmentTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub(crate) usize);

impl SegmentId {
    pub const ROOT: SegmentId = SegmentId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the account hierarchy, keyed by one path segment.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    pub label: String,
    /// `(next-hop label, row index)` for every row at or below this node.
    /// The label is empty for rows whose path ends here.
    pub entries: Vec<(String, usize)>,
    pub children: BTreeMap<String, SegmentId>,
    /// Back reference for navigation only.
    pub parent: Option<SegmentId>,
}

impl Segment {
    pub fn new(label: impl Into<String>, parent: Option<SegmentId>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
            children: BTreeMap::new(),
            parent,
        }
    }

    pub fn row_count(&self) -> usize {
        self.entries.len()
    }

    pub fn child_labels(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }
}
