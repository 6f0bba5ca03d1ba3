//! Account hierarchy built from ledger rows.
//!
//! Every row is pushed onto each segment along its account path, tagged with
//! the label of the next hop, so any segment can be broken down by its direct
//! children without walking the subtree.

use chrono::NaiveDate;
use tracing::debug;

use crate::date_utils::DayRange;
use crate::models::{Row, Segment, SegmentId};

#[derive(Debug, Clone)]
pub struct SegmentTree {
    rows: Vec<Row>,
    segments: Vec<Segment>,
}

impl Default for SegmentTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl SegmentTree {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            segments: vec![Segment::new("", None)],
        }
    }

    pub fn build(rows: Vec<Row>) -> Self {
        let mut tree = Self::empty();

        for (row_idx, row) in rows.iter().enumerate() {
            let mut current = SegmentId::ROOT;
            for label in &row.path {
                tree.segments[current.0]
                    .entries
                    .push((label.clone(), row_idx));
                current = tree.child_or_insert(current, label);
            }
            tree.segments[current.0]
                .entries
                .push((String::new(), row_idx));
        }

        tree.rows = rows;
        debug!(
            row_count = tree.rows.len(),
            segment_count = tree.segments.len(),
            "Built segment tree"
        );
        tree
    }

    fn child_or_insert(&mut self, parent: SegmentId, label: &str) -> SegmentId {
        if let Some(&id) = self.segments[parent.0].children.get(label) {
            return id;
        }
        let id = SegmentId(self.segments.len());
        self.segments.push(Segment::new(label, Some(parent)));
        self.segments[parent.0]
            .children
            .insert(label.to_string(), id);
        id
    }

    pub fn root(&self) -> SegmentId {
        SegmentId::ROOT
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn child(&self, id: SegmentId, label: &str) -> Option<SegmentId> {
        self.get(id)?.children.get(label).copied()
    }

    pub fn parent(&self, id: SegmentId) -> Option<SegmentId> {
        self.get(id)?.parent
    }

    /// Follows `path` from the root. An empty path is the root itself.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<SegmentId> {
        path.iter()
            .try_fold(self.root(), |id, label| self.child(id, label.as_ref()))
    }

    pub fn path_of(&self, id: SegmentId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(seg_id) = current {
            let Some(segment) = self.get(seg_id) else {
                break;
            };
            if segment.parent.is_some() {
                path.push(segment.label.clone());
            }
            current = segment.parent;
        }
        path.reverse();
        path
    }

    /// `(label, row)` pairs visible at `id`, in insertion order.
    pub fn rows_of(&self, id: SegmentId) -> impl Iterator<Item = (&str, &Row)> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|segment| segment.entries.iter())
            .map(move |(label, idx)| (label.as_str(), &self.rows[*idx]))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Earliest and latest row dates, or `None` for an empty tree.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|r| r.date).min()?;
        let last = self.rows.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Half-open range over every row day, `[first, last + 1)`.
    pub fn full_range(&self) -> Option<DayRange> {
        self.date_bounds()
            .map(|(first, last)| DayRange::covering(first, last))
    }
}
