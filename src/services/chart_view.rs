//! View state for one chart: which segment is shown, how wide the sliding
//! window is, and which days are visible.
//!
//! Full-length sums are kept per label and only rebuilt when the segment or
//! the window width changes. Moving the visible range re-slices them. Redraws
//! read the last handed-out series and never recompute.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::date_utils::DayRange;
use crate::error::{AppError, AppResult};
use crate::models::{LabelSeries, SegmentId, WindowWidth};
use crate::services::aggregator;
use crate::services::hierarchy::SegmentTree;

/// Longest visible range a view accepts, in days.
pub const MAX_VISIBLE_DAYS: i64 = 100 * 366;

pub struct ChartView {
    tree: Arc<SegmentTree>,
    current: SegmentId,
    width: WindowWidth,
    global: DayRange,
    visible: DayRange,
    sums: Vec<(String, Vec<f64>)>,
    series: Arc<[LabelSeries]>,
    changed: bool,
    recompute_count: u64,
}

impl ChartView {
    /// A view of the root over every row day.
    pub fn new(tree: Arc<SegmentTree>, width: WindowWidth) -> Self {
        let visible = Self::data_range(&tree);
        let root = tree.root();
        Self::build(tree, width, root, visible)
    }

    /// A view that starts at `node` with `start..end` visible. Sums are
    /// computed once, for that state only.
    pub fn with_range(
        tree: Arc<SegmentTree>,
        width: WindowWidth,
        node: SegmentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Self> {
        if tree.get(node).is_none() {
            return Err(AppError::NotFound(format!("no segment {}", node.index())));
        }
        let visible = checked_range(start, end)?;
        Ok(Self::build(tree, width, node, visible))
    }

    /// Days covered by the rows of `tree`, first through last inclusive.
    /// An empty tree covers today.
    pub fn data_range(tree: &SegmentTree) -> DayRange {
        tree.full_range().unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            DayRange::covering(today, today)
        })
    }

    fn build(
        tree: Arc<SegmentTree>,
        width: WindowWidth,
        current: SegmentId,
        visible: DayRange,
    ) -> Self {
        let global = Self::data_range(&tree);
        let mut view = Self {
            tree,
            current,
            width,
            global,
            visible,
            sums: Vec::new(),
            series: Arc::from(Vec::new()),
            changed: false,
            recompute_count: 0,
        };
        view.recompute_sums();
        view
    }

    pub fn tree(&self) -> &SegmentTree {
        &self.tree
    }

    pub fn current(&self) -> SegmentId {
        self.current
    }

    pub fn current_path(&self) -> Vec<String> {
        self.tree.path_of(self.current)
    }

    pub fn children(&self) -> Vec<String> {
        self.tree
            .get(self.current)
            .map(|segment| segment.child_labels())
            .unwrap_or_default()
    }

    pub fn window_width(&self) -> WindowWidth {
        self.width
    }

    pub fn global_range(&self) -> DayRange {
        self.global
    }

    pub fn visible_range(&self) -> DayRange {
        self.visible
    }

    /// Number of times series have been rebuilt since construction.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    pub fn set_window_width(&mut self, days: u32) -> AppResult<()> {
        let width = WindowWidth::new(days)?;
        if width != self.width {
            self.width = width;
            self.recompute_sums();
        }
        Ok(())
    }

    pub fn set_visible_range(&mut self, start: NaiveDate, end: NaiveDate) -> AppResult<()> {
        let visible = checked_range(start, end)?;
        if visible != self.visible {
            self.visible = visible;
            self.reslice();
        }
        Ok(())
    }

    /// Moves to the child named `label`. Returns `false` and does nothing if
    /// there is no such child.
    pub fn descend(&mut self, label: &str) -> bool {
        match self.tree.child(self.current, label) {
            Some(child) => {
                self.current = child;
                self.recompute_sums();
                true
            }
            None => false,
        }
    }

    /// Moves to the parent segment. Returns `false` at the root.
    pub fn ascend(&mut self) -> bool {
        match self.tree.parent(self.current) {
            Some(parent) => {
                self.current = parent;
                self.recompute_sums();
                true
            }
            None => false,
        }
    }

    /// Descends along `path` from the current segment, recomputing once.
    /// Stops without moving if any label is missing.
    pub fn navigate<S: AsRef<str>>(&mut self, path: &[S]) -> bool {
        let target = path.iter().try_fold(self.current, |id, label| {
            self.tree.child(id, label.as_ref())
        });
        match target {
            Some(id) if id != self.current => {
                self.current = id;
                self.recompute_sums();
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// The series for the current state. Cheap to call repeatedly.
    pub fn series(&self) -> Arc<[LabelSeries]> {
        Arc::clone(&self.series)
    }

    /// Returns the series once after each change, `None` until the next one.
    pub fn take_frame(&mut self) -> Option<Arc<[LabelSeries]>> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        Some(self.series())
    }

    fn recompute_sums(&mut self) {
        let len = aggregator::required_len(self.global, self.visible, self.width);
        self.sums = aggregator::label_sums(&self.tree, self.current, self.width, self.global, len);
        debug!(
            segment = self.current.index(),
            labels = self.sums.len(),
            days_per_sample = self.width.get(),
            "Recomputed sliding sums"
        );
        self.reslice();
    }

    fn reslice(&mut self) {
        // The visible range may have grown past the cached sums.
        let needed = aggregator::required_len(self.global, self.visible, self.width);
        if self.sums.iter().any(|(_, sums)| sums.len() < needed) {
            self.sums =
                aggregator::label_sums(&self.tree, self.current, self.width, self.global, needed);
        }

        let series: Vec<LabelSeries> = self
            .sums
            .iter()
            .map(|(label, sums)| LabelSeries {
                label: label.clone(),
                points: aggregator::slice(sums, self.global, self.visible),
            })
            .collect();
        self.series = Arc::from(series);
        self.changed = true;
        self.recompute_count += 1;
        trace!(recompute_count = self.recompute_count, "Series updated");
    }
}

fn checked_range(start: NaiveDate, end: NaiveDate) -> AppResult<DayRange> {
    let range = DayRange::new(start, end).ok_or_else(|| {
        AppError::Validation(format!("visible range ends before it starts: {} > {}", start, end))
    })?;
    if range.len_days() > MAX_VISIBLE_DAYS {
        return Err(AppError::Validation(format!(
            "visible range of {} days exceeds {} days",
            range.len_days(),
            MAX_VISIBLE_DAYS
        )));
    }
    Ok(range)
}
