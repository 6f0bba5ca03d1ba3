//! Daily buckets and sliding-window sums for one segment.
//!
//! All functions here are pure: the caller decides when the inputs changed
//! and a new series has to be produced.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::date_utils::{days_between, DayRange};
use crate::models::{LabelSeries, Row, SegmentId, WindowWidth};
use crate::services::hierarchy::SegmentTree;

pub fn day_index(date: NaiveDate, origin: NaiveDate) -> i64 {
    days_between(origin, date)
}

/// Number of daily buckets for the half-open `global` range: one per day,
/// plus a trailing bucket at `global.end`.
pub fn day_count(global: DayRange) -> usize {
    global.len_days().max(0) as usize + 1
}

/// Sums amounts per day. Rows outside the bucket array are dropped.
pub fn bucket<'a, I>(rows: I, global: DayRange) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Row>,
{
    let count = day_count(global);
    let mut buckets = vec![0.0; count];
    for row in rows {
        let day = day_index(row.date, global.start);
        if day >= 0 && (day as usize) < count {
            buckets[day as usize] += row.amount;
        }
    }
    buckets
}

/// `sum[i] = sum[i-1] + B[i] - B[i-W]`, reading missing buckets as zero.
/// `len` may exceed `buckets.len()`.
pub fn sliding_sum(buckets: &[f64], width: WindowWidth, len: usize) -> Vec<f64> {
    let at = |i: usize| buckets.get(i).copied().unwrap_or(0.0);
    let w = width.days();

    let mut sums = Vec::with_capacity(len);
    let mut running = 0.0;
    for i in 0..len {
        running += at(i);
        if i >= w {
            running -= at(i - w);
        }
        sums.push(running);
    }
    sums
}

/// Cuts the visible part out of `sums`, which start at `global.start`.
/// Always yields one point per visible day, indexed from zero.
pub fn slice(sums: &[f64], global: DayRange, visible: DayRange) -> Vec<(i64, f64)> {
    let start = day_index(visible.start, global.start);
    let len = visible.len_days().max(0);

    (0..len)
        .map(|offset| {
            let idx = start + offset;
            let value = if idx < 0 {
                0.0
            } else {
                sums.get(idx as usize).copied().unwrap_or(0.0)
            };
            (offset, value)
        })
        .collect()
}

/// Full-length sliding sums per label, labels in first-seen order.
pub fn label_sums(
    tree: &SegmentTree,
    node: SegmentId,
    width: WindowWidth,
    global: DayRange,
    len: usize,
) -> Vec<(String, Vec<f64>)> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&Row>> = HashMap::new();

    for (label, row) in tree.rows_of(node) {
        grouped
            .entry(label)
            .or_insert_with(|| {
                order.push(label.to_string());
                Vec::new()
            })
            .push(row);
    }

    order
        .into_iter()
        .map(|label| {
            let rows = grouped.remove(label.as_str()).unwrap_or_default();
            let buckets = bucket(rows, global);
            let sums = sliding_sum(&buckets, width, len.max(buckets.len()));
            (label, sums)
        })
        .collect()
}

/// One series per direct child label of `node` (plus `""` for rows that end
/// at `node`), restricted to `visible`.
pub fn aggregate(
    tree: &SegmentTree,
    node: SegmentId,
    width: WindowWidth,
    global: DayRange,
    visible: DayRange,
) -> Vec<LabelSeries> {
    let len = required_len(global, visible, width);
    label_sums(tree, node, width, global, len)
        .into_iter()
        .map(|(label, sums)| LabelSeries {
            points: slice(&sums, global, visible),
            label,
        })
        .collect()
}

/// Sum length needed so that `visible` can be sliced without running off the
/// end. One window past the last bucket every sum is zero, so the length
/// never grows beyond that however far `visible` reaches.
pub fn required_len(global: DayRange, visible: DayRange, width: WindowWidth) -> usize {
    let buckets = day_count(global);
    let end = day_index(visible.end, global.start).max(0) as usize;
    end.clamp(buckets, buckets + width.days())
}
