use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::date_utils::{format_date, parse_date};
use crate::error::{AppError, AppResult};
use crate::models::{LabelSeries, SegmentId, WindowWidth};
use crate::services::chart_view::ChartView;
use crate::services::hierarchy::SegmentTree;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SegmentParams {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeriesParams {
    pub path: Option<String>,
    pub days_per_sample: Option<u32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SegmentInfo {
    pub path: Vec<String>,
    pub label: String,
    pub parent: Option<Vec<String>>,
    pub children: Vec<String>,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub path: Vec<String>,
    pub start: String,
    pub end: String,
    pub days_per_sample: u32,
    pub series: Vec<LabelSeries>,
}

pub fn segment_info(tree: &SegmentTree, id: SegmentId) -> SegmentInfo {
    let segment = tree.get(id);
    SegmentInfo {
        path: tree.path_of(id),
        label: segment.map(|s| s.label.clone()).unwrap_or_default(),
        parent: tree.parent(id).map(|parent| tree.path_of(parent)),
        children: segment.map(|s| s.child_labels()).unwrap_or_default(),
        row_count: segment.map(|s| s.row_count()).unwrap_or(0),
    }
}

fn split_path(path: Option<&str>, delimiter: char) -> Vec<String> {
    match path.map(str::trim) {
        None | Some("") => Vec::new(),
        Some(path) => path
            .split(delimiter)
            .map(|label| label.trim().to_string())
            .collect(),
    }
}

fn join_path(path: &[String], delimiter: char) -> String {
    path.join(delimiter.to_string().as_str())
}

fn parse_param_date(name: &str, value: &str) -> AppResult<chrono::NaiveDate> {
    parse_date(value)
        .ok_or_else(|| AppError::Validation(format!("invalid {} date '{}'", name, value)))
}

pub async fn segment(
    State(state): State<AppState>,
    Query(params): Query<SegmentParams>,
) -> AppResult<Json<SegmentInfo>> {
    let tree = state.tree.current()?;
    let path = split_path(params.path.as_deref(), state.config.account_delimiter);
    let id = tree
        .find(path.as_slice())
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no segment '{}'",
                join_path(&path, state.config.account_delimiter)
            ))
        })?;

    Ok(Json(segment_info(&tree, id)))
}

pub async fn series(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> AppResult<Json<SeriesResponse>> {
    let tree = state.tree.current()?;
    let path = split_path(params.path.as_deref(), state.config.account_delimiter);

    let width = match params.days_per_sample {
        Some(days) => WindowWidth::new(days)?,
        None => state.default_width()?,
    };

    let node = tree.find(path.as_slice()).ok_or_else(|| {
        AppError::NotFound(format!(
            "no segment '{}'",
            join_path(&path, state.config.account_delimiter)
        ))
    })?;

    let default = ChartView::data_range(&tree);
    let start = match params.from.as_deref() {
        Some(from) => parse_param_date("from", from)?,
        None => default.start,
    };
    let end = match params.to.as_deref() {
        Some(to) => parse_param_date("to", to)?,
        None => default.end,
    };
    let view = ChartView::with_range(tree, width, node, start, end)?;

    let visible = view.visible_range();
    tracing::debug!(
        path = %join_path(&path, state.config.account_delimiter),
        days_per_sample = width.get(),
        start = %visible.start,
        end = %visible.end,
        "Serving series"
    );

    Ok(Json(SeriesResponse {
        path: view.current_path(),
        start: format_date(visible.start),
        end: format_date(visible.end),
        days_per_sample: width.get(),
        series: view.series().to_vec(),
    }))
}
