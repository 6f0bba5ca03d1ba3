use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::handlers::api::{segment_info, SegmentInfo};
use crate::services::hierarchy::SegmentTree;
use crate::services::row_parser::parse_rows;
use crate::services::row_source::{load_tree, RowSource};
use crate::state::AppState;

/// Form field holding an uploaded beancount ledger.
const LEDGER_FIELD: &str = "file";

/// Raw rows from the configured source, as CSV.
pub async fn input(State(state): State<AppState>) -> AppResult<Response> {
    let source = state
        .config
        .source
        .as_ref()
        .ok_or_else(|| AppError::NotFound("no row source configured".into()))?;
    let content = source.fetch().await?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        content,
    )
        .into_response())
}

/// Replaces the loaded tree. A `multipart/form-data` body carries a beancount
/// ledger in its `file` field, which is run through bean-query; any other body
/// is taken as CSV rows. A failed load leaves the current tree in place.
pub async fn upload(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<SegmentInfo>> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let tree = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::Upload {
                status: e.status(),
                message: e.body_text(),
            })?;
        load_uploaded_ledger(&state, multipart).await?
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| AppError::Upload {
                status: e.status(),
                message: e.body_text(),
            })?;
        SegmentTree::build(parse_rows(&body, state.config.account_delimiter)?)
    };

    let tree = state.tree.replace(tree)?;
    info!(
        rows = tree.rows().len(),
        segments = tree.segment_count(),
        "Replaced ledger rows from upload"
    );

    Ok(Json(segment_info(&tree, tree.root())))
}

async fn load_uploaded_ledger(
    state: &AppState,
    mut multipart: Multipart,
) -> AppResult<SegmentTree> {
    let mut ledger: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Upload {
        status: e.status(),
        message: e.body_text(),
    })? {
        if field.name() == Some(LEDGER_FIELD) {
            let content = field.bytes().await.map_err(|e| AppError::Upload {
                status: e.status(),
                message: e.body_text(),
            })?;
            debug!(size_bytes = content.len(), "Received ledger upload");
            ledger = Some(content);
        }
    }

    let ledger = ledger
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::Validation("no ledger file uploaded".into()))?;

    // bean-query reads from a path, so the ledger lives on disk until the query ran.
    let file = tempfile::Builder::new()
        .prefix("ledger-graphs-")
        .suffix(".bean")
        .tempfile()?;
    tokio::fs::write(file.path(), &ledger).await?;

    let source = RowSource::BeanQuery {
        ledger: file.path().to_path_buf(),
        command: state.config.bean_query_command.clone(),
    };
    load_tree(&source, state.config.account_delimiter).await
}
