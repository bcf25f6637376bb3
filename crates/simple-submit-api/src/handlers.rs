//! API Handlers
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use simple_submit_core::{
    ConfigTranslator, ProjectPermission, RequestContext, Result, SubmitConfig,
};

use crate::error::ApiResult;
use crate::metrics::WriteOutcome;
use crate::middleware::request_context;
use crate::AppState;

/// Commit message of configuration writes
pub const COMMIT_MESSAGE: &str = "Update simple submit rules";

pub async fn get_config(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<SubmitConfig>> {
    let ctx = request_context(&headers);
    let span = tracing::info_span!("read_config", trace_id = %ctx.trace_id, project = %project);
    let config = span.in_scope(|| read_config(&state, &ctx, &project))?;
    state.metrics.record_read();
    Ok(Json(config))
}

pub async fn put_config(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    Json(input): Json<SubmitConfig>,
) -> ApiResult<Json<SubmitConfig>> {
    let ctx = request_context(&headers);
    let span = tracing::info_span!("write_config", trace_id = %ctx.trace_id, project = %project);
    let result = span.in_scope(|| {
        let result = write_config(&state, &ctx, &project, &input);
        if let Err(e) = &result {
            tracing::warn!(user = ctx.user_name(), error = %e, "configuration write rejected");
        }
        result
    });
    state.metrics.record_write(WriteOutcome::of(&result));
    Ok(Json(result?))
}

fn read_config(state: &AppState, ctx: &RequestContext, project: &str) -> Result<SubmitConfig> {
    state
        .permissions
        .check(ctx.user.as_deref(), project, ProjectPermission::ReadConfig)?;
    let plugin = state.plugin_context();
    let project_state = state.store.project_state(project)?;
    Ok(ConfigTranslator::new(&plugin).read(&project_state))
}

/// Apply `input` as one commit. Nothing is committed unless every part of
/// the input is valid.
fn write_config(
    state: &AppState,
    ctx: &RequestContext,
    project: &str,
    input: &SubmitConfig,
) -> Result<SubmitConfig> {
    state
        .permissions
        .check(ctx.user.as_deref(), project, ProjectPermission::WriteConfig)?;
    tracing::debug!(input = %input, "applying configuration");

    let plugin = state.plugin_context();
    let translator = ConfigTranslator::new(&plugin);
    let project_state = state.store.project_state(project)?;

    let mut edit = state.store.open_edit(project, ctx.user_name())?;
    translator.write(&project_state, edit.config_mut(), input)?;
    let info = state.store.commit(edit, COMMIT_MESSAGE)?;
    state.store.evict(project);
    tracing::info!(user = ctx.user_name(), revision = %info.revision, "configuration updated");

    Ok(translator.read(&state.store.project_state(project)?))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "cannot encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
