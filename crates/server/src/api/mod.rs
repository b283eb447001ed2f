use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use shared::{
    domain::{CurrentSlide, Element, ElementId},
    error::{ApiError, ErrorCode},
    protocol::{
        Ack, ElementListing, HealthReport, ResponseListing, ResultsPayload, SaveElementRequest,
        SetSlideRequest, SlideAck, SubmitAck, SubmitResponseRequest,
    },
};
use tracing::{error, warn};

use crate::app_state::AppState;

pub(crate) const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdminQuery {
    key: Option<String>,
}

pub(crate) fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Internal => {
            error!(message = %err.message, "internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(err))
}

/// A body the JSON extractor refuses is reported as a validation failure.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, (StatusCode, Json<ApiError>)> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(reject(ApiError::validation(rejection.body_text()))),
    }
}

/// Header wins over the query parameter when both are present.
fn admin_proof(headers: &HeaderMap, query: AdminQuery) -> Option<String> {
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or(query.key)
}

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(server_api::health(&state.api).await)
}

pub(crate) async fn get_current_slide(State(state): State<Arc<AppState>>) -> Json<CurrentSlide> {
    Json(server_api::current_slide(&state.api).await)
}

pub(crate) async fn set_current_slide(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetSlideRequest>, JsonRejection>,
) -> ApiResult<SlideAck> {
    let req = json_body(payload)?;
    let slide = server_api::change_slide(&state.api, req.slide_name.as_deref())
        .await
        .map_err(reject)?;
    Ok(Json(SlideAck::from(slide)))
}

pub(crate) async fn list_elements(State(state): State<Arc<AppState>>) -> Json<ElementListing> {
    Json(server_api::list_elements(&state.api).await)
}

pub(crate) async fn save_element(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveElementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Element>), (StatusCode, Json<ApiError>)> {
    let req = json_body(payload)?;
    let element = server_api::save_element(&state.api, req)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(element)))
}

pub(crate) async fn get_element(
    State(state): State<Arc<AppState>>,
    Path(element_id): Path<String>,
) -> ApiResult<Element> {
    let element = server_api::get_element(&state.api, &ElementId::new(element_id))
        .await
        .map_err(reject)?;
    Ok(Json(element))
}

pub(crate) async fn delete_element(
    State(state): State<Arc<AppState>>,
    Path(element_id): Path<String>,
) -> ApiResult<Ack> {
    let ack = server_api::delete_element(&state.api, &ElementId::new(element_id))
        .await
        .map_err(reject)?;
    Ok(Json(ack))
}

pub(crate) async fn submit_response(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitResponseRequest>, JsonRejection>,
) -> ApiResult<SubmitAck> {
    let req = json_body(payload)?;
    let ack = server_api::submit_response(&state.api, req)
        .await
        .map_err(reject)?;
    Ok(Json(ack))
}

pub(crate) async fn list_responses(
    State(state): State<Arc<AppState>>,
    Path(element_id): Path<String>,
) -> Json<ResponseListing> {
    Json(server_api::list_responses(&state.api, &ElementId::new(element_id)).await)
}

pub(crate) async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(element_id): Path<String>,
) -> ApiResult<ResultsPayload> {
    let payload = server_api::get_results(&state.api, &ElementId::new(element_id))
        .await
        .map_err(reject)?;
    Ok(Json(payload))
}

pub(crate) async fn clear_responses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> ApiResult<Ack> {
    let proof = admin_proof(&headers, query);
    let ack = server_api::clear_responses(&state.api, proof.as_deref())
        .await
        .map_err(reject)?;
    Ok(Json(ack))
}

pub(crate) async fn admin_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let proof = admin_proof(&headers, query);
    if let Err(err) = server_api::authorize_admin(&state.api, proof.as_deref()) {
        warn!("rejected admin view request");
        return Err(reject(err));
    }
    Ok(Redirect::to(&state.admin_panel_path))
}

pub(crate) async fn not_found() -> (StatusCode, Json<ApiError>) {
    reject(ApiError::not_found("no such route"))
}
