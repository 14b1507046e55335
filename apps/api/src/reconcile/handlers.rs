use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use shared_types::{
    BatchOutcome, Envelope, MapBatchRequest, MapCompanyRequest, MapExistingRequest,
    MapNewRequest, MapSelfRequest, MappingAction, MappingOutcome, NextCompanyBody,
    RegenerateOutcome, SuggestionsBody, UnmappedListBody, UnmappedName,
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::reconcile::search::SearchTerm;
use crate::reconcile::{queries, require_clean_name, require_raw_name};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default, alias = "q")]
    pub query: Option<String>,
}

// ─── Queue ──────────────────────────────────────────────────────────────────

/// GET /api/unmapped_list
pub async fn handle_unmapped_list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Envelope<UnmappedListBody>>, AppError> {
    let raw_names = queries::unmapped_names(&state.db)
        .await?
        .into_iter()
        .map(|raw_name| UnmappedName { raw_name })
        .collect();
    Ok(Json(Envelope::success(UnmappedListBody { raw_names })))
}

/// GET /api/next_company
pub async fn handle_next_company(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Envelope<NextCompanyBody>>, AppError> {
    let raw_name = queries::next_unmapped(&state.db).await?;
    let envelope = match &raw_name {
        Some(_) => Envelope::success(NextCompanyBody { raw_name }),
        None => Envelope::success(NextCompanyBody { raw_name: None })
            .with_message("All raw company names have been processed."),
    };
    Ok(Json(envelope))
}

/// POST /api/unmapped/regenerate
pub async fn handle_regenerate_unmapped(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Envelope<RegenerateOutcome>>, AppError> {
    let inserted_count = queries::regenerate_unmapped(&state.db).await?;
    Ok(Json(
        Envelope::success(RegenerateOutcome { inserted_count })
            .with_message(format!("{inserted_count} raw names added to the queue.")),
    ))
}

/// GET /api/search/company?query=
pub async fn handle_search_companies(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Envelope<SuggestionsBody>>, AppError> {
    let term = SearchTerm::parse(params.query.as_deref())?;
    let companies = queries::search_companies(&state.db, &term).await?;
    Ok(Json(Envelope::success(SuggestionsBody { companies })))
}

// ─── Mapping actions ────────────────────────────────────────────────────────

/// POST /api/map/existing
pub async fn handle_map_existing(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(req): ApiJson<MapExistingRequest>,
) -> Result<Json<Envelope<MappingOutcome>>, AppError> {
    map_existing(&state, req).await.map(Json)
}

/// POST /api/map/new
pub async fn handle_map_new(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(req): ApiJson<MapNewRequest>,
) -> Result<Json<Envelope<MappingOutcome>>, AppError> {
    map_new(&state, req).await.map(Json)
}

/// POST /api/map/self
pub async fn handle_map_self(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(req): ApiJson<MapSelfRequest>,
) -> Result<Json<Envelope<MappingOutcome>>, AppError> {
    map_self(&state, req).await.map(Json)
}

/// POST /api/map_company
/// Generic form dispatching on the `action` field.
pub async fn handle_map_company(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(req): ApiJson<MapCompanyRequest>,
) -> Result<Json<Envelope<MappingOutcome>>, AppError> {
    let envelope = match req {
        MapCompanyRequest::Existing(req) => map_existing(&state, req).await?,
        MapCompanyRequest::New(req) => map_new(&state, req).await?,
        MapCompanyRequest::SelfMap(req) => map_self(&state, req).await?,
    };
    Ok(Json(envelope))
}

/// POST /api/map/batch
/// The body may be left out entirely; a body that is sent must be valid JSON.
pub async fn handle_map_batch(
    State(state): State<AppState>,
    _user: AuthUser,
    body: Bytes,
) -> Result<Json<Envelope<BatchOutcome>>, AppError> {
    let req = parse_batch_request(&body)?;
    let outcome = queries::map_all_to_self(&state.db, req.target_interest).await?;
    let message = format!(
        "Batch complete: {} mapped, {} failed.",
        outcome.processed_count, outcome.failed_count
    );
    Ok(Json(Envelope::success(outcome).with_message(message)))
}

fn parse_batch_request(body: &[u8]) -> Result<MapBatchRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(MapBatchRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body for batch mapping: {e}")))
}

async fn map_existing(
    state: &AppState,
    req: MapExistingRequest,
) -> Result<Envelope<MappingOutcome>, AppError> {
    let raw_name = require_raw_name(&req.raw_name)?;
    let outcome = queries::map_to_existing(&state.db, raw_name, req.company_id).await?;
    let message = format!(
        "'{}' mapped to existing company '{}'.",
        outcome.raw_name, outcome.company_name_clean
    );
    Ok(Envelope::success(outcome).with_message(message))
}

async fn map_new(state: &AppState, req: MapNewRequest) -> Result<Envelope<MappingOutcome>, AppError> {
    let raw_name = require_raw_name(&req.raw_name)?;
    let clean = require_clean_name(&req.company_name_clean)?;
    let outcome = queries::map_to_named(
        &state.db,
        raw_name,
        clean,
        req.target_interest,
        MappingAction::New,
    )
    .await?;
    let message = if outcome.company_created {
        format!(
            "'{}' mapped to new company '{}'.",
            outcome.raw_name, outcome.company_name_clean
        )
    } else {
        format!(
            "'{}' mapped to existing company '{}' with the same name.",
            outcome.raw_name, outcome.company_name_clean
        )
    };
    Ok(Envelope::success(outcome).with_message(message))
}

async fn map_self(state: &AppState, req: MapSelfRequest) -> Result<Envelope<MappingOutcome>, AppError> {
    let raw_name = require_raw_name(&req.raw_name)?;
    let outcome =
        queries::map_to_named(&state.db, raw_name, raw_name, true, MappingAction::SelfMap).await?;
    let message = if outcome.company_created {
        format!("'{}' self-mapped as a new target company.", outcome.raw_name)
    } else {
        format!(
            "'{}' self-mapped to existing company '{}'.",
            outcome.raw_name, outcome.company_name_clean
        )
    };
    Ok(Envelope::success(outcome).with_message(message))
}
