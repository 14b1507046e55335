use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shared_types::{
    ApplicationBody, ApplicationCreated, ApplicationPayload, ApplicationsBody, Empty, Envelope,
};
use uuid::Uuid;

use crate::applications::{queries, ApplicationRecord};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanyFilter {
    pub company_id: Option<i32>,
}

/// GET /api/applications?company_id=
pub async fn handle_applications_by_company(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(filter): ApiQuery<CompanyFilter>,
) -> Result<Json<Envelope<ApplicationsBody>>, AppError> {
    let company_id = filter.company_id.ok_or_else(|| {
        AppError::Validation("Missing or invalid 'company_id' query parameter.".to_string())
    })?;
    let applications = queries::list_for_company(&state.db, user.user_id, company_id).await?;
    Ok(Json(Envelope::success(ApplicationsBody { applications })))
}

/// GET /api/applications/all
pub async fn handle_all_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Envelope<ApplicationsBody>>, AppError> {
    let applications = queries::list_all(&state.db, user.user_id).await?;
    Ok(Json(Envelope::success(ApplicationsBody { applications })))
}

/// POST /api/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ApplicationPayload>,
) -> Result<(StatusCode, Json<Envelope<ApplicationCreated>>), AppError> {
    let record = ApplicationRecord::for_create(payload)?;
    let application_id = queries::create_application(&state.db, user.user_id, &record).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::success(ApplicationCreated { application_id })
                .with_message("Application created successfully."),
        ),
    ))
}

/// GET /api/application/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(application_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<ApplicationBody>>, AppError> {
    let application = queries::get_application(&state.db, user.user_id, application_id).await?;
    Ok(Json(Envelope::success(ApplicationBody { application })))
}

/// PUT /api/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(application_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ApplicationPayload>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    let record = ApplicationRecord::for_update(payload)?;
    queries::update_application(&state.db, user.user_id, application_id, &record).await?;
    Ok(Json(
        Envelope::success(Empty {}).with_message("Application updated successfully."),
    ))
}

/// DELETE /api/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(application_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    let removed =
        queries::delete_application(&state.db, &state.files, user.user_id, application_id).await?;
    Ok(Json(Envelope::success(Empty {}).with_message(format!(
        "Application and {removed} associated document file(s) deleted."
    ))))
}
