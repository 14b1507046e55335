use axum::{extract::State, http::StatusCode, Json};
use shared_types::{
    CompaniesBody, CompanyBody, CompanyContact, CompanyIdBody, CompanyPayload, ContactListing,
    ContactsBody, Empty, Envelope, RawNamesBody, SidebarBody,
};

use crate::auth::AuthUser;
use crate::companies::{queries, CompanyRecord};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// GET /api/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Envelope<CompaniesBody>>, AppError> {
    let companies = queries::list_companies(&state.db, user.user_id).await?;
    Ok(Json(Envelope::success(CompaniesBody { companies })))
}

/// POST /api/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(payload): ApiJson<CompanyPayload>,
) -> Result<(StatusCode, Json<Envelope<CompanyIdBody>>), AppError> {
    let record = CompanyRecord::from_payload(payload)?;
    let company_id = queries::create_company(&state.db, &record).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::success(CompanyIdBody { company_id })
                .with_message(format!("Company '{}' created.", record.company_name_clean)),
        ),
    ))
}

/// GET /api/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(company_id): ApiPath<i32>,
) -> Result<Json<Envelope<CompanyBody>>, AppError> {
    let company = queries::get_company(&state.db, company_id).await?;
    Ok(Json(Envelope::success(CompanyBody { company })))
}

/// PUT /api/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(company_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CompanyPayload>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    let record = CompanyRecord::from_payload(payload)?;
    queries::update_company(&state.db, company_id, &record).await?;
    Ok(Json(
        Envelope::success(Empty {}).with_message(format!("Company {company_id} updated.")),
    ))
}

/// DELETE /api/companies/:id
pub async fn handle_delete_company(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(company_id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    queries::delete_company(&state.db, company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/companies/:id/raw_names
pub async fn handle_company_raw_names(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(company_id): ApiPath<i32>,
) -> Result<Json<Envelope<RawNamesBody>>, AppError> {
    let raw_names = queries::raw_names_for_company(&state.db, company_id).await?;
    Ok(Json(Envelope::success(RawNamesBody {
        company_id,
        raw_names,
    })))
}

/// GET /api/companies/:id/contacts
pub async fn handle_company_contacts(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(company_id): ApiPath<i32>,
) -> Result<Json<Envelope<ContactsBody<CompanyContact>>>, AppError> {
    let contacts = queries::contacts_for_company(&state.db, company_id).await?;
    Ok(Json(Envelope::success(ContactsBody {
        company_id: Some(company_id),
        contacts,
    })))
}

/// GET /api/sidebar
pub async fn handle_sidebar(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Envelope<SidebarBody>>, AppError> {
    let companies = queries::sidebar_summaries(&state.db).await?;
    Ok(Json(Envelope::success(SidebarBody { companies })))
}

/// GET /api/contacts/all
pub async fn handle_all_contacts(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Envelope<ContactsBody<ContactListing>>>, AppError> {
    let contacts = queries::all_contacts(&state.db).await?;
    Ok(Json(Envelope::success(ContactsBody {
        company_id: None,
        contacts,
    })))
}
