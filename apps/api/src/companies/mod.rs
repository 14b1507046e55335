pub mod handlers;
pub mod queries;

use shared_types::CompanyPayload;

use crate::errors::AppError;

/// Trims a free-text field; blank input becomes `None` so it is stored as NULL.
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A validated company write. Built from the request payload for both create
/// and whole-record update.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub company_name_clean: String,
    pub target_interest: bool,
    pub headquarters: Option<String>,
    pub size_employees: Option<i32>,
    pub annual_revenue: Option<f64>,
    pub revenue_scale: Option<String>,
    pub notes: Option<String>,
}

impl CompanyRecord {
    pub fn from_payload(payload: CompanyPayload) -> Result<Self, AppError> {
        let company_name_clean = clean_text(payload.company_name_clean).ok_or_else(|| {
            AppError::Validation("Missing required field: company_name_clean".to_string())
        })?;

        if matches!(payload.size_employees, Some(n) if n < 0) {
            return Err(AppError::Validation(
                "size_employees cannot be negative".to_string(),
            ));
        }

        Ok(CompanyRecord {
            company_name_clean,
            target_interest: payload.target_interest.unwrap_or(false),
            headquarters: clean_text(payload.headquarters),
            size_employees: payload.size_employees,
            annual_revenue: payload.annual_revenue,
            revenue_scale: clean_text(payload.revenue_scale),
            notes: clean_text(payload.notes),
        })
    }
}
