pub mod handlers;
pub mod queries;

use chrono::NaiveDate;
use shared_types::{ApplicationPayload, ApplicationStatus};

use crate::companies::clean_text;
use crate::errors::AppError;

/// How the application's company is identified on write.
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyChoice {
    Id(i32),
    /// Clean name; the company is created when no profile has this name.
    Name(String),
}

/// A validated application write.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub company: CompanyChoice,
    pub title_name: String,
    pub date_applied: NaiveDate,
    pub status: ApplicationStatus,
    pub job_posting_url: Option<String>,
}

impl ApplicationRecord {
    /// Create accepts `company_id` or, failing that, `company_name_clean`.
    pub fn for_create(payload: ApplicationPayload) -> Result<Self, AppError> {
        let company = match (payload.company_id, clean_text(payload.company_name_clean.clone())) {
            (Some(id), _) => CompanyChoice::Id(id),
            (None, Some(name)) => CompanyChoice::Name(name),
            (None, None) => {
                return Err(missing_fields(
                    "company_name_clean, title_name, date_applied, current_status",
                ))
            }
        };
        Self::with_company(company, payload)
    }

    /// Update replaces the whole record and requires an existing `company_id`.
    pub fn for_update(payload: ApplicationPayload) -> Result<Self, AppError> {
        let company_id = payload.company_id.ok_or_else(|| {
            missing_fields("current_status, date_applied, title_name, company_id")
        })?;
        Self::with_company(CompanyChoice::Id(company_id), payload)
    }

    fn with_company(company: CompanyChoice, payload: ApplicationPayload) -> Result<Self, AppError> {
        let (Some(title_name), Some(date_applied), Some(status)) = (
            clean_text(payload.title_name),
            clean_text(payload.date_applied),
            clean_text(payload.current_status),
        ) else {
            return Err(missing_fields("title_name, date_applied, current_status"));
        };

        let date_applied = parse_date(&date_applied)?;
        let status = status
            .parse::<ApplicationStatus>()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(ApplicationRecord {
            company,
            title_name,
            date_applied,
            status,
            job_posting_url: clean_text(payload.job_posting_url),
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!(
            "Invalid date format for 'date_applied'. Expected YYYY-MM-DD, received '{value}'."
        ))
    })
}

fn missing_fields(fields: &str) -> AppError {
    AppError::Validation(format!("Missing required fields: {fields}."))
}
