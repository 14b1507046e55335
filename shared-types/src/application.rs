use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pipeline status of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    New,
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Withdrawn,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown application status '{0}'. Expected one of NEW, APPLIED, INTERVIEWING, OFFER, REJECTED, WITHDRAWN")]
pub struct UnknownStatus(pub String);

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::New,
        ApplicationStatus::Applied,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::New => "NEW",
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Interviewing => "INTERVIEWING",
            ApplicationStatus::Offer => "OFFER",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; also accepts the legacy spellings older pages sent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "NEW" | "DRAFT" => Ok(ApplicationStatus::New),
            "APPLIED" | "SUBMITTED" => Ok(ApplicationStatus::Applied),
            "INTERVIEWING" | "INTERVIEW" | "INTERVIEWED" | "IN_PROGRESS" => {
                Ok(ApplicationStatus::Interviewing)
            }
            "OFFER" | "OFFERED" | "OFFER_RECEIVED" => Ok(ApplicationStatus::Offer),
            "REJECTED" | "DECLINED" => Ok(ApplicationStatus::Rejected),
            "WITHDRAWN" | "WITHDREW" => Ok(ApplicationStatus::Withdrawn),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/applications` and `PUT /api/applications/{id}`.
///
/// Create accepts either `company_id` or `company_name_clean` (the company is
/// created when the name is unknown). Update requires `company_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplicationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name_clean: Option<String>,
    #[serde(default)]
    pub title_name: Option<String>,
    #[serde(default)]
    pub date_applied: Option<String>,
    #[serde(default, alias = "status")]
    pub current_status: Option<String>,
    #[serde(default, alias = "job_url")]
    pub job_posting_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyRef {
    pub company_id: i32,
    pub company_name_clean: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobTitleRef {
    pub job_title_id: i32,
    pub title_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRef {
    pub document_id: Uuid,
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub original_filename: String,
}

/// An application with its company, job title and attached documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub application_id: Uuid,
    pub date_applied: NaiveDate,
    pub current_status: ApplicationStatus,
    #[serde(default)]
    pub job_posting_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub company_info: Option<CompanyRef>,
    pub job_title_info: Option<JobTitleRef>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    /// Only filled by the all-applications listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_count: Option<i64>,
}

impl Application {
    pub fn company_name(&self) -> &str {
        self.company_info
            .as_ref()
            .map(|c| c.company_name_clean.as_str())
            .unwrap_or("Unknown/Unstandardized Company")
    }

    pub fn job_title(&self) -> &str {
        self.job_title_info
            .as_ref()
            .map(|t| t.title_name.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationsBody {
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationBody {
    pub application: Application,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationCreated {
    pub application_id: Uuid,
}
