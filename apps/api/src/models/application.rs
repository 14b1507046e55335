use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{Application, ApplicationStatus, CompanyRef, DocumentRef, JobTitleRef};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// One row of the application listing join (companies, job titles, documents).
/// An application with N documents yields N rows; one with none yields a
/// single row with NULL document columns.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationJoinRow {
    pub application_id: Uuid,
    pub date_applied: NaiveDate,
    pub current_status: String,
    pub job_posting_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub company_id: Option<i32>,
    pub company_name_clean: Option<String>,
    pub job_title_id: Option<i32>,
    pub title_name: Option<String>,
    pub document_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub file_path: Option<String>,
    pub original_filename: Option<String>,
    pub contact_count: Option<i64>,
}

impl ApplicationJoinRow {
    fn document(&self) -> Option<DocumentRef> {
        Some(DocumentRef {
            document_id: self.document_id?,
            document_type: self.document_type.clone().unwrap_or_else(|| "OTHER".to_string()),
            file_path: self.file_path.clone(),
            original_filename: self.original_filename.clone().unwrap_or_default(),
        })
    }

    /// Fails when the stored status is not a known value; the row is reported
    /// instead of being shown under a guessed status.
    fn into_application(self) -> Result<Application, AppError> {
        let current_status = self.current_status.parse::<ApplicationStatus>().map_err(|e| {
            AppError::Internal(anyhow!(
                "Application {} has an unreadable stored status: {e}",
                self.application_id
            ))
        })?;
        let documents = self.document().into_iter().collect();
        let company_info = match (self.company_id, self.company_name_clean) {
            (Some(company_id), Some(company_name_clean)) => Some(CompanyRef {
                company_id,
                company_name_clean,
            }),
            _ => None,
        };
        let job_title_info = match (self.job_title_id, self.title_name) {
            (Some(job_title_id), Some(title_name)) => Some(JobTitleRef {
                job_title_id,
                title_name,
            }),
            _ => None,
        };

        Ok(Application {
            application_id: self.application_id,
            date_applied: self.date_applied,
            current_status,
            job_posting_url: self.job_posting_url,
            updated_at: self.updated_at,
            company_info,
            job_title_info,
            documents,
            contact_count: self.contact_count,
        })
    }
}

/// Folds joined rows into applications with nested documents, keeping the
/// order in which each application first appears.
pub fn fold_application_rows(rows: Vec<ApplicationJoinRow>) -> Result<Vec<Application>, AppError> {
    let mut applications: Vec<Application> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.application_id) {
            Some(&i) => {
                let app = &mut applications[i];
                if let Some(doc) = row.document() {
                    if !app.documents.iter().any(|d| d.document_id == doc.document_id) {
                        app.documents.push(doc);
                    }
                }
            }
            None => {
                index.insert(row.application_id, applications.len());
                applications.push(row.into_application()?);
            }
        }
    }

    Ok(applications)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(app: u128, doc: Option<u128>) -> ApplicationJoinRow {
        ApplicationJoinRow {
            application_id: Uuid::from_u128(app),
            date_applied: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            current_status: "APPLIED".to_string(),
            job_posting_url: None,
            updated_at: None,
            company_id: Some(7),
            company_name_clean: Some("Acme".to_string()),
            job_title_id: Some(3),
            title_name: Some("Engineer".to_string()),
            document_id: doc.map(Uuid::from_u128),
            document_type: doc.map(|_| "RESUME".to_string()),
            file_path: doc.map(|d| Uuid::from_u128(d).to_string()),
            original_filename: doc.map(|_| "cv.pdf".to_string()),
            contact_count: None,
        }
    }

    #[test]
    fn test_documents_nested_under_their_application() {
        let apps = fold_application_rows(vec![
            row(1, Some(10)),
            row(1, Some(11)),
            row(2, None),
        ])
        .unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].application_id, Uuid::from_u128(1));
        assert_eq!(apps[0].documents.len(), 2);
        assert!(apps[1].documents.is_empty());
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let apps =
            fold_application_rows(vec![row(5, None), row(2, Some(20)), row(5, Some(50))]).unwrap();
        let ids: Vec<_> = apps.iter().map(|a| a.application_id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(5), Uuid::from_u128(2)]);
        assert_eq!(apps[0].documents.len(), 1);
    }

    #[test]
    fn test_duplicate_document_rows_collapse() {
        let apps = fold_application_rows(vec![row(1, Some(10)), row(1, Some(10))]).unwrap();
        assert_eq!(apps[0].documents.len(), 1);
    }

    #[test]
    fn test_detached_company_is_none() {
        let mut detached = row(1, None);
        detached.company_id = None;
        detached.company_name_clean = None;
        let apps = fold_application_rows(vec![detached]).unwrap();
        assert!(apps[0].company_info.is_none());
        assert_eq!(apps[0].company_name(), "Unknown/Unstandardized Company");
        assert_eq!(apps[0].current_status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_legacy_status_spelling_is_normalized() {
        let mut legacy = row(1, None);
        legacy.current_status = "Interview".to_string();
        let apps = fold_application_rows(vec![legacy]).unwrap();
        assert_eq!(apps[0].current_status, ApplicationStatus::Interviewing);
    }

    #[test]
    fn test_unknown_stored_status_is_reported() {
        let mut garbled = row(1, None);
        garbled.current_status = "GHOSTED".to_string();
        let err = fold_application_rows(vec![row(2, None), garbled]).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(err.to_string().contains("GHOSTED"));
    }
}
