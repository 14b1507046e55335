use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Resume,
    CoverLetter,
    JobDescription,
    Certificate,
    Other,
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid document_type: {0}. Must be one of RESUME, COVER_LETTER, JOB_DESCRIPTION, CERTIFICATE, OTHER")]
pub struct UnknownDocumentType(pub String);

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Resume => "RESUME",
            DocumentType::CoverLetter => "COVER_LETTER",
            DocumentType::JobDescription => "JOB_DESCRIPTION",
            DocumentType::Certificate => "CERTIFICATE",
            DocumentType::Other => "OTHER",
        }
    }
}

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "RESUME" | "CV" => Ok(DocumentType::Resume),
            "COVER_LETTER" => Ok(DocumentType::CoverLetter),
            "JOB_DESCRIPTION" => Ok(DocumentType::JobDescription),
            "CERTIFICATE" => Ok(DocumentType::Certificate),
            "OTHER" => Ok(DocumentType::Other),
            _ => Err(UnknownDocumentType(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the file dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DocumentListing {
    pub document_id: Uuid,
    pub application_id: Uuid,
    pub document_type: String,
    pub original_filename: String,
    pub file_path: String,
    pub upload_timestamp: DateTime<Utc>,
    pub company_id: Option<i32>,
    pub company_name_clean: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentsBody {
    pub documents: Vec<DocumentListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentUploaded {
    pub document_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_short_codes() {
        assert_eq!("resume".parse(), Ok(DocumentType::Resume));
        assert_eq!("cover_letter".parse(), Ok(DocumentType::CoverLetter));
        assert_eq!("Cover Letter".parse(), Ok(DocumentType::CoverLetter));
    }

    #[test]
    fn test_document_type_rejects_unknown() {
        assert!("selfie".parse::<DocumentType>().is_err());
    }
}
