use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;
use shared_types::DocumentType;

use crate::errors::AppError;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

/// A validated document upload.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub original_filename: String,
    pub mime_type: String,
    pub document_type: DocumentType,
    pub bytes: Bytes,
}

struct FilePart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Reads the multipart body. The file is taken from `file` (or the legacy
/// `document` key), the type from `document_type` (or `document_type_code`).
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<FilePart> = None;
    let mut document_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "document" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some(FilePart {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "document_type" | "document_type_code" => {
                document_type = Some(field.text().await?);
            }
            _ => {}
        }
    }

    validate_upload(file, document_type)
}

fn validate_upload(
    file: Option<FilePart>,
    document_type: Option<String>,
) -> Result<UploadForm, AppError> {
    let document_type = document_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing document_type.".to_string()))?
        .parse::<DocumentType>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let file = file.ok_or_else(|| AppError::Validation("No file part in the request.".to_string()))?;
    let raw_name = file
        .file_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No selected file.".to_string()))?;

    let original_filename = sanitize_filename(&raw_name)
        .ok_or_else(|| AppError::Validation(format!("Invalid file name '{raw_name}'.")))?;

    let extension = file_extension(&original_filename)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "File type not allowed. Allowed extensions: {}.",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

    Ok(UploadForm {
        mime_type: resolve_mime(file.content_type.as_deref(), &extension),
        original_filename,
        document_type,
        bytes: file.bytes,
    })
}

/// Reduces a client file name to a safe basename: path components are
/// dropped, whitespace becomes `_`, and anything outside `[A-Za-z0-9._-]` is
/// removed. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Uses the part's declared content type unless it is absent or generic, in
/// which case the type is derived from the extension.
pub fn resolve_mime(content_type: Option<&str>, extension: &str) -> String {
    match content_type.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => match extension {
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, content_type: Option<&str>) -> FilePart {
        FilePart {
            file_name: Some(name.to_string()),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(b"%PDF-1.7"),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Resume.pdf").as_deref(), Some("My_Resume.pdf"));
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("C:\\docs\\cv.docx").as_deref(), Some("cv.docx"));
        assert_eq!(sanitize_filename(".hidden.txt").as_deref(), Some("hidden.txt"));
        assert_eq!(sanitize_filename("résumé.pdf").as_deref(), Some("rsum.pdf"));
        assert_eq!(sanitize_filename("///"), None);
    }

    #[test]
    fn test_resolve_mime_prefers_declared_type() {
        assert_eq!(resolve_mime(Some("application/pdf"), "pdf"), "application/pdf");
        assert_eq!(resolve_mime(Some("application/octet-stream"), "txt"), "text/plain");
        assert_eq!(resolve_mime(None, "doc"), "application/msword");
    }

    #[test]
    fn test_validate_upload_accepts_allowed_file() {
        let form = validate_upload(
            Some(part("Cover Letter.PDF", None)),
            Some("cover_letter".to_string()),
        )
        .unwrap();
        assert_eq!(form.original_filename, "Cover_Letter.PDF");
        assert_eq!(form.mime_type, "application/pdf");
        assert_eq!(form.document_type, DocumentType::CoverLetter);
    }

    #[test]
    fn test_validate_upload_rejects_extension() {
        let err = validate_upload(Some(part("payload.exe", None)), Some("RESUME".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("not allowed")));
    }

    #[test]
    fn test_validate_upload_requires_type_and_file() {
        assert!(validate_upload(Some(part("cv.pdf", None)), None).is_err());
        assert!(validate_upload(Some(part("cv.pdf", None)), Some("selfie".into())).is_err());
        assert!(validate_upload(None, Some("RESUME".into())).is_err());
        assert!(validate_upload(Some(part("", None)), Some("RESUME".into())).is_err());
    }
}
