use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use shared_types::{DocumentUploaded, DocumentsBody, Empty, Envelope};
use tracing::warn;
use uuid::Uuid;

use crate::applications::queries::ensure_owner;
use crate::auth::AuthUser;
use crate::documents::queries::{self, NewDocument};
use crate::documents::upload::read_upload_form;
use crate::errors::AppError;
use crate::extract::ApiPath;
use crate::state::AppState;

/// POST /api/application/:id/documents
pub async fn handle_upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(application_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<DocumentUploaded>>), AppError> {
    let form = read_upload_form(multipart).await?;

    let mut conn = state.db.acquire().await?;
    ensure_owner(&mut conn, application_id, user.user_id).await?;
    drop(conn);

    let document_id = Uuid::new_v4();
    state.files.write(document_id, &form.bytes).await?;

    let doc = NewDocument {
        document_id,
        application_id,
        document_type: form.document_type,
        original_filename: &form.original_filename,
        mime_type: &form.mime_type,
        file_size: form.bytes.len() as i64,
    };
    if let Err(e) = queries::insert_document(&state.db, &doc).await {
        if let Err(io) = state.files.remove(document_id).await {
            warn!(%document_id, "Failed to remove orphaned upload: {io}");
        }
        return Err(e);
    }

    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::success(DocumentUploaded { document_id })
                .with_message("Document uploaded successfully."),
        ),
    ))
}

/// GET /api/documents/all
pub async fn handle_all_documents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Envelope<DocumentsBody>>, AppError> {
    let documents = queries::list_documents(&state.db, user.user_id).await?;
    Ok(Json(Envelope::success(DocumentsBody { documents })))
}

/// GET /api/documents/:id
/// Streams the stored file back as an attachment under its original name.
pub async fn handle_download_document(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(document_id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let doc = queries::find_document(&state.db, document_id, user.user_id).await?;

    let bytes = match state.files.read(document_id).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found on server.".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let mime_type = doc
        .mime_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        doc.original_filename.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/documents/:id
/// Deletes the record first; a file that is already gone is not an error.
pub async fn handle_delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(document_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    queries::delete_document(&state.db, document_id, user.user_id).await?;

    let message = match state.files.remove(document_id).await {
        Ok(true) => "Document deleted successfully.".to_string(),
        Ok(false) => {
            warn!(%document_id, "Stored file already missing");
            "Document record deleted; the stored file was already missing.".to_string()
        }
        Err(e) => {
            warn!(%document_id, "Failed to remove stored file: {e}");
            format!("Document record deleted, but the stored file could not be removed: {e}")
        }
    };

    Ok(Json(Envelope::success(Empty {}).with_message(message)))
}
