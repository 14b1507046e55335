use shared_types::{DocumentListing, DocumentType};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

pub struct NewDocument<'a> {
    pub document_id: Uuid,
    pub application_id: Uuid,
    pub document_type: DocumentType,
    pub original_filename: &'a str,
    pub mime_type: &'a str,
    pub file_size: i64,
}

/// Download metadata for a document owned by the requesting user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredDocument {
    pub document_id: Uuid,
    pub original_filename: String,
    pub mime_type: Option<String>,
    pub user_id: Uuid,
}

pub async fn insert_document(pool: &PgPool, doc: &NewDocument<'_>) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO job_documents
            (document_id, application_id, document_type, original_filename,
             file_path, mime_type, file_size, upload_timestamp)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        "#,
    )
    .bind(doc.document_id)
    .bind(doc.application_id)
    .bind(doc.document_type.as_str())
    .bind(doc.original_filename)
    .bind(doc.document_id.to_string())
    .bind(doc.mime_type)
    .bind(doc.file_size)
    .execute(&mut *tx)
    .await?;

    touch_application(&mut tx, doc.application_id).await?;
    tx.commit().await?;

    info!(
        document_id = %doc.document_id,
        application_id = %doc.application_id,
        size = doc.file_size,
        "Document stored"
    );
    Ok(())
}

pub async fn list_documents(pool: &PgPool, user_id: Uuid) -> Result<Vec<DocumentListing>, AppError> {
    Ok(sqlx::query_as::<_, DocumentListing>(
        r#"
        SELECT d.document_id, d.application_id, d.document_type, d.original_filename,
               d.file_path, d.upload_timestamp, c.company_id, c.company_name_clean
        FROM job_documents d
        JOIN applications a ON d.application_id = a.application_id
        LEFT JOIN companies c ON a.company_id = c.company_id
        WHERE a.user_id = $1
        ORDER BY d.upload_timestamp DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn find_document(
    pool: &PgPool,
    document_id: Uuid,
    user_id: Uuid,
) -> Result<StoredDocument, AppError> {
    let doc = sqlx::query_as::<_, StoredDocument>(
        r#"
        SELECT d.document_id, d.original_filename, d.mime_type, a.user_id
        FROM job_documents d
        JOIN applications a ON d.application_id = a.application_id
        WHERE d.document_id = $1
        "#,
    )
    .bind(document_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| document_not_found(document_id))?;

    if doc.user_id != user_id {
        return Err(AppError::Forbidden(
            "Access denied: document belongs to another user.".to_string(),
        ));
    }
    Ok(doc)
}

pub async fn delete_document(pool: &PgPool, document_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let owner: Option<(Uuid, Uuid)> = sqlx::query_as(
        r#"
        SELECT a.application_id, a.user_id
        FROM job_documents d
        JOIN applications a ON d.application_id = a.application_id
        WHERE d.document_id = $1
        "#,
    )
    .bind(document_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (application_id, owner_id) = owner.ok_or_else(|| document_not_found(document_id))?;
    if owner_id != user_id {
        return Err(AppError::Forbidden(
            "Access denied: document belongs to another user.".to_string(),
        ));
    }

    sqlx::query("DELETE FROM job_documents WHERE document_id = $1")
        .bind(document_id)
        .execute(&mut *tx)
        .await?;
    touch_application(&mut tx, application_id).await?;

    tx.commit().await?;
    info!(%document_id, "Document record deleted");
    Ok(())
}

async fn touch_application(conn: &mut sqlx::PgConnection, application_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE applications SET updated_at = NOW() WHERE application_id = $1")
        .bind(application_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub fn document_not_found(document_id: Uuid) -> AppError {
    AppError::NotFound(format!("Document {document_id} not found"))
}
