use shared_types::Application;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::{ApplicationRecord, CompanyChoice};
use crate::companies::queries::{company_name, find_or_create_company};
use crate::documents::storage::FileStore;
use crate::errors::AppError;
use crate::models::application::{fold_application_rows, ApplicationJoinRow};

const CONTACT_COUNT: &str = r#"
    (SELECT COUNT(ct.id)
       FROM contacts ct
       JOIN company_name_mapping m ON ct.company = m.raw_name
      WHERE m.company_id = a.company_id) AS contact_count"#;

const NO_CONTACT_COUNT: &str = "NULL::BIGINT AS contact_count";

fn application_select(contact_count: &str, filter: &str) -> String {
    format!(
        r#"
        SELECT a.application_id, a.date_applied, a.current_status, a.job_posting_url,
               a.updated_at, c.company_id, c.company_name_clean,
               jt.job_title_id, jt.title_name,
               d.document_id, d.document_type, d.file_path, d.original_filename,
               {contact_count}
        FROM applications a
        LEFT JOIN companies c ON a.company_id = c.company_id
        LEFT JOIN job_titles jt ON a.job_title_id = jt.job_title_id
        LEFT JOIN job_documents d ON a.application_id = d.application_id
        WHERE {filter}
        ORDER BY a.date_applied DESC, a.application_id, d.upload_timestamp
        "#
    )
}

pub async fn list_for_company(
    pool: &PgPool,
    user_id: Uuid,
    company_id: i32,
) -> Result<Vec<Application>, AppError> {
    let sql = application_select(NO_CONTACT_COUNT, "a.user_id = $1 AND a.company_id = $2");
    let rows = sqlx::query_as::<_, ApplicationJoinRow>(&sql)
        .bind(user_id)
        .bind(company_id)
        .fetch_all(pool)
        .await?;
    fold_application_rows(rows)
}

pub async fn list_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<Application>, AppError> {
    let sql = application_select(CONTACT_COUNT, "a.user_id = $1");
    let rows = sqlx::query_as::<_, ApplicationJoinRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    fold_application_rows(rows)
}

pub async fn get_application(
    pool: &PgPool,
    user_id: Uuid,
    application_id: Uuid,
) -> Result<Application, AppError> {
    let mut conn = pool.acquire().await?;
    ensure_owner(&mut conn, application_id, user_id).await?;

    let sql = application_select(CONTACT_COUNT, "a.application_id = $1");
    let rows = sqlx::query_as::<_, ApplicationJoinRow>(&sql)
        .bind(application_id)
        .fetch_all(&mut *conn)
        .await?;
    fold_application_rows(rows)?
        .into_iter()
        .next()
        .ok_or_else(|| application_not_found(application_id))
}

/// Fails with 404 when the application does not exist and 403 when it belongs
/// to someone else.
pub async fn ensure_owner(
    conn: &mut PgConnection,
    application_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    let owner: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM applications WHERE application_id = $1")
            .bind(application_id)
            .fetch_optional(conn)
            .await?;

    match owner {
        None => Err(application_not_found(application_id)),
        Some(owner) if owner != user_id => Err(AppError::Forbidden(
            "Access denied: application belongs to another user.".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

pub async fn create_application(
    pool: &PgPool,
    user_id: Uuid,
    record: &ApplicationRecord,
) -> Result<Uuid, AppError> {
    let mut tx = pool.begin().await?;

    let company_id = resolve_company(&mut tx, &record.company).await?;
    let job_title_id = find_or_create_job_title(&mut tx, &record.title_name).await?;
    let application_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO applications
            (application_id, user_id, company_id, job_title_id, job_posting_url,
             date_applied, current_status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        "#,
    )
    .bind(application_id)
    .bind(user_id)
    .bind(company_id)
    .bind(job_title_id)
    .bind(&record.job_posting_url)
    .bind(record.date_applied)
    .bind(record.status.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(%application_id, company_id, "Application created");
    Ok(application_id)
}

/// Whole-record replace: omitted optional fields are stored as NULL.
pub async fn update_application(
    pool: &PgPool,
    user_id: Uuid,
    application_id: Uuid,
    record: &ApplicationRecord,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    ensure_owner(&mut tx, application_id, user_id).await?;
    let company_id = resolve_company(&mut tx, &record.company).await?;
    let job_title_id = find_or_create_job_title(&mut tx, &record.title_name).await?;

    sqlx::query(
        r#"
        UPDATE applications
           SET company_id = $1, job_title_id = $2, job_posting_url = $3,
               date_applied = $4, current_status = $5, updated_at = NOW()
         WHERE application_id = $6 AND user_id = $7
        "#,
    )
    .bind(company_id)
    .bind(job_title_id)
    .bind(&record.job_posting_url)
    .bind(record.date_applied)
    .bind(record.status.as_str())
    .bind(application_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(%application_id, "Application updated");
    Ok(())
}

/// Deletes the application and its document records, then removes the stored
/// files. Returns how many files were removed from disk.
pub async fn delete_application(
    pool: &PgPool,
    files: &FileStore,
    user_id: Uuid,
    application_id: Uuid,
) -> Result<usize, AppError> {
    let mut tx = pool.begin().await?;

    ensure_owner(&mut tx, application_id, user_id).await?;

    let document_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT document_id FROM job_documents WHERE application_id = $1")
            .bind(application_id)
            .fetch_all(&mut *tx)
            .await?;

    sqlx::query("DELETE FROM job_documents WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM applications WHERE application_id = $1 AND user_id = $2")
        .bind(application_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let mut removed = 0;
    for document_id in document_ids {
        match files.remove(document_id).await {
            Ok(true) => removed += 1,
            Ok(false) => warn!(%document_id, "Stored file already missing"),
            Err(e) => warn!(%document_id, "Failed to remove stored file: {e}"),
        }
    }

    info!(%application_id, files_removed = removed, "Application deleted");
    Ok(removed)
}

async fn resolve_company(conn: &mut PgConnection, company: &CompanyChoice) -> Result<i32, AppError> {
    match company {
        CompanyChoice::Id(company_id) => {
            company_name(conn, *company_id).await?;
            Ok(*company_id)
        }
        CompanyChoice::Name(name) => {
            let company = find_or_create_company(conn, name, false, None).await?;
            Ok(company.company_id)
        }
    }
}

/// Case-insensitive lookup; new titles are stored as typed.
pub async fn find_or_create_job_title(
    conn: &mut PgConnection,
    title_name: &str,
) -> Result<i32, AppError> {
    let existing: Option<i32> =
        sqlx::query_scalar("SELECT job_title_id FROM job_titles WHERE lower(title_name) = lower($1)")
            .bind(title_name)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some(job_title_id) = existing {
        return Ok(job_title_id);
    }

    Ok(sqlx::query_scalar(
        r#"
        INSERT INTO job_titles (title_name, standardized_title, created_at, updated_at)
        VALUES ($1, $1, NOW(), NOW())
        RETURNING job_title_id
        "#,
    )
    .bind(title_name)
    .fetch_one(&mut *conn)
    .await?)
}

pub fn application_not_found(application_id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {application_id} not found"))
}
