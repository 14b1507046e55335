use shared_types::{BatchOutcome, CompanySuggestion, MappingAction, MappingOutcome, MappingState};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::companies::queries::{company_name, find_or_create_company};
use crate::errors::AppError;
use crate::reconcile::{already_mapped, auto_created_note, mapped_company_name};
use crate::reconcile::search::{SearchTerm, MAX_SUGGESTIONS};

/// Unprocessed raw names: mapping rows still waiting for a company, plus
/// contact company strings that have no mapping row yet.
const UNMAPPED_SQL: &str = r#"
    SELECT raw_name FROM company_name_mapping WHERE company_id IS NULL
    UNION
    SELECT ct.company
      FROM contacts ct
      LEFT JOIN company_name_mapping m ON ct.company = m.raw_name
     WHERE m.raw_name IS NULL
       AND ct.company IS NOT NULL
       AND btrim(ct.company) <> ''
"#;

pub async fn unmapped_names(pool: &PgPool) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar(&format!("{UNMAPPED_SQL} ORDER BY 1"))
        .fetch_all(pool)
        .await?)
}

pub async fn next_unmapped(pool: &PgPool) -> Result<Option<String>, AppError> {
    Ok(sqlx::query_scalar(&format!("{UNMAPPED_SQL} ORDER BY 1 LIMIT 1"))
        .fetch_optional(pool)
        .await?)
}

/// Current reconciliation state of a raw name, or `None` when the name is
/// neither in the mapping table nor on any contact.
pub async fn mapping_state(
    conn: &mut PgConnection,
    raw_name: &str,
) -> Result<Option<MappingState>, AppError> {
    let row: Option<(Option<i32>, Option<String>)> = sqlx::query_as(
        "SELECT company_id, mapping_source FROM company_name_mapping WHERE raw_name = $1",
    )
    .bind(raw_name)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some((None, _)) => Ok(Some(MappingState::Unprocessed)),
        Some((Some(_), source)) => Ok(Some(
            source
                .as_deref()
                .and_then(MappingAction::from_source)
                .map(MappingAction::resulting_state)
                // rows mapped before mapping_source existed
                .unwrap_or(MappingState::MappedExisting),
        )),
        None => {
            let on_contact: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM contacts WHERE company = $1)")
                    .bind(raw_name)
                    .fetch_one(&mut *conn)
                    .await?;
            Ok(on_contact.then_some(MappingState::Unprocessed))
        }
    }
}

async fn ensure_can_apply(
    conn: &mut PgConnection,
    raw_name: &str,
    action: MappingAction,
) -> Result<(), AppError> {
    let state = mapping_state(conn, raw_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Raw name '{raw_name}' not found.")))?;
    state
        .apply(action)
        .map(|_| ())
        .ok_or_else(|| already_mapped(raw_name))
}

/// Points the raw name at a company. Only unprocessed rows are updated, so the
/// loser of a concurrent mapping race affects no rows and gets a conflict.
async fn claim_raw_name(
    conn: &mut PgConnection,
    raw_name: &str,
    company_id: i32,
    action: MappingAction,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO company_name_mapping (raw_name, company_id, mapping_source, date_mapped)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (raw_name) DO UPDATE
           SET company_id = EXCLUDED.company_id,
               mapping_source = EXCLUDED.mapping_source,
               date_mapped = EXCLUDED.date_mapped
         WHERE company_name_mapping.company_id IS NULL
        "#,
    )
    .bind(raw_name)
    .bind(company_id)
    .bind(action.as_str())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(already_mapped(raw_name));
    }
    Ok(())
}

pub async fn map_to_existing(
    pool: &PgPool,
    raw_name: &str,
    company_id: i32,
) -> Result<MappingOutcome, AppError> {
    let mut tx = pool.begin().await?;
    ensure_can_apply(&mut *tx, raw_name, MappingAction::Existing).await?;
    let company_name_clean = company_name(&mut *tx, company_id).await?;
    claim_raw_name(&mut *tx, raw_name, company_id, MappingAction::Existing).await?;
    tx.commit().await?;

    info!(raw_name, company_id, "Raw name mapped to existing company");
    Ok(MappingOutcome {
        raw_name: raw_name.to_string(),
        company_id,
        company_name_clean,
        action: MappingAction::Existing,
        company_created: false,
    })
}

/// Maps the raw name to the company with the given clean name, creating the
/// company when no profile with that name exists. Used for both the `new` and
/// `self` actions; a reused company keeps its own target flag.
pub async fn map_to_named(
    pool: &PgPool,
    raw_name: &str,
    company_name_clean: &str,
    target_interest: bool,
    action: MappingAction,
) -> Result<MappingOutcome, AppError> {
    let company_name_clean = mapped_company_name(action, raw_name, company_name_clean)?;
    let note = auto_created_note(raw_name);
    let mut tx = pool.begin().await?;
    ensure_can_apply(&mut *tx, raw_name, action).await?;
    let company =
        find_or_create_company(&mut *tx, company_name_clean, target_interest, Some(&note)).await?;
    claim_raw_name(&mut *tx, raw_name, company.company_id, action).await?;
    tx.commit().await?;

    info!(
        raw_name,
        company_id = company.company_id,
        action = action.as_str(),
        created = company.created,
        "Raw name mapped"
    );
    Ok(MappingOutcome {
        raw_name: raw_name.to_string(),
        company_id: company.company_id,
        company_name_clean: company.company_name_clean,
        action,
        company_created: company.created,
    })
}

/// Self-maps every remaining unprocessed raw name. Each name is mapped in its
/// own transaction; failures are counted and do not stop the batch.
pub async fn map_all_to_self(pool: &PgPool, target_interest: bool) -> Result<BatchOutcome, AppError> {
    let names = unmapped_names(pool).await?;
    let mut outcome = BatchOutcome {
        processed_count: 0,
        failed_count: 0,
    };

    for raw_name in &names {
        match map_to_named(pool, raw_name, raw_name, target_interest, MappingAction::SelfMap).await {
            Ok(_) => outcome.processed_count += 1,
            Err(e) => {
                warn!(raw_name = %raw_name, "Batch self-map failed: {e}");
                outcome.failed_count += 1;
            }
        }
    }

    info!(
        processed = outcome.processed_count,
        failed = outcome.failed_count,
        "Batch self-map finished"
    );
    Ok(outcome)
}

/// Adds an unprocessed mapping row for every contact company string missing
/// from the mapping table. Safe to run repeatedly.
pub async fn regenerate_unmapped(pool: &PgPool) -> Result<u64, AppError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO company_name_mapping (raw_name, company_id)
        SELECT DISTINCT ct.company, NULL::INTEGER
          FROM contacts ct
          LEFT JOIN company_name_mapping m ON ct.company = m.raw_name
         WHERE m.raw_name IS NULL
           AND ct.company IS NOT NULL
           AND btrim(ct.company) <> ''
        ON CONFLICT (raw_name) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?
    .rows_affected();

    info!(inserted, "Unmapped raw names regenerated");
    Ok(inserted)
}

pub async fn search_companies(
    pool: &PgPool,
    term: &SearchTerm,
) -> Result<Vec<CompanySuggestion>, AppError> {
    Ok(sqlx::query_as::<_, CompanySuggestion>(
        r#"
        SELECT company_id, company_name_clean
        FROM companies
        WHERE company_name_clean ILIKE $3
        ORDER BY CASE
                   WHEN company_name_clean ILIKE $1 THEN 0
                   WHEN company_name_clean ILIKE $2 THEN 1
                   ELSE 2
                 END,
                 company_name_clean
        LIMIT $4
        "#,
    )
    .bind(&term.exact)
    .bind(&term.prefix)
    .bind(&term.contains)
    .bind(MAX_SUGGESTIONS)
    .fetch_all(pool)
    .await?)
}
