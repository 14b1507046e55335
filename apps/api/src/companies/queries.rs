use shared_types::{Company, CompanyContact, CompanyListing, CompanySummary, ContactListing};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::companies::CompanyRecord;
use crate::errors::AppError;

pub async fn list_companies(pool: &PgPool, user_id: Uuid) -> Result<Vec<CompanyListing>, AppError> {
    Ok(sqlx::query_as::<_, CompanyListing>(
        r#"
        SELECT c.company_id, c.company_name_clean, c.headquarters, c.size_employees,
               c.target_interest, c.annual_revenue, c.revenue_scale,
               (SELECT COUNT(a.application_id)
                  FROM applications a
                 WHERE a.company_id = c.company_id AND a.user_id = $1) AS application_count,
               (SELECT COUNT(ct.id)
                  FROM contacts ct
                  JOIN company_name_mapping m ON ct.company = m.raw_name
                 WHERE m.company_id = c.company_id) AS contact_count
        FROM companies c
        ORDER BY c.company_name_clean
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_company(pool: &PgPool, company_id: i32) -> Result<Company, AppError> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT company_id, company_name_clean, target_interest, headquarters,
               size_employees, annual_revenue, revenue_scale, notes
        FROM companies
        WHERE company_id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| company_not_found(company_id))
}

pub async fn create_company(pool: &PgPool, record: &CompanyRecord) -> Result<i32, AppError> {
    let company_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO companies
            (company_name_clean, target_interest, headquarters, size_employees,
             annual_revenue, revenue_scale, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING company_id
        "#,
    )
    .bind(&record.company_name_clean)
    .bind(record.target_interest)
    .bind(&record.headquarters)
    .bind(record.size_employees)
    .bind(record.annual_revenue)
    .bind(&record.revenue_scale)
    .bind(&record.notes)
    .fetch_one(pool)
    .await?;

    info!(company_id, name = %record.company_name_clean, "Company created");
    Ok(company_id)
}

/// Replaces every column of the profile; omitted optional fields become NULL.
pub async fn update_company(
    pool: &PgPool,
    company_id: i32,
    record: &CompanyRecord,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE companies
           SET company_name_clean = $1, target_interest = $2, headquarters = $3,
               size_employees = $4, annual_revenue = $5, revenue_scale = $6,
               notes = $7, updated_at = NOW()
         WHERE company_id = $8
        "#,
    )
    .bind(&record.company_name_clean)
    .bind(record.target_interest)
    .bind(&record.headquarters)
    .bind(record.size_employees)
    .bind(record.annual_revenue)
    .bind(&record.revenue_scale)
    .bind(&record.notes)
    .bind(company_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(company_not_found(company_id));
    }
    Ok(())
}

/// Detaches raw-name mappings and applications from the company, then deletes
/// it. The detached raw names go back to the reconciliation queue.
pub async fn delete_company(pool: &PgPool, company_id: i32) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let released = sqlx::query(
        r#"
        UPDATE company_name_mapping
           SET company_id = NULL, mapping_source = NULL, date_mapped = NULL
         WHERE company_id = $1
        "#,
    )
    .bind(company_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let detached = sqlx::query("UPDATE applications SET company_id = NULL WHERE company_id = $1")
        .bind(company_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM companies WHERE company_id = $1")
        .bind(company_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        // tx rolls back on drop
        return Err(company_not_found(company_id));
    }

    tx.commit().await?;
    info!(company_id, released, detached, "Company deleted");
    Ok(())
}

pub async fn raw_names_for_company(pool: &PgPool, company_id: i32) -> Result<Vec<String>, AppError> {
    ensure_company_exists(pool, company_id).await?;

    Ok(sqlx::query_scalar(
        "SELECT raw_name FROM company_name_mapping WHERE company_id = $1 ORDER BY raw_name",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?)
}

pub async fn contacts_for_company(
    pool: &PgPool,
    company_id: i32,
) -> Result<Vec<CompanyContact>, AppError> {
    ensure_company_exists(pool, company_id).await?;

    Ok(sqlx::query_as::<_, CompanyContact>(
        r#"
        SELECT ct.id AS contact_id, ct.first_name, ct.last_name, ct.email_address,
               ct.position, ct.connected_on, ct.url AS linkedin_url,
               m.raw_name AS associated_raw_name
        FROM contacts ct
        JOIN company_name_mapping m ON ct.company = m.raw_name
        WHERE m.company_id = $1
        ORDER BY ct.last_name, ct.first_name
        "#,
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?)
}

pub async fn sidebar_summaries(pool: &PgPool) -> Result<Vec<CompanySummary>, AppError> {
    Ok(sqlx::query_as::<_, CompanySummary>(
        r#"
        SELECT company_id, company_name_clean, target_interest AS is_target
        FROM companies
        ORDER BY company_name_clean
        "#,
    )
    .fetch_all(pool)
    .await?)
}

pub async fn all_contacts(pool: &PgPool) -> Result<Vec<ContactListing>, AppError> {
    Ok(sqlx::query_as::<_, ContactListing>(
        r#"
        SELECT ct.id AS contact_id, ct.first_name, ct.last_name, ct.url, ct.email_address,
               ct.company AS raw_company_name, ct.position, ct.connected_on,
               c.company_id, c.company_name_clean
        FROM contacts ct
        LEFT JOIN company_name_mapping m ON ct.company = m.raw_name
        LEFT JOIN companies c ON m.company_id = c.company_id
        ORDER BY ct.last_name, ct.first_name
        "#,
    )
    .fetch_all(pool)
    .await?)
}

pub struct ResolvedCompany {
    pub company_id: i32,
    pub company_name_clean: String,
    pub created: bool,
}

/// Looks a company up by exact clean name, inserting it when absent. An
/// existing company is returned untouched; `target_interest` and `notes` only
/// apply to a newly created one.
pub async fn find_or_create_company(
    conn: &mut PgConnection,
    company_name_clean: &str,
    target_interest: bool,
    notes: Option<&str>,
) -> Result<ResolvedCompany, AppError> {
    let existing: Option<i32> =
        sqlx::query_scalar("SELECT company_id FROM companies WHERE company_name_clean = $1")
            .bind(company_name_clean)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some(company_id) = existing {
        return Ok(ResolvedCompany {
            company_id,
            company_name_clean: company_name_clean.to_string(),
            created: false,
        });
    }

    let company_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO companies (company_name_clean, target_interest, notes, created_at, updated_at)
        VALUES ($1, $2, $3, NOW(), NOW())
        RETURNING company_id
        "#,
    )
    .bind(company_name_clean)
    .bind(target_interest)
    .bind(notes)
    .fetch_one(&mut *conn)
    .await?;

    info!(company_id, name = company_name_clean, "Company created from clean name");
    Ok(ResolvedCompany {
        company_id,
        company_name_clean: company_name_clean.to_string(),
        created: true,
    })
}

/// Returns the clean name of an existing company.
pub async fn company_name(conn: &mut PgConnection, company_id: i32) -> Result<String, AppError> {
    sqlx::query_scalar("SELECT company_name_clean FROM companies WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| company_not_found(company_id))
}

async fn ensure_company_exists(pool: &PgPool, company_id: i32) -> Result<(), AppError> {
    let found: Option<i32> = sqlx::query_scalar("SELECT company_id FROM companies WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(pool)
        .await?;
    found.map(|_| ()).ok_or_else(|| company_not_found(company_id))
}

pub fn company_not_found(company_id: i32) -> AppError {
    AppError::NotFound(format!("Company with ID {company_id} not found"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use shared_types::CompanyPayload;

    use super::*;
    use crate::reconcile::queries::{map_to_existing, unmapped_names};

    const USER: Uuid = Uuid::from_u128(0x1234_5678);
    const OTHER_USER: Uuid = Uuid::from_u128(0x9999);

    fn record(name: &str) -> CompanyRecord {
        CompanyRecord::from_payload(CompanyPayload {
            company_name_clean: Some(name.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    async fn add_contact(pool: &PgPool, company: &str) {
        sqlx::query("INSERT INTO contacts (first_name, last_name, company) VALUES ('Ada', 'Lovelace', $1)")
            .bind(company)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn add_application(pool: &PgPool, user_id: Uuid, company_id: i32) -> Uuid {
        let application_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO applications (application_id, user_id, company_id, date_applied) VALUES ($1, $2, $3, CURRENT_DATE)",
        )
        .bind(application_id)
        .bind(user_id)
        .bind(company_id)
        .execute(pool)
        .await
        .unwrap();
        application_id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_replaces_whole_record(pool: PgPool) {
        let full = CompanyRecord {
            company_name_clean: "Acme".into(),
            target_interest: true,
            headquarters: Some("Oslo".into()),
            size_employees: Some(40),
            annual_revenue: Some(1.5),
            revenue_scale: Some("M".into()),
            notes: Some("met at a fair".into()),
        };
        let company_id = create_company(&pool, &full).await.unwrap();

        let created = get_company(&pool, company_id).await.unwrap();
        assert_eq!(created.headquarters.as_deref(), Some("Oslo"));
        assert!(created.target_interest);

        let mut replacement = record("Acme Corp");
        replacement.size_employees = Some(55);
        update_company(&pool, company_id, &replacement).await.unwrap();

        let updated = get_company(&pool, company_id).await.unwrap();
        assert_eq!(updated.company_name_clean, "Acme Corp");
        assert_eq!(updated.size_employees, Some(55));
        assert_eq!(updated.headquarters, None);
        assert_eq!(updated.annual_revenue, None);
        assert_eq!(updated.revenue_scale, None);
        assert_eq!(updated.notes, None);
        assert!(!updated.target_interest);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_unknown_company_is_not_found(pool: PgPool) {
        let err = update_company(&pool, 4242, &record("Ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_name_is_conflict(pool: PgPool) {
        create_company(&pool, &record("Initech")).await.unwrap();
        let err = create_company(&pool, &record("Initech")).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_counts_user_applications_and_mapped_contacts(pool: PgPool) {
        let company_id = create_company(&pool, &record("Globex")).await.unwrap();
        add_contact(&pool, "Globex Corporation").await;
        add_contact(&pool, "Globex Corporation").await;
        map_to_existing(&pool, "Globex Corporation", company_id).await.unwrap();
        add_application(&pool, USER, company_id).await;
        add_application(&pool, OTHER_USER, company_id).await;

        let listed = list_companies(&pool, USER).await.unwrap();
        let globex = listed.iter().find(|c| c.company_id == company_id).unwrap();
        assert_eq!(globex.application_count, 1);
        assert_eq!(globex.contact_count, 2);

        let contacts = contacts_for_company(&pool, company_id).await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|c| c.associated_raw_name == "Globex Corporation"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_returns_raw_names_to_queue(pool: PgPool) {
        let company_id = create_company(&pool, &record("Hooli")).await.unwrap();
        add_contact(&pool, "Hooli XYZ").await;
        map_to_existing(&pool, "Hooli XYZ", company_id).await.unwrap();
        let application_id = add_application(&pool, USER, company_id).await;

        assert_eq!(
            raw_names_for_company(&pool, company_id).await.unwrap(),
            vec!["Hooli XYZ".to_string()]
        );
        assert!(unmapped_names(&pool).await.unwrap().is_empty());

        delete_company(&pool, company_id).await.unwrap();

        let listed = list_companies(&pool, USER).await.unwrap();
        assert!(listed.iter().all(|c| c.company_id != company_id));
        assert!(matches!(
            get_company(&pool, company_id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(unmapped_names(&pool).await.unwrap(), vec!["Hooli XYZ".to_string()]);

        let detached: Option<i32> =
            sqlx::query_scalar("SELECT company_id FROM applications WHERE application_id = $1")
                .bind(application_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(detached, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_unknown_company_is_not_found(pool: PgPool) {
        assert!(matches!(
            delete_company(&pool, 77).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_or_create_leaves_existing_company_untouched(pool: PgPool) {
        let mut hand_made = record("Umbrella");
        hand_made.notes = Some("written by hand".into());
        let company_id = create_company(&pool, &hand_made).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let resolved = find_or_create_company(&mut conn, "Umbrella", true, Some("auto"))
            .await
            .unwrap();
        assert_eq!(resolved.company_id, company_id);
        assert!(!resolved.created);

        let company = get_company(&pool, company_id).await.unwrap();
        assert!(!company.target_interest);
        assert_eq!(company.notes.as_deref(), Some("written by hand"));
    }
}
