pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::companies::handlers as companies;
use crate::documents::handlers as documents;
use crate::reconcile::handlers as reconcile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/db_test", get(health::db_test_handler))
        // Companies
        .route(
            "/api/companies",
            get(companies::handle_list_companies).post(companies::handle_create_company),
        )
        .route(
            "/api/companies/:id",
            get(companies::handle_get_company)
                .put(companies::handle_update_company)
                .delete(companies::handle_delete_company),
        )
        .route(
            "/api/companies/:id/raw_names",
            get(companies::handle_company_raw_names),
        )
        .route(
            "/api/companies/:id/contacts",
            get(companies::handle_company_contacts),
        )
        .route("/api/sidebar", get(companies::handle_sidebar))
        .route("/api/contacts/all", get(companies::handle_all_contacts))
        // Raw-name reconciliation
        .route("/api/unmapped_list", get(reconcile::handle_unmapped_list))
        .route("/api/next_company", get(reconcile::handle_next_company))
        .route(
            "/api/unmapped/regenerate",
            post(reconcile::handle_regenerate_unmapped),
        )
        .route("/api/search/company", get(reconcile::handle_search_companies))
        .route("/api/search_companies", get(reconcile::handle_search_companies))
        .route("/api/map/existing", post(reconcile::handle_map_existing))
        .route("/api/map/new", post(reconcile::handle_map_new))
        .route("/api/map/self", post(reconcile::handle_map_self))
        .route("/api/map/batch", post(reconcile::handle_map_batch))
        .route("/api/map_company", post(reconcile::handle_map_company))
        // Applications
        .route(
            "/api/applications",
            get(applications::handle_applications_by_company)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/applications/all",
            get(applications::handle_all_applications),
        )
        .route(
            "/api/applications/:id",
            put(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/application/:id",
            get(applications::handle_get_application),
        )
        // Documents
        .route(
            "/api/application/:id/documents",
            post(documents::handle_upload_document),
        )
        .route("/api/documents/all", get(documents::handle_all_documents))
        .route(
            "/api/documents/:id",
            get(documents::handle_download_document).delete(documents::handle_delete_document),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::documents::storage::FileStore;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// Router over a pool that never connects; only paths that fail before
    /// touching the database can be exercised.
    fn test_router() -> Router {
        let config = Config::for_tests(std::env::temp_dir().join("jobassist-router-tests"));
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let files = FileStore::new(config.upload_folder.clone());
        build_router(AppState { db, config, files })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer MOCK_TOKEN")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jobassist-api");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (status, body) = send(get_request("/api/companies", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_blank_bearer_is_unauthorized() {
        let request = Request::builder()
            .uri("/api/sidebar")
            .header(header::AUTHORIZATION, "Bearer ")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_search_query_too_short() {
        let (status, body) = send(get_request("/api/search/company?query=a", Some("t"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = send(get_request("/api/search_companies", Some("t"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_applications_require_company_id() {
        let (status, body) = send(get_request("/api/applications", Some("t"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_invalid_path_id_is_bad_request() {
        let (status, body) = send(get_request("/api/application/not-a-uuid", Some("t"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_company_requires_name() {
        let (status, body) = send(post_json("/api/companies", r#"{"headquarters": "Oslo"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("company_name_clean"));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let (status, body) = send(post_json("/api/map/existing", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_malformed_batch_body_is_bad_request() {
        let (status, body) = send(post_json("/api/map/batch", "{\"target_interest\": ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_map_self_rejects_blank_raw_name() {
        let (status, _) = send(post_json("/api/map/self", r#"{"raw_name": "  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_application_rejects_bad_date() {
        let (status, body) = send(post_json(
            "/api/applications",
            r#"{"company_name_clean": "Acme", "title_name": "Dev",
                "date_applied": "yesterday", "current_status": "APPLIED"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("YYYY-MM-DD"));
    }
}
