//! Typed calls for every backend route, all routed through the fetch guard.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use shared_types::{
    Application, ApplicationBody, ApplicationCreated, ApplicationPayload, ApplicationsBody,
    BatchOutcome, CompaniesBody, Company, CompanyBody, CompanyContact, CompanyIdBody,
    CompanyListing, CompanyPayload, CompanySuggestion, CompanySummary, ContactListing,
    ContactsBody, DocumentListing, DocumentType, DocumentUploaded, DocumentsBody, Empty,
    Envelope, MapBatchRequest, MapExistingRequest, MapNewRequest, MapSelfRequest,
    MappingOutcome, RawNamesBody, RegenerateOutcome, SidebarBody, SuggestionsBody,
    UnmappedListBody,
};
use uuid::Uuid;

use crate::guard::{FetchGuard, GuardError, Method, RequestOptions, Transport, UploadPart};

/// A downloaded document.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

pub struct ApiClient<T: Transport> {
    guard: FetchGuard<T>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(guard: FetchGuard<T>) -> Self {
        Self { guard }
    }

    async fn get<R: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, GuardError> {
        self.guard.fetch(operation, Method::Get, path, options).await
    }

    // ─── Companies ──────────────────────────────────────────────────────────

    pub async fn list_companies(&self) -> Result<Vec<CompanyListing>, GuardError> {
        let body: Envelope<CompaniesBody> =
            self.get("load companies", "/api/companies", RequestOptions::default()).await?;
        Ok(body.data.companies)
    }

    pub async fn get_company(&self, company_id: i32) -> Result<Company, GuardError> {
        let body: Envelope<CompanyBody> = self
            .get(
                "load company profile",
                &format!("/api/companies/{company_id}"),
                RequestOptions::default(),
            )
            .await?;
        Ok(body.data.company)
    }

    pub async fn create_company(&self, payload: &CompanyPayload) -> Result<Envelope<CompanyIdBody>, GuardError> {
        self.guard
            .fetch(
                "create company",
                Method::Post,
                "/api/companies",
                RequestOptions::json(payload)?,
            )
            .await
    }

    pub async fn update_company(
        &self,
        company_id: i32,
        payload: &CompanyPayload,
    ) -> Result<Envelope<Empty>, GuardError> {
        self.guard
            .fetch(
                "update company",
                Method::Put,
                &format!("/api/companies/{company_id}"),
                RequestOptions::json(payload)?,
            )
            .await
    }

    pub async fn delete_company(&self, company_id: i32) -> Result<(), GuardError> {
        self.guard
            .send_json(
                "delete company",
                Method::Delete,
                &format!("/api/companies/{company_id}"),
                RequestOptions::default(),
            )
            .await?;
        Ok(())
    }

    pub async fn company_raw_names(&self, company_id: i32) -> Result<Vec<String>, GuardError> {
        let body: Envelope<RawNamesBody> = self
            .get(
                "load raw names",
                &format!("/api/companies/{company_id}/raw_names"),
                RequestOptions::default(),
            )
            .await?;
        Ok(body.data.raw_names)
    }

    pub async fn company_contacts(&self, company_id: i32) -> Result<Vec<CompanyContact>, GuardError> {
        let body: Envelope<ContactsBody<CompanyContact>> = self
            .get(
                "load company contacts",
                &format!("/api/companies/{company_id}/contacts"),
                RequestOptions::default(),
            )
            .await?;
        Ok(body.data.contacts)
    }

    pub async fn sidebar(&self) -> Result<Vec<CompanySummary>, GuardError> {
        let body: Envelope<SidebarBody> =
            self.get("load sidebar", "/api/sidebar", RequestOptions::default()).await?;
        Ok(body.data.companies)
    }

    pub async fn all_contacts(&self) -> Result<Vec<ContactListing>, GuardError> {
        let body: Envelope<ContactsBody<ContactListing>> =
            self.get("load contacts", "/api/contacts/all", RequestOptions::default()).await?;
        Ok(body.data.contacts)
    }

    // ─── Reconciliation ─────────────────────────────────────────────────────

    pub async fn unmapped_list(&self) -> Result<Vec<String>, GuardError> {
        let body: Envelope<UnmappedListBody> = self
            .get("load unmapped names", "/api/unmapped_list", RequestOptions::default())
            .await?;
        Ok(body.data.raw_names.into_iter().map(|n| n.raw_name).collect())
    }

    pub async fn search_companies(&self, query: &str) -> Result<Vec<CompanySuggestion>, GuardError> {
        let body: Envelope<SuggestionsBody> = self
            .get(
                "search companies",
                "/api/search/company",
                RequestOptions::default().query("query", query),
            )
            .await?;
        Ok(body.data.companies)
    }

    pub async fn map_existing(
        &self,
        raw_name: &str,
        company_id: i32,
    ) -> Result<Envelope<MappingOutcome>, GuardError> {
        let req = MapExistingRequest {
            raw_name: raw_name.to_string(),
            company_id,
        };
        self.guard
            .fetch("map to existing company", Method::Post, "/api/map/existing", RequestOptions::json(&req)?)
            .await
    }

    pub async fn map_new(
        &self,
        raw_name: &str,
        company_name_clean: &str,
        target_interest: bool,
    ) -> Result<Envelope<MappingOutcome>, GuardError> {
        let req = MapNewRequest {
            raw_name: raw_name.to_string(),
            company_name_clean: company_name_clean.to_string(),
            target_interest,
        };
        self.guard
            .fetch("map to new company", Method::Post, "/api/map/new", RequestOptions::json(&req)?)
            .await
    }

    pub async fn map_self(&self, raw_name: &str) -> Result<Envelope<MappingOutcome>, GuardError> {
        let req = MapSelfRequest {
            raw_name: raw_name.to_string(),
        };
        self.guard
            .fetch("self-map company", Method::Post, "/api/map/self", RequestOptions::json(&req)?)
            .await
    }

    pub async fn map_batch(&self, target_interest: bool) -> Result<Envelope<BatchOutcome>, GuardError> {
        let req = MapBatchRequest { target_interest };
        self.guard
            .fetch("batch self-map", Method::Post, "/api/map/batch", RequestOptions::json(&req)?)
            .await
    }

    pub async fn regenerate_unmapped(&self) -> Result<Envelope<RegenerateOutcome>, GuardError> {
        self.guard
            .fetch(
                "regenerate unmapped names",
                Method::Post,
                "/api/unmapped/regenerate",
                RequestOptions::default(),
            )
            .await
    }

    // ─── Applications ───────────────────────────────────────────────────────

    pub async fn applications_for_company(&self, company_id: i32) -> Result<Vec<Application>, GuardError> {
        let body: Envelope<ApplicationsBody> = self
            .get(
                "load company applications",
                "/api/applications",
                RequestOptions::default().query("company_id", company_id.to_string()),
            )
            .await?;
        Ok(body.data.applications)
    }

    pub async fn all_applications(&self) -> Result<Vec<Application>, GuardError> {
        let body: Envelope<ApplicationsBody> = self
            .get("load applications", "/api/applications/all", RequestOptions::default())
            .await?;
        Ok(body.data.applications)
    }

    pub async fn get_application(&self, application_id: Uuid) -> Result<Application, GuardError> {
        let body: Envelope<ApplicationBody> = self
            .get(
                "load application",
                &format!("/api/application/{application_id}"),
                RequestOptions::default(),
            )
            .await?;
        Ok(body.data.application)
    }

    pub async fn create_application(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<Envelope<ApplicationCreated>, GuardError> {
        self.guard
            .fetch(
                "create application",
                Method::Post,
                "/api/applications",
                RequestOptions::json(payload)?,
            )
            .await
    }

    pub async fn update_application(
        &self,
        application_id: Uuid,
        payload: &ApplicationPayload,
    ) -> Result<Envelope<Empty>, GuardError> {
        self.guard
            .fetch(
                "update application",
                Method::Put,
                &format!("/api/applications/{application_id}"),
                RequestOptions::json(payload)?,
            )
            .await
    }

    pub async fn delete_application(&self, application_id: Uuid) -> Result<Envelope<Empty>, GuardError> {
        self.guard
            .fetch(
                "delete application",
                Method::Delete,
                &format!("/api/applications/{application_id}"),
                RequestOptions::default(),
            )
            .await
    }

    // ─── Documents ──────────────────────────────────────────────────────────

    pub async fn upload_document(
        &self,
        application_id: Uuid,
        document_type: DocumentType,
        file: UploadPart,
    ) -> Result<Envelope<DocumentUploaded>, GuardError> {
        let options = RequestOptions::multipart(
            vec![("document_type".to_string(), document_type.as_str().to_string())],
            vec![file],
        );
        self.guard
            .fetch(
                "upload document",
                Method::Post,
                &format!("/api/application/{application_id}/documents"),
                options,
            )
            .await
    }

    pub async fn all_documents(&self) -> Result<Vec<DocumentListing>, GuardError> {
        let body: Envelope<DocumentsBody> = self
            .get("load documents", "/api/documents/all", RequestOptions::default())
            .await?;
        Ok(body.data.documents)
    }

    pub async fn download_document(&self, document_id: Uuid) -> Result<Download, GuardError> {
        let response = self
            .guard
            .send(
                "download document",
                Method::Get,
                &format!("/api/documents/{document_id}"),
                RequestOptions::default(),
            )
            .await?;
        Ok(Download {
            file_name: response
                .header("content-disposition")
                .and_then(attachment_file_name),
            content_type: response.header("content-type").map(str::to_string),
            bytes: response.body,
        })
    }

    pub async fn delete_document(&self, document_id: Uuid) -> Result<Envelope<Empty>, GuardError> {
        self.guard
            .fetch(
                "delete document",
                Method::Delete,
                &format!("/api/documents/{document_id}"),
                RequestOptions::default(),
            )
            .await
    }

    pub async fn health(&self) -> Result<serde_json::Value, GuardError> {
        self.guard
            .send_json("database check", Method::Get, "/api/db_test", RequestOptions::default())
            .await
    }
}

/// Pulls the file name out of `attachment; filename="..."`.
fn attachment_file_name(disposition: &str) -> Option<String> {
    disposition.split(';').map(str::trim).find_map(|part| {
        let value = part.strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}
