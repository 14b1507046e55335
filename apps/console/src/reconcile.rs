//! Operator session for resolving unmapped raw company names.
//!
//! The session holds the queue of unprocessed names, the name being worked on
//! (the first one is selected automatically), and the existing company picked
//! from the suggestions. A successful action removes the name from the queue
//! and advances to the next one; a failed action leaves everything in place.

use shared_types::{CompanySuggestion, Envelope, MappingAction, MappingOutcome, MappingState};
use thiserror::Error;
use tracing::info;

use crate::api::ApiClient;
use crate::guard::{GuardError, Transport};

/// Queries shorter than this are not sent to the server.
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("No raw name is selected.")]
    NoCurrentName,

    #[error("Select an existing company first.")]
    NoCompanySelected,

    #[error("A clean company name is required.")]
    MissingCleanName,

    #[error(transparent)]
    Guard(#[from] GuardError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    /// Link to the selected existing company.
    Existing,
    New {
        company_name_clean: String,
        target_interest: bool,
    },
    SelfMap,
}

impl PendingAction {
    pub fn mapping_action(&self) -> MappingAction {
        match self {
            PendingAction::Existing => MappingAction::Existing,
            PendingAction::New { .. } => MappingAction::New,
            PendingAction::SelfMap => MappingAction::SelfMap,
        }
    }
}

#[derive(Debug, Default)]
pub struct ReconcileSession {
    queue: Vec<String>,
    current: Option<String>,
    selected: Option<CompanySuggestion>,
    resolved: Vec<(String, MappingState)>,
}

impl ReconcileSession {
    /// Duplicate names collapse, keeping first-seen order.
    pub fn new(names: Vec<String>) -> Self {
        let mut queue: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !queue.contains(&name) {
                queue.push(name);
            }
        }
        let current = queue.first().cloned();
        Self {
            queue,
            current,
            selected: None,
            resolved: Vec::new(),
        }
    }

    pub async fn load<T: Transport>(api: &ApiClient<T>) -> Result<Self, GuardError> {
        Ok(Self::new(api.unmapped_list().await?))
    }

    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn selected_company(&self) -> Option<&CompanySuggestion> {
        self.selected.as_ref()
    }

    pub fn resolved(&self) -> &[(String, MappingState)] {
        &self.resolved
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Switches to another queued name. Clears the company selection.
    pub fn select_raw_name(&mut self, raw_name: &str) -> bool {
        if !self.queue.iter().any(|n| n == raw_name) {
            return false;
        }
        self.current = Some(raw_name.to_string());
        self.selected = None;
        true
    }

    pub fn select_company(&mut self, company: CompanySuggestion) {
        self.selected = Some(company);
    }

    pub async fn suggestions<T: Transport>(
        &self,
        api: &ApiClient<T>,
        query: &str,
    ) -> Result<Vec<CompanySuggestion>, GuardError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        api.search_companies(query).await
    }

    /// Applies the action to the current raw name.
    pub async fn apply<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        action: PendingAction,
    ) -> Result<Envelope<MappingOutcome>, ReconcileError> {
        let raw_name = self.current.clone().ok_or(ReconcileError::NoCurrentName)?;

        let result = match &action {
            PendingAction::Existing => {
                let company = self
                    .selected
                    .as_ref()
                    .ok_or(ReconcileError::NoCompanySelected)?;
                api.map_existing(&raw_name, company.company_id).await?
            }
            PendingAction::New {
                company_name_clean,
                target_interest,
            } => {
                let clean = company_name_clean.trim();
                if clean.is_empty() {
                    return Err(ReconcileError::MissingCleanName);
                }
                api.map_new(&raw_name, clean, *target_interest).await?
            }
            PendingAction::SelfMap => api.map_self(&raw_name).await?,
        };

        let state = action.mapping_action().resulting_state();
        info!(raw_name = %raw_name, ?state, "Raw name resolved");
        self.complete(&raw_name, state);
        Ok(result)
    }

    fn complete(&mut self, raw_name: &str, state: MappingState) {
        self.queue.retain(|n| n != raw_name);
        self.resolved.push((raw_name.to_string(), state));
        self.current = self.queue.first().cloned();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::guard::testing::{json_response, ScriptedTransport};
    use crate::guard::{AuthGate, FetchGuard, GuardConfig, HttpResponse, RequestBody, TransportError};

    fn api(script: Vec<Result<HttpResponse, TransportError>>) -> (ApiClient<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(script));
        let guard = FetchGuard::new(
            transport.clone(),
            AuthGate::ready(Some("t".into())),
            GuardConfig::new("http://api.test"),
        );
        (ApiClient::new(guard), transport)
    }

    fn mapped(raw_name: &str, action: &str) -> Result<HttpResponse, TransportError> {
        json_response(
            200,
            json!({
                "status": "success",
                "message": "mapped",
                "raw_name": raw_name,
                "company_id": 11,
                "company_name_clean": raw_name,
                "action": action,
                "company_created": true
            }),
        )
    }

    fn session() -> ReconcileSession {
        ReconcileSession::new(vec![
            "Acme Inc".to_string(),
            "Globex".to_string(),
            "Acme Inc".to_string(),
            "Initech".to_string(),
        ])
    }

    #[test]
    fn test_new_session_dedups_and_selects_first() {
        let session = session();
        assert_eq!(session.queue(), ["Acme Inc", "Globex", "Initech"]);
        assert_eq!(session.current(), Some("Acme Inc"));
        assert!(!session.is_done());
    }

    #[test]
    fn test_select_raw_name_only_from_queue() {
        let mut session = session();
        session.select_company(CompanySuggestion {
            company_id: 1,
            company_name_clean: "Acme".into(),
        });
        assert!(session.select_raw_name("Globex"));
        assert_eq!(session.current(), Some("Globex"));
        assert!(session.selected_company().is_none());
        assert!(!session.select_raw_name("Umbrella"));
        assert_eq!(session.current(), Some("Globex"));
    }

    #[tokio::test]
    async fn test_success_removes_name_and_advances() {
        let (api, transport) = api(vec![mapped("Acme Inc", "self")]);
        let mut session = session();

        let outcome = session.apply(&api, PendingAction::SelfMap).await.unwrap();
        assert_eq!(outcome.data.action, MappingAction::SelfMap);
        assert_eq!(session.queue(), ["Globex", "Initech"]);
        assert_eq!(session.current(), Some("Globex"));
        assert_eq!(
            session.resolved(),
            [("Acme Inc".to_string(), MappingState::SelfMapped)]
        );

        let request = &transport.requests()[0];
        assert!(request.url.ends_with("/api/map/self"));
        assert_eq!(request.body, RequestBody::Json(json!({"raw_name": "Acme Inc"})));
    }

    #[tokio::test]
    async fn test_failure_keeps_name() {
        let (api, _) = api(vec![json_response(
            409,
            json!({"status": "error", "message": "Raw name 'Acme Inc' is already mapped."}),
        )]);
        let mut session = session();

        let err = session.apply(&api, PendingAction::SelfMap).await.unwrap_err();
        assert_eq!(err.to_string(), "Raw name 'Acme Inc' is already mapped.");
        assert_eq!(session.queue().len(), 3);
        assert_eq!(session.current(), Some("Acme Inc"));
        assert!(session.resolved().is_empty());
    }

    #[tokio::test]
    async fn test_existing_requires_selected_company() {
        let (api, transport) = api(Vec::new());
        let mut session = session();
        let err = session.apply(&api, PendingAction::Existing).await.unwrap_err();
        assert!(matches!(err, ReconcileError::NoCompanySelected));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_existing_sends_selected_company() {
        let (api, transport) = api(vec![mapped("Acme Inc", "existing")]);
        let mut session = session();
        session.select_company(CompanySuggestion {
            company_id: 11,
            company_name_clean: "Acme".into(),
        });
        session.apply(&api, PendingAction::Existing).await.unwrap();

        assert_eq!(
            transport.requests()[0].body,
            RequestBody::Json(json!({"raw_name": "Acme Inc", "company_id": 11}))
        );
        assert!(session.selected_company().is_none());
    }

    #[tokio::test]
    async fn test_new_requires_clean_name() {
        let (api, transport) = api(Vec::new());
        let mut session = session();
        let err = session
            .apply(
                &api,
                PendingAction::New {
                    company_name_clean: "  ".into(),
                    target_interest: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::MissingCleanName));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_last_name_finishes_session() {
        let (api, _) = api(vec![mapped("Solo", "self")]);
        let mut session = ReconcileSession::new(vec!["Solo".to_string()]);
        session.apply(&api, PendingAction::SelfMap).await.unwrap();
        assert!(session.is_done());
        assert_eq!(session.current(), None);

        let err = session.apply(&api, PendingAction::SelfMap).await.unwrap_err();
        assert!(matches!(err, ReconcileError::NoCurrentName));
    }

    #[tokio::test]
    async fn test_short_search_skips_request() {
        let (api, transport) = api(Vec::new());
        let session = session();
        assert!(session.suggestions(&api, " a ").await.unwrap().is_empty());
        assert_eq!(transport.attempts(), 0);
    }
}
