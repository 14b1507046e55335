//! Raw-name reconciliation types.
//!
//! A raw name is a free-text company string harvested from imported contacts.
//! It starts out `Unprocessed` and ends in exactly one terminal state once an
//! operator maps it.

use serde::{Deserialize, Serialize};

/// How a raw name was resolved. Stored in `company_name_mapping.mapping_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingAction {
    #[serde(rename = "existing")]
    Existing,
    #[serde(rename = "new")]
    New,
    #[serde(rename = "self")]
    SelfMap,
}

impl MappingAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MappingAction::Existing => "existing",
            MappingAction::New => "new",
            MappingAction::SelfMap => "self",
        }
    }

    pub fn from_source(source: &str) -> Option<Self> {
        match source {
            "existing" => Some(MappingAction::Existing),
            "new" => Some(MappingAction::New),
            "self" => Some(MappingAction::SelfMap),
            _ => None,
        }
    }

    pub fn resulting_state(self) -> MappingState {
        match self {
            MappingAction::Existing => MappingState::MappedExisting,
            MappingAction::New => MappingState::MappedNew,
            MappingAction::SelfMap => MappingState::SelfMapped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingState {
    Unprocessed,
    MappedExisting,
    MappedNew,
    SelfMapped,
}

impl MappingState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MappingState::Unprocessed)
    }

    /// Applies an action. Terminal states never transition again.
    pub fn apply(self, action: MappingAction) -> Option<MappingState> {
        match self {
            MappingState::Unprocessed => Some(action.resulting_state()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnmappedName {
    pub raw_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmappedListBody {
    pub raw_names: Vec<UnmappedName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NextCompanyBody {
    #[serde(default)]
    pub raw_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapExistingRequest {
    pub raw_name: String,
    pub company_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapNewRequest {
    pub raw_name: String,
    #[serde(alias = "new_clean_name")]
    pub company_name_clean: String,
    #[serde(default, alias = "is_target")]
    pub target_interest: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapSelfRequest {
    pub raw_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapBatchRequest {
    #[serde(default = "default_batch_target", alias = "is_target")]
    pub target_interest: bool,
}

impl Default for MapBatchRequest {
    fn default() -> Self {
        Self {
            target_interest: default_batch_target(),
        }
    }
}

fn default_batch_target() -> bool {
    true
}

/// Body of the generic `POST /api/map_company` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum MapCompanyRequest {
    #[serde(rename = "existing")]
    Existing(MapExistingRequest),
    #[serde(rename = "new")]
    New(MapNewRequest),
    #[serde(rename = "self")]
    SelfMap(MapSelfRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingOutcome {
    pub raw_name: String,
    pub company_id: i32,
    pub company_name_clean: String,
    pub action: MappingAction,
    /// False when a new or self map reused a company with the same clean name.
    pub company_created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchOutcome {
    pub processed_count: u64,
    pub failed_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegenerateOutcome {
    pub inserted_count: u64,
}
