use serde::{Deserialize, Serialize};

/// Canonical company profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    pub company_id: i32,
    pub company_name_clean: String,
    pub target_interest: bool,
    pub headquarters: Option<String>,
    pub size_employees: Option<i32>,
    pub annual_revenue: Option<f64>,
    pub revenue_scale: Option<String>,
    pub notes: Option<String>,
}

/// Row of the company list view, with per-user application and global contact counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanyListing {
    pub company_id: i32,
    pub company_name_clean: String,
    pub headquarters: Option<String>,
    pub size_employees: Option<i32>,
    pub target_interest: bool,
    pub annual_revenue: Option<f64>,
    pub revenue_scale: Option<String>,
    #[serde(default)]
    pub application_count: i64,
    #[serde(default)]
    pub contact_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanySummary {
    pub company_id: i32,
    pub company_name_clean: String,
    pub is_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanySuggestion {
    pub company_id: i32,
    pub company_name_clean: String,
}

/// Body of `POST /api/companies` and `PUT /api/companies/{id}`.
///
/// PUT replaces the whole record: any optional field left out is stored as NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyPayload {
    #[serde(default)]
    pub company_name_clean: Option<String>,
    #[serde(default, alias = "is_target")]
    pub target_interest: Option<bool>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub size_employees: Option<i32>,
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub revenue_scale: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompaniesBody {
    pub companies: Vec<CompanyListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyBody {
    pub company: Company,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyIdBody {
    pub company_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawNamesBody {
    pub company_id: i32,
    pub raw_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SidebarBody {
    pub companies: Vec<CompanySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionsBody {
    pub companies: Vec<CompanySuggestion>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_accepts_is_target_alias() {
        let payload: CompanyPayload =
            serde_json::from_value(json!({"company_name_clean": "Acme", "is_target": true}))
                .unwrap();
        assert_eq!(payload.target_interest, Some(true));
    }

    #[test]
    fn test_payload_missing_fields_are_none() {
        let payload: CompanyPayload =
            serde_json::from_value(json!({"company_name_clean": "Acme"})).unwrap();
        assert_eq!(payload.headquarters, None);
        assert_eq!(payload.target_interest, None);
        assert_eq!(payload.size_employees, None);
    }
}
