use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A contact reached through one of the raw names mapped to a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanyContact {
    pub contact_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub position: Option<String>,
    pub connected_on: Option<NaiveDate>,
    pub linkedin_url: Option<String>,
    pub associated_raw_name: String,
}

impl CompanyContact {
    pub fn full_name(&self) -> String {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// A contact with its raw company string and, when mapped, the canonical company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ContactListing {
    pub contact_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub url: Option<String>,
    pub email_address: Option<String>,
    pub raw_company_name: Option<String>,
    pub position: Option<String>,
    pub connected_on: Option<NaiveDate>,
    pub company_id: Option<i32>,
    pub company_name_clean: Option<String>,
}

impl ContactListing {
    pub fn full_name(&self) -> String {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactsBody<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i32>,
    pub contacts: Vec<T>,
}

fn join_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_skips_missing_parts() {
        assert_eq!(join_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(join_name(None, Some("Lovelace")), "Lovelace");
        assert_eq!(join_name(Some("  "), None), "");
    }
}
