pub mod handlers;
pub mod queries;
pub mod search;

use shared_types::MappingAction;

use crate::errors::AppError;

/// Raw names are matched byte for byte against contact data, so they are only
/// checked for blankness, never trimmed.
pub fn require_raw_name(raw_name: &str) -> Result<&str, AppError> {
    if raw_name.trim().is_empty() {
        return Err(AppError::Validation("Missing required field: raw_name".to_string()));
    }
    Ok(raw_name)
}

pub fn require_clean_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "Missing required field: company_name_clean".to_string(),
        ));
    }
    Ok(name)
}

/// Name of the company a mapping resolves to. A self-map uses the raw name
/// exactly as stored; the other actions use the trimmed clean name.
pub fn mapped_company_name<'a>(
    action: MappingAction,
    raw_name: &'a str,
    company_name_clean: &'a str,
) -> Result<&'a str, AppError> {
    match action {
        MappingAction::SelfMap => require_raw_name(raw_name),
        MappingAction::New | MappingAction::Existing => require_clean_name(company_name_clean),
    }
}

/// Note stored on a company created by a mapping action.
pub fn auto_created_note(raw_name: &str) -> String {
    format!("Auto-created from raw name: {raw_name}")
}

pub fn already_mapped(raw_name: &str) -> AppError {
    AppError::Conflict(format!("Raw name '{raw_name}' is already mapped."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_name_kept_verbatim() {
        assert_eq!(require_raw_name(" Acme, Inc. ").unwrap(), " Acme, Inc. ");
        assert!(require_raw_name("   ").is_err());
    }

    #[test]
    fn test_clean_name_trimmed() {
        assert_eq!(require_clean_name("  Acme ").unwrap(), "Acme");
        assert!(require_clean_name("").is_err());
    }

    #[test]
    fn test_self_map_keeps_surrounding_whitespace() {
        let name = mapped_company_name(MappingAction::SelfMap, " Acme, Inc. ", " Acme, Inc. ").unwrap();
        assert_eq!(name, " Acme, Inc. ");
        assert!(mapped_company_name(MappingAction::SelfMap, "  ", "  ").is_err());
    }

    #[test]
    fn test_new_map_trims_clean_name() {
        let name = mapped_company_name(MappingAction::New, " acme inc ", "  Acme ").unwrap();
        assert_eq!(name, "Acme");
        assert!(mapped_company_name(MappingAction::New, "acme", " ").is_err());
    }

    #[test]
    fn test_auto_created_note_names_raw_name() {
        assert_eq!(auto_created_note("Googel Inc"), "Auto-created from raw name: Googel Inc");
    }

    #[test]
    fn test_already_mapped_is_conflict() {
        assert!(matches!(already_mapped("Acme"), AppError::Conflict(_)));
    }
}
