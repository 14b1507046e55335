use crate::errors::AppError;

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_SUGGESTIONS: i64 = 10;

/// ILIKE patterns for a company suggestion lookup. Results rank exact matches
/// first, then prefix matches, then substring matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerm {
    pub exact: String,
    pub prefix: String,
    pub contains: String,
}

impl SearchTerm {
    pub fn parse(query: Option<&str>) -> Result<Self, AppError> {
        let query = query.map(str::trim).unwrap_or_default();
        if query.is_empty() {
            return Err(AppError::Validation("Missing 'query' parameter.".to_string()));
        }
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(AppError::Validation(format!(
                "Search query must be at least {MIN_QUERY_LEN} characters."
            )));
        }

        let escaped = escape_like(query);
        Ok(SearchTerm {
            exact: escaped.clone(),
            prefix: format!("{escaped}%"),
            contains: format!("%{escaped}%"),
        })
    }
}

/// Escapes LIKE metacharacters so user input only matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns() {
        let term = SearchTerm::parse(Some(" goo ")).unwrap();
        assert_eq!(term.exact, "goo");
        assert_eq!(term.prefix, "goo%");
        assert_eq!(term.contains, "%goo%");
    }

    #[test]
    fn test_short_query_rejected() {
        assert!(matches!(
            SearchTerm::parse(Some("a")),
            Err(AppError::Validation(_))
        ));
        assert!(SearchTerm::parse(Some("  ")).is_err());
        assert!(SearchTerm::parse(None).is_err());
    }

    #[test]
    fn test_wildcards_escaped() {
        let term = SearchTerm::parse(Some("100%_fit")).unwrap();
        assert_eq!(term.exact, "100\\%\\_fit");
        assert_eq!(term.contains, "%100\\%\\_fit%");
    }
}
