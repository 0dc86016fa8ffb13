//! Market-maker prefix on provider quote ids.
//!
//! Signed orders carry `"{mmId}--{quoteId}"` so that settlement
//! notifications can be traced back to the market maker; the prefix is
//! stripped again before notifications reach the provider.

/// Separator between the market-maker id and the provider's quote id.
pub const QUOTE_ID_SEPARATOR: &str = "--";

pub fn add_quote_id_prefix(mm_id: &str, quote_id: &str) -> String {
    format!("{mm_id}{QUOTE_ID_SEPARATOR}{quote_id}")
}

/// Strip the prefix if present; other ids pass through unchanged.
pub fn remove_quote_id_prefix(mm_id: &str, quote_id: &str) -> String {
    let prefix = format!("{mm_id}{QUOTE_ID_SEPARATOR}");
    quote_id
        .strip_prefix(prefix.as_str())
        .unwrap_or(quote_id)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_prefix() {
        assert_eq!(add_quote_id_prefix("1", "echo-testing-8888"), "1--echo-testing-8888");
    }

    #[test]
    fn test_remove_inverts_add() {
        for id in ["echo-testing-8888", "", "1--nested", "--", "a--b--c"] {
            assert_eq!(remove_quote_id_prefix("1", &add_quote_id_prefix("1", id)), id);
        }
    }

    #[test]
    fn test_remove_leaves_foreign_ids() {
        assert_eq!(remove_quote_id_prefix("1", "2--quote"), "2--quote");
        assert_eq!(remove_quote_id_prefix("1", "quote"), "quote");
    }
}
