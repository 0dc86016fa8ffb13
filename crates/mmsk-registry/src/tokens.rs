//! Supported-token resolution from pair strings and token metadata.
//!
//! Symbols compare case-insensitively. Output casing always comes from the
//! token list, never from pair strings or caller input.

use mmsk_core::{SupportedToken, TokenMeta};
use std::collections::HashMap;

/// Build the bidirectional adjacency map of `"A/B"` pair strings.
///
/// Keys and values are upper-cased. Opposites keep first-seen order without
/// duplicates. Strings without `/`, with an empty side, or pairing a symbol
/// with itself contribute nothing.
///
/// `["SNT/ETH", "SNT/TUSD"]` yields `SNT -> [ETH, TUSD]`, `ETH -> [SNT]`,
/// `TUSD -> [SNT]`.
pub fn pair_adjacency(pairs: &[String]) -> HashMap<String, Vec<String>> {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();

    let mut link = |from: &str, to: &str| {
        let opposites = adjacency.entry(from.to_string()).or_default();
        if !opposites.iter().any(|o| o == to) {
            opposites.push(to.to_string());
        }
    };

    for pair in pairs {
        let Some((a, b)) = pair.split_once('/') else {
            continue;
        };
        let (a, b) = (a.trim().to_ascii_uppercase(), b.trim().to_ascii_uppercase());
        if a.is_empty() || b.is_empty() || a == b {
            continue;
        }
        link(&a, &b);
        link(&b, &a);
    }

    adjacency
}

/// Derive the supported tokens.
///
/// Each token in `token_list` gets the opposites the pair list gives it,
/// filtered to symbols present in `token_list`. Tokens left with no
/// opposites are dropped. Output order follows `token_list`.
pub fn supported_tokens(pairs: &[String], token_list: &[TokenMeta]) -> Vec<SupportedToken> {
    let adjacency = pair_adjacency(pairs);

    let mut canonical: HashMap<String, &str> = HashMap::with_capacity(token_list.len());
    for token in token_list {
        canonical
            .entry(token.symbol.to_ascii_uppercase())
            .or_insert(token.symbol.as_str());
    }

    token_list
        .iter()
        .filter_map(|token| {
            let opposites: Vec<String> = adjacency
                .get(&token.symbol.to_ascii_uppercase())?
                .iter()
                .filter_map(|o| canonical.get(o).map(|s| s.to_string()))
                .collect();

            if opposites.is_empty() {
                None
            } else {
                Some(SupportedToken {
                    meta: token.clone(),
                    opposites,
                })
            }
        })
        .collect()
}

/// Case-insensitive lookup by symbol.
pub fn find_by_symbol<'a>(
    tokens: &'a [SupportedToken],
    symbol: &str,
) -> Option<&'a SupportedToken> {
    tokens.iter().find(|t| t.symbol().eq_ignore_ascii_case(symbol))
}

/// Case-insensitive lookup by contract address.
pub fn find_by_address<'a>(
    tokens: &'a [SupportedToken],
    address: &str,
) -> Option<&'a SupportedToken> {
    tokens
        .iter()
        .find(|t| t.contract_address().eq_ignore_ascii_case(address))
}

/// Whether `base` can be traded against `quote`.
pub fn is_supported_pair(tokens: &[SupportedToken], base: &str, quote: &str) -> bool {
    find_by_symbol(tokens, base)
        .map(|t| t.opposites.iter().any(|o| o.eq_ignore_ascii_case(quote)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(symbol: &str, address: &str) -> TokenMeta {
        TokenMeta {
            symbol: symbol.to_string(),
            contract_address: address.to_string(),
            decimal: 18,
            precision: 4,
            min_trade_amount: None,
            max_trade_amount: None,
        }
    }

    fn pairs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pair_adjacency_is_bidirectional() {
        let adjacency = pair_adjacency(&pairs(&["SNT/ETH", "SNT/TUSD"]));
        assert_eq!(adjacency["SNT"], vec!["ETH", "TUSD"]);
        assert_eq!(adjacency["ETH"], vec!["SNT"]);
        assert_eq!(adjacency["TUSD"], vec!["SNT"]);
    }

    #[test]
    fn test_pair_adjacency_dedups_and_skips_malformed() {
        let adjacency =
            pair_adjacency(&pairs(&["ETH/USDT", "usdt/eth", "DAI", "/ETH", "ETH/ETH"]));
        assert_eq!(adjacency.len(), 2);
        assert_eq!(adjacency["ETH"], vec!["USDT"]);
        assert_eq!(adjacency["USDT"], vec!["ETH"]);
    }

    #[test]
    fn test_supported_tokens_filters_unknown_opposites() {
        let tokens = vec![meta("ETH", "0x0"), meta("USDT", "0x1"), meta("DAI", "0x2")];
        let result = supported_tokens(&pairs(&["ETH/USDT", "ETH/SNT", "DAI/SNT"]), &tokens);

        let symbols: Vec<&str> = result.iter().map(|t| t.symbol()).collect();
        assert_eq!(symbols, vec!["ETH", "USDT"]);
        assert_eq!(result[0].opposites, vec!["USDT"]);
        assert_eq!(result[1].opposites, vec!["ETH"]);
    }

    #[test]
    fn test_supported_tokens_opposites_subset_of_token_list() {
        let tokens = vec![meta("ETH", "0x0"), meta("USDT", "0x1"), meta("imBTC", "0x3")];
        let result = supported_tokens(
            &pairs(&["ETH/USDT", "IMBTC/ETH", "IMBTC/WBTC", "X/Y", "USDT/LINK"]),
            &tokens,
        );

        for token in &result {
            assert!(!token.opposites.is_empty());
            for opposite in &token.opposites {
                assert!(tokens.iter().any(|t| &t.symbol == opposite));
            }
        }
    }

    #[test]
    fn test_supported_tokens_use_canonical_casing() {
        let tokens = vec![meta("ETH", "0x0"), meta("imBTC", "0x3")];
        let result = supported_tokens(&pairs(&["IMBTC/eth"]), &tokens);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].opposites, vec!["imBTC"]);
        assert_eq!(result[1].symbol(), "imBTC");
        assert_eq!(result[1].opposites, vec!["ETH"]);
    }

    #[test]
    fn test_supported_tokens_empty_inputs() {
        assert!(supported_tokens(&[], &[meta("ETH", "0x0")]).is_empty());
        assert!(supported_tokens(&pairs(&["ETH/USDT"]), &[]).is_empty());
    }

    #[test]
    fn test_lookups_ignore_case() {
        let tokens = supported_tokens(
            &pairs(&["ETH/USDT"]),
            &[
                meta("ETH", "0x0000000000000000000000000000000000000000"),
                meta("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7"),
            ],
        );

        assert_eq!(find_by_symbol(&tokens, "usdt").unwrap().symbol(), "USDT");
        assert_eq!(
            find_by_address(&tokens, "0xdac17f958d2ee523a2206206994597c13d831ec7")
                .unwrap()
                .symbol(),
            "USDT"
        );
        assert!(is_supported_pair(&tokens, "eth", "USDT"));
        assert!(!is_supported_pair(&tokens, "ETH", "DAI"));
        assert!(!is_supported_pair(&tokens, "DAI", "ETH"));
    }
}
