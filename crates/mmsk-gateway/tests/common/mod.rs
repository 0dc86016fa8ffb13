//! Shared fixtures: a fixed registry mirroring a small testnet deployment.

use mmsk_core::{MarketMakerConfig, PriceQuote, TokenMeta, ZERO_ADDRESS};
use mmsk_gateway::{AppConfig, Gateway};
use mmsk_quoting::MockQuoter;
use mmsk_registry::ConfigRegistry;
use mmsk_signer::KeyManager;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Development keys; never funded on mainnet.
pub const MAKER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const PROXY_OWNER_KEY: &str =
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
/// Address of `PROXY_OWNER_KEY`, configured as the market maker's proxy.
pub const PROXY_ADDRESS: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

pub const USER: &str = "0x6813eb9362372eef6200f3b1dbc3f819671cba69";
pub const USDT: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";
pub const WETH: &str = "0xd0a1e359811322d97991e03f863a0c30c2cf029c";
pub const RFQ: &str = "0xfD474E4809e690626C67ECb7A908de4b9c464b99";
pub const QUOTE_ID: &str = "echo-testing-8888";

pub fn market_maker_config() -> MarketMakerConfig {
    serde_json::from_value(serde_json::json!({
        "mmId": 1,
        "mmProxyContractAddress": PROXY_ADDRESS,
        "tokenlonExchangeContractAddress": "0xd489f1684cf5e78d933e254bd7ac8a9a6a70d491",
        "exchangeContractAddress": "0x30589010550762d2f0d06f650d8e8b6ade6dbf4b",
        "userProxyContractAddress": "0x25657705a6be20511687d483f2fccfb2d92f6033",
        "wethContractAddress": WETH,
        "orderExpirationSeconds": 600,
        "feeFactor": 30,
        "addressBookV5": {
            "Tokenlon": "0xF1eC89551112da48C3b43B5a167AF0b2a7Cc2614",
            "PMM": "0x7bd7d025D4231aAD1233967b527FFd7416410257",
            "AMMWrapper": "0xCF011536f10e85e376E70905EED4CA9eA8Cded34",
            "RFQ": RFQ
        }
    }))
    .unwrap()
}

pub fn token_list() -> Vec<TokenMeta> {
    serde_json::from_value(serde_json::json!([
        {
            "symbol": "ETH",
            "contractAddress": ZERO_ADDRESS,
            "decimal": 18,
            "precision": 4,
            "minTradeAmount": 0.01,
            "maxTradeAmount": 10
        },
        {
            "symbol": "USDT",
            "contractAddress": USDT,
            "decimal": 6,
            "precision": 4,
            "minTradeAmount": 1,
            "maxTradeAmount": 1000
        }
    ]))
    .unwrap()
}

pub fn registry() -> ConfigRegistry {
    ConfigRegistry::fixed(
        Some(market_maker_config()),
        vec!["USDT/ETH".to_string()],
        token_list(),
        vec![],
    )
}

pub fn key(hex_key: &str) -> KeyManager {
    KeyManager::from_bytes(&hex::decode(hex_key).unwrap(), None).unwrap()
}

/// Gateway signing with `signer_key` against a provider quoting `price`.
pub fn gateway(signer_key: &str, price: Decimal) -> (Gateway, Arc<MockQuoter>) {
    let quoter = Arc::new(
        MockQuoter::new()
            .with_pairs(&["USDT/ETH"])
            .with_price(PriceQuote::firm(price, QUOTE_ID)),
    );
    let gateway = Gateway::with_parts(AppConfig::default(), registry(), quoter.clone(), key(signer_key));
    (gateway, quoter)
}
