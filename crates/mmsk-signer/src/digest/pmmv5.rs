//! PMMV5 orders: 0x v2 orders filled through the PMM proxy.
//!
//! The 0x v2 domain has no chain id; only name, version and the exchange
//! contract enter the separator.

use alloy::primitives::{Address, B256};
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolStruct};

pub const EIP712_DOMAIN_NAME: &str = "0x Protocol";
pub const EIP712_DOMAIN_VERSION: &str = "2";

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        address makerAddress;
        address takerAddress;
        address feeRecipientAddress;
        address senderAddress;
        uint256 makerAssetAmount;
        uint256 takerAssetAmount;
        uint256 makerFee;
        uint256 takerFee;
        uint256 expirationTimeSeconds;
        uint256 salt;
        bytes makerAssetData;
        bytes takerAssetData;
    }
}

/// Signing digest of `order` against the 0x exchange at `exchange`.
pub fn order_digest(order: &Order, exchange: Address) -> B256 {
    let domain = eip712_domain! {
        name: EIP712_DOMAIN_NAME,
        version: EIP712_DOMAIN_VERSION,
        verifying_contract: exchange,
    };
    order.eip712_signing_hash(&domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::erc20_asset_data;
    use alloy::primitives::U256;
    use std::str::FromStr;

    fn addr(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    fn reference_order() -> Order {
        let pmm = addr("0x7bd7d025d4231aad1233967b527ffd7416410257");
        Order {
            makerAddress: addr("0x86b9f429c3ef44c599eb560eb531a0e3f2e36f64"),
            takerAddress: pmm,
            feeRecipientAddress: addr("0x6813eb9362372eef6200f3b1dbc3f819671cba69"),
            senderAddress: pmm,
            makerAssetAmount: U256::from(100_000_000u64),
            takerAssetAmount: U256::from(1_000_000_000_000_000_000u128),
            makerFee: U256::ZERO,
            takerFee: U256::ZERO,
            expirationTimeSeconds: U256::from(1_620_444_917u64),
            salt: U256::from_str(
                "0x1e000000000000000000000000000000000000000000000000000000001234",
            )
            .unwrap(),
            makerAssetData: erc20_asset_data(addr("0xdac17f958d2ee523a2206206994597c13d831ec7")),
            takerAssetData: erc20_asset_data(addr("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")),
        }
    }

    #[test]
    fn test_reference_digest() {
        let exchange = addr("0x30589010550762d2f0d06f650d8e8b6ade6dbf4b");
        let digest = order_digest(&reference_order(), exchange);
        assert_eq!(
            digest,
            B256::from_str("0x492233d8236ffb673dfed289127a1cde94fe3826f6777e85f3086c380abd0a98")
                .unwrap()
        );
    }

    #[test]
    fn test_digest_depends_on_exchange() {
        let order = reference_order();
        let a = order_digest(&order, addr("0x30589010550762d2f0d06f650d8e8b6ade6dbf4b"));
        let b = order_digest(&order, addr("0x080bf510fcbf18b91105470639e9561022937712"));
        assert_ne!(a, b);
    }
}
