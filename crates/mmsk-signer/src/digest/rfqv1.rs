//! RFQV1 orders settled by the Tokenlon RFQ contract.

use alloy::primitives::{Address, B256};
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolStruct};

pub const EIP712_DOMAIN_NAME: &str = "Tokenlon";
pub const EIP712_DOMAIN_VERSION: &str = "v5";

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        address takerAddr;
        address makerAddr;
        address takerAssetAddr;
        address makerAssetAddr;
        uint256 takerAssetAmount;
        uint256 makerAssetAmount;
        uint256 salt;
        uint256 deadline;
        uint256 feeFactor;
    }
}

/// Signing digest of `order` for the RFQ contract `rfq` on `chain_id`.
pub fn order_digest(order: &Order, chain_id: u64, rfq: Address) -> B256 {
    let domain = eip712_domain! {
        name: EIP712_DOMAIN_NAME,
        version: EIP712_DOMAIN_VERSION,
        chain_id: chain_id,
        verifying_contract: rfq,
    };
    order.eip712_signing_hash(&domain)
}
