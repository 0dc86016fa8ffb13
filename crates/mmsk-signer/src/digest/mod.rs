//! EIP-712 order digests.
//!
//! Each protocol family has its own order struct and domain. The digest is
//! `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(order))`, the value the
//! market maker actually signs.

pub mod pmmv5;
pub mod rfqv1;

use alloy::primitives::{Address, Bytes};

/// Selector of the 0x ERC-20 asset proxy, `bytes4(keccak256("ERC20Token(address)"))`.
pub const ERC20_PROXY_ID: [u8; 4] = [0xf4, 0x72, 0x61, 0xb0];

/// ERC-20 asset data: proxy id followed by the left-padded token address.
pub fn erc20_asset_data(token: Address) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&ERC20_PROXY_ID);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(token.as_slice());
    Bytes::from(data)
}
