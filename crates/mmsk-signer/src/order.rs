//! Signed order payloads returned to the exchange.
//!
//! Addresses and byte strings serialize as `0x`-prefixed lower-case hex and
//! on-chain amounts as decimal strings, so no precision is lost in JSON.

use crate::digest::{pmmv5, rfqv1};
use alloy::primitives::{Address, Bytes, U256};
use mmsk_core::{FeeFactor, Protocol};
use serde::Serialize;

mod ser {
    use alloy::primitives::{Address, Bytes, U256};
    use serde::Serializer;

    pub fn address<S: Serializer>(value: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&value[..])))
    }

    pub fn bytes<S: Serializer>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&value[..])))
    }

    pub fn uint<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

/// Salt for a PMMV5 order: fee factor in the top 16 bits, random below.
pub fn pmm_salt(fee: FeeFactor) -> U256 {
    let mut bytes: [u8; 32] = rand::random();
    bytes[..2].copy_from_slice(&fee.bps().to_be_bytes());
    U256::from_be_bytes(bytes)
}

/// Fee factor carried in the top 16 bits of a PMMV5 salt.
pub fn fee_factor_from_salt(salt: U256) -> u16 {
    let bytes = salt.to_be_bytes::<32>();
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Uniformly random 256-bit salt.
pub fn random_salt() -> U256 {
    U256::from_be_bytes(rand::random::<[u8; 32]>())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmmV5Order {
    #[serde(serialize_with = "ser::address")]
    pub maker_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub taker_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub fee_recipient_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub sender_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub maker_asset_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub taker_asset_address: Address,
    #[serde(serialize_with = "ser::uint")]
    pub maker_asset_amount: U256,
    #[serde(serialize_with = "ser::uint")]
    pub taker_asset_amount: U256,
    #[serde(serialize_with = "ser::uint")]
    pub maker_fee: U256,
    #[serde(serialize_with = "ser::uint")]
    pub taker_fee: U256,
    #[serde(serialize_with = "ser::uint")]
    pub expiration_time_seconds: U256,
    #[serde(serialize_with = "ser::uint")]
    pub salt: U256,
    #[serde(serialize_with = "ser::bytes")]
    pub maker_asset_data: Bytes,
    #[serde(serialize_with = "ser::bytes")]
    pub taker_asset_data: Bytes,
    #[serde(serialize_with = "ser::address")]
    pub exchange_address: Address,
    pub fee_factor: u16,
    pub quote_id: String,
    #[serde(serialize_with = "ser::bytes")]
    pub maker_wallet_signature: Bytes,
}

impl PmmV5Order {
    /// The EIP-712 record this payload was signed over.
    pub fn to_typed(&self) -> pmmv5::Order {
        pmmv5::Order {
            makerAddress: self.maker_address,
            takerAddress: self.taker_address,
            feeRecipientAddress: self.fee_recipient_address,
            senderAddress: self.sender_address,
            makerAssetAmount: self.maker_asset_amount,
            takerAssetAmount: self.taker_asset_amount,
            makerFee: self.maker_fee,
            takerFee: self.taker_fee,
            expirationTimeSeconds: self.expiration_time_seconds,
            salt: self.salt,
            makerAssetData: self.maker_asset_data.clone(),
            takerAssetData: self.taker_asset_data.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqV1Order {
    #[serde(serialize_with = "ser::address")]
    pub taker_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub maker_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub taker_asset_address: Address,
    #[serde(serialize_with = "ser::address")]
    pub maker_asset_address: Address,
    #[serde(serialize_with = "ser::uint")]
    pub taker_asset_amount: U256,
    #[serde(serialize_with = "ser::uint")]
    pub maker_asset_amount: U256,
    #[serde(serialize_with = "ser::uint")]
    pub salt: U256,
    #[serde(serialize_with = "ser::uint")]
    pub deadline: U256,
    pub fee_factor: u16,
    pub quote_id: String,
    #[serde(serialize_with = "ser::bytes")]
    pub maker_wallet_signature: Bytes,
}

impl RfqV1Order {
    pub fn to_typed(&self) -> rfqv1::Order {
        rfqv1::Order {
            takerAddr: self.taker_address,
            makerAddr: self.maker_address,
            takerAssetAddr: self.taker_asset_address,
            makerAssetAddr: self.maker_asset_address,
            takerAssetAmount: self.taker_asset_amount,
            makerAssetAmount: self.maker_asset_amount,
            salt: self.salt,
            deadline: self.deadline,
            feeFactor: U256::from(self.fee_factor),
        }
    }
}

/// A signed order for one of the supported protocol families.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "protocol", content = "order")]
pub enum SignedOrder {
    #[serde(rename = "PMMV5")]
    PmmV5(PmmV5Order),
    #[serde(rename = "RFQV1")]
    RfqV1(RfqV1Order),
}

impl SignedOrder {
    pub fn protocol(&self) -> Protocol {
        match self {
            SignedOrder::PmmV5(_) => Protocol::PmmV5,
            SignedOrder::RfqV1(_) => Protocol::RfqV1,
        }
    }

    /// Quote id including the market-maker prefix.
    pub fn quote_id(&self) -> &str {
        match self {
            SignedOrder::PmmV5(order) => &order.quote_id,
            SignedOrder::RfqV1(order) => &order.quote_id,
        }
    }

    pub fn signature(&self) -> &Bytes {
        match self {
            SignedOrder::PmmV5(order) => &order.maker_wallet_signature,
            SignedOrder::RfqV1(order) => &order.maker_wallet_signature,
        }
    }

    pub fn fee_factor(&self) -> u16 {
        match self {
            SignedOrder::PmmV5(order) => order.fee_factor,
            SignedOrder::RfqV1(order) => order.fee_factor,
        }
    }

    pub fn maker_asset_amount(&self) -> U256 {
        match self {
            SignedOrder::PmmV5(order) => order.maker_asset_amount,
            SignedOrder::RfqV1(order) => order.maker_asset_amount,
        }
    }

    pub fn taker_asset_amount(&self) -> U256 {
        match self {
            SignedOrder::PmmV5(order) => order.taker_asset_amount,
            SignedOrder::RfqV1(order) => order.taker_asset_amount,
        }
    }
}
