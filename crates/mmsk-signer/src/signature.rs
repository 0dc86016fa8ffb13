//! Signature schemes and their byte layouts.
//!
//! The maker is either an EOA (the signer's own address) or a market-maker
//! proxy wallet that accepts signatures from authorized signers. The scheme
//! marker at the end of the payload tells the settlement contract which
//! check to run.
//!
//! | Protocol | Scheme | Layout                                   |
//! |----------|--------|------------------------------------------|
//! | PMMV5    | EOA    | `v ‖ r ‖ s ‖ 03`                         |
//! | PMMV5    | wallet | `v ‖ r ‖ s ‖ user ‖ fee(u16) ‖ 04`       |
//! | RFQV1    | EOA    | `r ‖ s ‖ v ‖ 32 zero bytes ‖ 03`         |
//! | RFQV1    | wallet | `v ‖ r ‖ s ‖ user ‖ fee(u16) ‖ 06`       |

use alloy::primitives::{keccak256, Address, Bytes, PrimitiveSignature, B256};
use alloy::signers::Signer as AlloySigner;
use mmsk_core::{FeeFactor, Protocol};
use serde::Serialize;
use std::fmt;

/// How the maker's signature is verified on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScheme {
    Eoa,
    Wallet,
}

impl SignatureScheme {
    /// EOA when the signer is the maker itself, wallet otherwise.
    pub fn select(signer: Address, maker: Address) -> Self {
        if signer == maker {
            Self::Eoa
        } else {
            Self::Wallet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eoa => "eoa",
            Self::Wallet => "wallet",
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 0x v2 signature types used by PMMV5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PmmSignatureType {
    EthSign = 3,
    Wallet = 4,
}

/// Tokenlon RFQ signature types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RfqSignatureType {
    Illegal = 0,
    Invalid = 1,
    Eip712 = 2,
    EthSign = 3,
    WalletBytes = 4,
    WalletBytes32 = 5,
    Wallet = 6,
}

/// Message an authorized signer signs for a proxy wallet:
/// `keccak256(digest ‖ user ‖ uint16 fee)`.
pub fn wallet_message(digest: B256, user: Address, fee: FeeFactor) -> B256 {
    let mut data = Vec::with_capacity(54);
    data.extend_from_slice(digest.as_slice());
    data.extend_from_slice(user.as_slice());
    data.extend_from_slice(&fee.bps().to_be_bytes());
    keccak256(data)
}

fn r_bytes(sig: &PrimitiveSignature) -> [u8; 32] {
    sig.r().to_be_bytes::<32>()
}

fn s_bytes(sig: &PrimitiveSignature) -> [u8; 32] {
    sig.s().to_be_bytes::<32>()
}

/// Recovery id in the legacy 27/28 form.
fn v_byte(sig: &PrimitiveSignature) -> u8 {
    27 + u8::from(sig.v())
}

fn wallet_payload(sig: &PrimitiveSignature, user: Address, fee: FeeFactor, marker: u8) -> Bytes {
    let mut out = Vec::with_capacity(88);
    out.push(v_byte(sig));
    out.extend_from_slice(&r_bytes(sig));
    out.extend_from_slice(&s_bytes(sig));
    out.extend_from_slice(user.as_slice());
    out.extend_from_slice(&fee.bps().to_be_bytes());
    out.push(marker);
    Bytes::from(out)
}

/// Encode a PMMV5 maker signature.
pub fn encode_pmm(
    sig: &PrimitiveSignature,
    scheme: SignatureScheme,
    user: Address,
    fee: FeeFactor,
) -> Bytes {
    match scheme {
        SignatureScheme::Eoa => {
            let mut out = Vec::with_capacity(66);
            out.push(v_byte(sig));
            out.extend_from_slice(&r_bytes(sig));
            out.extend_from_slice(&s_bytes(sig));
            out.push(PmmSignatureType::EthSign as u8);
            Bytes::from(out)
        }
        SignatureScheme::Wallet => wallet_payload(sig, user, fee, PmmSignatureType::Wallet as u8),
    }
}

/// Encode an RFQV1 maker signature.
pub fn encode_rfq(
    sig: &PrimitiveSignature,
    scheme: SignatureScheme,
    user: Address,
    fee: FeeFactor,
) -> Bytes {
    match scheme {
        SignatureScheme::Eoa => {
            let mut out = Vec::with_capacity(98);
            out.extend_from_slice(&r_bytes(sig));
            out.extend_from_slice(&s_bytes(sig));
            out.push(v_byte(sig));
            out.extend_from_slice(&[0u8; 32]);
            out.push(RfqSignatureType::EthSign as u8);
            Bytes::from(out)
        }
        SignatureScheme::Wallet => wallet_payload(sig, user, fee, RfqSignatureType::Wallet as u8),
    }
}

/// Personal-sign the order digest (or its wallet message) and encode the
/// result for `protocol`.
pub async fn sign_order_digest<S>(
    signer: &S,
    protocol: Protocol,
    digest: B256,
    scheme: SignatureScheme,
    user: Address,
    fee: FeeFactor,
) -> Result<Bytes, alloy::signers::Error>
where
    S: AlloySigner + Send + Sync,
{
    let message = match scheme {
        SignatureScheme::Eoa => digest,
        SignatureScheme::Wallet => wallet_message(digest, user, fee),
    };
    let sig = signer.sign_message(message.as_slice()).await?;

    Ok(match protocol {
        Protocol::PmmV5 => encode_pmm(&sig, scheme, user, fee),
        Protocol::RfqV1 => encode_rfq(&sig, scheme, user, fee),
    })
}
