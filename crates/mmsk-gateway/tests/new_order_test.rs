//! Firm order integration tests.
//!
//! Covers protocol dispatch, signature scheme selection and amount scaling
//! through the gateway with a fixed registry and a mock provider.

mod common;
use common::*;

use alloy::primitives::{Address, PrimitiveSignature, U256};
use mmsk_core::{Query, Side};
use mmsk_gateway::NewOrderReply;
use mmsk_signer::digest::rfqv1;
use mmsk_signer::{OrderError, RfqSignatureType, SignedOrder};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;

fn query(side: Side, amount: rust_decimal::Decimal, protocol: &str) -> Query {
    Query::new("ETH", "USDT", side)
        .with_amount(amount)
        .with_user(USER)
        .with_protocol(protocol)
}

fn reply_json(result: Result<SignedOrder, OrderError>) -> Value {
    serde_json::to_value(NewOrderReply::from(result)).unwrap()
}

#[tokio::test]
async fn test_pmmv4_is_unrecognized() {
    let (gateway, quoter) = gateway(MAKER_KEY, dec!(1));
    let result = gateway.new_order(&query(Side::Sell, dec!(0.1), "PMMV4")).await;

    let reply = reply_json(result);
    assert_eq!(reply["result"], false);
    assert_eq!(reply["message"], "Unrecognized protocol: PMMV4");
    assert!(quoter.price_requests().is_empty());
}

#[tokio::test]
async fn test_pmmv5_signed_by_proxy_wallet() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1));
    let result = gateway.new_order(&query(Side::Sell, dec!(0.1), "PMMV5")).await;

    let reply = reply_json(result);
    assert_eq!(reply["result"], true);
    assert_eq!(reply["protocol"], "PMMV5");
    assert_eq!(reply["order"]["quoteId"], "1--echo-testing-8888");
    let signature = reply["order"]["makerWalletSignature"].as_str().unwrap();
    assert!(signature.ends_with('4'));
}

#[tokio::test]
async fn test_pmmv5_signed_by_eoa() {
    let (gateway, _) = gateway(PROXY_OWNER_KEY, dec!(1));
    let result = gateway.new_order(&query(Side::Sell, dec!(0.1), "PMMV5")).await;

    let reply = reply_json(result);
    assert_eq!(reply["order"]["quoteId"], "1--echo-testing-8888");
    let signature = reply["order"]["makerWalletSignature"].as_str().unwrap();
    assert!(signature.ends_with('3'));
}

#[tokio::test]
async fn test_rfqv1_signed_by_proxy_wallet() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1));
    let order = gateway
        .new_order(&query(Side::Sell, dec!(0.1), "RFQV1"))
        .await
        .unwrap();

    assert_eq!(order.quote_id(), "1--echo-testing-8888");
    let sig = order.signature();
    assert_eq!(sig.len(), 88);
    assert_eq!(sig[87], RfqSignatureType::Wallet as u8);
}

#[tokio::test]
async fn test_rfqv1_signed_by_eoa_recovers_signer() {
    let (gateway, _) = gateway(PROXY_OWNER_KEY, dec!(1));
    let order = gateway
        .new_order(&query(Side::Sell, dec!(0.1), "RFQV1"))
        .await
        .unwrap();

    let SignedOrder::RfqV1(order) = order else {
        panic!("expected an RFQV1 order");
    };
    let sig = &order.maker_wallet_signature;
    assert_eq!(sig.len(), 98);
    assert_eq!(sig[97], RfqSignatureType::EthSign as u8);

    let digest = rfqv1::order_digest(&order.to_typed(), 1, Address::from_str(RFQ).unwrap());
    let recovered = PrimitiveSignature::new(
        U256::from_be_slice(&sig[0..32]),
        U256::from_be_slice(&sig[32..64]),
        sig[64] == 28,
    )
    .recover_address_from_msg(digest.as_slice())
    .unwrap();
    assert_eq!(recovered, Address::from_str(PROXY_ADDRESS).unwrap());
}

#[tokio::test]
async fn test_buy_formats_taker_asset_amount() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1.1));
    let result = gateway.new_order(&query(Side::Buy, dec!(0.1111), "PMMV5")).await;

    let reply = reply_json(result);
    let order = &reply["order"];
    assert!(order["makerWalletSignature"].as_str().unwrap().ends_with('4'));
    assert_eq!(
        &order["takerAssetData"].as_str().unwrap()[34..],
        "dac17f958d2ee523a2206206994597c13d831ec7"
    );
    // 30 bps market-maker default inflates 0.1111 ETH to 0.1114 ETH.
    assert_eq!(order["takerAssetAmount"], "122539");
    assert_eq!(order["makerAssetAmount"], "111400000000000000");
    assert_eq!(order["feeFactor"], 30);
}

#[tokio::test]
async fn test_buy_with_fee_override() {
    let (gateway, quoter) = gateway(MAKER_KEY, dec!(1.1));
    let query = query(Side::Buy, dec!(0.1111), "PMMV5").with_fee_factor(10);
    let order = gateway.new_order(&query).await.unwrap();

    assert_eq!(order.maker_asset_amount(), U256::from(111_200_000_000_000_000u128));
    assert_eq!(order.taker_asset_amount(), U256::from(122_319u64));
    assert_eq!(order.fee_factor(), 10);

    // The provider is asked for the fee-inflated amount.
    assert_eq!(quoter.price_requests()[0].amount, Some(dec!(0.1112)));
}

#[tokio::test]
async fn test_sell_formats_maker_asset_amount() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1.1));
    let result = gateway.new_order(&query(Side::Sell, dec!(0.1111), "PMMV5")).await;

    let reply = reply_json(result);
    let order = &reply["order"];
    assert!(order["makerWalletSignature"].as_str().unwrap().ends_with('4'));
    assert_eq!(order["takerAssetAmount"], "111100000000000000");
    assert_eq!(order["makerAssetAmount"], "122210");
    assert_eq!(
        &order["takerAssetData"].as_str().unwrap()[34..],
        &WETH[2..]
    );
}

#[tokio::test]
async fn test_query_from_relay_json() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1.1));
    let query: Query = serde_json::from_value(serde_json::json!({
        "base": "eth",
        "quote": "usdt",
        "side": "SELL",
        "amount": "0.1111",
        "uniqId": "testing-1111",
        "userAddr": USER,
        "protocol": "RFQV1"
    }))
    .unwrap();

    let order = gateway.new_order(&query).await.unwrap();
    assert_eq!(order.maker_asset_amount(), U256::from(122_210u64));
}
