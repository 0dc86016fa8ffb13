//! Gateway request handling beyond firm orders.

mod common;
use common::*;

use mmsk_core::{Query, Rate, Side};
use mmsk_gateway::{AppError, RateReply};
use mmsk_quoting::{DealOrder, ExceptionOrder, PairsCheckIssue};
use rust_decimal_macros::dec;

fn deal(quote_id: &str) -> DealOrder {
    DealOrder {
        maker_token: "USDT".to_string(),
        taker_token: "ETH".to_string(),
        maker_token_amount: dec!(0.12221),
        taker_token_amount: dec!(0.1111),
        quote_id: quote_id.to_string(),
        timestamp: 1_620_444_917,
    }
}

#[tokio::test]
async fn test_supported_tokens() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1));
    let tokens = gateway.supported_tokens();

    let symbols: Vec<_> = tokens.iter().map(|t| t.symbol().to_string()).collect();
    assert_eq!(symbols, vec!["ETH", "USDT"]);
    assert!(tokens[0].can_trade_against("USDT"));
    assert!(tokens[1].can_trade_against("ETH"));
}

#[tokio::test]
async fn test_indicative_rate() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1.1));

    let sell = gateway
        .indicative_rate(&Query::new("ETH", "USDT", Side::Sell).with_amount(dec!(0.1)))
        .await
        .unwrap();
    assert_eq!(sell.rate, Rate(dec!(1.1)));

    let buy = gateway
        .indicative_rate(&Query::new("ETH", "USDT", Side::Buy).with_amount(dec!(0.1)))
        .await
        .unwrap();
    assert_eq!(buy.rate, Rate(dec!(0.90909091)));
}

#[tokio::test]
async fn test_indicative_rate_rejected() {
    let (gateway, quoter) = gateway(MAKER_KEY, dec!(1.1));
    let mut quote = mmsk_core::PriceQuote::firm(dec!(1.1), QUOTE_ID);
    quote.exchangeable = false;
    quote.message = Some("paused".to_string());
    quoter.set_price(Some(quote));

    let result = gateway
        .indicative_rate(&Query::new("ETH", "USDT", Side::Sell))
        .await;
    let reply = serde_json::to_value(RateReply::from(result)).unwrap();
    assert_eq!(reply["result"], false);
    assert_eq!(reply["exchangeable"], false);
    assert_eq!(reply["message"], "paused");
}

#[tokio::test]
async fn test_indicative_rate_unsupported_pair_skips_provider() {
    let (gateway, quoter) = gateway(MAKER_KEY, dec!(1.1));

    let result = gateway
        .indicative_rate(&Query::new("ETH", "DAI", Side::Sell).with_amount(dec!(0.1)))
        .await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    assert!(quoter.price_requests().is_empty());

    let reply = serde_json::to_value(RateReply::from(result)).unwrap();
    assert_eq!(reply["result"], false);
    assert_eq!(reply["exchangeable"], false);
    assert_eq!(reply["message"], "Invalid request: Unsupported pair ETH/DAI");
}

#[tokio::test]
async fn test_deal_and_exception_strip_prefix() {
    let (gateway, quoter) = gateway(MAKER_KEY, dec!(1));

    let ack = tokio_test::assert_ok!(gateway.deal_order(deal("1--echo-testing-8888")).await);
    assert!(ack.result);
    assert_eq!(quoter.deals()[0].quote_id, "echo-testing-8888");

    let d = deal("1--echo-testing-8888");
    let exception = ExceptionOrder {
        maker_token: d.maker_token,
        taker_token: d.taker_token,
        maker_token_amount: d.maker_token_amount,
        taker_token_amount: d.taker_token_amount,
        quote_id: d.quote_id,
        timestamp: d.timestamp,
        kind: "FAILED".to_string(),
    };
    gateway.exception_order(exception).await.unwrap();
    assert_eq!(quoter.exceptions()[0].quote_id, "echo-testing-8888");

    // Ids without the prefix pass through.
    gateway.deal_order(deal("raw-id")).await.unwrap();
    assert_eq!(quoter.deals()[1].quote_id, "raw-id");
}

#[tokio::test]
async fn test_check_pairs() {
    let (gateway, quoter) = gateway(MAKER_KEY, dec!(1));
    tokio_test::assert_ok!(gateway.check_pairs().await);

    quoter.set_pairs(&["ETHUSDT"]);
    assert!(matches!(
        gateway.check_pairs().await,
        Err(PairsCheckIssue::Malformed(_))
    ));

    quoter.set_pairs_error("connect ECONNREFUSED");
    assert!(matches!(
        gateway.check_pairs().await,
        Err(PairsCheckIssue::RequestFailed(_))
    ));
}

#[tokio::test]
async fn test_start_and_shutdown() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1));
    gateway.start();
    gateway.shutdown().await;

    assert!(gateway.statuses().iter().all(|s| s.loaded));
}

#[tokio::test]
async fn test_render_metrics_after_signing() {
    let (gateway, _) = gateway(MAKER_KEY, dec!(1.1));
    let query = Query::new("ETH", "USDT", Side::Sell)
        .with_amount(dec!(0.1111))
        .with_user(USER)
        .with_protocol("PMMV5");
    tokio_test::assert_ok!(gateway.new_order(&query).await);

    let text = tokio_test::assert_ok!(gateway.render_metrics());
    assert!(text.contains("mmsk_orders_signed_total"));
    assert!(text.contains("PMMV5"));
}
