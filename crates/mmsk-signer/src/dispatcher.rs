//! Order construction and signing dispatcher.
//!
//! One entry point, [`build_signed_order`], runs the whole pipeline for a
//! firm request:
//!
//! 1. Parse the protocol selector
//! 2. Normalize and validate the query against the registry snapshot
//! 3. Fetch a firm price from the quoting provider
//! 4. Resolve amounts and asset addresses, fill protocol fields
//! 5. Compute the EIP-712 digest and sign it
//!
//! Provider and signer calls are bounded by the context's timeouts.

use crate::digest::{erc20_asset_data, pmmv5, rfqv1};
use crate::error::{OrderError, OrderResult};
use crate::order::{pmm_salt, random_salt, PmmV5Order, RfqV1Order, SignedOrder};
use crate::signature::{sign_order_digest, SignatureScheme};
use alloy::primitives::{Address, U256};
use alloy::signers::Signer as AlloySigner;
use mmsk_core::{
    Amount, Clock, FeeFactor, MarketMakerConfig, PriceQuote, Protocol, Query, Rate, Side,
    SupportedToken, SystemClock,
};
use mmsk_quoting::{
    add_quote_id_prefix, effective_fee_factor, normalize, rejection_message, Quoter,
};
use mmsk_registry::RegistrySnapshot;
use mmsk_telemetry::Metrics;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default chain id (Ethereum mainnet).
pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything besides the query that order construction depends on.
#[derive(Clone)]
pub struct ProtocolContext {
    pub snapshot: RegistrySnapshot,
    pub chain_id: u64,
    pub quote_timeout: Duration,
    pub sign_timeout: Duration,
    pub clock: Arc<dyn Clock>,
}

impl ProtocolContext {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            snapshot,
            chain_id: DEFAULT_CHAIN_ID,
            quote_timeout: DEFAULT_QUOTE_TIMEOUT,
            sign_timeout: DEFAULT_SIGN_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_timeouts(mut self, quote_timeout: Duration, sign_timeout: Duration) -> Self {
        self.quote_timeout = quote_timeout;
        self.sign_timeout = sign_timeout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for ProtocolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolContext")
            .field("chain_id", &self.chain_id)
            .field("quote_timeout", &self.quote_timeout)
            .field("sign_timeout", &self.sign_timeout)
            .finish_non_exhaustive()
    }
}

/// Build and sign an order for `query`.
///
/// Rejections from the provider come back as [`OrderError::Rejected`] with a
/// displayable message; see [`OrderError::is_fatal`] for the split between
/// per-request and gateway-level failures.
pub async fn build_signed_order<S>(
    signer: &S,
    quoter: &dyn Quoter,
    query: &Query,
    ctx: &ProtocolContext,
) -> OrderResult<SignedOrder>
where
    S: AlloySigner + Send + Sync,
{
    let protocol = match Protocol::from_str(&query.protocol) {
        Ok(protocol) => protocol,
        Err(_) => {
            warn!(protocol = %query.protocol, "Unrecognized protocol");
            Metrics::order_failed("unrecognized", "protocol");
            return Err(OrderError::UnrecognizedProtocol(query.protocol.clone()));
        }
    };

    let result = build(signer, quoter, query, protocol, ctx).await;
    match &result {
        Ok((order, scheme)) => {
            Metrics::order_signed(protocol.as_str(), scheme.as_str());
            info!(
                protocol = %protocol,
                scheme = %scheme,
                quote_id = %order.quote_id(),
                maker_amount = %order.maker_asset_amount(),
                taker_amount = %order.taker_asset_amount(),
                fee_factor = order.fee_factor(),
                "Order signed"
            );
        }
        Err(e) => {
            Metrics::order_failed(protocol.as_str(), e.kind());
            warn!(protocol = %protocol, kind = e.kind(), error = %e, "Order not signed");
        }
    }
    result.map(|(order, _)| order)
}

/// Validated inputs shared by both protocol families.
struct OrderTerms<'a> {
    mm: &'a MarketMakerConfig,
    maker: Address,
    user: Address,
    maker_asset: Address,
    taker_asset: Address,
    maker_amount: U256,
    taker_amount: U256,
    fee: FeeFactor,
    expiration: u64,
    quote_id: String,
}

async fn build<S>(
    signer: &S,
    quoter: &dyn Quoter,
    query: &Query,
    protocol: Protocol,
    ctx: &ProtocolContext,
) -> OrderResult<(SignedOrder, SignatureScheme)>
where
    S: AlloySigner + Send + Sync,
{
    let snapshot = &ctx.snapshot;
    let mm = snapshot
        .market_maker()
        .map_err(|e| OrderError::ConfigUnavailable(e.to_string()))?;

    let normalized = normalize(query, snapshot);
    let (base, quote_token) = resolve_pair(&normalized, snapshot)?;
    let amount = normalized
        .amount
        .map(Amount::new)
        .filter(Amount::is_positive)
        .ok_or_else(|| OrderError::Validation("amount must be a positive number".to_string()))?;
    let user = parse_user(normalized.user_addr.as_deref())?;

    let quote = fetch_price(quoter, &normalized, ctx.quote_timeout).await?;
    let rate = quote
        .usable_price()
        .and_then(|price| Rate::for_side(price, normalized.side))
        .ok_or_else(|| OrderError::Rejected(rejection_message(&quote)))?;
    let provider_quote_id = quote
        .quote_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| OrderError::Rejected("quote provider returned no quoteId".to_string()))?;

    let maker = match quote.maker_address.as_deref() {
        Some(address) => Address::from_str(address).map_err(|_| {
            OrderError::Rejected(format!("quote provider returned invalid makerAddress {address}"))
        })?,
        None => config_address("mmProxyContractAddress", &mm.mm_proxy_contract_address)?,
    };

    let overflow = || OrderError::Validation(format!("amount {amount} overflows at rate {rate}"));
    let (maker_token, maker_amount, taker_token, taker_amount) = match normalized.side {
        Side::Buy => (
            base,
            amount,
            quote_token,
            amount.checked_div(rate).ok_or_else(overflow)?,
        ),
        Side::Sell => (
            quote_token,
            amount.checked_mul(rate).ok_or_else(overflow)?,
            base,
            amount,
        ),
    };

    let terms = OrderTerms {
        mm,
        maker,
        user,
        maker_asset: asset_address(maker_token, mm)?,
        taker_asset: asset_address(taker_token, mm)?,
        maker_amount: base_units(maker_amount, maker_token)?,
        taker_amount: base_units(taker_amount, taker_token)?,
        fee: effective_fee_factor(query.fee_factor, snapshot, maker_token.symbol()),
        expiration: expiration(ctx.clock.now_secs(), mm.order_expiration_seconds)?,
        quote_id: add_quote_id_prefix(&mm.mm_id, provider_quote_id),
    };

    let scheme = SignatureScheme::select(signer.address(), terms.maker);
    debug!(
        protocol = %protocol,
        scheme = %scheme,
        side = %normalized.side,
        maker_token = %maker_token.symbol(),
        taker_token = %taker_token.symbol(),
        rate = %rate,
        "Building order"
    );

    let order = match protocol {
        Protocol::PmmV5 => SignedOrder::PmmV5(sign_pmm(signer, terms, scheme, ctx).await?),
        Protocol::RfqV1 => SignedOrder::RfqV1(sign_rfq(signer, terms, scheme, ctx).await?),
    };
    Ok((order, scheme))
}

async fn sign_pmm<S>(
    signer: &S,
    terms: OrderTerms<'_>,
    scheme: SignatureScheme,
    ctx: &ProtocolContext,
) -> OrderResult<PmmV5Order>
where
    S: AlloySigner + Send + Sync,
{
    let pmm = config_address("addressBookV5.PMM", &terms.mm.address_book.pmm)?;
    let exchange = config_address("exchangeContractAddress", &terms.mm.exchange_contract_address)?;

    let typed = pmmv5::Order {
        makerAddress: terms.maker,
        takerAddress: pmm,
        feeRecipientAddress: terms.user,
        senderAddress: pmm,
        makerAssetAmount: terms.maker_amount,
        takerAssetAmount: terms.taker_amount,
        makerFee: U256::ZERO,
        takerFee: U256::ZERO,
        expirationTimeSeconds: U256::from(terms.expiration),
        salt: pmm_salt(terms.fee),
        makerAssetData: erc20_asset_data(terms.maker_asset),
        takerAssetData: erc20_asset_data(terms.taker_asset),
    };
    let digest = pmmv5::order_digest(&typed, exchange);
    let signature = sign_with_timeout(
        signer,
        Protocol::PmmV5,
        digest,
        scheme,
        &terms,
        ctx.sign_timeout,
    )
    .await?;

    Ok(PmmV5Order {
        maker_address: typed.makerAddress,
        taker_address: typed.takerAddress,
        fee_recipient_address: typed.feeRecipientAddress,
        sender_address: typed.senderAddress,
        maker_asset_address: terms.maker_asset,
        taker_asset_address: terms.taker_asset,
        maker_asset_amount: typed.makerAssetAmount,
        taker_asset_amount: typed.takerAssetAmount,
        maker_fee: typed.makerFee,
        taker_fee: typed.takerFee,
        expiration_time_seconds: typed.expirationTimeSeconds,
        salt: typed.salt,
        maker_asset_data: typed.makerAssetData,
        taker_asset_data: typed.takerAssetData,
        exchange_address: exchange,
        fee_factor: terms.fee.bps(),
        quote_id: terms.quote_id,
        maker_wallet_signature: signature,
    })
}

async fn sign_rfq<S>(
    signer: &S,
    terms: OrderTerms<'_>,
    scheme: SignatureScheme,
    ctx: &ProtocolContext,
) -> OrderResult<RfqV1Order>
where
    S: AlloySigner + Send + Sync,
{
    let rfq = config_address("addressBookV5.RFQ", &terms.mm.address_book.rfq)?;

    let typed = rfqv1::Order {
        takerAddr: terms.user,
        makerAddr: terms.maker,
        takerAssetAddr: terms.taker_asset,
        makerAssetAddr: terms.maker_asset,
        takerAssetAmount: terms.taker_amount,
        makerAssetAmount: terms.maker_amount,
        salt: random_salt(),
        deadline: U256::from(terms.expiration),
        feeFactor: U256::from(terms.fee.bps()),
    };
    let digest = rfqv1::order_digest(&typed, ctx.chain_id, rfq);
    let signature = sign_with_timeout(
        signer,
        Protocol::RfqV1,
        digest,
        scheme,
        &terms,
        ctx.sign_timeout,
    )
    .await?;

    Ok(RfqV1Order {
        taker_address: typed.takerAddr,
        maker_address: typed.makerAddr,
        taker_asset_address: typed.takerAssetAddr,
        maker_asset_address: typed.makerAssetAddr,
        taker_asset_amount: typed.takerAssetAmount,
        maker_asset_amount: typed.makerAssetAmount,
        salt: typed.salt,
        deadline: typed.deadline,
        fee_factor: terms.fee.bps(),
        quote_id: terms.quote_id,
        maker_wallet_signature: signature,
    })
}

async fn sign_with_timeout<S>(
    signer: &S,
    protocol: Protocol,
    digest: alloy::primitives::B256,
    scheme: SignatureScheme,
    terms: &OrderTerms<'_>,
    timeout: Duration,
) -> OrderResult<alloy::primitives::Bytes>
where
    S: AlloySigner + Send + Sync,
{
    let signing = sign_order_digest(signer, protocol, digest, scheme, terms.user, terms.fee);
    match tokio::time::timeout(timeout, signing).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(OrderError::Timeout {
            operation: "sign",
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

async fn fetch_price(
    quoter: &dyn Quoter,
    query: &Query,
    timeout: Duration,
) -> OrderResult<PriceQuote> {
    match tokio::time::timeout(timeout, quoter.get_price(query)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(OrderError::Timeout {
            operation: "getPrice",
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

fn resolve_pair<'a>(
    query: &Query,
    snapshot: &'a RegistrySnapshot,
) -> OrderResult<(&'a SupportedToken, &'a SupportedToken)> {
    let (Some(base), Some(quote)) = (query.base.as_deref(), query.quote.as_deref()) else {
        return Err(OrderError::Validation("base and quote are required".to_string()));
    };

    if !snapshot.is_supported_pair(base, quote) {
        return Err(OrderError::Validation(format!("Unsupported pair {base}/{quote}")));
    }

    match (snapshot.find_token(base), snapshot.find_token(quote)) {
        (Some(b), Some(q)) => Ok((b, q)),
        _ => Err(OrderError::Validation(format!("Unsupported pair {base}/{quote}"))),
    }
}

fn parse_user(user: Option<&str>) -> OrderResult<Address> {
    let user = user
        .filter(|u| !u.is_empty())
        .ok_or_else(|| OrderError::Validation("userAddr is required".to_string()))?;
    Address::from_str(user)
        .map_err(|_| OrderError::Validation(format!("invalid userAddr {user}")))
}

fn config_address(field: &str, value: &str) -> OrderResult<Address> {
    Address::from_str(value).map_err(|_| {
        OrderError::ConfigUnavailable(format!("marketMakerConfig {field} is not an address: {value:?}"))
    })
}

/// On-chain asset for `token`: the wrapped native token for ETH.
fn asset_address(token: &SupportedToken, mm: &MarketMakerConfig) -> OrderResult<Address> {
    if token.meta.is_native() {
        config_address("wethContractAddress", &mm.weth_contract_address)
    } else {
        Address::from_str(token.contract_address()).map_err(|_| {
            OrderError::ConfigUnavailable(format!(
                "token {} has invalid contract address {}",
                token.symbol(),
                token.contract_address()
            ))
        })
    }
}

fn expiration(now_secs: u64, window_secs: u64) -> OrderResult<u64> {
    now_secs.checked_add(window_secs).ok_or_else(|| {
        OrderError::ConfigUnavailable(format!(
            "marketMakerConfig orderExpirationSeconds {window_secs} overflows the expiration time"
        ))
    })
}

fn base_units(amount: Amount, token: &SupportedToken) -> OrderResult<U256> {
    amount
        .to_base_units(token.meta.decimal)
        .map(U256::from)
        .map_err(|e| OrderError::Validation(format!("{} amount: {e}", token.symbol())))
}
