//! Watches the gap between buying instrument A directly and buying B and
//! converting it into A at a fixed share ratio.

mod decision;
mod prices;
mod report;

pub use self::decision::*;
pub use self::prices::{parse_naver_price, parse_yahoo_chart, Instrument, MarketPriceFeed, PriceFeed};
pub use self::report::{alert_banner, format_arbitrage_message, format_thousands, ReportLabels};

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::delivery::{notify, ChatTransport, DeliveryResult};
use crate::MAX_TELEGRAM_LEN;

pub const DEFAULT_RATIO: f64 = 0.4059146;
pub const DEFAULT_THRESHOLD_PCT: f64 = 2.0;
pub const DEFAULT_FEE_PCT: f64 = 0.15;

pub const PRICE_FETCH_FAILED: &str = "❌ Could not fetch price data.";

#[derive(Debug, Clone)]
pub struct ArbitrageSettings {
    pub title: String,
    /// Held instrument, bought directly.
    pub instrument_a: Instrument,
    /// Instrument converted into A.
    pub instrument_b: Instrument,
    /// A shares received per B share.
    pub ratio: f64,
    pub threshold_pct: f64,
    pub round_trip_fee_pct: f64,
    /// Send the report even when the gap is under the threshold.
    pub send_always: bool,
    pub chunk_pause: Option<Duration>,
}

impl Default for ArbitrageSettings {
    fn default() -> Self {
        Self {
            title: "HD Hyundai Heavy / Mipo merger arbitrage".to_string(),
            instrument_a: Instrument {
                name: "HD Hyundai Heavy Industries".to_string(),
                yahoo_ticker: "329180.KS".to_string(),
                naver_code: Some("329180".to_string()),
            },
            instrument_b: Instrument {
                name: "HD Hyundai Mipo".to_string(),
                yahoo_ticker: "010620.KS".to_string(),
                naver_code: Some("010620".to_string()),
            },
            ratio: DEFAULT_RATIO,
            threshold_pct: DEFAULT_THRESHOLD_PCT,
            round_trip_fee_pct: DEFAULT_FEE_PCT,
            send_always: false,
            chunk_pause: None,
        }
    }
}

impl ArbitrageSettings {
    fn labels(&self) -> ReportLabels<'_> {
        ReportLabels {
            title: &self.title,
            name_a: &self.instrument_a.name,
            name_b: &self.instrument_b.name,
            currency: " KRW",
            threshold_pct: self.threshold_pct,
            round_trip_fee_pct: self.round_trip_fee_pct,
        }
    }
}

#[derive(Debug)]
pub enum CheckOutcome {
    /// At least one price could not be fetched.
    NoData(String),
    /// Gap under the threshold and `send_always` off.
    Skipped(Decision),
    Sent {
        decision: Decision,
        alert: bool,
        delivery: Vec<DeliveryResult>,
    },
}

/// Runs one check. Prices that fail validation abort the check without notifying anyone.
pub async fn run_check(
    feed: &dyn PriceFeed,
    transport: Option<&dyn ChatTransport>,
    settings: &ArbitrageSettings,
    now: DateTime<Local>,
) -> Result<CheckOutcome> {
    info!("Fetching prices for {} and {}", settings.instrument_a.name, settings.instrument_b.name);

    let prices = match feed.price(&settings.instrument_a).await {
        Ok(price_a) => feed.price(&settings.instrument_b).await.map(|price_b| (price_a, price_b)),
        Err(e) => Err(e),
    };
    let (price_a, price_b) = match prices {
        Ok(prices) => prices,
        Err(e) => {
            warn!("Price fetch failed: {}", e);
            notify(transport, PRICE_FETCH_FAILED, MAX_TELEGRAM_LEN, settings.chunk_pause).await;
            return Ok(CheckOutcome::NoData(e.to_string()));
        }
    };

    let decision = decide(price_a, price_b, settings.ratio).map_err(|e| {
        warn!("Refusing to report on invalid prices: {}", e);
        e
    })?;

    info!(
        "{}: {:.0} | {}: {:.0} | via B: {:.0} | deviation {:+.2}% | {:?}",
        settings.instrument_a.name,
        decision.price_a,
        settings.instrument_b.name,
        decision.price_b,
        decision.effective_b_as_a,
        decision.deviation_pct,
        decision.classification
    );

    let alert = should_alert(&decision, settings.threshold_pct);
    if !alert && !settings.send_always {
        info!(
            "Deviation {:.2}% is under the {}% threshold, not sending",
            decision.deviation_pct.abs(),
            settings.threshold_pct
        );
        return Ok(CheckOutcome::Skipped(decision));
    }

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let mut message = format_arbitrage_message(&decision, &settings.labels(), &timestamp);
    if alert {
        message = alert_banner(&message);
    }
    let delivery = notify(transport, &message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;

    Ok(CheckOutcome::Sent {
        decision,
        alert,
        delivery,
    })
}
