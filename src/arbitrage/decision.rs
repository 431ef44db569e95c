use crate::{HeraldError, Result};

/// Deviations smaller than this are treated as parity.
pub const PARITY_EPSILON_PCT: f64 = 1e-6;

/// Which way of ending up holding instrument A is cheaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Buying A directly beats converting B.
    ACheaper,
    /// Buying B and converting it at the ratio beats buying A.
    BCheaper,
    Equal,
}

/// Prices of instrument A (bought directly) and B (converted into A at `ratio`
/// A shares per B share), plus everything derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub price_a: f64,
    pub price_b: f64,
    pub ratio: f64,
    /// Cost of one A share obtained through B.
    pub effective_b_as_a: f64,
    /// Signed gap between the converted price and the direct price, in percent of the direct price.
    pub deviation_pct: f64,
    /// Price B would need for both routes to cost the same.
    pub parity_b: f64,
    pub classification: Classification,
}

fn validate(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(HeraldError::InvalidInput(format!("{} must be a positive number, got {}", name, value)))
    }
}

pub fn decide(price_a: f64, price_b: f64, ratio: f64) -> Result<Decision> {
    let price_a = validate("price_a", price_a)?;
    let price_b = validate("price_b", price_b)?;
    let ratio = validate("ratio", ratio)?;

    let effective_b_as_a = price_b / ratio;
    let deviation_pct = (effective_b_as_a - price_a) / price_a * 100.0;
    let parity_b = price_a * ratio;

    let classification = if deviation_pct.abs() < PARITY_EPSILON_PCT {
        Classification::Equal
    } else if deviation_pct < 0.0 {
        Classification::BCheaper
    } else {
        Classification::ACheaper
    };

    Ok(Decision {
        price_a,
        price_b,
        ratio,
        effective_b_as_a,
        deviation_pct,
        parity_b,
        classification,
    })
}

pub fn should_alert(decision: &Decision, threshold_pct: f64) -> bool {
    decision.deviation_pct.abs() >= threshold_pct
}

/// Whether the gap is still worth taking after fees: it must exceed twice the round-trip fee.
pub fn clears_fees(decision: &Decision, round_trip_fee_pct: f64) -> bool {
    decision.deviation_pct.abs() > 2.0 * round_trip_fee_pct
}
