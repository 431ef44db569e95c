//! Telegram (legacy Markdown) rendering of an arbitrage decision.

use super::decision::{clears_fees, should_alert, Classification, Decision};

/// Display labels and thresholds used while rendering.
#[derive(Debug, Clone)]
pub struct ReportLabels<'a> {
    pub title: &'a str,
    pub name_a: &'a str,
    pub name_b: &'a str,
    pub currency: &'a str,
    pub threshold_pct: f64,
    pub round_trip_fee_pct: f64,
}

/// Rounds to a whole number and groups digits in thousands: `1234567.6` -> `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Sections: title and timestamp, prices, analysis, strategy, notes.
pub fn format_arbitrage_message(decision: &Decision, labels: &ReportLabels<'_>, timestamp: &str) -> String {
    let money = |value: f64| format!("{}{}", format_thousands(value), labels.currency);
    let gap = decision.deviation_pct.abs();

    let mut msg = format!("🔍 *{}*\n", labels.title);
    msg.push_str(&format!("📅 {}\n\n", timestamp));

    msg.push_str("📊 *Current prices*\n");
    msg.push_str(&format!("• {}: `{}`\n", labels.name_a, money(decision.price_a)));
    msg.push_str(&format!("• {}: `{}`\n", labels.name_b, money(decision.price_b)));
    msg.push_str(&format!("• Conversion ratio: `{:.6}`\n\n", decision.ratio));

    msg.push_str("📈 *Analysis*\n");
    msg.push_str(&format!(
        "• {} price via {}: `{}`\n",
        labels.name_a,
        labels.name_b,
        money(decision.effective_b_as_a)
    ));
    msg.push_str(&format!("• Deviation: `{:+.2}%`\n", decision.deviation_pct));
    msg.push_str(&format!("• {} parity price: `{}`\n\n", labels.name_b, money(decision.parity_b)));

    msg.push_str("💡 *Strategy*\n");
    match decision.classification {
        Classification::BCheaper => {
            msg.push_str(&format!(
                "🟢 *Buy {} and convert into {}* is cheaper\n",
                labels.name_b, labels.name_a
            ));
            msg.push_str(&format!("• Expected gain: `{:.2}%`\n", gap));
        }
        Classification::ACheaper => {
            msg.push_str(&format!("🔵 *Buy {} directly* is cheaper\n", labels.name_a));
            msg.push_str(&format!("• Discount versus {}: `{:.2}%`\n", labels.name_b, gap));
        }
        Classification::Equal => {
            msg.push_str("🟡 *Both routes cost about the same*\n");
            msg.push_str(&format!("• Deviation: `{:.2}%`\n", gap));
        }
    }
    if decision.classification != Classification::Equal && should_alert(decision, labels.threshold_pct) {
        msg.push_str(&format!(
            "⚠️ *Heads up*: the deviation is {}% or more!\n",
            labels.threshold_pct
        ));
    }

    let fee_hurdle = labels.round_trip_fee_pct * 2.0;
    msg.push_str("\n📋 *Notes*\n");
    if clears_fees(decision, labels.round_trip_fee_pct) {
        msg.push_str(&format!(
            "✅ Still profitable after estimated fees ({:.2}%)\n",
            fee_hurdle
        ));
    } else {
        msg.push_str(&format!(
            "⚠️ Little real gain after estimated fees ({:.2}%)\n",
            fee_hurdle
        ));
    }
    msg.push_str("• Real trades also pay slippage and commissions\n");
    msg.push_str("• Price risk remains until the conversion completes\n");

    msg
}

pub fn alert_banner(message: &str) -> String {
    format!("🚨 *Arbitrage opportunity detected!* 🚨\n\n{}", message)
}
