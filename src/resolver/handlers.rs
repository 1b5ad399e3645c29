//! Aggregation handlers behind the count and performance routes

use crate::data::DataStore;
use tracing::debug;

pub const FALLBACK_ANSWER: &str = "Sorry can not find the answer";
pub const GREETING_ANSWER: &str = "Hello! I can answer questions about fund holdings and trades.";

/// At least one must appear before a count is attempted
const COUNT_GUARDRAIL_KEYWORDS: &[&str] =
    &["count", "number", "how many", "total", "quantity", "amount"];

/// Holdings and trades rows for the fund named in the question
pub fn answer_count(store: &DataStore, question: &str) -> String {
    let lowered = question.to_lowercase();

    if !COUNT_GUARDRAIL_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        debug!("Count guardrail rejected question");
        return FALLBACK_ANSWER.to_string();
    }

    // Longest names first so "Fund A Extended" wins over "Fund A"
    let matched = store
        .fund_names()
        .into_iter()
        .find(|fund| lowered.contains(&fund.to_lowercase()));

    let Some(fund) = matched else {
        debug!("No fund named in question");
        return FALLBACK_ANSWER.to_string();
    };

    let holdings = store.holdings_count(fund);
    let trades = store.trades_count(fund);

    debug!(fund, holdings, trades, "Counted fund rows");

    format!(
        "Fund '{}' has {} holdings and {} trades.",
        fund, holdings, trades
    )
}

/// Fund with the highest summed PL_YTD
pub fn answer_performance(store: &DataStore) -> String {
    if !store.has_pl_ytd() {
        debug!("Holdings carry no PL_YTD column");
        return FALLBACK_ANSWER.to_string();
    }

    let mut totals = store.pl_ytd_by_fund();
    // Stable: equal sums keep ascending name order
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    match totals.first() {
        Some((fund, total)) => format!(
            "The best performing fund is '{}' with a Yearly P&L of ${}.",
            fund,
            format_money(*total)
        ),
        None => FALLBACK_ANSWER.to_string(),
    }
}

/// Two decimals with comma thousands separators, e.g. `-1,234.50`
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.2}", value);
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, fraction)
}
