//! Number formatting shared by the migration rows
//!
//! Amounts arrive as decimal strings straight from the data providers.
//! Anything that does not parse renders as [`NO_DATA`] instead of failing.

use serde::{Deserialize, Serialize};

/// Placeholder for a value that is absent or unknown
pub const NO_DATA: &str = "—";

/// Rate string the selector store uses for "no rate available"
pub const UNKNOWN_RATE: &str = "-1";

const COMPACT_SUFFIXES: [&str; 6] = ["", "K", "M", "B", "T", "P"];
const COMPACT_ABOVE: f64 = 99_999.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unit {
    /// Token units
    #[default]
    Token,
    /// Fraction rendered as a percentage (0.052 → 5.20%)
    Percent,
    Usd,
}

/// Format a decimal string, see [`format_value`]
pub fn format_number(value: &str, unit: Unit) -> String {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format_value(v, unit),
        _ => NO_DATA.to_string(),
    }
}

pub fn format_value(value: f64, unit: Unit) -> String {
    let number = if unit == Unit::Percent { value * 100.0 } else { value };
    let decimals = if number == 0.0 {
        0
    } else if number > 1.0 || unit != Unit::Token {
        2
    } else {
        7
    };

    let min_value = 10f64.powi(-(decimals as i32));
    let below_min = number != 0.0 && number.abs() < min_value;
    let shown = if below_min { min_value } else { number };

    let body = if shown > COMPACT_ABOVE {
        compact(shown, decimals)
    } else {
        grouped(shown, decimals)
    };

    let mut out = String::new();
    if below_min {
        out.push('<');
    }
    if unit == Unit::Usd {
        out.push('$');
    }
    out.push_str(&body);
    if unit == Unit::Percent {
        out.push('%');
    }
    out
}

/// 123456.7 → "123.46K"
fn compact(value: f64, decimals: usize) -> String {
    let integer_places = format!("{:.0}", value.abs()).len();
    let group = ((integer_places.saturating_sub(1)) / 3).min(COMPACT_SUFFIXES.len() - 1);
    let scaled = value / 1000f64.powi(group as i32);
    format!("{}{}", grouped(scaled, decimals), COMPACT_SUFFIXES[group])
}

/// Fixed decimals with thousands separators
fn grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut int_grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            int_grouped.push(',');
        }
        int_grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, int_grouped, f),
        None => format!("{}{}", sign, int_grouped),
    }
}

/// Reward emitted on top of the base rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveInfo {
    pub reward_token_symbol: String,
    /// Fractional APR, or "Infinity"
    pub incentive_apr: String,
}

/// Summarize incentives as "+1.10% stkAAVE", "∞" for unbounded emissions.
/// Empty lists render nothing.
pub fn format_incentives(incentives: &[IncentiveInfo]) -> Option<String> {
    if incentives.is_empty() {
        return None;
    }

    let symbols = incentives
        .iter()
        .map(|i| i.reward_token_symbol.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let infinite = incentives.iter().any(|i| i.incentive_apr == "Infinity");
    let apr = if infinite {
        "∞".to_string()
    } else {
        let sum: f64 = incentives
            .iter()
            .filter_map(|i| i.incentive_apr.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .sum();
        if sum < 10_000.0 {
            format_value(sum, Unit::Percent)
        } else {
            ">10,000%".to_string()
        }
    };

    Some(format!("+{} {}", apr, symbols))
}

/// A rate with its incentives, as shown on either side of an APY change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateCell {
    /// Formatted APY, `None` for the unknown-rate sentinel
    pub apy: Option<String>,
    pub incentives: Option<String>,
}

impl RateCell {
    pub fn new(value: &str, incentives: &[IncentiveInfo]) -> Self {
        let apy = if value.trim() == UNKNOWN_RATE {
            None
        } else {
            Some(format_number(value, Unit::Percent))
        };
        Self {
            apy,
            incentives: format_incentives(incentives),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.apy.is_none()
    }

    pub fn apy_text(&self) -> &str {
        self.apy.as_deref().unwrap_or(NO_DATA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incentive(symbol: &str, apr: &str) -> IncentiveInfo {
        IncentiveInfo {
            reward_token_symbol: symbol.to_string(),
            incentive_apr: apr.to_string(),
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_number("0.052", Unit::Percent), "5.20%");
        assert_eq!(format_number("0", Unit::Percent), "0%");
        assert_eq!(format_number("0.00001", Unit::Percent), "<0.01%");
    }

    #[test]
    fn test_usd() {
        assert_eq!(format_number("1234.5", Unit::Usd), "$1,234.50");
        assert_eq!(format_number("0.001", Unit::Usd), "<$0.01");
    }

    #[test]
    fn test_token_decimals() {
        assert_eq!(format_number("12.3456", Unit::Token), "12.35");
        assert_eq!(format_number("0.5", Unit::Token), "0.5000000");
        assert_eq!(format_number("0", Unit::Token), "0");
        assert_eq!(format_number("0.00000001", Unit::Token), "<0.0000001");
    }

    #[test]
    fn test_compact_above_threshold() {
        assert_eq!(format_number("99999", Unit::Token), "99,999.00");
        assert_eq!(format_number("123456.789", Unit::Token), "123.46K");
        assert_eq!(format_number("2500000", Unit::Usd), "$2.50M");
    }

    #[test]
    fn test_unparseable_is_no_data() {
        assert_eq!(format_number("", Unit::Token), NO_DATA);
        assert_eq!(format_number("abc", Unit::Usd), NO_DATA);
        assert_eq!(format_number("NaN", Unit::Percent), NO_DATA);
    }

    #[test]
    fn test_incentives() {
        assert_eq!(format_incentives(&[]), None);
        assert_eq!(
            format_incentives(&[incentive("stkAAVE", "0.011")]).as_deref(),
            Some("+1.10% stkAAVE")
        );
        assert_eq!(
            format_incentives(&[incentive("OP", "0.01"), incentive("WMATIC", "Infinity")]).as_deref(),
            Some("+∞ OP WMATIC")
        );
    }

    #[test]
    fn test_rate_cell_sentinel() {
        let cell = RateCell::new("-1", &[]);
        assert!(cell.is_unknown());
        assert_eq!(cell.apy_text(), NO_DATA);

        let cell = RateCell::new("0.052", &[incentive("stkAAVE", "0.01")]);
        assert_eq!(cell.apy_text(), "5.20%");
        assert_eq!(cell.incentives.as_deref(), Some("+1.00% stkAAVE"));
    }
}
