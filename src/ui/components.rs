//! Reusable UI component helpers
//!
//! Turns captions and migration rows into styled ratatui lines. Nothing here
//! holds state; the same row always produces the same lines.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::{
    accent, bg_selected, danger, disabled, paper, primary, success, text, text_secondary, warning,
};
use crate::format::{RateCell, NO_DATA};
use crate::governance::ProposalCaption;
use crate::migration::{Checkbox, CollateralIndicator, MigrationRow};

/// Width of the label column inside a migration row
const LABEL_WIDTH: usize = 20;
/// Indent of the stat lines under the asset line
const INDENT: &str = "    ";
const SEPARATOR: &str = " → ";

/// Caption as label + time; the label is dropped on narrow layouts
pub fn caption_spans(caption: &ProposalCaption, show_label: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(2);
    if show_label {
        spans.push(Span::styled(
            format!("{} ", caption.label),
            Style::default().fg(text_secondary()),
        ));
    }
    spans.push(Span::styled(caption.text.clone(), Style::default().fg(text())));
    spans
}

/// Border color follows the disabled flag, fill follows the checked flag
pub fn checkbox_span(checkbox: &Checkbox) -> Span<'static> {
    let border = if checkbox.disabled { disabled() } else { text_secondary() };
    let fill = if checkbox.checked { text_secondary() } else { paper() };
    let mark = if checkbox.checked { "[✓]" } else { "[ ]" };
    Span::styled(mark, Style::default().fg(border).bg(fill))
}

fn rate_spans(cell: &RateCell) -> Vec<Span<'static>> {
    let apy_style = if cell.is_unknown() {
        Style::default().fg(text_secondary())
    } else {
        Style::default().fg(text())
    };
    let mut spans = vec![Span::styled(cell.apy_text().to_string(), apy_style)];
    if let Some(incentives) = &cell.incentives {
        spans.push(Span::styled(format!(" {}", incentives), Style::default().fg(accent())));
    }
    spans
}

fn collateral_spans(indicator: CollateralIndicator) -> Vec<Span<'static>> {
    match indicator {
        CollateralIndicator::Enabled => vec![Span::styled("✓", Style::default().fg(success()))],
        CollateralIndicator::Empty => vec![Span::styled(NO_DATA, Style::default().fg(text_secondary()))],
        CollateralIndicator::Isolated => vec![
            Span::styled("⚠ ", Style::default().fg(warning())),
            Span::styled("Isolated", Style::default().fg(warning()).add_modifier(Modifier::BOLD)),
        ],
    }
}

/// Small glyph standing in for the token icon
fn token_glyph(icon_symbol: &str) -> Span<'static> {
    let (glyph, color) = match icon_symbol.to_ascii_uppercase().as_str() {
        "USDC" | "USDT" | "DAI" | "TUSD" | "SUSD" | "GUSD" | "LUSD" | "BUSD" | "FRAX" => ("$", success()),
        "ETH" | "WETH" | "STETH" | "WSTETH" => ("Ξ", accent()),
        "BTC" | "WBTC" | "RENBTC" => ("₿", warning()),
        _ => ("◎", text_secondary()),
    };
    Span::styled(format!("{} ", glyph), Style::default().fg(color))
}

fn badge(label: &str) -> Span<'static> {
    Span::styled(format!("[{}]", label), Style::default().fg(primary()).bg(text()))
}

fn separator() -> Span<'static> {
    Span::styled(SEPARATOR, Style::default().fg(text_secondary()))
}

fn stat_label(label: &str) -> Span<'static> {
    Span::styled(
        format!("{}{:<width$}", INDENT, label, width = LABEL_WIDTH),
        Style::default().fg(text_secondary()),
    )
}

/// Lines for one migration list entry, top to bottom
pub fn migration_row_lines(row: &MigrationRow, selected: bool, show_usd: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(7);

    let symbol_style = if row.checkbox.disabled {
        Style::default().fg(text_secondary()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(text()).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        checkbox_span(&row.checkbox),
        Span::raw(" "),
        token_glyph(&row.icon_symbol),
        Span::styled(row.symbol.clone(), symbol_style),
    ]));

    lines.push(Line::from(vec![
        stat_label("Current v2 Balance"),
        Span::styled(row.balance.amount.clone(), Style::default().fg(text())),
    ]));
    if show_usd {
        lines.push(Line::from(vec![
            stat_label(""),
            Span::styled(row.balance.amount_in_usd.clone(), Style::default().fg(text_secondary())),
        ]));
    }

    let mut apy = vec![stat_label("APY change")];
    apy.extend(rate_spans(&row.apy_change.from));
    apy.push(separator());
    apy.extend(rate_spans(&row.apy_change.to));
    lines.push(Line::from(apy));

    if let Some(change) = &row.collateral_change {
        let mut spans = vec![stat_label("Collateral change")];
        spans.extend(collateral_spans(change.from));
        spans.push(separator());
        spans.extend(collateral_spans(change.to));
        lines.push(Line::from(spans));
    }

    if let Some(change) = &row.apy_type_change {
        lines.push(Line::from(vec![
            stat_label("APY type change"),
            badge(change.from),
            separator(),
            badge(change.to),
        ]));
    }

    if let Some(reason) = row.disabled_reason {
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(reason, Style::default().fg(danger())),
        ]));
    }

    if selected {
        lines = lines
            .into_iter()
            .map(|line| line.style(Style::default().bg(bg_selected())))
            .collect();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{describe, BorrowRateMode, CollateralCapability, MigrationPosition, UserReserve};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn position() -> MigrationPosition {
        MigrationPosition {
            checked: true,
            amount: "10".to_string(),
            amount_in_usd: "10".to_string(),
            disabled: None,
            collateral: None,
            borrow_rate_mode: None,
            user_reserve: UserReserve {
                symbol: "DAI".to_string(),
                icon_symbol: "DAI".to_string(),
                supply_apy: "0.02".to_string(),
                variable_borrow_apy: "0.04".to_string(),
                stable_borrow_apy: "0.05".to_string(),
                a_incentives: vec![],
                v_incentives: vec![],
                s_incentives: vec![],
                usage_as_collateral_enabled_on_user: false,
                usage_as_collateral_enabled: false,
            },
            v3_rates: None,
        }
    }

    #[test]
    fn test_supply_row_has_no_optional_sections() {
        let lines = migration_row_lines(&describe(&position()), false, true);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(lines.len(), 4, "asset, balance, usd, apy: {:?}", text);
        assert!(text[0].starts_with("[✓]"));
        assert!(text[0].contains("DAI"));
        assert!(text[3].contains("2.00% → —"));
    }

    #[test]
    fn test_borrow_row_with_collateral() {
        let mut p = position();
        p.borrow_rate_mode = Some(BorrowRateMode::Stable);
        p.collateral = Some(CollateralCapability {
            enabled_as_collateral: true,
            is_isolated: true,
        });
        let text: Vec<String> = migration_row_lines(&describe(&p), true, false)
            .iter()
            .map(line_text)
            .collect();
        assert!(text.iter().any(|l| l.contains("Collateral change") && l.contains("⚠ Isolated")));
        assert!(text.iter().any(|l| l.contains("[Stable] → [Variable]")));
        assert!(!text.iter().any(|l| l.contains('$')), "usd hidden");
    }

    #[test]
    fn test_disabled_checkbox_style() {
        let enabled = checkbox_span(&Checkbox { checked: false, disabled: false });
        let disabled_box = checkbox_span(&Checkbox { checked: false, disabled: true });
        assert_eq!(enabled.content, "[ ]");
        assert_ne!(enabled.style.fg, disabled_box.style.fg);
        assert_eq!(disabled_box.style.bg, Some(paper()));
    }

    #[test]
    fn test_token_glyph_follows_icon_symbol() {
        assert_eq!(token_glyph("dai").content, "$ ");
        assert_eq!(token_glyph("WETH").content, "Ξ ");
        assert_eq!(token_glyph("WBTC").content, "₿ ");
        assert_eq!(token_glyph("CRV").content, "◎ ");

        let mut p = position();
        p.user_reserve.icon_symbol = "WETH".to_string();
        let lines = migration_row_lines(&describe(&p), false, false);
        assert!(line_text(&lines[0]).contains("Ξ DAI"));
    }

    #[test]
    fn test_caption_label_can_be_hidden() {
        let caption = ProposalCaption {
            label: "Voting ends".to_string(),
            time: crate::governance::TimeExpr::Relative(0),
            text: "in an hour".to_string(),
        };
        assert_eq!(caption_spans(&caption, true).len(), 2);
        let narrow = caption_spans(&caption, false);
        assert_eq!(narrow.len(), 1);
        assert_eq!(narrow[0].content, "in an hour");
    }
}
