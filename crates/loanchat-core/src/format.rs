//! # Message Formatting
//!
//! Line-by-line classification of assistant messages and the number and
//! clock formats used across the panels. Stateless.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Prefixes that mark a line as a list item.
const BULLET_PREFIXES: [&str; 6] = ["•", "✅", "❌", "⚠️", "💰", "📋"];

// =============================================================================
// MESSAGE LINES
// =============================================================================

/// A run of text inside a rich line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

/// One rendered line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Whitespace-only line; rendered as a break.
    Blank,
    /// Line containing `**` markers, split into plain and bold runs.
    Rich(Vec<Span>),
    /// List item: starts with a bullet glyph, a status emoji or `N.`.
    Bullet(String),
    Plain(String),
}

/// Classify every line of `content`.
///
/// Bold markers take precedence over bullet detection, so `✅ **Approved**`
/// is a rich line.
#[must_use]
pub fn format_message(content: &str) -> Vec<Line> {
    content.split('\n').map(classify_line).collect()
}

fn classify_line(line: &str) -> Line {
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if line.contains("**") {
        return Line::Rich(split_bold(line));
    }
    if is_bullet(line.trim()) {
        return Line::Bullet(line.to_string());
    }
    Line::Plain(line.to_string())
}

/// Odd segments between `**` markers are bold. An unmatched trailing marker
/// makes the remainder bold, as the service's own renderer does.
fn split_bold(line: &str) -> Vec<Span> {
    line.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::Bold(part.to_string())
            } else {
                Span::Text(part.to_string())
            }
        })
        .collect()
}

fn is_bullet(trimmed: &str) -> bool {
    if BULLET_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return true;
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with('.')
}

// =============================================================================
// CURRENCY
// =============================================================================

/// Rupee amount with Indian digit grouping, e.g. `₹ 5,00,000` or `₹ 16,607.64`.
///
/// Missing, zero and non-finite amounts render as `₹ 0`. At most two
/// fraction digits are shown, trailing zeros trimmed.
#[must_use]
pub fn format_currency(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value.is_finite() && value != 0.0 => {
            format!("₹ {}", group_indian(&format!("{value:.2}")))
        }
        _ => "₹ 0".to_string(),
    }
}

/// Group a plain decimal string (`-1234567.50`) as `-12,34,567.5`.
fn group_indian(decimal: &str) -> String {
    let (sign, unsigned) = match decimal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", decimal),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len().saturating_add(8));
    let split = whole.len().saturating_sub(3);
    let (head, tail) = whole.split_at(split);

    let head_chars: Vec<char> = head.chars().collect();
    let lead = head_chars.len() % 2;
    for (i, c) in head_chars.iter().enumerate() {
        if i > 0 && (i.saturating_sub(lead)) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if !head.is_empty() {
        grouped.push(',');
    }
    grouped.push_str(tail);

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Percentage with up to two decimals, e.g. `10.5%`.
#[must_use]
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(value) if value.is_finite() => {
            let text = format!("{value:.2}");
            let text = text.trim_end_matches('0').trim_end_matches('.');
            format!("{text}%")
        }
        _ => "0%".to_string(),
    }
}

// =============================================================================
// CLOCK
// =============================================================================

/// Message stamp as `hh:mm AM/PM` in the timestamp's own zone.
#[must_use]
pub fn format_time<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%I:%M %p").to_string()
}

// =============================================================================
// TESTS
// =============================================================================
