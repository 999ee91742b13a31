//! Display helpers shared by the CLI and any other renderer.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::services::DueStatus;
use crate::domain::Period;

pub fn symbol_for(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        _ => code,
    }
}

pub fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Whole currency units with grouping. The sign is dropped; callers that need
/// it use [`format_signed_currency`].
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_string();
    let whole = rounded.split('.').next().unwrap_or("0");
    format!("{}{}", symbol_for(currency), group_digits(whole, ','))
}

pub fn format_signed_currency(amount: Decimal, currency: &str) -> String {
    let body = format_currency(amount, currency);
    if amount.is_zero() {
        body
    } else if amount.is_sign_negative() {
        format!("-{body}")
    } else {
        format!("+{body}")
    }
}

/// "Jan 3"
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{} {}", month_label(date.month()), date.day())
}

/// "Jan 3 – 16, 2025", or "Jan 24 – Feb 6, 2025" when the period spans months.
pub fn format_period_label(period: &Period) -> String {
    let (start, end) = (period.start, period.end);
    if start.year() != end.year() {
        format!(
            "{}, {} – {}, {}",
            format_short_date(start),
            start.year(),
            format_short_date(end),
            end.year()
        )
    } else if start.month() != end.month() {
        format!(
            "{} – {}, {}",
            format_short_date(start),
            format_short_date(end),
            end.year()
        )
    } else {
        format!("{} – {}, {}", format_short_date(start), end.day(), end.year())
    }
}

pub fn due_status_text(status: DueStatus, due_date: NaiveDate) -> String {
    match status {
        DueStatus::Paid => format!("Paid {}", format_short_date(due_date)),
        DueStatus::Overdue { days: 1 } => "Overdue by 1 day".to_string(),
        DueStatus::Overdue { days } => format!("Overdue by {days} days"),
        DueStatus::DueToday => "Due today".to_string(),
        DueStatus::DueTomorrow => "Due tomorrow".to_string(),
        DueStatus::DueSoon { .. } | DueStatus::Upcoming => {
            format!("Due {}", format_short_date(due_date))
        }
    }
}

/// "Today", "Tomorrow" or the short date.
pub fn event_date_text(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        format_short_date(date)
    }
}
