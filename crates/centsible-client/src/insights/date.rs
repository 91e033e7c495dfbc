use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Datelike, Duration, NaiveDate};

use crate::insights::types::TransactionFilter;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Calendar window containing `as_of`: first through last day of the
    /// month for monthly budgets, Monday through Sunday for weekly, January 1
    /// through December 31 for yearly.
    pub fn window(self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Weekly => {
                let offset = i64::from(as_of.weekday().num_days_from_monday());
                let start = as_of - Duration::days(offset);
                (start, start + Duration::days(6))
            }
            Self::Monthly => {
                let start = first_day_of_month(as_of);
                let end = add_months_clamped(start, 1) - Duration::days(1);
                (start, end)
            }
            Self::Yearly => {
                let start = NaiveDate::from_ymd_opt(as_of.year(), 1, 1).unwrap_or(as_of);
                let end = NaiveDate::from_ymd_opt(as_of.year(), 12, 31).unwrap_or(as_of);
                (start, end)
            }
        }
    }
}

pub fn build_filter(
    from: Option<&str>,
    to: Option<&str>,
    command: &str,
) -> ClientResult<TransactionFilter> {
    let parsed_from = match from {
        Some(value) => Some(parse_iso_date_strict(value, "from", command)?),
        None => None,
    };
    let parsed_to = match to {
        Some(value) => Some(parse_iso_date_strict(value, "to", command)?),
        None => None,
    };

    if let (Some(start), Some(end)) = (parsed_from, parsed_to)
        && start > end
    {
        return Err(ClientError::invalid_argument_for_command(
            "Invalid date range: `from` must be on or before `to`.",
            Some(command),
        ));
    }

    Ok(TransactionFilter {
        from: parsed_from,
        to: parsed_to,
        category: None,
        category_id: None,
    })
}

/// Resolves an `--as-of` override, defaulting to today's UTC date.
pub fn resolve_as_of(value: Option<&str>, command: &str) -> ClientResult<NaiveDate> {
    match value {
        Some(raw) => parse_iso_date_strict(raw, "as-of", command),
        None => Ok(today_utc()),
    }
}

pub fn today_utc() -> NaiveDate {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH);
    let days = match elapsed {
        Ok(duration) => (duration.as_secs() / 86_400) as i64,
        Err(_) => 0,
    };
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .map(|epoch| epoch + Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    if !looks_like_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let current_month = i32::try_from(date.month()).unwrap_or(1);
    let mut raw_month = current_month + months;
    let mut year = date.year();

    while raw_month > 12 {
        raw_month -= 12;
        year += 1;
    }
    while raw_month < 1 {
        raw_month += 12;
        year -= 1;
    }

    let month_u32 = u32::try_from(raw_month).unwrap_or(1);
    let day = date.day().min(days_in_month(year, month_u32));
    if let Some(result) = NaiveDate::from_ymd_opt(year, month_u32, day) {
        return result;
    }
    date
}

fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn parse_iso_date_strict(value: &str, field_name: &str, command: &str) -> ClientResult<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with a real calendar date."),
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with valid calendar values."),
            Some(command),
        )
    })
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
