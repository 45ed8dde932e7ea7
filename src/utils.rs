use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;
use time::{Date, Month};

static LOGIN_RE: OnceLock<Regex> = OnceLock::new();
static NAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static DATE_RE: OnceLock<Regex> = OnceLock::new();

pub fn login_regex() -> &'static Regex {
    LOGIN_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("login pattern compiles"))
}

pub fn name_regex() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[а-яА-ЯёЁa-zA-Z]+$").expect("name pattern compiles"))
}

pub fn email_regex() -> &'static Regex {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

pub fn date_regex() -> &'static Regex {
    DATE_RE.get_or_init(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("date pattern compiles"))
}

pub fn validate_required(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }
    Ok(())
}

pub fn validate_pattern(value: &str, pattern: &Regex, message: &str) -> Result<(), String> {
    if !pattern.is_match(value) {
        return Err(message.to_string());
    }
    Ok(())
}

pub fn validate_range(value: u32, min: u32, max: u32, field_name: &str) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{} must be between {} and {}", field_name, min, max));
    }
    Ok(())
}

/// Letters-only personal name check shared by first, last and middle names.
pub fn validate_person_name(value: &str, field_name: &str) -> Result<(), String> {
    validate_required(value, field_name)?;
    validate_pattern(
        value,
        name_regex(),
        &format!("{} may contain letters only", field_name),
    )
}

/// Parses a `DD.MM.YYYY` string into a calendar date.
pub fn parse_date(value: &str) -> Option<Date> {
    if !date_regex().is_match(value) {
        return None;
    }
    let mut parts = value.split('.');
    let day: u8 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

pub fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    validate_required(value, field_name)?;
    validate_pattern(
        value,
        date_regex(),
        &format!("{} must use the DD.MM.YYYY format", field_name),
    )?;
    if parse_date(value).is_none() {
        return Err(format!("{} is not a valid calendar date", field_name));
    }
    Ok(())
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Case-insensitive comparison that orders digit runs by numeric value,
/// so "Group 2" sorts before "Group 10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let l_trim = l_run.trim_start_matches('0');
                let r_trim = r_run.trim_start_matches('0');
                let ord = l_trim
                    .len()
                    .cmp(&r_trim.len())
                    .then_with(|| l_trim.cmp(r_trim));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}
