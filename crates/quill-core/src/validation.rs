//! Input validation shared by the services.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::DomainError;

pub const USERNAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const CATEGORY_NAME_MAX_LEN: usize = 50;
pub const TITLE_MAX_LEN: usize = 100;
pub const EXCERPT_MAX_LEN: usize = 200;

/// Trimmed value of a required field, or a validation error naming it.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("Please provide a {}", field)));
    }
    Ok(trimmed)
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{} cannot be more than {} characters",
            capitalize(field),
            max
        )));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<String, DomainError> {
    let name = required("username", value)?;
    max_chars("username", name, USERNAME_MAX_LEN)?;
    Ok(name.to_string())
}

pub fn email(value: &str) -> Result<String, DomainError> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern is valid")
    });

    let email = required("email", value)?;
    if !regex.is_match(email) {
        return Err(DomainError::validation("Please provide a valid email"));
    }
    Ok(email.to_string())
}

pub fn password(value: &str) -> Result<&str, DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation("Please add a password"));
    }
    if value.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(value)
}

/// Trim tags, drop empty ones and duplicates, keep first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Split a comma-separated tag list as sent by HTML forms.
pub fn split_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
