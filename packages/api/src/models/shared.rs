use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

use super::hydra::PAGE_SIZE;
use crate::error::AppError;

/// Highest page whose row offset still fits a signed 64-bit SQL integer.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE;

/// Page selection for collection endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> Result<u64, AppError> {
        checked_page(self.page)
    }
}

/// Requested page, defaulting to 1 and flooring at 1.
pub fn checked_page(page: Option<u64>) -> Result<u64, AppError> {
    match page.unwrap_or(1).max(1) {
        page if page <= MAX_PAGE => Ok(page),
        _ => Err(AppError::ConstraintViolation(
            "page: This value is not valid.".into(),
        )),
    }
}

/// Serde helper for nullable relation fields on update.
///
/// * JSON field absent  => `None`          (leave unchanged)
/// * JSON field = null  => `Some(None)`    (clear the relation)
/// * JSON field = value => `Some(Some(v))` (set the relation)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Collects `field: message` constraint violations and reports them all
/// at once, one per line.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl AsRef<str>) {
        self.messages.push(format!("{field}: {}", message.as_ref()));
    }

    pub fn not_null<T>(&mut self, field: &str, value: &Option<T>) -> bool {
        if value.is_none() {
            self.add(field, "This value should not be null.");
            return false;
        }
        true
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, "This value should not be blank.");
            return false;
        }
        true
    }

    /// Character-count bounds, inclusive.
    pub fn length(&mut self, field: &str, value: &str, min: Option<usize>, max: Option<usize>) {
        let count = value.chars().count();
        if let Some(min) = min
            && count < min
        {
            self.add(
                field,
                format!(
                    "This value is too short. It should have {min} character{} or more.",
                    plural(min)
                ),
            );
        }
        if let Some(max) = max
            && count > max
        {
            self.add(
                field,
                format!(
                    "This value is too long. It should have {max} character{} or less.",
                    plural(max)
                ),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.add(field, "This value is not a valid email address.");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::ConstraintViolation(self.messages.join("\n")))
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Loose address check: something, a single `@`, then a dotted domain
/// without whitespace.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn already_used(field: &str) -> AppError {
    AppError::UniquenessViolation(format!("{field}: This value is already used."))
}
