use std::{collections::BTreeSet, sync::LazyLock};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::{
    currency::to_cents,
    enums::plan_fields::PlanField,
    plans::{PlanForm, PlanPayload},
};

pub const COUPON_CODE_MIN_LEN: usize = 3;
pub const COUPON_CODE_MAX_LEN: usize = 128;
pub const EXPIRATION_FORMAT: &str = "%m/%d/%Y";

static EXPIRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid regex"));

/// Valid iff the character count of `value` lies in `min..=max`.
pub fn check_length(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    min <= len && len <= max
}

/// Valid iff `value` is a plain decimal number: an optional leading `-`,
/// digits, at most one `.`, and at least one digit.
///
/// Exponents, `NaN`, `inf`, whitespace and thousands separators are rejected.
pub fn check_number(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let mut seen_point = false;
    let mut seen_digit = false;

    for c in unsigned.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }

    seen_digit
}

/// Valid iff `pattern` matches the whole of `value`.
pub fn check_regexp(value: &str, pattern: &Regex) -> bool {
    pattern
        .find(value)
        .is_some_and(|m| m.start() == 0 && m.end() == value.len())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: PlanField,
    pub message: String,
}

/// Every violation found in one validation pass, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.violations))]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

fn join_messages(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ValidationErrors {
    pub fn fields(&self) -> BTreeSet<PlanField> {
        self.violations.iter().map(|v| v.field).collect()
    }

    /// Message shown to the user: every violation on its own line.
    pub fn tip(&self) -> String {
        join_messages(&self.violations)
    }

    fn push(&mut self, field: PlanField, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            message: message.into(),
        });
    }
}

/// A form that passed validation, with the expiration already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlanForm {
    form: PlanForm,
    coupon_expires_at: Option<DateTime<Utc>>,
}

impl ValidatedPlanForm {
    pub fn coupon_expires_at(&self) -> Option<DateTime<Utc>> {
        self.coupon_expires_at
    }

    /// Normalizes money fields to cents and builds the wire payload.
    pub fn into_payload(self, id: Option<i64>) -> PlanPayload {
        PlanPayload {
            id,
            list_price_cents: to_cents(&self.form.list_price),
            discounted_price_cents: to_cents(&self.form.discounted_price),
            features_bitmap: self.form.features.bits(),
            coupon_expires_at: self
                .coupon_expires_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            coupon_code: self.form.coupon_code,
            plan_type: self.form.plan_type,
            hidden_plan_comment: self.form.hidden_plan_comment,
            coupon_applied_message: self.form.coupon_applied_message,
        }
    }
}

/// Runs every field check and reports all violations together.
///
/// Order: coupon code, plan type, list price, discounted price, expiration.
pub fn validate_plan_form(
    form: &PlanForm,
    reference_tz: Tz,
) -> Result<ValidatedPlanForm, ValidationErrors> {
    let mut errors = ValidationErrors {
        violations: Vec::new(),
    };

    if !check_length(&form.coupon_code, COUPON_CODE_MIN_LEN, COUPON_CODE_MAX_LEN) {
        errors.push(
            PlanField::CouponCode,
            format!(
                "Coupon code must be between {} and {} characters.",
                COUPON_CODE_MIN_LEN, COUPON_CODE_MAX_LEN
            ),
        );
    }

    if form.plan_type.trim().is_empty() {
        errors.push(PlanField::PlanType, "Plan type is required.");
    }

    for field in [PlanField::ListPrice, PlanField::DiscountedPrice] {
        if let Err(message) = check_price(form.value(field)) {
            errors.push(field, format!("{} {}", field.label(), message));
        }
    }

    let coupon_expires_at = match parse_expiration(&form.coupon_expiration, reference_tz) {
        Ok(at) => at,
        Err(message) => {
            errors.push(PlanField::CouponExpiration, message);
            None
        }
    };

    if !errors.violations.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedPlanForm {
        form: form.clone(),
        coupon_expires_at,
    })
}

// Empty prices are allowed and sent as empty strings.
fn check_price(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Ok(());
    }
    if !check_number(value) {
        return Err("must be a number.");
    }
    if value.starts_with('-') {
        return Err("cannot be negative.");
    }
    match to_cents(value).parse::<i64>() {
        Ok(_) => Ok(()),
        Err(_) => Err("is too large."),
    }
}

fn parse_expiration(value: &str, reference_tz: Tz) -> Result<Option<DateTime<Utc>>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    if !check_regexp(value, &EXPIRATION_RE) {
        return Err(format!(
            "{} must use the MM/DD/YYYY format.",
            PlanField::CouponExpiration.label()
        ));
    }

    let invalid = || {
        format!(
            "{} is not a valid calendar date.",
            PlanField::CouponExpiration.label()
        )
    };
    let date = NaiveDate::parse_from_str(value, EXPIRATION_FORMAT).map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;

    // Midnight can fall inside a DST gap; take the first local minute that exists.
    let local = (0..MINUTES_PER_DAY)
        .find_map(|minute| {
            reference_tz
                .from_local_datetime(&(midnight + Duration::minutes(minute)))
                .earliest()
        })
        .ok_or_else(|| {
            format!(
                "{} has no valid time on that day in {}.",
                PlanField::CouponExpiration.label(),
                reference_tz
            )
        })?;

    Ok(Some(local.with_timezone(&Utc)))
}

const MINUTES_PER_DAY: i64 = 24 * 60;
