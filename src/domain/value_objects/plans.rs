use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    currency::cents_to_display, enums::plan_fields::PlanField, plan_fields::EXPIRATION_FORMAT,
};

/// Plan category. The set of valid values is owned by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PlanType(pub String);

impl PlanType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Feature bitmap attached to a plan. Each bit is one feature flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct FeatureFlags(pub u64);

impl FeatureFlags {
    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn contains(&self, flag: u64) -> bool {
        flag != 0 && self.0 & flag == flag
    }

    pub fn insert(&mut self, flag: u64) {
        self.0 |= flag;
    }

    pub fn remove(&mut self, flag: u64) {
        self.0 &= !flag;
    }

    pub fn toggle(&mut self, flag: u64) {
        self.0 ^= flag;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub coupon_code: String,
    pub plan_type: PlanType,
    #[serde(default)]
    pub hidden_plan_comment: String,
    #[serde(default)]
    pub coupon_applied_message: String,
    pub list_price_cents: i64,
    pub discounted_price_cents: i64,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub redemptions: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub coupon_expires_at: Option<DateTime<Utc>>,
}

/// Field values as typed into the dialog, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanForm {
    pub coupon_code: String,
    pub plan_type: String,
    pub hidden_plan_comment: String,
    pub coupon_applied_message: String,
    pub list_price: String,
    pub discounted_price: String,
    pub coupon_expiration: String,
    pub features: FeatureFlags,
    pub redemptions: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl PlanForm {
    pub fn blank(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
            ..Self::default()
        }
    }

    /// Pre-fills the form from a stored plan. Prices are rendered back to
    /// decimal text and the expiration to `MM/DD/YYYY` in `reference_tz`.
    pub fn from_model(plan: &PlanModel, reference_tz: Tz) -> Self {
        Self {
            coupon_code: plan.coupon_code.clone(),
            plan_type: plan.plan_type.as_str().to_string(),
            hidden_plan_comment: plan.hidden_plan_comment.clone(),
            coupon_applied_message: plan.coupon_applied_message.clone(),
            list_price: cents_to_display(plan.list_price_cents),
            discounted_price: cents_to_display(plan.discounted_price_cents),
            coupon_expiration: plan
                .coupon_expires_at
                .map(|at| at.with_timezone(&reference_tz).format(EXPIRATION_FORMAT).to_string())
                .unwrap_or_default(),
            features: plan.features,
            redemptions: plan.redemptions,
            created_at: plan.created_at,
        }
    }

    pub fn value(&self, field: PlanField) -> &str {
        match field {
            PlanField::CouponCode => &self.coupon_code,
            PlanField::PlanType => &self.plan_type,
            PlanField::HiddenPlanComment => &self.hidden_plan_comment,
            PlanField::CouponAppliedMessage => &self.coupon_applied_message,
            PlanField::ListPrice => &self.list_price,
            PlanField::DiscountedPrice => &self.discounted_price,
            PlanField::CouponExpiration => &self.coupon_expiration,
        }
    }

    pub fn set_value(&mut self, field: PlanField, value: String) {
        let slot = match field {
            PlanField::CouponCode => &mut self.coupon_code,
            PlanField::PlanType => &mut self.plan_type,
            PlanField::HiddenPlanComment => &mut self.hidden_plan_comment,
            PlanField::CouponAppliedMessage => &mut self.coupon_applied_message,
            PlanField::ListPrice => &mut self.list_price,
            PlanField::DiscountedPrice => &mut self.discounted_price,
            PlanField::CouponExpiration => &mut self.coupon_expiration,
        };
        *slot = value;
    }
}

/// Body of the create-or-update call. Prices are integer cents encoded as
/// strings; an absent expiration is sent as an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanPayload {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub coupon_code: String,
    pub plan_type: String,
    pub hidden_plan_comment: String,
    pub coupon_applied_message: String,
    pub list_price_cents: String,
    pub discounted_price_cents: String,
    pub features_bitmap: u64,
    pub coupon_expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletePlanModel {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanSaveReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored_plan() -> PlanModel {
        PlanModel {
            id: Some(42),
            coupon_code: "SAVE10".to_string(),
            plan_type: PlanType::new("PROFESSIONAL_MONTHLY"),
            hidden_plan_comment: "spring promo".to_string(),
            coupon_applied_message: "You saved 10%".to_string(),
            list_price_cents: 1999,
            discounted_price_cents: 950,
            features: FeatureFlags(0b101),
            redemptions: 7,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            coupon_expires_at: Some(
                chrono_tz::America::Los_Angeles
                    .with_ymd_and_hms(2024, 12, 31, 0, 0, 0)
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        }
    }

    #[test]
    fn form_from_model_renders_prices_and_expiration() {
        let form = PlanForm::from_model(&stored_plan(), chrono_tz::America::Los_Angeles);

        assert_eq!(form.coupon_code, "SAVE10");
        assert_eq!(form.plan_type, "PROFESSIONAL_MONTHLY");
        assert_eq!(form.list_price, "19.99");
        assert_eq!(form.discounted_price, "9.50");
        assert_eq!(form.coupon_expiration, "12/31/2024");
        assert_eq!(form.redemptions, 7);
        assert_eq!(form.features, FeatureFlags(0b101));
    }

    #[test]
    fn blank_form_only_carries_creation_time() {
        let now = Utc::now();
        let form = PlanForm::blank(now);
        assert_eq!(form.created_at, Some(now));
        assert!(form.coupon_code.is_empty());
        assert!(form.coupon_expiration.is_empty());
    }

    #[test]
    fn feature_flags_toggle_bits() {
        let mut flags = FeatureFlags::default();
        flags.insert(0b10);
        assert!(flags.contains(0b10));
        flags.toggle(0b11);
        assert_eq!(flags.bits(), 0b01);
        flags.remove(0b01);
        assert_eq!(flags.bits(), 0);
        assert!(!flags.contains(0));
    }

    #[test]
    fn new_plan_payload_omits_id() {
        let payload = PlanPayload {
            id: None,
            coupon_code: "SAVE10".to_string(),
            plan_type: "PROFESSIONAL_MONTHLY".to_string(),
            hidden_plan_comment: String::new(),
            coupon_applied_message: String::new(),
            list_price_cents: "1999".to_string(),
            discounted_price_cents: "950".to_string(),
            features_bitmap: 0,
            coupon_expires_at: String::new(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["list_price_cents"], "1999");
        assert_eq!(json["coupon_expires_at"], "");
    }

    #[test]
    fn snapshot_deserializes_with_missing_optional_fields() {
        let plan: PlanModel = serde_json::from_str(
            r#"{"coupon_code":"ABC","plan_type":"FREE","list_price_cents":0,"discounted_price_cents":0}"#,
        )
        .unwrap();
        assert_eq!(plan.id, None);
        assert_eq!(plan.features, FeatureFlags(0));
        assert_eq!(plan.coupon_expires_at, None);
    }
}
