use std::fmt::Display;
use serde::{Deserialize, Serialize};

/// Editable inputs of the plan dialog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PlanField {
    CouponCode,
    PlanType,
    HiddenPlanComment,
    CouponAppliedMessage,
    ListPrice,
    DiscountedPrice,
    CouponExpiration,
}

impl PlanField {
    pub fn label(&self) -> &'static str {
        match self {
            PlanField::CouponCode => "Coupon code",
            PlanField::PlanType => "Plan type",
            PlanField::HiddenPlanComment => "Hidden plan comment",
            PlanField::CouponAppliedMessage => "Coupon applied message",
            PlanField::ListPrice => "List price",
            PlanField::DiscountedPrice => "Discounted price",
            PlanField::CouponExpiration => "Coupon expiration date",
        }
    }
}

impl Display for PlanField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = match self {
            PlanField::CouponCode => "coupon_code",
            PlanField::PlanType => "plan_type",
            PlanField::HiddenPlanComment => "hidden_plan_comment",
            PlanField::CouponAppliedMessage => "coupon_applied_message",
            PlanField::ListPrice => "list_price",
            PlanField::DiscountedPrice => "discounted_price",
            PlanField::CouponExpiration => "coupon_expiration",
        };
        write!(f, "{}", field)
    }
}
