use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::plans::PlanType;

/// One rendered row of the plan history table. Rows arrive most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanRowModel {
    pub id: i64,
    pub coupon_code: String,
    pub plan_type: PlanType,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

impl PlanRowModel {
    pub fn new(id: i64, coupon_code: impl Into<String>, plan_type: PlanType) -> Self {
        Self {
            id,
            coupon_code: coupon_code.into(),
            plan_type,
            visible: true,
        }
    }

    pub fn key(&self) -> RowKey {
        RowKey {
            coupon_code: self.coupon_code.clone(),
            plan_type: self.plan_type.clone(),
        }
    }
}

/// Identity of a plan across its historical versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub coupon_code: String,
    pub plan_type: PlanType,
}

/// Rolls up older versions of each plan.
///
/// With `collapse` set, the first row per `(coupon_code, plan_type)` stays
/// visible and every later row with the same key is hidden. Without it, every
/// row is shown again. Only `visible` is written. Returns the visible count.
pub fn roll_up(rows: &mut [PlanRowModel], collapse: bool) -> usize {
    if !collapse {
        for row in rows.iter_mut() {
            row.visible = true;
        }
        return rows.len();
    }

    let mut seen: HashSet<RowKey> = HashSet::with_capacity(rows.len());
    let mut visible = 0;
    for row in rows.iter_mut() {
        let first_of_key = seen.insert(row.key());
        row.visible = first_of_key;
        if first_of_key {
            visible += 1;
        }
    }
    visible
}
