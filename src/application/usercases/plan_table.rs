use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::domain::{
    repositories::page_navigator::PlanPageNavigator,
    value_objects::{
        page_url::{row_limit, with_row_limit},
        plan_rows::{PlanRowModel, roll_up},
    },
};

/// The plan history table: roll-up toggle and row-limit navigation.
pub struct PlanTableUseCase<N>
where
    N: PlanPageNavigator + Send + Sync,
{
    navigator: Arc<N>,
    rows: Vec<PlanRowModel>,
    rolled_up: bool,
    default_row_limit: u32,
}

impl<N> PlanTableUseCase<N>
where
    N: PlanPageNavigator + Send + Sync,
{
    pub fn new(navigator: Arc<N>, rows: Vec<PlanRowModel>, default_row_limit: u32) -> Self {
        Self {
            navigator,
            rows,
            rolled_up: false,
            default_row_limit,
        }
    }

    pub fn rows(&self) -> &[PlanRowModel] {
        &self.rows
    }

    pub fn is_rolled_up(&self) -> bool {
        self.rolled_up
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &PlanRowModel> {
        self.rows.iter().filter(|row| row.visible)
    }

    pub fn set_roll_up(&mut self, collapse: bool) -> usize {
        self.rolled_up = collapse;
        let visible = roll_up(&mut self.rows, collapse);
        debug!(
            collapse,
            total = self.rows.len(),
            visible,
            "plan_table: roll-up applied"
        );
        visible
    }

    /// Row limit the page is showing: its `limit` parameter, or the configured
    /// default when the parameter is missing or not a number.
    pub fn current_row_limit(&self, current_page: &Url) -> u32 {
        row_limit(current_page).unwrap_or(self.default_row_limit)
    }

    /// Navigates to `current_page` with its `limit` parameter set to `limit`.
    pub fn show_row_limit(&self, current_page: &Url, limit: u32) -> Url {
        let target = with_row_limit(current_page, limit);
        info!(limit, target = %target, "plan_table: changing row limit");
        self.navigator.navigate(target.clone());
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        repositories::page_navigator::MockPlanPageNavigator, value_objects::plans::PlanType,
    };
    use mockall::predicate::eq;

    fn rows() -> Vec<PlanRowModel> {
        vec![
            PlanRowModel::new(3, "SAVE10", PlanType::new("MONTHLY")),
            PlanRowModel::new(2, "SAVE10", PlanType::new("MONTHLY")),
            PlanRowModel::new(1, "WELCOME", PlanType::new("MONTHLY")),
        ]
    }

    #[test]
    fn roll_up_hides_older_versions_and_restores_them() {
        let mut table = PlanTableUseCase::new(Arc::new(MockPlanPageNavigator::new()), rows(), 100);

        assert_eq!(table.set_roll_up(true), 2);
        assert!(table.is_rolled_up());
        let ids: Vec<i64> = table.visible_rows().map(|row| row.id).collect();
        assert_eq!(ids, vec![3, 1]);

        assert_eq!(table.set_roll_up(false), 3);
        assert_eq!(table.visible_rows().count(), 3);
        assert_eq!(table.rows(), rows().as_slice());
    }

    #[test]
    fn row_limit_triggers_full_navigation() {
        let mut navigator = MockPlanPageNavigator::new();
        let expected =
            Url::parse("https://admin.example.com/plans/?tab=coupons&limit=500").unwrap();
        navigator
            .expect_navigate()
            .with(eq(expected.clone()))
            .times(1)
            .return_const(());

        let table = PlanTableUseCase::new(Arc::new(navigator), rows(), 100);
        let current = Url::parse("https://admin.example.com/plans/?tab=coupons&limit=100").unwrap();

        assert_eq!(table.show_row_limit(&current, 500), expected);
    }

    #[test]
    fn current_row_limit_falls_back_to_configured_default() {
        let table = PlanTableUseCase::new(Arc::new(MockPlanPageNavigator::new()), rows(), 25);

        let explicit = Url::parse("https://admin.example.com/plans/?limit=500").unwrap();
        let missing = Url::parse("https://admin.example.com/plans/?tab=coupons").unwrap();
        let garbled = Url::parse("https://admin.example.com/plans/?limit=all").unwrap();

        assert_eq!(table.current_row_limit(&explicit), 500);
        assert_eq!(table.current_row_limit(&missing), 25);
        assert_eq!(table.current_row_limit(&garbled), 25);
    }
}
