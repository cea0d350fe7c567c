use mockall::automock;
use url::Url;

/// The page hosting the plan dialog and table.
#[automock]
pub trait PlanPageNavigator {
    /// Full reload so the server re-renders the plan rows.
    fn reload(&self);
    /// Full navigation to `url`, not an in-place refresh.
    fn navigate(&self, url: Url);
}
