use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    repositories::{
        page_navigator::PlanPageNavigator,
        plans::{PlanAdminRepository, PlanApiError},
    },
    value_objects::{
        enums::{
            dialog_states::{DialogState, OpenMode},
            plan_fields::PlanField,
        },
        plan_fields::{ValidationErrors, validate_plan_form},
        plans::{PlanForm, PlanModel, PlanSaveReceipt},
    },
};

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("plan form is invalid: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Api(#[from] PlanApiError),
    #[error("a plan request is already in flight")]
    RequestInFlight,
    #[error("cannot {action} while the dialog is {state}")]
    InvalidTransition {
        action: &'static str,
        state: DialogState,
    },
    #[error("a plan that was never saved has nothing to delete")]
    NothingToDelete,
}

pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Record being edited, owned by the dialog while it is open.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogContext {
    pub snapshot: Option<PlanModel>,
    pub form: PlanForm,
}

impl DialogContext {
    fn plan_id(&self) -> Option<i64> {
        self.snapshot.as_ref().and_then(|plan| plan.id)
    }
}

#[derive(Debug, Default)]
struct DialogSession {
    state: DialogState,
    context: Option<DialogContext>,
    flagged: BTreeSet<PlanField>,
    tip: Option<String>,
    in_flight: Option<Uuid>,
}

impl DialogSession {
    fn reset(&mut self) {
        *self = DialogSession::default();
    }

    fn ensure_idle(&self) -> DialogResult<()> {
        match self.in_flight {
            Some(_) => Err(DialogError::RequestInFlight),
            None => Ok(()),
        }
    }

    fn open_mode(&self, action: &'static str) -> DialogResult<OpenMode> {
        self.state.open_mode().ok_or(DialogError::InvalidTransition {
            action,
            state: self.state,
        })
    }

    fn editable_form(&mut self, action: &'static str) -> DialogResult<&mut PlanForm> {
        self.ensure_idle()?;
        self.open_mode(action)?;
        match self.context.as_mut() {
            Some(context) => Ok(&mut context.form),
            None => Err(DialogError::InvalidTransition {
                action,
                state: self.state,
            }),
        }
    }
}

/// Request token held while a save or delete is outstanding.
///
/// If the request future is dropped before it finishes, `Drop` clears the
/// session's token so the dialog can be cancelled or retried.
struct InFlightGuard<'a> {
    session: &'a Mutex<DialogSession>,
    token: Uuid,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(session: &'a Mutex<DialogSession>, locked: &mut DialogSession) -> Self {
        let token = Uuid::new_v4();
        locked.in_flight = Some(token);
        Self {
            session,
            token,
            armed: true,
        }
    }

    /// Clears the token under a lock the caller already holds.
    fn release(&mut self, locked: &mut DialogSession) {
        if self.armed && locked.in_flight == Some(self.token) {
            locked.in_flight = None;
        }
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut locked = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if locked.in_flight == Some(self.token) {
            locked.in_flight = None;
            warn!(token = %self.token, "plan_dialog: request abandoned before it finished");
        }
    }
}

/// Drives the create / edit / delete dialog for plans.
///
/// Every state change goes through this use case. A save or delete takes a
/// request token; until the API answers, any other save, delete, cancel or
/// edit is refused with [`DialogError::RequestInFlight`].
pub struct PlanDialogUseCase<R, N>
where
    R: PlanAdminRepository + Send + Sync,
    N: PlanPageNavigator + Send + Sync,
{
    plan_repository: Arc<R>,
    navigator: Arc<N>,
    reference_tz: Tz,
    session: Mutex<DialogSession>,
}

impl<R, N> PlanDialogUseCase<R, N>
where
    R: PlanAdminRepository + Send + Sync,
    N: PlanPageNavigator + Send + Sync,
{
    pub fn new(plan_repository: Arc<R>, navigator: Arc<N>, reference_tz: Tz) -> Self {
        Self {
            plan_repository,
            navigator,
            reference_tz,
            session: Mutex::new(DialogSession::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, DialogSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> DialogState {
        self.session().state
    }

    pub fn context(&self) -> Option<DialogContext> {
        self.session().context.clone()
    }

    pub fn form(&self) -> Option<PlanForm> {
        self.session().context.as_ref().map(|c| c.form.clone())
    }

    pub fn flagged_fields(&self) -> BTreeSet<PlanField> {
        self.session().flagged.clone()
    }

    pub fn tip(&self) -> Option<String> {
        self.session().tip.clone()
    }

    pub fn in_flight(&self) -> bool {
        self.session().in_flight.is_some()
    }

    pub fn open_for_create(&self) -> DialogResult<()> {
        let mut session = self.session();
        if session.state != DialogState::Closed {
            return Err(DialogError::InvalidTransition {
                action: "open for create",
                state: session.state,
            });
        }

        session.state = DialogState::OpenForCreate;
        session.context = Some(DialogContext {
            snapshot: None,
            form: PlanForm::blank(Utc::now()),
        });
        debug!("plan_dialog: opened for create");
        Ok(())
    }

    pub fn open_for_edit(&self, snapshot: PlanModel) -> DialogResult<()> {
        let mut session = self.session();
        if session.state != DialogState::Closed {
            return Err(DialogError::InvalidTransition {
                action: "open for edit",
                state: session.state,
            });
        }

        let form = PlanForm::from_model(&snapshot, self.reference_tz);
        debug!(
            plan_id = ?snapshot.id,
            coupon_code = %snapshot.coupon_code,
            "plan_dialog: opened for edit"
        );
        session.state = DialogState::OpenForEdit;
        session.context = Some(DialogContext {
            snapshot: Some(snapshot),
            form,
        });
        Ok(())
    }

    /// Updates one text field. Editing a flagged field clears its flag.
    pub fn set_field(&self, field: PlanField, value: impl Into<String>) -> DialogResult<()> {
        let mut session = self.session();
        session
            .editable_form("edit a field")?
            .set_value(field, value.into());
        session.flagged.remove(&field);
        if session.flagged.is_empty() {
            session.tip = None;
        }
        Ok(())
    }

    pub fn set_features(&self, bits: u64) -> DialogResult<()> {
        let mut session = self.session();
        session.editable_form("edit features")?.features.0 = bits;
        Ok(())
    }

    pub fn toggle_feature(&self, flag: u64) -> DialogResult<()> {
        let mut session = self.session();
        session.editable_form("edit features")?.features.toggle(flag);
        Ok(())
    }

    /// Validates, normalizes and submits the form.
    ///
    /// On success the dialog closes and the page reloads. A validation failure
    /// flags the offending fields without calling the API. An API failure
    /// leaves the dialog open with the form untouched.
    pub async fn save(&self) -> DialogResult<PlanSaveReceipt> {
        let (mut guard, payload) = {
            let mut session = self.session();
            session.ensure_idle()?;
            let mode = session.open_mode("save")?;
            let Some(context) = session.context.as_ref() else {
                return Err(DialogError::InvalidTransition {
                    action: "save",
                    state: session.state,
                });
            };
            let plan_id = context.plan_id();

            let validated = match validate_plan_form(&context.form, self.reference_tz) {
                Ok(validated) => validated,
                Err(errors) => {
                    warn!(
                        ?mode,
                        violation_count = errors.violations.len(),
                        fields = ?errors.fields(),
                        "plan_dialog: plan form failed validation"
                    );
                    session.flagged = errors.fields();
                    session.tip = Some(errors.tip());
                    return Err(DialogError::Validation(errors));
                }
            };

            session.flagged.clear();
            session.tip = None;
            let guard = InFlightGuard::acquire(&self.session, &mut session);
            (guard, validated.into_payload(plan_id))
        };
        let token = guard.token;

        info!(
            %token,
            plan_id = ?payload.id,
            coupon_code = %payload.coupon_code,
            plan_type = %payload.plan_type,
            "plan_dialog: submitting plan"
        );
        let result = self.plan_repository.create_or_update_plan(payload).await;

        let mut session = self.session();
        guard.release(&mut session);
        match result {
            Ok(receipt) => {
                session.reset();
                drop(session);
                info!(%token, plan_id = ?receipt.id, "plan_dialog: plan saved");
                self.navigator.reload();
                Ok(receipt)
            }
            Err(err) => {
                error!(%token, api_error = ?err, "plan_dialog: failed to save plan");
                Err(DialogError::Api(err))
            }
        }
    }

    pub fn request_delete(&self) -> DialogResult<()> {
        let mut session = self.session();
        session.ensure_idle()?;
        let mode = session.open_mode("delete")?;
        let plan_id = session.context.as_ref().and_then(DialogContext::plan_id);
        if plan_id.is_none() {
            return Err(DialogError::NothingToDelete);
        }

        session.state = DialogState::ConfirmDelete { return_to: mode };
        debug!(?plan_id, "plan_dialog: awaiting delete confirmation");
        Ok(())
    }

    pub fn cancel_delete(&self) -> DialogResult<()> {
        let mut session = self.session();
        session.ensure_idle()?;
        let state = session.state;
        match state {
            DialogState::ConfirmDelete { return_to } => {
                session.state = DialogState::from_open_mode(return_to);
                debug!("plan_dialog: delete cancelled");
                Ok(())
            }
            state => Err(DialogError::InvalidTransition {
                action: "cancel delete",
                state,
            }),
        }
    }

    /// Deletes the plan being edited. On failure the dialog returns to the
    /// open state it came from so the user can retry.
    pub async fn confirm_delete(&self) -> DialogResult<()> {
        let (mut guard, plan_id, return_to) = {
            let mut session = self.session();
            session.ensure_idle()?;
            let state = session.state;
            let DialogState::ConfirmDelete { return_to } = state else {
                return Err(DialogError::InvalidTransition {
                    action: "confirm delete",
                    state,
                });
            };
            let Some(plan_id) = session.context.as_ref().and_then(DialogContext::plan_id) else {
                return Err(DialogError::NothingToDelete);
            };

            let guard = InFlightGuard::acquire(&self.session, &mut session);
            (guard, plan_id, return_to)
        };
        let token = guard.token;

        info!(%token, plan_id, "plan_dialog: deleting plan");
        let result = self.plan_repository.delete_plan(plan_id).await;

        let mut session = self.session();
        guard.release(&mut session);
        match result {
            Ok(()) => {
                session.reset();
                drop(session);
                info!(%token, plan_id, "plan_dialog: plan deleted");
                self.navigator.reload();
                Ok(())
            }
            Err(err) => {
                session.state = DialogState::from_open_mode(return_to);
                error!(%token, plan_id, api_error = ?err, "plan_dialog: failed to delete plan");
                Err(DialogError::Api(err))
            }
        }
    }

    /// Closes the dialog, discarding the form and any error flags.
    pub fn cancel(&self) -> DialogResult<()> {
        let mut session = self.session();
        session.ensure_idle()?;
        if session.state.is_open() {
            debug!(state = %session.state, "plan_dialog: cancelled");
        }
        session.reset();
        Ok(())
    }
}
