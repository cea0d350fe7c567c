pub mod dialog_states;
pub mod plan_fields;
