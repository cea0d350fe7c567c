pub mod plan_dialog;
pub mod plan_table;
