pub mod page_navigator;
pub mod plans;
