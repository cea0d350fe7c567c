pub mod currency;
pub mod enums;
pub mod page_url;
pub mod plan_fields;
pub mod plan_rows;
pub mod plans;
