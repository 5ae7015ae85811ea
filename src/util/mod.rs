pub mod attribute_status;
pub mod report;
