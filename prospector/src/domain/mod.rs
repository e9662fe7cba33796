pub mod csv_export;
pub mod email;
pub mod lead;
pub mod log_entry;
pub mod query;
pub mod search_request;
