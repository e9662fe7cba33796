pub mod google_search;
pub mod rate_limiter;
pub mod search_pipeline;

pub use google_search::*;
pub use rate_limiter::*;
pub use search_pipeline::*;
