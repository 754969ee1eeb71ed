mod config_errors;
mod pipeline_errors;
mod search_errors;

pub use config_errors::*;
pub use pipeline_errors::*;
pub use search_errors::*;
