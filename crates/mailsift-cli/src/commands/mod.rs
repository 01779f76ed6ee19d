//! Command implementations.

pub mod analyze;
pub mod classify;
pub mod client;
pub mod templates;
pub mod topics;

pub use self::analyze::execute_analyze;
pub use self::classify::execute_classify;
pub use self::client::execute_client;
pub use self::templates::{execute_templates, execute_validate};
pub use self::topics::{execute_llm_topics, execute_topics};
