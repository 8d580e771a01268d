pub mod config;
pub mod error;
pub mod file_store;
pub mod normalize;
pub mod pagination;
pub mod rest_store;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::ThermalError;
pub use pagination::{sanitize_limit, sanitize_offset, Pagination};
pub use store::{build_source, SessionQuery, SessionSource};
pub use types::{SessionRecord, SessionType};
