pub mod errors;
pub mod id;

pub use errors::{ConfigError, GemchatError};
pub use id::{new_id, MessageId};

pub type Result<T> = std::result::Result<T, GemchatError>;
