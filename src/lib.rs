pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod types;
pub mod utils;
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use error::TopicMapError;
pub use generator::TopicMapGenerator;
pub use generator::workflow::launch;
pub use types::{GeneratedTopicMap, TopicMapEntry, TopicMapRequest};
