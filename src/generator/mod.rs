pub mod context;
pub mod outlet;
pub mod research;
pub mod topic_map;
pub mod workflow;

pub use context::GeneratorContext;
pub use topic_map::TopicMapGenerator;
