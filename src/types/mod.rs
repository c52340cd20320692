pub mod research;
pub mod topic_map;

pub use research::ResearchBrief;
pub use topic_map::{
    CONTENT_TYPES, GeneratedTopicMap, Level, Scope, TopicMapEntry, TopicMapRequest, UserIntent,
    suggested_word_count,
};
