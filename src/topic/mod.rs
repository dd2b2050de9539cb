//! Topic filter matching
//!
//! MQTT topic/filter semantics used by the subscription tracker: a level walk
//! that answers whether a concrete topic falls under a filter, plus optional
//! syntax validators for callers that want them.

pub mod validation;

pub use validation::{
    parse_levels, topic_matches_filter, validate_topic_filter, validate_topic_name, TopicLevel,
};
