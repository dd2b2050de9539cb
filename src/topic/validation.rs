//! Topic name and filter matching
//!
//! Key rules:
//! - `/` separates levels
//! - `+` occupies a whole level and matches exactly one topic level
//! - `#` occupies the last level and matches that level and everything below,
//!   including no levels at all
//! - Matching is case-sensitive and leading/trailing separators are significant
//!
//! The subscription tracker never validates filters; a malformed filter is
//! stored as-is and simply fails to match. The validators here are for callers
//! that want to reject bad input at their own boundary.

/// Represents a level in a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicLevel<'a> {
    /// Normal topic level
    Normal(&'a str),
    /// Single-level wildcard (+)
    SingleWildcard,
    /// Multi-level wildcard (#)
    MultiWildcard,
}

/// Parse topic into levels
pub fn parse_levels(topic: &str) -> impl Iterator<Item = TopicLevel<'_>> {
    topic.split('/').map(|level| match level {
        "+" => TopicLevel::SingleWildcard,
        "#" => TopicLevel::MultiWildcard,
        s => TopicLevel::Normal(s),
    })
}

/// Validate a topic name (a concrete publish destination)
///
/// Topic names:
/// - Must be at least 1 character
/// - Must not exceed 65535 bytes
/// - Must not contain null character
/// - Must not contain wildcards (+ or #)
pub fn validate_topic_name(topic: &str) -> Result<(), &'static str> {
    if topic.is_empty() {
        return Err("topic name cannot be empty");
    }

    if topic.len() > 65535 {
        return Err("topic name exceeds maximum length");
    }

    if topic.contains('\0') {
        return Err("topic name cannot contain null character");
    }

    if topic.contains('+') || topic.contains('#') {
        return Err("topic name cannot contain wildcards");
    }

    Ok(())
}

/// Validate a topic filter (a subscription pattern)
///
/// Topic filters:
/// - Must be at least 1 character
/// - Must not exceed 65535 bytes
/// - Must not contain null character
/// - Multi-level wildcard (#) must occupy the entire last level
/// - Single-level wildcard (+) must occupy an entire level
pub fn validate_topic_filter(filter: &str) -> Result<(), &'static str> {
    if filter.is_empty() {
        return Err("topic filter cannot be empty");
    }

    if filter.len() > 65535 {
        return Err("topic filter exceeds maximum length");
    }

    if filter.contains('\0') {
        return Err("topic filter cannot contain null character");
    }

    let mut levels = filter.split('/').peekable();
    while let Some(level) = levels.next() {
        if level.contains('#') {
            if level != "#" {
                return Err("multi-level wildcard must occupy entire level");
            }
            if levels.peek().is_some() {
                return Err("multi-level wildcard must be last level");
            }
        }

        if level.contains('+') && level != "+" {
            return Err("single-level wildcard must occupy entire level");
        }
    }

    Ok(())
}

/// Check if a topic filter matches a concrete topic name
///
/// Walks both strings level by level without allocating:
/// - `#` matches everything remaining, including nothing
/// - `+` consumes exactly one topic level
/// - any other filter level must equal the topic level byte for byte
/// - both sides must run out together unless `#` ended the walk
pub fn topic_matches_filter(topic: &str, filter: &str) -> bool {
    let mut topic_levels = topic.split('/');

    for filter_level in parse_levels(filter) {
        match filter_level {
            TopicLevel::MultiWildcard => return true,
            TopicLevel::SingleWildcard => {
                if topic_levels.next().is_none() {
                    return false;
                }
            }
            TopicLevel::Normal(expected) => match topic_levels.next() {
                Some(level) if level == expected => {}
                _ => return false,
            },
        }
    }

    // Filter exhausted; the topic must be too
    topic_levels.next().is_none()
}
