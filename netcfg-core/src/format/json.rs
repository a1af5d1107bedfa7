use crate::group::LeveledGroup;

/// Format the level records of a group as JSON.
pub fn format_json(group: &LeveledGroup) -> String {
    serde_json::to_string_pretty(group.lines()).unwrap_or_else(|_| "[]".to_string())
}
