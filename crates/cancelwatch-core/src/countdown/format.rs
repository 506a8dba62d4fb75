/// Render whole seconds as `m:ss` (minutes unpadded, seconds two digits).
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
