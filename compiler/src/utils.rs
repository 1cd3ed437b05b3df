/// Quote `text` as a JSON string literal for use in messages.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}
