//! Small shared helpers.

/// Current UTC time in the fixed-width report-key format `YYYYMMDD-HHMMSS`.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Truncate a string for log payloads, appending an ellipsis when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::is_well_formed_timestamp;

    #[test]
    fn test_now_timestamp_is_well_formed() {
        assert!(is_well_formed_timestamp(&now_timestamp()));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a longer line", 8), "a longer...");
    }
}
