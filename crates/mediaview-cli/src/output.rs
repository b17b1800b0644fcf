//! Output formatting for CLI

use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Render `data` as one line of JSON, or with `text` for the text format
pub fn format_output<T: Serialize>(
    data: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Text => text(data),
    }
}

/// `mm:ss` for a millisecond position
pub fn clock(ms: u32) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        ok: bool,
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Text);
    }

    #[test]
    fn test_format_output() {
        let row = Row { name: "a.mp4", ok: true };
        assert_eq!(
            format_output(&row, OutputFormat::Json, |_| String::new()),
            r#"{"name":"a.mp4","ok":true}"#
        );
        assert_eq!(
            format_output(&row, OutputFormat::Text, |r| format!("{} {}", r.name, r.ok)),
            "a.mp4 true"
        );
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(61_999), "01:01");
        assert_eq!(clock(3_600_000), "60:00");
    }
}
