pub mod http;

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)((?:proxy-)?authorization: )(.+)",
        r"(?i)((?:set-)?cookie: )(.+)",
        r"(?i)([A-Z0-9_\-]*?(?:KEY|TOKEN|SECRET|PASSWORD)(?:=|: ))([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Header names whose values are always hidden from logs.
const SENSITIVE_HEADER_NAMES: &[&str] = &["authorization", "proxy-authorization", "cookie", "set-cookie"];

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in SENSITIVE_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}

/// Render a header value for logging, hiding credentials.
pub fn redact_header(name: &str, value: &str) -> String {
    if SENSITIVE_HEADER_NAMES.iter().any(|sensitive| name.eq_ignore_ascii_case(sensitive)) {
        return "<redacted>".to_string();
    }
    let line = format!("{name}: {value}");
    let redacted = redact_sensitive(&line);
    redacted
        .split_once(": ")
        .map(|(_, rendered)| rendered.to_string())
        .unwrap_or(redacted)
}
