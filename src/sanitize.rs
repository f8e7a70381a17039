use regex::Regex;
use std::sync::OnceLock;

const DEFAULT_PREVIEW_LEN: usize = 2000;

/// Read once per process from `QUERYGEN_PREVIEW_LEN`.
pub fn preview_len() -> usize {
    static LEN: OnceLock<usize> = OnceLock::new();
    *LEN.get_or_init(|| {
        std::env::var("QUERYGEN_PREVIEW_LEN")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PREVIEW_LEN)
    })
}

pub fn strip_ansi(input: &str) -> String {
    // Remove common ANSI CSI sequences (e.g., ESC[...m)
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            i += 2;
            while i < bytes.len() {
                let b = bytes[i];
                i += 1;
                if (0x40..=0x7e).contains(&b) {
                    break;
                }
            }
            continue;
        }

        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).to_string()
}

/// Text coming back from a provider, made safe for the terminal.
pub fn sanitize_for_console(input: &str) -> String {
    let no_ansi = strip_ansi(input);
    truncate_chars(&redact_secrets(&no_ansi), preview_len())
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        return s.to_string();
    }

    let truncated: String = s.chars().take(max_chars).collect();
    format!(
        "{truncated}... [truncated {} chars]",
        total.saturating_sub(max_chars)
    )
}

/// Mask API keys and similar credentials. Applied to error text before it is printed or saved.
pub fn redact_secrets(input: &str) -> String {
    static GOOGLE_RE: OnceLock<Regex> = OnceLock::new();
    static SK_RE: OnceLock<Regex> = OnceLock::new();
    static URL_KEY_RE: OnceLock<Regex> = OnceLock::new();
    static BEARER_RE: OnceLock<Regex> = OnceLock::new();
    static KV_RE: OnceLock<Regex> = OnceLock::new();

    let google_re =
        GOOGLE_RE.get_or_init(|| Regex::new(r"\bAIza[0-9A-Za-z_\-]{20,}").expect("google regex"));
    let sk_re = SK_RE.get_or_init(|| Regex::new(r"\bsk-[A-Za-z0-9_\-]{10,}").expect("sk regex"));
    let url_key_re = URL_KEY_RE
        .get_or_init(|| Regex::new(r"([?&]key=)[^&\s)]+").expect("url key regex"));
    let bearer_re = BEARER_RE
        .get_or_init(|| Regex::new(r"(?i)(bearer\s+)[A-Za-z0-9._\-]+").expect("bearer regex"));
    let kv_re = KV_RE.get_or_init(|| {
        // key: value  OR  key=value  (JSON/env-like)
        Regex::new(
            r#"(?i)(api[_-]?key|x-goog-api-key|access[_-]?token|secret)(["']?\s*[:=]\s*)(["']?)([^\s"'\r\n,}]+)(["']?)"#,
        )
        .expect("kv regex")
    });

    let mut s = input.to_string();
    s = google_re.replace_all(&s, "AIza[REDACTED]").to_string();
    s = sk_re.replace_all(&s, "sk-[REDACTED]").to_string();
    s = url_key_re.replace_all(&s, "${1}[REDACTED]").to_string();
    s = bearer_re.replace_all(&s, "${1}[REDACTED]").to_string();
    s = kv_re.replace_all(&s, "$1$2$3[REDACTED]$5").to_string();

    s
}
