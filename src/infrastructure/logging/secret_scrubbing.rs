use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static URL_CREDENTIALS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(rediss?(?:\+unix)?://)[^@/\s]+@"));

static PASSWORD_FIELD: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']?(password|requirepass|secret|token)["']?\s*[:=]\s*["']?[^"'\s,}]+["']?"#)
});

static AUTH_COMMAND: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)\bAUTH\s+\S+(\s+\S+)?"));

/// Scrubs store credentials out of text before it reaches logs or the terminal
///
/// Store errors and connection URLs may carry a password in their userinfo
/// section, in a `password: ...` field, or inside an echoed `AUTH` command.
#[derive(Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    pub fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = message.to_string();

        if let Ok(pattern) = URL_CREDENTIALS.as_ref() {
            scrubbed = pattern
                .replace_all(&scrubbed, "${1}[REDACTED]@")
                .into_owned();
        }
        if let Ok(pattern) = AUTH_COMMAND.as_ref() {
            scrubbed = pattern.replace_all(&scrubbed, "AUTH [REDACTED]").into_owned();
        }
        if let Ok(pattern) = PASSWORD_FIELD.as_ref() {
            scrubbed = pattern
                .replace_all(&scrubbed, "${1}=[REDACTED]")
                .into_owned();
        }

        scrubbed
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
