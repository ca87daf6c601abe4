use crate::utils::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$")
            .expect("dotenv pattern is valid")
    })
}

/// Parses `KEY=VALUE` lines. Quoted values keep `#`; unquoted values end at ` #`.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(caps) = line_regex().captures(line) else {
            tracing::debug!("Skipping malformed .env line: {}", trimmed);
            continue;
        };

        let key = caps[1].to_string();
        let raw = &caps[2];
        let value = unquote(raw).unwrap_or_else(|| match raw.find(" #") {
            Some(idx) => raw[..idx].trim_end().to_string(),
            None => raw.to_string(),
        });
        pairs.push((key, value));
    }

    pairs
}

fn unquote(raw: &str) -> Option<String> {
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = raw[1..].rfind(quote).map(|end| &raw[1..end + 1])?;
    if quote == '"' {
        Some(inner.replace("\\n", "\n").replace("\\\"", "\""))
    } else {
        Some(inner.to_string())
    }
}

/// Finds `.env` in `start` or its ancestors.
pub fn find_dotenv(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

/// Exports variables from `path` without overriding ones already set. Returns how many were set.
pub fn load_dotenv_from(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let mut applied = 0;

    for (key, value) in parse_dotenv(&content) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }

    tracing::debug!("🔑 Loaded {} variables from {}", applied, path.display());
    Ok(applied)
}

/// Loads the nearest `.env` at or above `start`. Returns the file that was read, if any.
pub fn load_nearest_dotenv(start: &Path) -> Result<Option<PathBuf>> {
    match find_dotenv(start) {
        Some(path) => {
            load_dotenv_from(&path)?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

/// Loads the nearest `.env` above the working directory. Runs before logging is set up,
/// so the caller reports the outcome.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    load_nearest_dotenv(&cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_dotenv() {
        let pairs = parse_dotenv(
            r#"
# comment
OPENAI_API_KEY=sk-test-123
export RESEND_FROM_EMAIL="Deals <deals@example.com>"
SINGLE='keep # this'
TRAILING=value # note
not a pair
"#,
        );

        assert_eq!(
            pairs,
            vec![
                ("OPENAI_API_KEY".to_string(), "sk-test-123".to_string()),
                ("RESEND_FROM_EMAIL".to_string(), "Deals <deals@example.com>".to_string()),
                ("SINGLE".to_string(), "keep # this".to_string()),
                ("TRAILING".to_string(), "value".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_does_not_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "SMART_SHOPPER_DOTENV_NEW=fresh\nSMART_SHOPPER_DOTENV_SET=from_file\n",
        )
        .unwrap();
        std::env::set_var("SMART_SHOPPER_DOTENV_SET", "from_shell");

        let applied = load_dotenv_from(&path).unwrap();

        assert_eq!(applied, 1);
        assert_eq!(std::env::var("SMART_SHOPPER_DOTENV_NEW").unwrap(), "fresh");
        assert_eq!(std::env::var("SMART_SHOPPER_DOTENV_SET").unwrap(), "from_shell");

        std::env::remove_var("SMART_SHOPPER_DOTENV_NEW");
        std::env::remove_var("SMART_SHOPPER_DOTENV_SET");
    }

    #[test]
    fn test_find_dotenv_in_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".env"), "X=1\n").unwrap();

        assert_eq!(find_dotenv(&nested), Some(dir.path().join(".env")));
    }

    #[test]
    fn test_load_nearest_reports_the_file_it_read() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("project");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".env"), "SMART_SHOPPER_DOTENV_LOG=smart_shopper=trace\n").unwrap();

        let loaded = load_nearest_dotenv(&nested).unwrap();

        assert_eq!(loaded, Some(dir.path().join(".env")));
        assert_eq!(std::env::var("SMART_SHOPPER_DOTENV_LOG").unwrap(), "smart_shopper=trace");
        std::env::remove_var("SMART_SHOPPER_DOTENV_LOG");
    }
}
