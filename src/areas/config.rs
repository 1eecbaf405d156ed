//! Repository configuration (`.git/config`)
//!
//! The file uses git's INI dialect:
//!
//! ```text
//! [core]
//!     repositoryformatversion = 0
//! [remote "origin"]
//!     url = https://example.com/repo.git
//! ```
//!
//! Section and key names are case-insensitive and stored lowercased; a subsection
//! is folded into its section name as `remote.origin`. Only
//! `core.repositoryformatversion` is interpreted by the store itself.

use crate::errors::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

const SECTION_REGEX: &str = r#"^\[\s*([A-Za-z0-9.\-]+)(?:\s+"((?:[^"\\]|\\.)*)")?\s*\]$"#;
const ENTRY_REGEX: &str = r"^([A-Za-z][A-Za-z0-9\-]*)\s*(?:=\s*(.*?))?\s*$";

/// On-disk format version this crate reads and writes
pub const REPOSITORY_FORMAT_VERSION: i64 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let section_re = regex::Regex::new(SECTION_REGEX)?;
        let entry_re = regex::Regex::new(ENTRY_REGEX)?;

        let mut config = Config::default();
        let mut current: Option<String> = None;

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(caps) = section_re.captures(line) {
                let mut name = caps[1].to_lowercase();
                if let Some(subsection) = caps.get(2) {
                    name = format!("{name}.{}", subsection.as_str());
                }
                config.sections.entry(name.clone()).or_default();
                current = Some(name);
            } else if let (Some(section), Some(caps)) = (&current, entry_re.captures(line)) {
                // a bare key is boolean true
                let value = caps.get(2).map_or("true", |value| value.as_str());
                config.set(section, &caps[1], unquote(value));
            } else {
                warn!(line = number + 1, "ignoring unparsable config line");
            }
        }

        Ok(config)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_lowercase())
            .and_then(|entries| entries.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_lowercase())
            .or_default()
            .insert(key.to_lowercase(), value.into());
    }

    /// `core.repositoryformatversion`, if present and an integer
    pub fn repository_format_version(&self) -> Option<std::result::Result<i64, String>> {
        self.get("core", "repositoryformatversion")
            .map(|version| version.parse::<i64>().map_err(|_| version.to_string()))
    }

    /// Configuration written for a freshly created repository
    pub fn default_config() -> Self {
        let mut config = Config::default();
        config.set(
            "core",
            "repositoryformatversion",
            REPOSITORY_FORMAT_VERSION.to_string(),
        );
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");

        config
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (section, entries) in &self.sections {
            match section.split_once('.') {
                Some((name, subsection)) => writeln!(f, "[{name} \"{subsection}\"]")?,
                None => writeln!(f, "[{section}]")?,
            }
            for (key, value) in entries {
                writeln!(f, "\t{key} = {value}")?;
            }
        }

        Ok(())
    }
}
