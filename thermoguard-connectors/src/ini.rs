//! Minimal INI reader
//!
//! Supports exactly what station files use:
//!
//! ```ini
//! ; comment
//! # comment
//! [section]
//! key = value
//! ```
//!
//! Section and key names are case-sensitive and trimmed. A repeated key
//! overwrites the earlier one; a repeated section header continues the same
//! section. Any `key = value` line before the first header is a syntax error.

use std::collections::BTreeMap;

use crate::{ConnectorError, ConnectorResult};

/// One `key = value` line
#[derive(Debug, Clone, PartialEq)]
pub struct IniEntry {
    pub value: String,
    /// 1-based line the value was read from
    pub line: usize,
}

/// Keys of one section, sorted by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniSection {
    entries: BTreeMap<String, IniEntry>,
}

impl IniSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&IniEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IniEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed INI file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniDocument {
    sections: BTreeMap<String, IniSection>,
}

impl IniDocument {
    pub fn parse(text: &str) -> ConnectorResult<Self> {
        let mut doc = Self::default();
        let mut current: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| ConnectorError::Syntax {
                        line,
                        reason: format!("malformed section header '{trimmed}'"),
                    })?;
                doc.sections.entry(name.to_owned()).or_default();
                current = Some(name.to_owned());
                continue;
            }

            let (key, value) = trimmed.split_once('=').ok_or_else(|| ConnectorError::Syntax {
                line,
                reason: format!("expected 'key = value', found '{trimmed}'"),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConnectorError::Syntax {
                    line,
                    reason: "empty key".into(),
                });
            }

            let section = current.as_ref().ok_or_else(|| ConnectorError::Syntax {
                line,
                reason: format!("key '{key}' outside of any section"),
            })?;

            doc.sections.entry(section.clone()).or_default().entries.insert(
                key.to_owned(),
                IniEntry {
                    value: value.trim().to_owned(),
                    line,
                },
            );
        }

        Ok(doc)
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    /// Value that must be present and non-empty
    pub fn require(&self, section: &str, key: &str) -> ConnectorResult<&str> {
        self.get(section, key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConnectorError::MissingKey {
                section: section.to_owned(),
                key: key.to_owned(),
            })
    }
}
