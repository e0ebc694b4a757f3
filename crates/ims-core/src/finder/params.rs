use serde::Serialize;
use std::fmt;

/// Canonical, ordered query parameters for a list request. Two snapshots
/// compare equal exactly when they would produce the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams(Vec<(&'static str, String)>);

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.push((key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }
}

/// Renders as a form-encoded query string, for logs and diagnostics.
impl fmt::Display for ListParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}=", key)?;
            write_form_value(f, value)?;
        }
        Ok(())
    }
}

fn write_form_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'*' => {
                write!(f, "{}", byte as char)?
            }
            b' ' => f.write_str("+")?,
            other => write!(f, "%{:02X}", other)?,
        }
    }
    Ok(())
}
