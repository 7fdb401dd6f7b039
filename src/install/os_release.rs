//! Minimal `/etc/os-release` reader.
use std::fs;
use std::path::Path;

use crate::errors::DockhandError;

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub version_id: Option<String>,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    pub fn is_fedora(&self) -> bool {
        self.id == "fedora"
    }

    /// `PRETTY_NAME`, else `ID VERSION_ID`.
    pub fn display_name(&self) -> String {
        match (&self.pretty_name, &self.version_id) {
            (Some(p), _) => p.clone(),
            (None, Some(v)) => format!("{} {v}", self.id),
            (None, None) => self.id.clone(),
        }
    }
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let inner = v
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(v);
    inner.replace("\\\"", "\"").replace("\\\\", "\\")
}

pub fn parse_os_release(text: &str) -> OsRelease {
    let mut out = OsRelease::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value);
        match key.trim() {
            "ID" => out.id = value.to_ascii_lowercase(),
            "VERSION_ID" => out.version_id = Some(value),
            "PRETTY_NAME" => out.pretty_name = Some(value),
            _ => {}
        }
    }
    out
}

pub fn read_os_release(path: &Path) -> Result<OsRelease, DockhandError> {
    let text = fs::read_to_string(path)
        .map_err(|e| DockhandError::Message(format!("cannot read {}: {e}", path.display())))?;
    Ok(parse_os_release(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fedora_release() {
        let text = "NAME=\"Fedora Linux\"\nVERSION=\"40 (Server Edition)\"\nID=fedora\nVERSION_ID=40\nPRETTY_NAME=\"Fedora Linux 40 (Server Edition)\"\n# comment\n";
        let os = parse_os_release(text);
        assert!(os.is_fedora());
        assert_eq!(os.version_id.as_deref(), Some("40"));
        assert_eq!(os.display_name(), "Fedora Linux 40 (Server Edition)");
    }

    #[test]
    fn other_distributions_are_not_fedora() {
        let os = parse_os_release("ID='ubuntu'\nVERSION_ID=\"24.04\"\n");
        assert!(!os.is_fedora());
        assert_eq!(os.id, "ubuntu");
        assert_eq!(os.display_name(), "ubuntu 24.04");
    }

    #[test]
    fn missing_file_is_an_error() {
        let td = tempfile::tempdir().expect("tmpdir");
        assert!(read_os_release(&td.path().join("nope")).is_err());
    }
}
