// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers to stamp a release version into a JSON package manifest.

use core::fmt;
use std::fs::{read_to_string, write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

/// Git tag (release build) or commit hash (dev build) of this tool, or "undefined" when no git context available.
pub const VERSION: &str = include_str!(concat!(env!("OUT_DIR"), "/version.txt"));

/// Manifest key holding the package version.
const VERSION_KEY: &str = "version";

/// Strip at most one leading `v` from a version identifier.
///
/// Nothing else is validated or altered, so `"v1.2.3"` becomes `"1.2.3"`,
/// `"1.2.3"` is returned as is and `"vv1"` becomes `"v1"`.
#[must_use]
pub fn clean_version(raw: &str) -> &str {
    raw.strip_prefix('v').unwrap_or(raw)
}

/// Outcome of a successful [`update_manifest`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Update {
    /// Version written to the manifest, without the `v` prefix
    pub version: String,
    /// Manifest that was rewritten
    pub path: PathBuf,
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Updated version to {} in {}",
            self.version,
            self.path.display()
        )
    }
}

/// Read and parse the manifest at `path`.
///
/// Only a top-level JSON object is accepted, since anything else has no
/// place to hold a `version` field.
pub fn read_manifest(path: &Path) -> Result<Value> {
    let content = read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    let manifest: Value =
        serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))?;
    if !manifest.is_object() {
        bail!("{} does not contain a JSON object", path.display());
    }
    Ok(manifest)
}

/// Set the `version` field of `manifest`.
///
/// An existing field keeps its position, a missing one is appended after the
/// other entries.
pub fn set_version(manifest: &mut Value, version: &str) -> Result<()> {
    let Some(obj) = manifest.as_object_mut() else {
        bail!("manifest is not a JSON object");
    };
    obj.insert(VERSION_KEY.to_owned(), Value::String(version.to_owned()));
    Ok(())
}

/// Render `manifest` with two-space indentation and a trailing newline.
pub fn render_manifest(manifest: &Value) -> Result<String> {
    let mut content =
        serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    content.push('\n');
    Ok(content)
}

/// Overwrite the file at `path` with the rendered `manifest`.
pub fn write_manifest(path: &Path, manifest: &Value) -> Result<()> {
    let content =
        render_manifest(manifest).context(format!("Failed to serialize {}", path.display()))?;
    write(path, content).context(format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Override the manifest version with `raw_version`, dropping its `v` prefix.
///
/// This implementation uses `serde_json` with the `preserve_order` and
/// `arbitrary_precision` features, so the other entries keep their order and
/// number literals keep their text. Nothing is written unless the manifest was
/// read and parsed successfully.
pub fn update_manifest(path: &Path, raw_version: &str) -> Result<Update> {
    let version = clean_version(raw_version);
    debug!(raw_version, version, "normalized version");

    let mut manifest = read_manifest(path)?;
    debug!(path = %path.display(), "loaded manifest");

    set_version(&mut manifest, version)?;
    write_manifest(path, &manifest)?;
    debug!(path = %path.display(), "wrote manifest");

    Ok(Update {
        version: version.to_owned(),
        path: path.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn clean_version_test() {
        assert_eq!("2.3.0", clean_version("v2.3.0"));
        assert_eq!("1.0.0", clean_version("1.0.0"));

        // Only one leading character is removed
        assert_eq!("v1.0.0", clean_version("vv1.0.0"));
        assert_eq!("", clean_version("v"));

        // Not a prefix, left alone
        assert_eq!("1.0.0-v2", clean_version("1.0.0-v2"));
        assert_eq!("V1.0.0", clean_version("V1.0.0"));
        assert_eq!(" v1.0.0", clean_version(" v1.0.0"));
    }

    #[test]
    fn clean_version_is_idempotent_on_clean_input() {
        for version in ["1.0.0", "2.3.0-beta.1", "release", ""] {
            assert_eq!(version, clean_version(clean_version(version)));
        }
    }

    #[test]
    fn set_version_overwrites_in_place() -> Result<()> {
        let mut manifest: Value =
            serde_json::from_str(r#"{"name": "demo", "version": "0.0.1", "private": true}"#)?;
        set_version(&mut manifest, "2.3.0")?;

        let keys: Vec<&str> = manifest
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(vec!["name", "version", "private"], keys);
        assert_eq!(Some("2.3.0"), manifest["version"].as_str());
        Ok(())
    }

    #[test]
    fn set_version_appends_missing_field() -> Result<()> {
        let mut manifest = json!({ "name": "x" });
        set_version(&mut manifest, "1.0.0")?;
        assert_eq!(
            "{\n  \"name\": \"x\",\n  \"version\": \"1.0.0\"\n}\n",
            render_manifest(&manifest)?
        );
        Ok(())
    }

    #[test]
    fn set_version_rejects_non_object() {
        for mut manifest in [json!([1, 2]), json!("1.0.0"), json!(null), json!(7)] {
            assert!(set_version(&mut manifest, "1.0.0").is_err());
        }
    }

    #[test]
    fn render_manifest_keeps_number_literals() -> Result<()> {
        let manifest: Value =
            serde_json::from_str(r#"{"size": 1.50, "big": 12345678901234567890}"#)?;
        assert_eq!(
            "{\n  \"size\": 1.50,\n  \"big\": 12345678901234567890\n}\n",
            render_manifest(&manifest)?
        );
        Ok(())
    }

    #[test]
    fn update_display_test() {
        let update = Update {
            version: "2.3.0".to_owned(),
            path: PathBuf::from("package.json"),
        };
        assert_eq!("Updated version to 2.3.0 in package.json", update.to_string());
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
