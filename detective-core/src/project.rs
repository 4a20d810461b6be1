use crate::{DetectiveError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The fields of a `package.json` the analysis reads. Everything else is
/// kept in `extra` so the root manifest survives into the report untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub dependencies: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub optional_dependencies: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Published manifests carry `null`, `[]` or non-string ranges in dependency
/// maps; those read as empty or skipped entries.
fn lenient_ranges<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(map) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(name, range)| match range {
            Value::String(range) => Some((name, range)),
            _ => None,
        })
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

impl Manifest {
    pub fn read(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| DetectiveError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| DetectiveError::ParseJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `funding` is a string, an object with a `url`, or a list of either.
    pub fn funding_url(&self) -> Option<String> {
        fn url_of(value: &Value) -> Option<String> {
            match value {
                Value::String(url) => Some(url.clone()),
                Value::Object(map) => map.get("url")?.as_str().map(str::to_string),
                Value::Array(items) => items.iter().find_map(url_of),
                _ => None,
            }
        }

        self.funding.as_ref().and_then(url_of)
    }

    /// `dependencies` overlaid on `devDependencies`, the set a project
    /// declares explicitly.
    pub fn direct_dependencies(&self) -> BTreeMap<String, String> {
        let mut merged = self.dev_dependencies.clone();
        for (name, range) in &self.dependencies {
            merged.insert(name.clone(), range.clone());
        }
        merged
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

impl Project {
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = Some(start);

        while let Some(dir) = current {
            let candidate = dir.join("package.json");
            if candidate.is_file() {
                return Self::from_manifest_path(candidate);
            }
            current = dir.parent();
        }

        Err(DetectiveError::ManifestMissing {
            path: start.to_path_buf(),
        })
    }

    pub fn from_manifest_path(path: PathBuf) -> Result<Self> {
        let manifest = Manifest::read(&path)?;

        let root =
            path.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| DetectiveError::ManifestInvalid {
                    path: path.clone(),
                    reason: "manifest has no parent directory".into(),
                })?;

        Ok(Project {
            root,
            manifest_path: path,
            manifest,
        })
    }

    pub fn node_modules(&self) -> PathBuf {
        self.root.join("node_modules")
    }

    pub fn label(&self) -> String {
        if let Some(name) = self.manifest.name.as_deref() {
            name.to_string()
        } else {
            self.root
                .file_name()
                .and_then(|os| os.to_str())
                .unwrap_or(".")
                .to_string()
        }
    }
}
