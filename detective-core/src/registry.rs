//! Latest published versions, fetched with one batched `npm outdated`.
//!
//! The query runs against a synthetic manifest in a throwaway directory
//! so the project's own manifest and lockfile are never touched. `npm
//! outdated` exits non-zero whenever something is outdated, which for a
//! manifest full of `*` ranges and no install is always; the JSON on stdout
//! is read regardless of the exit status.

use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Package name to latest published version. A missing entry means the
/// version is unknown.
pub type LatestVersionMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the outdated check inside `workdir`, which holds the synthetic
/// `package.json` (and `.npmrc` when there is one).
pub trait RegistryQuery: Send + Sync {
    fn outdated(&self, workdir: &Path) -> impl Future<Output = io::Result<QueryOutput>> + Send;
}

#[derive(Debug, Clone)]
pub struct NpmOutdated {
    command: String,
}

impl NpmOutdated {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl RegistryQuery for NpmOutdated {
    async fn outdated(&self, workdir: &Path) -> io::Result<QueryOutput> {
        let output = tokio::process::Command::new(&self.command)
            .args(["outdated", "--json"])
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(QueryOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[derive(Debug)]
pub struct LatestVersionResolver<Q> {
    query: Q,
    npmrc: Option<PathBuf>,
}

impl<Q: RegistryQuery> LatestVersionResolver<Q> {
    pub fn new(query: Q) -> Self {
        Self { query, npmrc: None }
    }

    /// Registry settings copied next to the synthetic manifest.
    pub fn with_npmrc(mut self, path: impl Into<PathBuf>) -> Self {
        self.npmrc = Some(path.into());
        self
    }

    /// Never fails: any problem yields a map with fewer (or no) entries.
    pub async fn resolve(&self, names: &BTreeSet<String>) -> LatestVersionMap {
        if names.is_empty() {
            return LatestVersionMap::new();
        }

        let workdir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => {
                warn!(%error, "cannot create a directory for the registry query");
                return LatestVersionMap::new();
            }
        };
        debug!(dir = %workdir.path().display(), packages = names.len(), "querying registry");

        if let Err(error) = write_synthetic_manifest(workdir.path(), names) {
            warn!(%error, "cannot write the registry query manifest");
            return LatestVersionMap::new();
        }

        self.copy_npmrc(workdir.path());

        let latest = match self.query.outdated(workdir.path()).await {
            Ok(output) => parse_outdated(&output),
            Err(error) => {
                warn!(%error, "registry query failed, freshness will be unknown");
                LatestVersionMap::new()
            }
        };

        if let Err(error) = workdir.close() {
            debug!(%error, "failed to remove registry query directory");
        }

        latest
    }

    fn copy_npmrc(&self, workdir: &Path) {
        let Some(source) = self.npmrc.as_deref() else {
            return;
        };

        if !source.is_file() {
            debug!("no .npmrc found, using the default npm registry");
            return;
        }

        if let Err(error) = fs::copy(source, workdir.join(".npmrc")) {
            debug!(%error, "could not copy .npmrc, using the default npm registry");
        }
    }
}

fn write_synthetic_manifest(dir: &Path, names: &BTreeSet<String>) -> io::Result<()> {
    let dependencies: BTreeMap<&str, &str> = names.iter().map(|name| (name.as_str(), "*")).collect();
    let manifest = json!({ "dependencies": dependencies });
    let data = serde_json::to_string(&manifest).map_err(io::Error::other)?;
    fs::write(dir.join("package.json"), data)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OutdatedPayload {
    Single(OutdatedEntry),
    Many(Vec<OutdatedEntry>),
}

#[derive(Debug, Deserialize)]
struct OutdatedEntry {
    #[serde(default)]
    latest: Option<String>,
}

pub fn parse_outdated(output: &QueryOutput) -> LatestVersionMap {
    let mut latest = LatestVersionMap::new();
    let stdout = output.stdout.trim();

    if stdout.is_empty() {
        if !output.success {
            warn!(stderr = %output.stderr.trim(), "registry query produced no output");
        }
        return latest;
    }

    let value: Value = match serde_json::from_str(stdout) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "malformed registry query output");
            return latest;
        }
    };

    if let Some(error) = value.get("error").filter(|error| error.get("code").is_some()) {
        let summary = error
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        warn!(%summary, "registry query reported an error");
        return latest;
    }

    let packages: BTreeMap<String, OutdatedPayload> = match serde_json::from_value(value) {
        Ok(packages) => packages,
        Err(error) => {
            warn!(%error, "unexpected registry query output");
            return latest;
        }
    };

    for (name, payload) in packages {
        let version = match payload {
            OutdatedPayload::Single(entry) => entry.latest,
            OutdatedPayload::Many(entries) => entries.into_iter().find_map(|entry| entry.latest),
        };

        if let Some(version) = version.filter(|v| !v.is_empty()) {
            latest.insert(name, version);
        }
    }

    latest
}
