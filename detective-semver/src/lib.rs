use std::error::Error as StdError;
use std::fmt;

pub use semver::Version;

/// How far an installed version lags behind another version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionDelta {
    None,
    Patch,
    Minor,
    Major,
    Unknown,
}

impl VersionDelta {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionDelta::None => "none",
            VersionDelta::Patch => "patch",
            VersionDelta::Minor => "minor",
            VersionDelta::Major => "major",
            VersionDelta::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VersionDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    input: String,
    message: String,
}

impl Error {
    pub fn new(input: String, message: String) -> Self {
        Self { input, message }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.input)
    }
}

impl StdError for Error {}

/// Parses a version the way npm writes them in installed manifests, which
/// tolerates surrounding whitespace and a leading `v` or `=`.
pub fn parse_version(original: &str) -> Result<Version, Error> {
    let mut s = original.trim();

    if let Some(rest) = s.strip_prefix('=') {
        s = rest.trim_start();
    }

    if let Some(rest) = s.strip_prefix('v').or_else(|| s.strip_prefix('V')) {
        s = rest;
    }

    if s.is_empty() {
        return Err(Error::new(original.to_string(), "empty version".into()));
    }

    Version::parse(s).map_err(|err| Error::new(original.to_string(), err.to_string()))
}

/// Point distance between two versions. Only the release triple is
/// compared; prerelease and build metadata never move the bucket.
pub fn distance(installed: &Version, latest: &Version) -> VersionDelta {
    if installed.major != latest.major {
        VersionDelta::Major
    } else if installed.minor != latest.minor {
        VersionDelta::Minor
    } else if installed.patch != latest.patch {
        VersionDelta::Patch
    } else {
        VersionDelta::None
    }
}

/// Classifies `installed` against `latest`. A missing or unparseable side
/// yields [`VersionDelta::Unknown`].
pub fn diff(installed: &str, latest: Option<&str>) -> VersionDelta {
    let Some(latest) = latest else {
        return VersionDelta::Unknown;
    };

    match (parse_version(installed), parse_version(latest)) {
        (Ok(installed), Ok(latest)) => distance(&installed, &latest),
        _ => VersionDelta::Unknown,
    }
}
