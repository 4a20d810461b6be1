pub use detective_semver::VersionDelta;

/// Distance between an installed version and the latest published one.
/// No latest version means [`VersionDelta::Unknown`], never up to date.
pub fn classify(installed: &str, latest: Option<&str>) -> VersionDelta {
    detective_semver::diff(installed, latest)
}

/// Outdated items grouped by how far behind they are.
#[derive(Debug)]
pub struct FreshnessBuckets<T> {
    pub major: Vec<T>,
    pub minor: Vec<T>,
    pub patch: Vec<T>,
}

impl<T> Default for FreshnessBuckets<T> {
    fn default() -> Self {
        Self {
            major: Vec::new(),
            minor: Vec::new(),
            patch: Vec::new(),
        }
    }
}

impl<T> FreshnessBuckets<T> {
    /// Files `item` under `delta`; current and unknown items are dropped.
    pub fn push(&mut self, delta: VersionDelta, item: T) {
        match delta {
            VersionDelta::Major => self.major.push(item),
            VersionDelta::Minor => self.minor.push(item),
            VersionDelta::Patch => self.patch.push(item),
            VersionDelta::None | VersionDelta::Unknown => {}
        }
    }

    pub fn len(&self) -> usize {
        self.major.len() + self.minor.len() + self.patch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Major first, then minor, then patch.
    pub fn into_ordered(self) -> impl Iterator<Item = (VersionDelta, T)> {
        self.major
            .into_iter()
            .map(|item| (VersionDelta::Major, item))
            .chain(self.minor.into_iter().map(|item| (VersionDelta::Minor, item)))
            .chain(self.patch.into_iter().map(|item| (VersionDelta::Patch, item)))
    }

    /// "N major versions out of date (x.xx%), ..." against `total`.
    pub fn summary(&self, total: usize) -> String {
        format!(
            "{} major versions out of date ({:.2}%), {} minor versions out of date ({:.2}%), {} patch versions out of date ({:.2}%)",
            self.major.len(),
            percentage(self.major.len(), total),
            self.minor.len(),
            percentage(self.minor.len(), total),
            self.patch.len(),
            percentage(self.patch.len(), total),
        )
    }
}

pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
