use std::env;
use std::thread;

const DEFAULT_ARTIFACT_DIRS: [&str; 2] = ["docs", "tests"];

#[derive(Debug, Clone)]
pub struct DetectiveConfig {
    pub scan_concurrency: usize,
    pub npm_command: String,
    pub offline: bool,
    pub artifact_dirs: Vec<String>,
    pub verbose: bool,
}

impl DetectiveConfig {
    pub fn from_env() -> Self {
        let mut scan_concurrency = default_scan_concurrency();
        let mut npm_command = default_npm_command().to_string();
        let mut artifact_dirs: Vec<String> =
            DEFAULT_ARTIFACT_DIRS.iter().map(|s| s.to_string()).collect();

        if let Ok(value) = env::var("MODULE_DETECTIVE_CONCURRENCY")
            && let Ok(parsed) = value.trim().parse::<usize>()
            && parsed > 0
        {
            scan_concurrency = parsed;
        }

        if let Ok(value) = env::var("MODULE_DETECTIVE_NPM") {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                npm_command = trimmed.to_string();
            }
        }

        if let Ok(value) = env::var("MODULE_DETECTIVE_ARTIFACT_DIRS") {
            let dirs = parse_list(&value);
            if !dirs.is_empty() {
                artifact_dirs = dirs;
            }
        }

        let offline = env::var("MODULE_DETECTIVE_OFFLINE")
            .map(|value| is_truthy(&value))
            .unwrap_or(false);

        let verbose = env::var("MODULE_DETECTIVE_VERBOSE")
            .map(|value| is_truthy(&value))
            .unwrap_or(false);

        DetectiveConfig {
            scan_concurrency,
            npm_command,
            offline,
            artifact_dirs,
            verbose,
        }
    }
}

impl Default for DetectiveConfig {
    fn default() -> Self {
        Self {
            scan_concurrency: default_scan_concurrency(),
            npm_command: default_npm_command().to_string(),
            offline: false,
            artifact_dirs: DEFAULT_ARTIFACT_DIRS.iter().map(|s| s.to_string()).collect(),
            verbose: false,
        }
    }
}

/// A third of the available cores, leaving room for the main thread and the
/// registry query.
pub fn default_scan_concurrency() -> usize {
    let cores = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.div_ceil(3).max(1)
}

fn default_npm_command() -> &'static str {
    if cfg!(windows) { "npm.cmd" } else { "npm" }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    matches!(v.as_str(), "1" | "true" | "yes" | "y" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_concurrency_is_never_zero() {
        assert!(default_scan_concurrency() >= 1);
    }

    #[test]
    fn parses_comma_lists() {
        assert_eq!(
            parse_list(" docs, tests ,,example "),
            vec!["docs", "tests", "example"]
        );
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" Yes "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn default_artifact_dirs() {
        let config = DetectiveConfig::default();
        assert_eq!(config.artifact_dirs, vec!["docs", "tests"]);
        assert!(!config.offline);
    }
}
