pub mod config;
pub mod console;
pub mod disk;
pub mod error;
pub mod freshness;
pub mod graph;
pub mod operations;
pub mod project;
pub mod registry;
pub mod report;
pub mod suggestions;

pub use config::DetectiveConfig;
pub use error::DetectiveError;
pub use graph::{Breadcrumb, DependencyGraph, NodeId, PackageNode};
pub use project::{Manifest, Project};
pub use report::Report;

pub type Result<T> = std::result::Result<T, DetectiveError>;
