pub mod aggregate;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod ident;
pub mod ingest;
pub mod model;
pub mod package_tree;
pub mod parsers;
pub mod payload;
pub mod report;
pub mod treemap;

pub use aggregate::ReportOptions;
pub use model::ClassCoverageFact;
pub use package_tree::build_package_tree;
pub use treemap::build_treemap;
