use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovtreeError {
    #[error("Malformed identifier '{name}': {reason}")]
    MalformedIdentifier { name: String, reason: String },

    #[error("Inconsistent coverage for '{name}': {covered} covered of {total} elements")]
    InconsistentCoverageFact {
        name: String,
        covered: i64,
        total: i64,
    },

    #[error("Duplicate coverage fact for class '{0}'")]
    DuplicateClass(String),

    #[error("Element counts overflow when adding '{0}'")]
    CountOverflow(String),

    #[error("Default package label '{0}' is also the name of a package")]
    DefaultPackageCollision(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error at position {position}: {source}")]
    Xml {
        source: quick_xml::Error,
        position: usize,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown coverage format")]
    UnknownFormat,
}

pub type Result<T> = std::result::Result<T, CovtreeError>;
