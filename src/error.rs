use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TocError {
    /// A TOC link whose href does not point at an in-page fragment.
    #[error("link href {href:?} is not an in-page #fragment")]
    MissingFragment { href: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TocError>;
