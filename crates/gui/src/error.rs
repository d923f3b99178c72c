/// Errors surfaced by the annotation core
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupError {
    /// No overlay container to host marker widgets
    MissingContainer,
    /// Operation referenced an annotation that does not exist
    UnknownAnnotation(String),
    /// Operation needs a two-point measurement but got an issue
    NotAMeasurement(String),
}

impl std::fmt::Display for MarkupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupError::MissingContainer => write!(f, "Config missing: overlay container"),
            MarkupError::UnknownAnnotation(id) => write!(f, "Annotation '{}' not found", id),
            MarkupError::NotAMeasurement(id) => {
                write!(f, "Annotation '{}' is not a measurement", id)
            }
        }
    }
}

impl std::error::Error for MarkupError {}
