use thiserror::Error;

/// Broad classification of [`DomainError`] used by the UI to pick a message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Index,
    Parse,
    Io,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Thickness {value} m is below the minimum of {minimum} m")]
    ThicknessBelowMinimum { value: f64, minimum: f64 },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("CSV must include these columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Add layers first.")]
    NothingToExport,

    #[error("Column image of {width}x{height} pixels is too large to export")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Layer index {index} is out of bounds (store has {len} layers)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Malformed input at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ThicknessBelowMinimum { .. }
            | DomainError::InvalidField { .. }
            | DomainError::MissingColumns { .. }
            | DomainError::NothingToExport
            | DomainError::ImageTooLarge { .. } => ErrorKind::Validation,
            DomainError::IndexOutOfBounds { .. } => ErrorKind::Index,
            DomainError::Parse { .. } | DomainError::Csv(_) => ErrorKind::Parse,
            DomainError::Image(_) | DomainError::Clipboard(_) | DomainError::Io(_) => {
                ErrorKind::Io
            }
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_columns() {
        let err = DomainError::MissingColumns {
            columns: vec!["Grain Size".to_string(), "Thickness".to_string()],
        };
        assert_eq!(err.to_string(), "CSV must include these columns: Grain Size, Thickness");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DomainError::IndexOutOfBounds { index: 3, len: 2 }.kind(), ErrorKind::Index);
        assert_eq!(
            DomainError::Parse { line: 2, reason: "bad".to_string() }.kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            DomainError::ThicknessBelowMinimum { value: 0.05, minimum: 0.1 }.kind(),
            ErrorKind::Validation
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(DomainError::from(io).kind(), ErrorKind::Io);
    }
}
