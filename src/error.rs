/// Broad category of a failure.
///
/// Degenerate samples and solver non-convergence are not represented here:
/// those are reported through NaN sentinels and log warnings, never as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mismatched array lengths, unknown columns, inconsistent configuration.
    InvalidInput,
    /// Malformed `FitRegion` (non-finite bounds, `min >= max`, bad lines).
    InvalidRegion,
    /// Too few points survived clipping to fit the requested polynomial.
    InsufficientData,
    /// A statistic violated an enforced limit (raise mode only).
    LimitViolation,
    /// Reading or writing a JSON file failed.
    Io,
}

#[derive(Clone)]
pub struct DiagError {
    kind: ErrorKind,
    message: String,
}

impl DiagError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DiagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for DiagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for DiagError {}
