//! Errors returned by a search.

use crate::domain::DomainError;

/// Error from a range raptor search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RaptorError {
    /// The request is inconsistent or incomplete
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// The configuration holds values the search cannot use
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// A criterion or feature was requested without the support it needs
    #[error("unsupported search criteria: {0}")]
    UnsupportedCriteria(String),

    /// The transit data broke an invariant during the search
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_convert() {
        let err: RaptorError = DomainError::PatternTooShort("P1".to_string()).into();
        assert_eq!(err.to_string(), "pattern P1 must have at least two stops");
    }

    #[test]
    fn display_includes_reason() {
        let err = RaptorError::UnsupportedCriteria("c2 requires a calculator".to_string());
        assert_eq!(
            err.to_string(),
            "unsupported search criteria: c2 requires a calculator"
        );
    }
}
