use crate::creator::CreatorId;

/// Convenience alias for pipeline results.
pub type ChangeResult<T> = Result<T, ChangeError>;

/// Errors raised while wiring the tile-change pipeline. Dispatch
/// itself is infallible; only registration can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    /// The same solver instance was added twice.
    #[error("solver '{0}' is already registered")]
    DuplicateSolver(String),

    /// The same creator was registered twice.
    #[error("creator {0} is already registered")]
    DuplicateCreator(CreatorId),
}
