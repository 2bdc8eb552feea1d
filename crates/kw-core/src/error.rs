use crate::position::Position2D;

/// Alias for `Result<T, WorldError>`.
pub type WorldResult<T> = Result<T, WorldError>;

/// Errors that can occur when manipulating the spatial hierarchy.
///
/// All validation is synchronous and happens before any mutation, so a
/// returned error means the container is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The child is already a member of this container.
    #[error("duplicate member: {id}")]
    DuplicateMember {
        /// Short form of the offending child's id.
        id: String,
    },

    /// Another member already occupies the given position.
    #[error("position {0} is already occupied")]
    PositionOccupied(Position2D),

    /// The queried child is not a member of this container.
    #[error("not a member of this container: {id}")]
    NotAMember {
        /// Short form of the queried child's id.
        id: String,
    },
}
