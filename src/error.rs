//! Error taxonomy for the slicing pipeline
//!
//! Nothing here is fatal to a session: the tick absorbs every `SliceError`
//! at candidate granularity and records it in the `TickReport`.

use crate::sim::EntityId;

/// Reasons a single slice attempt was skipped
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SliceError {
    /// Blade trajectory and velocity are collinear, no cut normal exists
    #[error("degenerate cut plane: blade trajectory parallel to velocity")]
    DegeneratePlane,

    /// The mesh splitter reported a failure
    #[error("slice failure: {0}")]
    SliceFailure(String),

    /// The cut plane does not cross the target mesh
    #[error("cut plane does not intersect the target mesh")]
    NoIntersection,

    /// An optional collaborator was not configured
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// The target was already sliced during this tick
    #[error("entity {0} already sliced this tick")]
    DuplicateSliceAttempt(EntityId),

    /// The target no longer exists in the world
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// Mesh data is malformed (e.g. a face index past the vertex buffer)
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A builder was asked to produce an entity without a required part
    #[error("incomplete entity: missing {0}")]
    IncompleteEntity(&'static str),
}

/// Settings loading errors
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its valid range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
