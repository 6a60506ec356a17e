use thiserror::Error;

use crate::model::PhaseKey;
use crate::store::RowHandle;

/// Errors raised by a [`crate::store::RoadmapStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Row {handle} not found in '{collection}'")]
    RowNotFound {
        collection: String,
        handle: RowHandle,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Backend(String),
}

/// The write the controller was attempting when the store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Reload,
    RenamePhase,
    MovePhase,
    ResizePhase,
    AddPhase,
    UpdatePhase,
    DeletePhase,
    SaveLinks,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Operation::Reload => "reload roadmap",
            Operation::RenamePhase => "rename phase",
            Operation::MovePhase => "move phase",
            Operation::ResizePhase => "resize phase",
            Operation::AddPhase => "add phase",
            Operation::UpdatePhase => "update phase",
            Operation::DeletePhase => "delete phase",
            Operation::SaveLinks => "save phase links",
        };
        f.write_str(label)
    }
}

/// A gesture or edit refused before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Phases can only be moved within their own chantier ('{from}' → '{to}')")]
    CrossChantierDrop { from: String, to: String },

    #[error("Moving '{phase}' would end past the last visible bucket")]
    BeyondWindow { phase: String },

    #[error("Start bucket must not come after the end bucket")]
    InvertedSpan,

    #[error("Phase name cannot be empty")]
    EmptyName,

    #[error("Chantier '{chantier}' already has a phase named '{phase}'")]
    DuplicatePhase { chantier: String, phase: String },

    #[error("No bucket to anchor the phase on")]
    NoBucket,

    #[error("Week {week} does not fall in exactly one sprint")]
    AmbiguousWeek { week: String },

    #[error("Bucket reference '{reference}' is unknown, the phase cannot be shifted")]
    UnknownReference { reference: String },

    #[error("No sprint exists that far from '{reference}'")]
    OutsideSprints { reference: String },
}

/// Roadmap controller error.
#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("Could not {operation}: {source}")]
    Persistence {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    #[error("No row handle for {entity}; the row may have been removed")]
    MissingRowHandle { entity: String },

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Phase not found: {0}")]
    PhaseNotFound(PhaseKey),

    #[error("Chantier not found: {0}")]
    ChantierNotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl RoadmapError {
    pub(crate) fn persistence(operation: Operation) -> impl FnOnce(StoreError) -> Self {
        move |source| RoadmapError::Persistence { operation, source }
    }

    /// Validation failures are warnings; everything else is an error.
    pub fn is_rejection(&self) -> bool {
        matches!(self, RoadmapError::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_error_names_the_operation() {
        let err = RoadmapError::persistence(Operation::MovePhase)(StoreError::Backend(
            "sheet locked".into(),
        ));
        assert_eq!(err.to_string(), "Could not move phase: sheet locked");
        assert!(!err.is_rejection());
    }

    #[test]
    fn rejections_are_flagged() {
        let err: RoadmapError = Rejection::InvertedSpan.into();
        assert!(err.is_rejection());
    }
}
