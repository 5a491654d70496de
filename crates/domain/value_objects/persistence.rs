use thiserror::Error;

/// Constraint violations reported by a repository write.
///
/// Repositories return these wrapped in `anyhow::Error`; callers recover them
/// with `downcast_ref` to map onto conflict responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceConflict {
    #[error("unique constraint violated: {constraint}")]
    Unique { constraint: String },
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKey { constraint: String },
}

impl PersistenceConflict {
    pub fn from_error(err: &anyhow::Error) -> Option<&PersistenceConflict> {
        err.downcast_ref::<PersistenceConflict>()
    }
}
