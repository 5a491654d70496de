pub mod plans;
pub mod posts;
pub mod subscriptions;
pub mod users;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::value_objects::persistence::PersistenceConflict;

/// Lifts constraint violations into `PersistenceConflict` so use cases can map them.
pub(crate) fn map_write_error(err: DieselError) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceConflict::Unique {
                constraint: info.constraint_name().unwrap_or("unknown").to_string(),
            }
            .into()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            PersistenceConflict::ForeignKey {
                constraint: info.constraint_name().unwrap_or("unknown").to_string(),
            }
            .into()
        }
        other => anyhow::Error::new(other),
    }
}
