use docgrid_model::{ModelError, Transaction};
use thiserror::Error;

/// Errors the engine cannot turn into a no-op.
///
/// A primitive that does not apply returns its input transaction instead;
/// only misuse (positions outside the document, grids built from nodes that
/// are not tables) ends up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{node_type} is not a table")]
    NotATable { node_type: String },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Keep `tr` when the schema refused the edit; propagate anything else.
pub(crate) fn unless_rejected(
    edit: Result<Transaction, ModelError>,
    tr: &Transaction,
) -> Result<Transaction> {
    match edit {
        Ok(next) => Ok(next),
        Err(err) if err.is_schema_violation() => {
            log::debug!("edit rejected by schema, keeping transaction: {err}");
            Ok(tr.clone())
        }
        Err(err) => Err(err.into()),
    }
}
