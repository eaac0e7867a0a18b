use thiserror::Error;

use crate::model::OutputId;

/// Conditions the reactor cannot recover from.
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Output {removed:?} was removed and no output remains to host clients")]
    NoOutputRemaining { removed: OutputId },
}
