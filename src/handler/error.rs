use crate::flash::{FlashLevel, FlashMessage};
use crate::repository::RepositoryError;
use thiserror::Error;

/// Why an operator action was rejected
#[derive(Error, Debug)]
pub enum ActionError {
    /// The payment is not in a state that allows the action (stale page, lost race)
    #[error("{0}")]
    Validation(String),

    /// The invoice file was missing, unacceptable or could not be stored
    #[error("Upload failed: {0}")]
    Upload(String),

    /// A business precondition for the action is not met
    #[error("{0}")]
    Precondition(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ActionError {
    pub fn flash_level(&self) -> FlashLevel {
        match self {
            ActionError::Validation(_) | ActionError::Precondition(_) => FlashLevel::Warning,
            ActionError::Upload(_) | ActionError::Repository(_) => FlashLevel::Danger,
        }
    }
}

impl From<&ActionError> for FlashMessage {
    fn from(err: &ActionError) -> Self {
        FlashMessage::new(err.flash_level(), err.to_string())
    }
}
