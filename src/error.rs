use thiserror::Error;

use crate::collect::CollectError;
use crate::collect::assignments::AssignmentError;
use crate::identity::IdentityError;
use crate::jq_exec::FilterError;
use crate::manifest::RenderError;
use crate::schema::GraphError;
use crate::submit::SubmitError;

/// Every failure the create pipeline can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl Error {
    /// The user cancelled a prompt; callers report this without the usual failure message.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Collect(CollectError::Interrupted))
    }
}
