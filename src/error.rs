use thiserror::Error;

/// Boxed error produced by a [`Collaborator`](crate::Collaborator).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid bands, height, limit, or chunk size.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A codec was assembled without one of its required functions.
    #[error("missing capability: {0} has not been supplied")]
    MissingCapability(&'static str),
    /// Raised by the data source or sink. Kept as-is so callers can
    /// `downcast_ref` back to their own error type.
    #[error(transparent)]
    Collaborator(BoxError),
    /// A collaborator returned data that breaks its contract.
    #[error("data contract violated: {0}")]
    DataContract(String),
}

impl Error {
    pub(crate) fn collaborator<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Collaborator(Box::new(error))
    }

    /// Gets the collaborator error this was raised from, if any.
    pub fn collaborator_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Collaborator(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
