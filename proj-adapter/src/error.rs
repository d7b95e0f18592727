use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    /// Failure reported by PROJ through its error register. `message` is the
    /// engine's own rendering of `code`, unchanged.
    #[error("PROJ error ({context}): {code} {message}")]
    Engine {
        code: i32,
        message: String,
        context: &'static str,
    },

    #[error("proj_context_create() returned NULL")]
    ContextCreation,

    #[error("{0} contains NUL byte")]
    NulInDefinition(&'static str),

    #[error("{name} holds {len} values but {count} points were requested")]
    BufferTooShort {
        name: &'static str,
        len: usize,
        count: usize,
    },

    #[error("definition cannot be used as a CRS: {definition}")]
    NotACrs { definition: String },

    #[error("definition has no coordinate operation to project with: {definition}")]
    NotAnOperation { definition: String },
}

impl ProjError {
    /// Engine message for engine failures, the `Display` text otherwise.
    pub fn message(&self) -> String {
        match self {
            Self::Engine { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// PROJ error code, if the failure came from the engine.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }
}
