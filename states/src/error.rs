use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("State not found: {type_name}, context: {context}")]
    StateNotFound {
        type_name: &'static str,
        context: String,
    },
    #[error("Compute not found: {type_name}, context: {context}")]
    ComputeNotFound {
        type_name: &'static str,
        context: String,
    },
    #[error("Command not found: {type_name}, context: {context}")]
    CommandNotFound {
        type_name: &'static str,
        context: String,
    },
}

impl Error {
    pub fn state_not_found(type_name: &'static str, context: impl Into<String>) -> Self {
        Self::StateNotFound {
            type_name,
            context: context.into(),
        }
    }

    pub fn compute_not_found(type_name: &'static str, context: impl Into<String>) -> Self {
        Self::ComputeNotFound {
            type_name,
            context: context.into(),
        }
    }

    pub fn command_not_found(type_name: &'static str, context: impl Into<String>) -> Self {
        Self::CommandNotFound {
            type_name,
            context: context.into(),
        }
    }
}
