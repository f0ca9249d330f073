use stencil_parser::ParseError;
use stencil_semantics::SemanticError;
use thiserror::Error;

/// Failure to load the template of a marker kind. Fatal for that kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Template resource '{resource_name}' was not found")]
    Missing { resource_name: String },

    #[error("Template resource '{resource_name}' failed to parse: {source}")]
    Parse {
        resource_name: String,
        #[source]
        source: ParseError,
    },

    #[error("Template resource '{resource_name}' declares no type")]
    Empty { resource_name: String },

    #[error("Template resource '{resource_name}' declares {count} top-level types, expected exactly one")]
    Ambiguous { resource_name: String, count: usize },
}

/// Failure to synthesize the declaration for one accepted usage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("Cannot merge members into {kind} '{target}'")]
    UnsupportedTargetKind { target: String, kind: &'static str },

    #[error("Member '{member}' has unbalanced brackets")]
    UnbalancedMember { member: String },

    #[error("Failed to render generated source: {0}")]
    Render(String),

    #[error("Generated source does not parse: {message}")]
    InvalidOutput { message: String },
}

impl From<std::fmt::Error> for SynthesisError {
    fn from(error: std::fmt::Error) -> Self {
        SynthesisError::Render(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
