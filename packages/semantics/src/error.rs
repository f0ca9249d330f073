use stencil_parser::ParseError;
use thiserror::Error;

pub type SemanticResult<T> = Result<T, SemanticError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
}
