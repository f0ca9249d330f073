pub mod ast;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{CompilationUnit, Member, NamespaceMember, OpaqueMember, Span, TypeDecl, TypeKind};
pub use error::{ParseError, ParseResult};
pub use id_generator::{get_document_id, IDGenerator};
pub use parser::{parse, parse_with_path, Parser};
pub use serializer::{serialize, Serializer};
pub use tokenizer::{tokenize, try_tokenize, Token};
