pub mod compilation;
pub mod error;
pub mod model;
pub mod names;
pub mod symbols;

mod collector;

#[cfg(test)]
mod tests_model;

pub use compilation::{Compilation, LineIndex, SyntaxTree, TreeId};
pub use error::{SemanticError, SemanticResult};
pub use model::SemanticModel;
pub use symbols::{DeclarationSite, LookupScope, ScopeLevel, TypeId, TypeSymbol};
