use crate::error::GeneratorResult;
use stencil_semantics::Compilation;

/// Path the reference declarations are registered under
pub const REFERENCE_PATH: &str = "Stencil.Generator.Reference.cs";

const REFERENCE_SOURCE: &str = include_str!("embedded/Reference.cs");

/// Declarations of the marker attributes, their related base classes and the
/// `System.ComponentModel` interfaces, as `(path, source)` pairs
pub fn reference_sources() -> Vec<(&'static str, &'static str)> {
    vec![(REFERENCE_PATH, REFERENCE_SOURCE)]
}

/// Add the reference declarations to `compilation` as reference trees
pub fn add_references(compilation: &mut Compilation) -> GeneratorResult<()> {
    for (path, source) in reference_sources() {
        compilation.add_reference(path, source)?;
    }
    Ok(())
}
