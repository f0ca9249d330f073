use crate::error::{SemanticError, SemanticResult};
use crate::model::SemanticModel;
use serde::{Deserialize, Serialize};
use stencil_parser::{parse_with_path, CompilationUnit};

/// Index of a syntax tree inside its compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(pub usize);

/// Byte offsets of line starts, for 1-based line/column lookup
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based (line, column) of a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

/// One parsed source file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub id: TreeId,
    pub path: String,
    pub source: String,
    pub unit: CompilationUnit,
    /// Reference trees are resolved against but never scanned for markers
    pub is_reference: bool,
    line_index: LineIndex,
}

impl SyntaxTree {
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        self.line_index.line_col(offset)
    }
}

/// An immutable snapshot of parsed trees
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    trees: Vec<SyntaxTree>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and add a user source file
    pub fn add_source(&mut self, path: impl Into<String>, source: impl Into<String>) -> SemanticResult<TreeId> {
        self.add_tree(path.into(), source.into(), false)
    }

    /// Parse and add a tree that only contributes declarations
    pub fn add_reference(&mut self, path: impl Into<String>, source: impl Into<String>) -> SemanticResult<TreeId> {
        self.add_tree(path.into(), source.into(), true)
    }

    fn add_tree(&mut self, path: String, source: String, is_reference: bool) -> SemanticResult<TreeId> {
        let unit = parse_with_path(&source, &path).map_err(|error| SemanticError::Parse {
            path: path.clone(),
            source: error,
        })?;

        let id = TreeId(self.trees.len());
        let line_index = LineIndex::new(&source);
        self.trees.push(SyntaxTree {
            id,
            path,
            source,
            unit,
            is_reference,
            line_index,
        });
        Ok(id)
    }

    /// All trees in insertion order
    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    /// Trees that may contain marker usages, in insertion order
    pub fn source_trees(&self) -> impl Iterator<Item = &SyntaxTree> {
        self.trees.iter().filter(|tree| !tree.is_reference)
    }

    pub fn tree(&self, id: TreeId) -> &SyntaxTree {
        &self.trees[id.0]
    }

    /// Build the symbol table for this snapshot
    pub fn semantic_model(&self) -> SemanticModel<'_> {
        SemanticModel::build(self)
    }
}
