use crate::compilation::TreeId;
use crate::names::qualify;
use crate::symbols::{DeclarationSite, LookupScope};
use stencil_common::visitor::{walk_compilation_unit, walk_namespace, walk_type_decl, Visitor};
use stencil_parser::ast::{CompilationUnit, NamespaceDecl, TypeDecl};

/// Collects every type declaration of one tree together with the scope it
/// was declared in.
pub(crate) struct DeclarationCollector<'c> {
    tree: TreeId,
    /// Index the first collected site will get in the model
    base_index: usize,
    scope: LookupScope,
    types: Vec<(&'c TypeDecl, String, usize)>,
    pub sites: Vec<DeclarationSite<'c>>,
}

impl<'c> DeclarationCollector<'c> {
    pub fn new(tree: TreeId, base_index: usize) -> Self {
        Self {
            tree,
            base_index,
            scope: LookupScope::default(),
            types: Vec::new(),
            sites: Vec::new(),
        }
    }
}

impl<'c> Visitor<'c> for DeclarationCollector<'c> {
    fn visit_compilation_unit(&mut self, unit: &'c CompilationUnit) {
        self.scope.push_usings(&unit.usings);
        walk_compilation_unit(self, unit);
    }

    fn visit_namespace(&mut self, ns: &'c NamespaceDecl) {
        let saved = self.scope.clone();

        self.scope.enter_namespace(&ns.name, &ns.usings);
        walk_namespace(self, ns);

        self.scope = saved;
    }

    fn visit_type_decl(&mut self, decl: &'c TypeDecl) {
        let (container, parent) = match self.types.last() {
            Some((_, full_name, index)) => (full_name.clone(), Some(*index)),
            None => (self.scope.namespace.clone(), None),
        };
        let full_name = qualify(&container, &decl.name);

        let mut scope = self.scope.clone();
        scope.containing_types = self.types.iter().rev().map(|(_, name, _)| name.clone()).collect();

        let index = self.base_index + self.sites.len();
        self.sites.push(DeclarationSite {
            tree: self.tree,
            decl,
            ancestors: self.types.iter().map(|(decl, _, _)| *decl).collect(),
            namespace: self.scope.namespace.clone(),
            scope,
            full_name: full_name.clone(),
            parent,
        });

        self.types.push((decl, full_name, index));
        walk_type_decl(self, decl);
        self.types.pop();
    }
}
