use crate::diagnostic::Location;
use crate::marker::{MarkerKind, MarkerUsage, UsageArgument};
use stencil_common::visitor::{walk_compilation_unit, walk_type_decl, Visitor};
use stencil_parser::ast::{Attribute, OpaqueMember, TypeDecl};
use stencil_semantics::{LookupScope, SemanticModel, SyntaxTree};
use tracing::trace;

/// Find every usage of `kind` in the source trees of the model's compilation.
///
/// Usages come out in tree insertion order, then in pre-order over type
/// declarations, then in attribute order.
pub fn scan<'c>(model: &SemanticModel<'c>, kind: &MarkerKind) -> Vec<MarkerUsage<'c>> {
    let mut scanner = MarkerScanner::new(model, kind);
    for tree in model.compilation().source_trees() {
        scanner.scan_tree(tree);
    }
    scanner.usages
}

/// Visitor collecting the usages of one marker kind
pub struct MarkerScanner<'m, 'c> {
    model: &'m SemanticModel<'c>,
    kind: &'m MarkerKind,
    full_name: String,
    tree: Option<&'c SyntaxTree>,
    usages: Vec<MarkerUsage<'c>>,
}

impl<'m, 'c> MarkerScanner<'m, 'c> {
    pub fn new(model: &'m SemanticModel<'c>, kind: &'m MarkerKind) -> Self {
        Self {
            model,
            kind,
            full_name: kind.full_name(),
            tree: None,
            usages: Vec::new(),
        }
    }

    pub fn scan_tree(&mut self, tree: &'c SyntaxTree) {
        self.tree = Some(tree);
        walk_compilation_unit(self, &tree.unit);
        self.tree = None;
    }

    pub fn into_usages(self) -> Vec<MarkerUsage<'c>> {
        self.usages
    }

    fn is_marker(&self, scope: &LookupScope, attribute: &Attribute) -> bool {
        self.model
            .resolve_attribute(scope, &attribute.name)
            .is_some_and(|id| self.model.symbol(id).full_name == self.full_name)
    }

    fn location(&self, attribute: &Attribute) -> Location {
        let (path, (line, column)) = match self.tree {
            Some(tree) => (tree.path.clone(), tree.line_col(attribute.span.start)),
            None => (String::new(), (0, 0)),
        };
        Location {
            path,
            span: attribute.span.clone(),
            line,
            column,
        }
    }
}

impl<'m, 'c> Visitor<'c> for MarkerScanner<'m, 'c> {
    fn visit_type_decl(&mut self, decl: &'c TypeDecl) {
        let model = self.model;
        let tree = self.tree.map(|tree| tree.id);
        let site = tree.and_then(|id| model.declaration(id, &decl.span.id));
        let target = tree.and_then(|id| model.declared_symbol(id, &decl.span.id));

        let (Some(site), Some(target)) = (site, target) else {
            debug_assert!(false, "type declaration {} is not in the semantic model", decl.name);
            return;
        };

        let markers: Vec<&'c Attribute> = decl
            .attributes
            .iter()
            .filter(|list| list.target.as_deref().map_or(true, |t| t == "type"))
            .flat_map(|list| &list.attributes)
            .filter(|attribute| self.is_marker(&site.scope, attribute))
            .collect();

        for attribute in markers {
            trace!(marker = %self.kind, ty = %site.full_name, "found marker usage");

            let usage = MarkerUsage {
                kind: self.kind.clone(),
                target,
                target_name: decl.name.clone(),
                target_display: model.symbol(target).display_name(),
                declaration: decl,
                ancestors: site.ancestors.clone(),
                namespace: site.namespace.clone(),
                location: self.location(attribute),
                arguments: attribute
                    .arguments
                    .iter()
                    .map(|argument| UsageArgument {
                        name: argument.name.clone(),
                        value: argument.value_text(),
                    })
                    .collect(),
            };
            self.usages.push(usage);
        }

        walk_type_decl(self, decl);
    }

    fn visit_opaque_member(&mut self, _member: &'c OpaqueMember) {}
}
