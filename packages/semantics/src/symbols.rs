use crate::compilation::TreeId;
use crate::names::qualify;
use serde::{Deserialize, Serialize};
use stencil_parser::ast::{CompilationUnit, NamespaceMember, TypeDecl, TypeKind, UsingDirective};

/// Index of a type symbol inside its semantic model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub usize);

/// Types, aliases and imports visible from one enclosing namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeLevel {
    /// Full name of the namespace, `""` for the global namespace
    pub namespace: String,
    /// Namespaces imported by the `using` directives of this level
    pub usings: Vec<String>,
    /// `using Alias = Target;` pairs of this level
    pub aliases: Vec<(String, String)>,
}

impl ScopeLevel {
    fn new(namespace: String) -> Self {
        Self {
            namespace,
            ..Self::default()
        }
    }
}

/// Everything needed to resolve a type name written at some point in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupScope {
    /// Full names of the enclosing types, innermost first
    pub containing_types: Vec<String>,
    /// Full name of the enclosing namespace, `""` for the global namespace
    pub namespace: String,
    /// Enclosing namespaces innermost first, ending with the global namespace.
    /// `using` directives belong to the level whose body declares them.
    pub levels: Vec<ScopeLevel>,
}

impl Default for LookupScope {
    fn default() -> Self {
        Self {
            containing_types: Vec::new(),
            namespace: String::new(),
            levels: vec![ScopeLevel::default()],
        }
    }
}

impl LookupScope {
    /// Add `using` directives to the innermost level
    pub fn push_usings(&mut self, usings: &[UsingDirective]) {
        if self.levels.is_empty() {
            self.levels.push(ScopeLevel::new(self.namespace.clone()));
        }
        let level = &mut self.levels[0];
        for using in usings {
            match &using.alias {
                Some(alias) => level.aliases.push((alias.clone(), using.name.clone())),
                None if !using.is_static => level.usings.push(using.name.clone()),
                None => {}
            }
        }
    }

    /// Step into the body of `namespace Name { ... }`.
    ///
    /// A dotted name opens one level per segment; the body's usings attach to
    /// the innermost of them.
    pub fn enter_namespace(&mut self, name: &str, usings: &[UsingDirective]) {
        for segment in name.split('.') {
            self.namespace = qualify(&self.namespace, segment);
            self.levels.insert(0, ScopeLevel::new(self.namespace.clone()));
        }
        self.push_usings(usings);
    }

    /// Imported namespaces of every level, innermost first
    pub fn usings(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .flat_map(|level| level.usings.iter().map(String::as_str))
    }

    /// Scope at the position of the first top-level type declared in `unit`,
    /// used for files that are not part of the compilation (templates).
    pub fn for_first_type(unit: &CompilationUnit) -> Self {
        let mut scope = LookupScope::default();
        scope.push_usings(&unit.usings);

        let mut members = &unit.members;
        loop {
            let Some(NamespaceMember::Namespace(ns)) = members
                .iter()
                .find(|m| !matches!(m, NamespaceMember::Delegate(_)))
            else {
                break;
            };
            scope.enter_namespace(&ns.name, &ns.usings);
            members = &ns.members;
        }

        scope
    }
}

/// One (possibly partial) declaration of a type
#[derive(Debug, Clone)]
pub struct DeclarationSite<'c> {
    pub tree: TreeId,
    pub decl: &'c TypeDecl,
    /// Enclosing type declarations, outermost first
    pub ancestors: Vec<&'c TypeDecl>,
    /// Full name of the enclosing namespace, `""` for the global namespace
    pub namespace: String,
    /// Scope the declaration's attributes and base list are resolved in
    pub scope: LookupScope,
    pub full_name: String,
    /// Site index of the enclosing type declaration
    pub(crate) parent: Option<usize>,
}

/// A named type, merged across all of its partial declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub id: TypeId,
    pub name: String,
    pub arity: usize,
    pub kind: TypeKind,
    pub namespace: String,
    pub containing: Option<TypeId>,
    /// Dotted name without type arguments, e.g. `App.Outer.Inner`
    pub full_name: String,
    pub type_params: Vec<String>,
    /// Resolved base types across all declarations, in declaration order
    pub bases: Vec<TypeId>,
    /// Base list entries that did not resolve to a known type
    pub unresolved_bases: Vec<String>,
    pub(crate) sites: Vec<usize>,
}

impl TypeSymbol {
    /// Full name with type parameters, e.g. `App.Box<T>`
    pub fn display_name(&self) -> String {
        if self.type_params.is_empty() {
            self.full_name.clone()
        } else {
            format!("{}<{}>", self.full_name, self.type_params.join(", "))
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_parser::parse;

    #[test]
    fn test_usings_stay_on_their_level() {
        let outer = parse("using A; using X = A.Thing;").unwrap();
        let inner = parse("using B; using static C.Helpers;").unwrap();

        let mut scope = LookupScope::default();
        scope.push_usings(&outer.usings);
        scope.enter_namespace("App.Models", &inner.usings);

        let namespaces: Vec<_> = scope.levels.iter().map(|l| l.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["App.Models", "App", ""]);
        assert_eq!(scope.namespace, "App.Models");
        assert_eq!(scope.levels[0].usings, vec!["B"]);
        assert!(scope.levels[1].usings.is_empty());
        assert_eq!(scope.levels[2].usings, vec!["A"]);
        assert_eq!(scope.levels[2].aliases, vec![("X".to_string(), "A.Thing".to_string())]);
        assert_eq!(scope.usings().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_scope_for_first_type() {
        let unit = parse(
            r#"
            using System;
            namespace Outer
            {
                using System.ComponentModel;
                namespace Inner
                {
                    public class Template { }
                }
            }
            "#,
        )
        .unwrap();

        let scope = LookupScope::for_first_type(&unit);
        assert_eq!(scope.namespace, "Outer.Inner");
        assert_eq!(scope.levels.len(), 3);
        assert_eq!(scope.levels[1].usings, vec!["System.ComponentModel"]);
        assert_eq!(scope.usings().collect::<Vec<_>>(), vec!["System.ComponentModel", "System"]);
    }

    #[test]
    fn test_scope_for_global_type() {
        let unit = parse("using System; class Template { }").unwrap();
        let scope = LookupScope::for_first_type(&unit);

        assert_eq!(scope.namespace, "");
        assert_eq!(scope.levels.len(), 1);
        assert_eq!(scope.usings().collect::<Vec<_>>(), vec!["System"]);
    }
}
