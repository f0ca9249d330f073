use stencil_parser::ast::*;

/// Visitor pattern for traversing AST nodes immutably
///
/// Default implementations walk the entire tree in source order (depth-first,
/// pre-order). Override specific visit_* methods to act on nodes; call the
/// matching `walk_*` function to keep descending. The `'ast` lifetime lets
/// visitors keep references into the tree they walk.
pub trait Visitor<'ast>: Sized {
    fn visit_compilation_unit(&mut self, unit: &'ast CompilationUnit) {
        walk_compilation_unit(self, unit);
    }

    fn visit_using(&mut self, _using: &'ast UsingDirective) {
        // Leaf node, no children to walk
    }

    fn visit_namespace(&mut self, ns: &'ast NamespaceDecl) {
        walk_namespace(self, ns);
    }

    fn visit_type_decl(&mut self, decl: &'ast TypeDecl) {
        walk_type_decl(self, decl);
    }

    fn visit_attribute_list(&mut self, list: &'ast AttributeList) {
        walk_attribute_list(self, list);
    }

    fn visit_attribute(&mut self, _attribute: &'ast Attribute) {
        // Leaf node, no children to walk
    }

    fn visit_opaque_member(&mut self, member: &'ast OpaqueMember) {
        walk_opaque_member(self, member);
    }
}

/// Mutable visitor pattern for transforming AST nodes
pub trait VisitorMut: Sized {
    fn visit_type_decl_mut(&mut self, decl: &mut TypeDecl) {
        walk_type_decl_mut(self, decl);
    }

    fn visit_member_mut(&mut self, member: &mut Member) {
        walk_member_mut(self, member);
    }

    fn visit_opaque_member_mut(&mut self, _member: &mut OpaqueMember) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations for immutable visitor

pub fn walk_compilation_unit<'ast, V: Visitor<'ast>>(visitor: &mut V, unit: &'ast CompilationUnit) {
    for using in &unit.usings {
        visitor.visit_using(using);
    }
    for list in &unit.attributes {
        visitor.visit_attribute_list(list);
    }
    for member in &unit.members {
        walk_namespace_member(visitor, member);
    }
}

pub fn walk_namespace<'ast, V: Visitor<'ast>>(visitor: &mut V, ns: &'ast NamespaceDecl) {
    for using in &ns.usings {
        visitor.visit_using(using);
    }
    for member in &ns.members {
        walk_namespace_member(visitor, member);
    }
}

pub fn walk_namespace_member<'ast, V: Visitor<'ast>>(visitor: &mut V, member: &'ast NamespaceMember) {
    match member {
        NamespaceMember::Namespace(ns) => visitor.visit_namespace(ns),
        NamespaceMember::Type(decl) => visitor.visit_type_decl(decl),
        NamespaceMember::Delegate(delegate) => visitor.visit_opaque_member(delegate),
    }
}

pub fn walk_type_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &'ast TypeDecl) {
    for list in &decl.attributes {
        visitor.visit_attribute_list(list);
    }
    for member in &decl.members {
        match member {
            Member::Type(nested) => visitor.visit_type_decl(nested),
            Member::Opaque(opaque) => visitor.visit_opaque_member(opaque),
        }
    }
}

pub fn walk_attribute_list<'ast, V: Visitor<'ast>>(visitor: &mut V, list: &'ast AttributeList) {
    for attribute in &list.attributes {
        visitor.visit_attribute(attribute);
    }
}

pub fn walk_opaque_member<'ast, V: Visitor<'ast>>(visitor: &mut V, member: &'ast OpaqueMember) {
    for list in &member.attributes {
        visitor.visit_attribute_list(list);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_type_decl_mut<V: VisitorMut>(visitor: &mut V, decl: &mut TypeDecl) {
    for member in &mut decl.members {
        visitor.visit_member_mut(member);
    }
}

pub fn walk_member_mut<V: VisitorMut>(visitor: &mut V, member: &mut Member) {
    match member {
        Member::Type(nested) => visitor.visit_type_decl_mut(nested),
        Member::Opaque(opaque) => visitor.visit_opaque_member_mut(opaque),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_parser::parse;

    #[derive(Default)]
    struct Collector<'ast> {
        types: Vec<&'ast str>,
        attributes: Vec<String>,
        usings: usize,
    }

    impl<'ast> Visitor<'ast> for Collector<'ast> {
        fn visit_using(&mut self, _using: &'ast UsingDirective) {
            self.usings += 1;
        }

        fn visit_type_decl(&mut self, decl: &'ast TypeDecl) {
            self.types.push(&decl.name);
            walk_type_decl(self, decl);
        }

        fn visit_attribute(&mut self, attribute: &'ast Attribute) {
            self.attributes.push(attribute.name.clone());
        }
    }

    #[test]
    fn test_visitor_walks_in_source_order() {
        let source = r#"
            using System;
            namespace A
            {
                using B;

                [X] class One { [Y] class Two { } [Z] int field; }
                class Three { }
            }
        "#;
        let unit = parse(source).unwrap();

        let mut collector = Collector::default();
        collector.visit_compilation_unit(&unit);

        assert_eq!(collector.types, vec!["One", "Two", "Three"]);
        assert_eq!(collector.attributes, vec!["X", "Y", "Z"]);
        assert_eq!(collector.usings, 2);
    }

    struct Renamer;

    impl VisitorMut for Renamer {
        fn visit_opaque_member_mut(&mut self, member: &mut OpaqueMember) {
            member.name = member.name.as_ref().map(|n| n.to_uppercase());
        }
    }

    #[test]
    fn test_visitor_mut_reaches_nested_members() {
        let mut unit = parse("class A { int a; class B { int b; } }").unwrap();
        let NamespaceMember::Type(decl) = &mut unit.members[0] else {
            panic!("expected type");
        };

        Renamer.visit_type_decl_mut(decl);

        let names: Vec<_> = unit
            .type_declarations()
            .iter()
            .flat_map(|d| d.members.iter().filter_map(|m| match m {
                Member::Opaque(o) => o.name.clone(),
                Member::Type(_) => None,
            }))
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
