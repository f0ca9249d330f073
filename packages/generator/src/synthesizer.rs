use crate::error::SynthesisError;
use crate::marker::MarkerUsage;
use crate::template::TemplateDefinition;
use std::fmt::Write;
use stencil_parser::ast::{
    BaseType, CompilationUnit, Member, NamespaceDecl, NamespaceMember, OpaqueMember, Span, TypeDecl,
    UsingDirective,
};
use stencil_parser::{parse_with_path, serialize};
use tracing::trace;

/// Prepended to every generated source text
pub const HEADER: &str = "\
// <auto-generated>
//     This code was generated by the Stencil declaration generator.
//     Licensed under the MIT license. See the LICENSE file in the project root for more information.
// </auto-generated>
#pragma warning disable
";

/// Build the source text of the partial declaration that merges `members`
/// and the template's interfaces into the usage target.
pub fn synthesize(
    usage: &MarkerUsage,
    template: &TemplateDefinition,
    members: Vec<Member>,
) -> Result<String, SynthesisError> {
    let target = usage.declaration;
    if !target.kind.accepts_members() {
        return Err(SynthesisError::UnsupportedTargetKind {
            target: usage.target_display.clone(),
            kind: target.kind.keyword(),
        });
    }

    for member in &members {
        check_balanced(member)?;
    }

    let mut decl = TypeDecl::new(target.kind, target.name.clone());
    decl.modifiers = target.modifiers.clone();
    decl.type_params = target.type_params.clone();
    decl.members = members;
    decl.base_list = template
        .interfaces()
        .map(|base| BaseType {
            name: base.name.clone(),
            arguments: None,
            span: Span::synthetic(),
        })
        .collect();

    for ancestor in usage.ancestors.iter().rev() {
        let mut shell = TypeDecl::new(ancestor.kind, ancestor.name.clone());
        shell.modifiers = ancestor.modifiers.clone();
        shell.type_params = ancestor.type_params.clone();
        shell.members = vec![Member::Type(decl)];
        decl = shell;
    }

    let mut unit = CompilationUnit::new();
    unit.usings = dedup_usings(&template.usings);
    unit.members = if usage.namespace.is_empty() {
        vec![NamespaceMember::Type(decl)]
    } else {
        vec![NamespaceMember::Namespace(NamespaceDecl {
            name: usage.namespace.clone(),
            file_scoped: false,
            usings: Vec::new(),
            members: vec![NamespaceMember::Type(decl)],
            span: Span::synthetic(),
        })]
    };

    let mut text = String::new();
    text.push_str(HEADER);
    write!(text, "{}", serialize(&unit))?;

    verify(&text, usage)?;
    trace!(ty = %usage.target_display, bytes = text.len(), "synthesized declaration");

    Ok(text)
}

/// The output must parse again and still declare the target
fn verify(text: &str, usage: &MarkerUsage) -> Result<(), SynthesisError> {
    let unit = parse_with_path(text, &usage.target_display).map_err(|error| {
        SynthesisError::InvalidOutput {
            message: error.to_string(),
        }
    })?;

    if unit
        .type_declarations()
        .iter()
        .any(|decl| decl.name == usage.target_name)
    {
        Ok(())
    } else {
        Err(SynthesisError::InvalidOutput {
            message: format!("'{}' is missing from the output", usage.target_name),
        })
    }
}

fn dedup_usings(usings: &[UsingDirective]) -> Vec<UsingDirective> {
    let mut out: Vec<UsingDirective> = Vec::new();
    for using in usings {
        let seen = out.iter().any(|existing| {
            existing.name == using.name
                && existing.alias == using.alias
                && existing.is_static == using.is_static
        });
        if !seen {
            out.push(using.clone());
        }
    }
    out
}

fn check_balanced(member: &Member) -> Result<(), SynthesisError> {
    match member {
        Member::Type(decl) => decl.members.iter().try_for_each(check_balanced),
        Member::Opaque(opaque) => check_balanced_tokens(opaque),
    }
}

fn check_balanced_tokens(member: &OpaqueMember) -> Result<(), SynthesisError> {
    let mut stack = Vec::new();
    for token in &member.tokens {
        match token.text.as_str() {
            "(" => stack.push(")"),
            "[" => stack.push("]"),
            "{" => stack.push("}"),
            close @ (")" | "]" | "}") => {
                if stack.pop() != Some(close) {
                    return Err(unbalanced(member));
                }
            }
            _ => {}
        }
    }

    if stack.is_empty() {
        Ok(())
    } else {
        Err(unbalanced(member))
    }
}

fn unbalanced(member: &OpaqueMember) -> SynthesisError {
    SynthesisError::UnbalancedMember {
        member: member.name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerKind;
    use crate::scanner::scan;
    use crate::template::{MemoryTemplates, TemplateDefinition};
    use stencil_parser::ast::{RawToken, TypeKind};
    use stencil_parser::parse;
    use stencil_semantics::Compilation;

    const LIB: &str = r#"
        namespace Lib
        {
            public interface IFoo { }
            public class FooBase { }
            public sealed class FooAttribute : System.Attribute { }
        }
    "#;

    fn foo() -> MarkerKind {
        MarkerKind::new("Lib", "FooAttribute")
    }

    fn template_source() -> MemoryTemplates {
        MemoryTemplates::new().with_template(
            &foo(),
            r#"
            using System;
            namespace Lib
            {
                using System;
                public class Foo : FooBase, IFoo
                {
                    public void A() { }
                    public void B() { }
                }
            }
            "#,
        )
    }

    fn run(source: &str) -> Result<String, SynthesisError> {
        let mut compilation = Compilation::new();
        compilation.add_reference("Lib.cs", LIB).unwrap();
        compilation.add_source("App.cs", source).unwrap();
        let model = compilation.semantic_model();

        let template = TemplateDefinition::load(&foo(), &template_source(), &model).unwrap();
        let usages = scan(&model, &foo());
        synthesize(&usages[0], &template, template.members.clone())
    }

    #[test]
    fn test_nesting_keeps_only_ancestor_headers() {
        let text = run(
            r#"
            namespace App
            {
                /// <summary>Outer</summary>
                [Serializable]
                public partial class X<T> : System.IDisposable where T : class
                {
                    internal partial struct Y
                    {
                        partial class Z
                        {
                            [Lib.Foo] private partial class Target { }
                        }
                    }
                }
            }
            "#,
        )
        .unwrap();

        assert!(text.starts_with(HEADER));

        let unit = parse(&text).unwrap();
        let NamespaceMember::Namespace(ns) = &unit.members[0] else {
            panic!("expected a namespace");
        };
        assert_eq!(ns.name, "App");

        let NamespaceMember::Type(x) = &ns.members[0] else {
            panic!("expected a type");
        };
        assert_eq!(x.name, "X");
        assert_eq!(x.type_params, vec!["T"]);
        assert_eq!(x.modifiers, vec!["public", "partial"]);
        assert!(x.base_list.is_empty());
        assert!(x.constraints.is_empty());
        assert!(x.attributes.is_empty());
        assert!(x.docs.is_empty());

        let Member::Type(y) = &x.members[0] else {
            panic!("expected Y");
        };
        assert_eq!(y.kind, TypeKind::Struct);
        let Member::Type(z) = &y.members[0] else {
            panic!("expected Z");
        };
        let Member::Type(target) = &z.members[0] else {
            panic!("expected Target");
        };

        assert_eq!(target.name, "Target");
        assert_eq!(target.modifiers, vec!["private", "partial"]);
        assert_eq!(
            target.base_list.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            vec!["global::Lib.IFoo"]
        );
        assert_eq!(
            target.member_names().collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn test_global_namespace_has_no_wrapper_and_usings_are_unique() {
        let text = run("[Lib.Foo] partial class Target<TItem> { }").unwrap();
        let unit = parse(&text).unwrap();

        assert_eq!(unit.usings.len(), 1);
        let NamespaceMember::Type(target) = &unit.members[0] else {
            panic!("expected a type at the top level");
        };
        assert_eq!(target.type_params, vec!["TItem"]);
    }

    #[test]
    fn test_interfaces_and_enums_are_rejected() {
        let error = run("[Lib.Foo] partial interface ITarget { }").unwrap_err();
        assert_eq!(
            error,
            SynthesisError::UnsupportedTargetKind {
                target: "ITarget".to_string(),
                kind: "interface"
            }
        );
    }

    #[test]
    fn test_unbalanced_member_is_reported() {
        let mut compilation = Compilation::new();
        compilation.add_reference("Lib.cs", LIB).unwrap();
        compilation
            .add_source("App.cs", "[Lib.Foo] partial class Target { }")
            .unwrap();
        let model = compilation.semantic_model();
        let template = TemplateDefinition::load(&foo(), &template_source(), &model).unwrap();
        let usages = scan(&model, &foo());

        let broken = OpaqueMember::from_tokens(vec![
            RawToken::new("void", false),
            RawToken::new("F", true),
            RawToken::new("(", false),
            RawToken::new("{", true),
            RawToken::new(")", true),
        ]);
        let error = synthesize(&usages[0], &template, vec![Member::Opaque(broken)]).unwrap_err();

        assert_eq!(
            error,
            SynthesisError::UnbalancedMember {
                member: "F".to_string()
            }
        );
    }
}
