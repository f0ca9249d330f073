use super::{is_partial, ValidationOutcome};
use crate::descriptors::{
    DUPLICATE_OBSERVABLE_RECIPIENT, MISSING_OBSERVABLE_FUNCTIONALITY, OBSERVABLE_RECIPIENT_NOT_PARTIAL,
};
use crate::marker::{MarkerKind, MarkerUsage, COMPONENT_MODEL_NAMESPACE};
use crate::template::TemplateDefinition;
use std::collections::HashSet;
use stencil_common::visitor::VisitorMut;
use stencil_parser::ast::{Member, OpaqueMember};
use stencil_semantics::SemanticModel;

fn component_model_type(name: &str) -> String {
    format!("{}.{}", COMPONENT_MODEL_NAMESPACE, name)
}

pub(super) fn validate(usage: &MarkerUsage, model: &SemanticModel) -> ValidationOutcome {
    if !is_partial(usage, model) {
        return ValidationOutcome::Rejected(&OBSERVABLE_RECIPIENT_NOT_PARTIAL);
    }
    if model.inherits_from(usage.target, &component_model_type("ObservableRecipient")) {
        return ValidationOutcome::Rejected(&DUPLICATE_OBSERVABLE_RECIPIENT);
    }
    if !has_observable_functionality(usage, model) {
        return ValidationOutcome::Rejected(&MISSING_OBSERVABLE_FUNCTIONALITY);
    }
    ValidationOutcome::Accepted
}

/// The generated recipient members call into property change notification,
/// which must come from the `ObservableObject` base or a sibling marker
fn has_observable_functionality(usage: &MarkerUsage, model: &SemanticModel) -> bool {
    if model.inherits_from(usage.target, &component_model_type("ObservableObject")) {
        return true;
    }

    [MarkerKind::observable_object(), MarkerKind::inotify_property_changed()]
        .iter()
        .any(|kind| model.has_attribute_in_hierarchy(usage.target, &kind.full_name()))
}

pub(super) fn select_members(
    template: &TemplateDefinition,
    usage: &MarkerUsage,
    model: &SemanticModel,
) -> Vec<Member> {
    let declared: HashSet<&str> = model
        .declarations(usage.target)
        .flat_map(|site| site.decl.member_names())
        .collect();

    let template_name = template.declaration.name.as_str();
    let keep_constructors = !declares_constructor(usage, model);
    let mut renamer = ConstructorRenamer {
        template_name,
        target_name: &usage.target_name,
    };

    template
        .members
        .iter()
        .filter(|member| keep_constructors || !is_instance_constructor(member, template_name))
        .filter(|member| !member.name().is_some_and(|name| declared.contains(name)))
        .cloned()
        .map(|mut member| {
            renamer.visit_member_mut(&mut member);
            member
        })
        .collect()
}

/// Whether any declaration of the target already has an instance constructor,
/// in which case the template constructors are not merged
fn declares_constructor(usage: &MarkerUsage, model: &SemanticModel) -> bool {
    model
        .declarations(usage.target)
        .flat_map(|site| &site.decl.members)
        .any(|member| is_instance_constructor(member, &usage.target_name))
}

fn is_instance_constructor(member: &Member, type_name: &str) -> bool {
    let Member::Opaque(member) = member else {
        return false;
    };
    member.is_constructor_of(type_name)
        && !member
            .tokens
            .iter()
            .take_while(|token| token.text != "(")
            .any(|token| token.text == "static")
}

/// Renames constructors of the template type to the target type
struct ConstructorRenamer<'a> {
    template_name: &'a str,
    target_name: &'a str,
}

impl VisitorMut for ConstructorRenamer<'_> {
    fn visit_opaque_member_mut(&mut self, member: &mut OpaqueMember) {
        if !member.is_constructor_of(self.template_name) {
            return;
        }

        if let Some(token) = member
            .tokens
            .iter_mut()
            .find(|token| token.text == self.template_name)
        {
            token.text = self.target_name.to_string();
        }
        member.name = Some(self.target_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::MarkerHandler;
    use crate::reference::add_references;
    use crate::scanner::scan;
    use crate::template::{EmbeddedTemplates, MemoryTemplates, TemplateDefinition};
    use stencil_semantics::Compilation;

    fn compile(source: &str) -> Compilation {
        let mut compilation = Compilation::new();
        add_references(&mut compilation).unwrap();
        compilation.add_source("Test.cs", source).unwrap();
        compilation
    }

    fn outcome(source: &str) -> ValidationOutcome {
        let compilation = compile(source);
        let model = compilation.semantic_model();
        let usages = scan(&model, &MarkerKind::observable_recipient());
        assert_eq!(usages.len(), 1);
        validate(&usages[0], &model)
    }

    #[test]
    fn test_accepts_observable_object_subclass() {
        assert_eq!(
            outcome("using Stencil.ComponentModel; [ObservableRecipient] partial class Vm : ObservableObject { }"),
            ValidationOutcome::Accepted
        );
        assert_eq!(
            outcome("using Stencil.ComponentModel; [ObservableRecipient] partial class Vm : ObservableValidator { }"),
            ValidationOutcome::Accepted
        );
    }

    #[test]
    fn test_accepts_sibling_marker_on_target_or_base() {
        assert_eq!(
            outcome("using Stencil.ComponentModel; [ObservableObject] [ObservableRecipient] partial class Vm { }"),
            ValidationOutcome::Accepted
        );
        assert_eq!(
            outcome(
                r#"
                using Stencil.ComponentModel;
                [INotifyPropertyChanged] partial class Base { }
                [ObservableRecipient] partial class Vm : Base { }
                "#
            ),
            ValidationOutcome::Accepted
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            outcome("using Stencil.ComponentModel; [ObservableRecipient] class Vm : ObservableObject { }"),
            ValidationOutcome::Rejected(&OBSERVABLE_RECIPIENT_NOT_PARTIAL)
        );
        assert_eq!(
            outcome("using Stencil.ComponentModel; [ObservableRecipient] partial class Vm : ObservableRecipient { }"),
            ValidationOutcome::Rejected(&DUPLICATE_OBSERVABLE_RECIPIENT)
        );
        assert_eq!(
            outcome("using Stencil.ComponentModel; [ObservableRecipient] partial class Vm { }"),
            ValidationOutcome::Rejected(&MISSING_OBSERVABLE_FUNCTIONALITY)
        );
    }

    #[test]
    fn test_declared_members_are_dropped_and_constructors_renamed() {
        let compilation = compile(
            r#"
            using Stencil.ComponentModel;
            [ObservableRecipient]
            partial class Vm : ObservableObject
            {
                protected virtual void OnActivated() { }
            }
            "#,
        );
        let model = compilation.semantic_model();
        let kind = MarkerKind::observable_recipient();
        let template = TemplateDefinition::load(&kind, &EmbeddedTemplates, &model).unwrap();
        let usages = scan(&model, &kind);

        let members = MarkerHandler::ObservableRecipient.select_members(&template, &usages[0], &model);
        let names: Vec<_> = members.iter().filter_map(|m| m.name()).collect();

        assert!(!names.contains(&"OnActivated"));
        assert!(names.contains(&"OnDeactivated"));
        assert!(names.contains(&"Vm"));
        assert!(!names.contains(&"ObservableRecipient"));
        assert_eq!(members.len(), template.members.len() - 1);
    }

    #[test]
    fn test_template_constructors_dropped_when_target_has_one() {
        let compilation = compile(
            r#"
            using Stencil.ComponentModel;
            [ObservableRecipient]
            public partial class Shell : ObservableObject
            {
                public Shell() { }
            }
            "#,
        );
        let model = compilation.semantic_model();
        let kind = MarkerKind::observable_recipient();
        let template = TemplateDefinition::load(&kind, &EmbeddedTemplates, &model).unwrap();
        let usages = scan(&model, &kind);

        let members = select_members(&template, &usages[0], &model);
        let names: Vec<_> = members.iter().filter_map(|m| m.name()).collect();

        assert!(!names.contains(&"Shell"));
        assert!(!names.contains(&"ObservableRecipient"));
        assert!(names.contains(&"OnActivated"));
    }

    #[test]
    fn test_static_constructor_keeps_template_constructors() {
        let compilation = compile(
            r#"
            using Stencil.ComponentModel;
            [ObservableRecipient]
            public partial class Shell : ObservableObject
            {
                static Shell() { }
            }
            "#,
        );
        let model = compilation.semantic_model();
        let kind = MarkerKind::observable_recipient();
        let template = TemplateDefinition::load(&kind, &EmbeddedTemplates, &model).unwrap();
        let usages = scan(&model, &kind);

        let declared = model.declarations(usages[0].target).next().unwrap();
        assert!(!is_instance_constructor(&declared.decl.members[0], "Shell"));
        assert!(!declares_constructor(&usages[0], &model));
        let members = select_members(&template, &usages[0], &model);
        assert!(members.iter().any(|m| is_instance_constructor(m, "Shell")));
    }

    #[test]
    fn test_renamer_only_touches_constructors() {
        let compilation = compile(
            r#"
            namespace Lib { public sealed class RecipientAttribute : System.Attribute { } }
            [Lib.Recipient] partial class Target { }
            "#,
        );
        let model = compilation.semantic_model();
        let kind = MarkerKind::new("Lib", "RecipientAttribute");
        let source = MemoryTemplates::new().with_template(
            &kind,
            "class Recipient { public Recipient() { } public Recipient Self() => this; }",
        );
        let template = TemplateDefinition::load(&kind, &source, &model).unwrap();
        let usages = scan(&model, &kind);

        let members = select_members(&template, &usages[0], &model);
        let names: Vec<_> = members.iter().filter_map(|m| m.name()).collect();
        assert_eq!(names, vec!["Target", "Self"]);
    }
}
