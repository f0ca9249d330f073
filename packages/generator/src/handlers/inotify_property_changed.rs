use super::{is_partial, ValidationOutcome};
use crate::descriptors::{DUPLICATE_INOTIFY_PROPERTY_CHANGED_INTERFACE, INOTIFY_PROPERTY_CHANGED_NOT_PARTIAL};
use crate::marker::MarkerUsage;
use crate::template::TemplateDefinition;
use stencil_parser::ast::Member;
use stencil_semantics::SemanticModel;

pub(crate) const INOTIFY_PROPERTY_CHANGED: &str = "System.ComponentModel.INotifyPropertyChanged";

/// Members kept when helper methods are turned off
const CORE_MEMBERS: &[&str] = &["PropertyChanged", "OnPropertyChanged"];

pub(super) fn validate(usage: &MarkerUsage, model: &SemanticModel) -> ValidationOutcome {
    if !is_partial(usage, model) {
        return ValidationOutcome::Rejected(&INOTIFY_PROPERTY_CHANGED_NOT_PARTIAL);
    }
    if model.implements(usage.target, INOTIFY_PROPERTY_CHANGED) {
        return ValidationOutcome::Rejected(&DUPLICATE_INOTIFY_PROPERTY_CHANGED_INTERFACE);
    }
    ValidationOutcome::Accepted
}

pub(super) fn select_members(template: &TemplateDefinition, usage: &MarkerUsage) -> Vec<Member> {
    if usage.named_bool("IncludeAdditionalHelperMethods") != Some(false) {
        return template.members.clone();
    }

    template
        .members
        .iter()
        .filter(|member| member.name().is_some_and(|name| CORE_MEMBERS.contains(&name)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::MarkerHandler;
    use crate::marker::MarkerKind;
    use crate::reference::add_references;
    use crate::scanner::scan;
    use crate::template::{EmbeddedTemplates, TemplateDefinition};
    use stencil_semantics::Compilation;

    fn compile(source: &str) -> Compilation {
        let mut compilation = Compilation::new();
        add_references(&mut compilation).unwrap();
        compilation.add_source("Test.cs", source).unwrap();
        compilation
    }

    fn outcomes(source: &str) -> Vec<ValidationOutcome> {
        let compilation = compile(source);
        let model = compilation.semantic_model();
        scan(&model, &MarkerKind::inotify_property_changed())
            .iter()
            .map(|usage| validate(usage, &model))
            .collect()
    }

    #[test]
    fn test_accepts_partial_class() {
        let outcomes = outcomes(
            r#"
            using Stencil.ComponentModel;
            namespace App { [INotifyPropertyChanged] public partial class Model { } }
            "#,
        );
        assert_eq!(outcomes, vec![ValidationOutcome::Accepted]);
    }

    #[test]
    fn test_rejects_non_partial_class() {
        let outcomes = outcomes(
            r#"
            using Stencil.ComponentModel;
            [INotifyPropertyChanged] public class Model { }
            "#,
        );
        assert_eq!(
            outcomes,
            vec![ValidationOutcome::Rejected(&INOTIFY_PROPERTY_CHANGED_NOT_PARTIAL)]
        );
    }

    #[test]
    fn test_rejects_inherited_interface() {
        let outcomes = outcomes(
            r#"
            using System.ComponentModel;
            using Stencil.ComponentModel;
            public class Base : INotifyPropertyChanged { }
            [INotifyPropertyChanged] public partial class Model : Base { }
            "#,
        );
        assert_eq!(
            outcomes,
            vec![ValidationOutcome::Rejected(&DUPLICATE_INOTIFY_PROPERTY_CHANGED_INTERFACE)]
        );
    }

    #[test]
    fn test_helper_methods_can_be_excluded() {
        let compilation = compile(
            r#"
            using Stencil.ComponentModel;
            [INotifyPropertyChanged(IncludeAdditionalHelperMethods = false)] partial class Lean { }
            [INotifyPropertyChanged] partial class Full { }
            "#,
        );
        let model = compilation.semantic_model();
        let kind = MarkerKind::inotify_property_changed();
        let template = TemplateDefinition::load(&kind, &EmbeddedTemplates, &model).unwrap();
        let usages = scan(&model, &kind);

        let lean = MarkerHandler::INotifyPropertyChanged.select_members(&template, &usages[0], &model);
        let full = MarkerHandler::INotifyPropertyChanged.select_members(&template, &usages[1], &model);

        assert!(lean
            .iter()
            .all(|m| matches!(m.name(), Some("PropertyChanged" | "OnPropertyChanged"))));
        assert!(lean.iter().any(|m| m.name() == Some("PropertyChanged")));
        assert!(lean.len() < full.len());
        assert_eq!(full.len(), template.members.len());
    }
}
