use super::inotify_property_changed::INOTIFY_PROPERTY_CHANGED;
use super::{is_partial, ValidationOutcome};
use crate::descriptors::{
    DUPLICATE_OBSERVABLE_OBJECT_CHANGED_INTERFACE, DUPLICATE_OBSERVABLE_OBJECT_CHANGING_INTERFACE,
    OBSERVABLE_OBJECT_NOT_PARTIAL,
};
use crate::marker::MarkerUsage;
use stencil_semantics::SemanticModel;

const INOTIFY_PROPERTY_CHANGING: &str = "System.ComponentModel.INotifyPropertyChanging";

pub(super) fn validate(usage: &MarkerUsage, model: &SemanticModel) -> ValidationOutcome {
    if !is_partial(usage, model) {
        return ValidationOutcome::Rejected(&OBSERVABLE_OBJECT_NOT_PARTIAL);
    }
    if model.implements(usage.target, INOTIFY_PROPERTY_CHANGED) {
        return ValidationOutcome::Rejected(&DUPLICATE_OBSERVABLE_OBJECT_CHANGED_INTERFACE);
    }
    if model.implements(usage.target, INOTIFY_PROPERTY_CHANGING) {
        return ValidationOutcome::Rejected(&DUPLICATE_OBSERVABLE_OBJECT_CHANGING_INTERFACE);
    }
    ValidationOutcome::Accepted
}
