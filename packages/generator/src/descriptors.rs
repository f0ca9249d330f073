//! Diagnostic descriptors of the built-in marker kinds.
//!
//! Identifiers are `STN` + a two-digit marker code + a two-digit check
//! number. `xx98` reports a duplicate usage, `xx99` a synthesis failure.

use crate::diagnostic::{DiagnosticDescriptor, DiagnosticLevel};

// [INotifyPropertyChanged]

pub static INOTIFY_PROPERTY_CHANGED_NOT_PARTIAL: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0101",
    title: "Target type is not partial",
    message_format: "Cannot apply [INotifyPropertyChanged] to type {0}, as it is not declared as partial",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_INOTIFY_PROPERTY_CHANGED_INTERFACE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0102",
    title: "Duplicate INotifyPropertyChanged definition",
    message_format: "Cannot apply [INotifyPropertyChanged] to type {0}, as it already declares the INotifyPropertyChanged interface",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_INOTIFY_PROPERTY_CHANGED_USAGE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0198",
    title: "Duplicate [INotifyPropertyChanged] usage",
    message_format: "Type {0} is annotated with [INotifyPropertyChanged] more than once, only the first usage is processed",
    level: DiagnosticLevel::Warning,
};

pub static INOTIFY_PROPERTY_CHANGED_GENERATION_FAILED: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0199",
    title: "Failed to generate [INotifyPropertyChanged] members",
    message_format: "The generator failed to process [INotifyPropertyChanged] on type {0}",
    level: DiagnosticLevel::Error,
};

// [ObservableObject]

pub static OBSERVABLE_OBJECT_NOT_PARTIAL: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0201",
    title: "Target type is not partial",
    message_format: "Cannot apply [ObservableObject] to type {0}, as it is not declared as partial",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_OBSERVABLE_OBJECT_CHANGED_INTERFACE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0202",
    title: "Duplicate INotifyPropertyChanged definition",
    message_format: "Cannot apply [ObservableObject] to type {0}, as it already declares the INotifyPropertyChanged interface",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_OBSERVABLE_OBJECT_CHANGING_INTERFACE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0203",
    title: "Duplicate INotifyPropertyChanging definition",
    message_format: "Cannot apply [ObservableObject] to type {0}, as it already declares the INotifyPropertyChanging interface",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_OBSERVABLE_OBJECT_USAGE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0298",
    title: "Duplicate [ObservableObject] usage",
    message_format: "Type {0} is annotated with [ObservableObject] more than once, only the first usage is processed",
    level: DiagnosticLevel::Warning,
};

pub static OBSERVABLE_OBJECT_GENERATION_FAILED: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0299",
    title: "Failed to generate [ObservableObject] members",
    message_format: "The generator failed to process [ObservableObject] on type {0}",
    level: DiagnosticLevel::Error,
};

// [ObservableRecipient]

pub static OBSERVABLE_RECIPIENT_NOT_PARTIAL: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0301",
    title: "Target type is not partial",
    message_format: "Cannot apply [ObservableRecipient] to type {0}, as it is not declared as partial",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_OBSERVABLE_RECIPIENT: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0302",
    title: "Duplicate ObservableRecipient definition",
    message_format: "Cannot apply [ObservableRecipient] to type {0}, as it already inherits from the ObservableRecipient class",
    level: DiagnosticLevel::Error,
};

pub static MISSING_OBSERVABLE_FUNCTIONALITY: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0303",
    title: "Missing observable base functionality",
    message_format: "Cannot apply [ObservableRecipient] to type {0}, as it does not inherit from ObservableObject and is not annotated with [ObservableObject] or [INotifyPropertyChanged]",
    level: DiagnosticLevel::Error,
};

pub static DUPLICATE_OBSERVABLE_RECIPIENT_USAGE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0398",
    title: "Duplicate [ObservableRecipient] usage",
    message_format: "Type {0} is annotated with [ObservableRecipient] more than once, only the first usage is processed",
    level: DiagnosticLevel::Warning,
};

pub static OBSERVABLE_RECIPIENT_GENERATION_FAILED: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN0399",
    title: "Failed to generate [ObservableRecipient] members",
    message_format: "The generator failed to process [ObservableRecipient] on type {0}",
    level: DiagnosticLevel::Error,
};

// User-registered markers

pub static DUPLICATE_CUSTOM_MARKER_USAGE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN9098",
    title: "Duplicate marker usage",
    message_format: "Type {0} is annotated with the same marker more than once, only the first usage is processed",
    level: DiagnosticLevel::Warning,
};

pub static CUSTOM_MARKER_GENERATION_FAILED: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "STN9099",
    title: "Failed to generate marker members",
    message_format: "The generator failed to process the marker on type {0}",
    level: DiagnosticLevel::Error,
};
