//! Helpers for the textual type names that appear in base lists, usings and
//! attribute sections.

/// Strip a leading `global::` qualifier
pub fn strip_global(name: &str) -> (bool, &str) {
    match name.strip_prefix("global::") {
        Some(rest) => (true, rest),
        None => (false, name),
    }
}

/// Remove every type argument list from a name and report the arity of the
/// last segment: `A<int>.B<T, U>` becomes `("A.B", 2)`.
pub fn split_generic(name: &str) -> (String, usize) {
    let mut base = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut arity = 0usize;

    for c in name.chars() {
        match c {
            '<' => {
                depth += 1;
                if depth == 1 {
                    arity = 1;
                }
            }
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 1 => arity += 1,
            '.' if depth == 0 => {
                arity = 0;
                base.push(c);
            }
            c if depth == 0 && !c.is_whitespace() => base.push(c),
            _ => {}
        }
    }

    // Nullable annotations never change the referenced type
    let base = base.trim_end_matches('?').to_string();
    (base, arity)
}

/// Join a namespace (possibly empty) and a relative name
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Last segment of a dotted name
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Candidate spellings for an attribute name: `Foo` looks up `FooAttribute`
/// first, then `Foo` itself.
pub fn attribute_candidates(name: &str) -> Vec<String> {
    let (global, rest) = strip_global(name);
    let (base, _) = split_generic(rest);
    let prefix = if global { "global::" } else { "" };

    let mut candidates = Vec::with_capacity(2);
    if !base.ends_with("Attribute") {
        candidates.push(format!("{}{}Attribute", prefix, base));
    }
    candidates.push(format!("{}{}", prefix, base));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_generic() {
        assert_eq!(split_generic("Foo"), ("Foo".to_string(), 0));
        assert_eq!(split_generic("Foo<T>"), ("Foo".to_string(), 1));
        assert_eq!(
            split_generic("System.Collections.Generic.Dictionary<string, List<int>>"),
            ("System.Collections.Generic.Dictionary".to_string(), 2)
        );
        assert_eq!(split_generic("Outer<T>.Inner"), ("Outer.Inner".to_string(), 0));
        assert_eq!(split_generic("IFoo?"), ("IFoo".to_string(), 0));
    }

    #[test]
    fn test_attribute_candidates() {
        assert_eq!(
            attribute_candidates("ObservableObject"),
            vec!["ObservableObjectAttribute", "ObservableObject"]
        );
        assert_eq!(
            attribute_candidates("global::A.FooAttribute"),
            vec!["global::A.FooAttribute"]
        );
    }

    #[test]
    fn test_qualify_and_simple_name() {
        assert_eq!(qualify("", "Foo"), "Foo");
        assert_eq!(qualify("A.B", "Foo"), "A.B.Foo");
        assert_eq!(simple_name("A.B.Foo"), "Foo");
    }
}
