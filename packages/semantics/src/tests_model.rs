use crate::*;

fn compile(sources: &[(&str, &str)]) -> Compilation {
    let mut compilation = Compilation::new();
    for (path, source) in sources {
        compilation.add_source(*path, *source).unwrap();
    }
    compilation
}

const COMPONENT_MODEL: &str = r#"
namespace System.ComponentModel
{
    public interface INotifyPropertyChanged { }
    public interface INotifyPropertyChanging { }
}

namespace Stencil.ComponentModel
{
    using System.ComponentModel;

    public sealed class ObservableObjectAttribute : System.Attribute { }
    public abstract class ObservableObject : INotifyPropertyChanged, INotifyPropertyChanging { }
}
"#;

#[test]
fn test_partial_declarations_merge() {
    let compilation = compile(&[
        ("A.cs", "namespace App { public partial class Foo : IOne { } }"),
        ("B.cs", "namespace App { partial class Foo : ITwo { } interface IOne { } interface ITwo { } }"),
    ]);
    let model = compilation.semantic_model();

    let foo = model.type_by_name("App.Foo", 0).unwrap();
    assert_eq!(model.declarations(foo).count(), 2);

    let bases: Vec<_> = model
        .symbol(foo)
        .bases
        .iter()
        .map(|b| model.symbol(*b).name.clone())
        .collect();
    assert_eq!(bases, vec!["IOne", "ITwo"]);
}

#[test]
fn test_generic_arity_distinguishes_types() {
    let compilation = compile(&[(
        "A.cs",
        "namespace App { class Box { } class Box<T> { } class Uses : Box<int> { } }",
    )]);
    let model = compilation.semantic_model();

    let plain = model.type_by_name("App.Box", 0).unwrap();
    let generic = model.type_by_name("App.Box", 1).unwrap();
    assert_ne!(plain, generic);

    let uses = model.type_by_name("App.Uses", 0).unwrap();
    assert_eq!(model.symbol(uses).bases, vec![generic]);
    assert_eq!(model.symbol(generic).display_name(), "App.Box<T>");
}

#[test]
fn test_nested_types_and_containing_lookup() {
    let compilation = compile(&[(
        "A.cs",
        r#"
        namespace App
        {
            class Outer
            {
                class Marker { }
                class Inner : Marker { }
            }
        }
        "#,
    )]);
    let model = compilation.semantic_model();

    let outer = model.type_by_name("App.Outer", 0).unwrap();
    let inner = model.type_by_name("App.Outer.Inner", 0).unwrap();
    let marker = model.type_by_name("App.Outer.Marker", 0).unwrap();

    assert_eq!(model.symbol(inner).containing, Some(outer));
    assert_eq!(model.symbol(inner).bases, vec![marker]);
}

#[test]
fn test_resolution_through_usings_aliases_and_global() {
    let compilation = compile(&[
        ("Lib.cs", "namespace Lib.Models { public class Item { } }"),
        (
            "App.cs",
            r#"
            using Lib.Models;
            using M = Lib.Models;
            using I = Lib.Models.Item;

            namespace App
            {
                class A : Item { }
                class B : M.Item { }
                class C : I { }
                class D : global::Lib.Models.Item { }
                class E : Missing { }
            }
            "#,
        ),
    ]);
    let model = compilation.semantic_model();
    let item = model.type_by_name("Lib.Models.Item", 0).unwrap();

    for name in ["App.A", "App.B", "App.C", "App.D"] {
        let id = model.type_by_name(name, 0).unwrap();
        assert_eq!(model.symbol(id).bases, vec![item], "{}", name);
    }

    let e = model.type_by_name("App.E", 0).unwrap();
    assert!(model.symbol(e).bases.is_empty());
    assert_eq!(model.symbol(e).unresolved_bases, vec!["Missing"]);
}

#[test]
fn test_inner_namespace_shadows_outer() {
    let compilation = compile(&[(
        "A.cs",
        r#"
        namespace Outer
        {
            class Thing { }
            namespace Inner
            {
                class Thing { }
                class User : Thing { }
            }
        }
        "#,
    )]);
    let model = compilation.semantic_model();

    let user = model.type_by_name("Outer.Inner.User", 0).unwrap();
    let inner_thing = model.type_by_name("Outer.Inner.Thing", 0).unwrap();
    assert_eq!(model.symbol(user).bases, vec![inner_thing]);
}

#[test]
fn test_namespace_usings_bind_before_outer_namespaces() {
    let compilation = compile(&[
        ("Global.cs", "class Thing { } class FooAttribute : System.Attribute { }"),
        (
            "Lib.cs",
            "namespace Lib { class Thing { } class FooAttribute : System.Attribute { } }",
        ),
        (
            "App.cs",
            r#"
            using Lib;
            class AtRoot : Thing { }
            namespace App
            {
                using Lib;
                class Inside : Thing { }
                [Foo] class Marked { }
            }
            "#,
        ),
    ]);
    let model = compilation.semantic_model();
    let global_thing = model.type_by_name("Thing", 0).unwrap();
    let lib_thing = model.type_by_name("Lib.Thing", 0).unwrap();

    let at_root = model.type_by_name("AtRoot", 0).unwrap();
    assert_eq!(model.symbol(at_root).bases, vec![global_thing]);

    let inside = model.type_by_name("App.Inside", 0).unwrap();
    assert_eq!(model.symbol(inside).bases, vec![lib_thing]);

    let marked = model.type_by_name("App.Marked", 0).unwrap();
    assert!(model.has_attribute(marked, "Lib.FooAttribute"));
    assert!(!model.has_attribute(marked, "FooAttribute"));
}

#[test]
fn test_alias_in_namespace_body_binds_before_outer_namespaces() {
    let compilation = compile(&[(
        "A.cs",
        r#"
        class Target { }
        namespace Lib { class Real { } }
        namespace App
        {
            using Target = Lib.Real;
            class User : Target { }
        }
        "#,
    )]);
    let model = compilation.semantic_model();

    let user = model.type_by_name("App.User", 0).unwrap();
    let real = model.type_by_name("Lib.Real", 0).unwrap();
    assert_eq!(model.symbol(user).bases, vec![real]);
}

#[test]
fn test_attribute_resolution_prefers_suffix() {
    let compilation = compile(&[
        ("Ref.cs", COMPONENT_MODEL),
        (
            "App.cs",
            r#"
            using Stencil.ComponentModel;

            namespace App
            {
                [ObservableObject]
                public partial class ViewModel { }
            }
            "#,
        ),
    ]);
    let model = compilation.semantic_model();

    let view_model = model.type_by_name("App.ViewModel", 0).unwrap();
    let attributes = model.attributes_of(view_model);
    let resolved = attributes[0].1.unwrap();

    assert_eq!(
        model.symbol(resolved).full_name,
        "Stencil.ComponentModel.ObservableObjectAttribute"
    );
    assert!(model.has_attribute(view_model, "Stencil.ComponentModel.ObservableObjectAttribute"));
}

#[test]
fn test_transitive_interface_and_class_queries() {
    let compilation = compile(&[
        ("Ref.cs", COMPONENT_MODEL),
        (
            "App.cs",
            r#"
            namespace App
            {
                using Stencil.ComponentModel;

                [ObservableObject]
                public class Base { }
                public class Middle : ObservableObject { }
                public class Leaf : Middle { }
                public partial class Marked : Base { }
            }
            "#,
        ),
    ]);
    let model = compilation.semantic_model();

    let leaf = model.type_by_name("App.Leaf", 0).unwrap();
    assert!(model.implements(leaf, "System.ComponentModel.INotifyPropertyChanged"));
    assert!(model.implements(leaf, "System.ComponentModel.INotifyPropertyChanging"));
    assert!(model.inherits_from(leaf, "Stencil.ComponentModel.ObservableObject"));
    assert!(!model.inherits_from(leaf, "System.ComponentModel.INotifyPropertyChanged"));

    let marked = model.type_by_name("App.Marked", 0).unwrap();
    let attribute = "Stencil.ComponentModel.ObservableObjectAttribute";
    assert!(!model.has_attribute(marked, attribute));
    assert!(model.has_attribute_in_hierarchy(marked, attribute));
}

#[test]
fn test_inheritance_cycles_terminate() {
    let compilation = compile(&[("A.cs", "class A : B { } class B : A { }")]);
    let model = compilation.semantic_model();

    let a = model.type_by_name("A", 0).unwrap();
    let b = model.type_by_name("B", 0).unwrap();

    assert_eq!(model.all_bases(a), vec![b]);
    assert_eq!(model.base_classes(a), vec![b]);
    assert!(!model.inherits_from(a, "C"));
}

#[test]
fn test_trees_sharing_a_path_keep_their_declarations() {
    let compilation = compile(&[
        ("A.cs", "class First { }"),
        ("A.cs", "class Second { }"),
    ]);
    let model = compilation.semantic_model();
    let trees = compilation.trees();

    let first = trees[0].unit.type_declarations()[0];
    let second = trees[1].unit.type_declarations()[0];
    assert_eq!(first.span.id, second.span.id);

    assert_eq!(
        model.declared_symbol(trees[0].id, &first.span.id),
        model.type_by_name("First", 0)
    );
    assert_eq!(
        model.declared_symbol(trees[1].id, &second.span.id),
        model.type_by_name("Second", 0)
    );
}

#[test]
fn test_declared_symbol_by_span() {
    let compilation = compile(&[("A.cs", "namespace N { class A { class B { } } }")]);
    let model = compilation.semantic_model();
    let tree = &compilation.trees()[0];

    let outer = tree.unit.type_declarations()[0];
    let nested = tree.unit.type_declarations()[1];

    let site = model.declaration(tree.id, &nested.span.id).unwrap();
    assert_eq!(site.ancestors.len(), 1);
    assert_eq!(site.ancestors[0].name, "A");
    assert_eq!(site.namespace, "N");

    assert_eq!(
        model.declared_symbol(tree.id, &outer.span.id),
        model.type_by_name("N.A", 0)
    );
}
