/// Serialized output must parse back to the same declaration structure
use crate::*;

fn shape(unit: &CompilationUnit) -> Vec<(String, Vec<String>)> {
    unit.type_declarations()
        .iter()
        .map(|d| (d.name.clone(), d.member_names().map(str::to_string).collect()))
        .collect()
}

#[test]
fn test_roundtrip_observable_template() {
    let source = r#"
        using System.ComponentModel;
        using System.Runtime.CompilerServices;

        namespace Stencil.ComponentModel
        {
            public abstract class ObservableObject : INotifyPropertyChanged, INotifyPropertyChanging
            {
                public event PropertyChangedEventHandler? PropertyChanged;

                public event PropertyChangingEventHandler? PropertyChanging;

                protected virtual void OnPropertyChanged(PropertyChangedEventArgs e)
                {
                    PropertyChanged?.Invoke(this, e);
                }

                protected bool SetProperty<T>(ref T field, T newValue, [CallerMemberName] string? propertyName = null)
                {
                    if (EqualityComparer<T>.Default.Equals(field, newValue))
                    {
                        return false;
                    }

                    OnPropertyChanging(new PropertyChangingEventArgs(propertyName));
                    field = newValue;
                    OnPropertyChanged(new PropertyChangedEventArgs(propertyName));
                    return true;
                }

                protected void OnPropertyChanging(PropertyChangingEventArgs e) => PropertyChanging?.Invoke(this, e);
            }
        }
    "#;

    let unit = parse(source).unwrap();
    let serialized = serialize(&unit);
    let reparsed = parse(&serialized)
        .unwrap_or_else(|e| panic!("Failed to reparse: {}\n{}", e, serialized));

    assert_eq!(shape(&unit), shape(&reparsed));
    assert_eq!(reparsed.usings.len(), 2);

    // Serializing is a fixed point once the layout is normalized
    assert_eq!(serialize(&reparsed), serialized);
}

#[test]
fn test_roundtrip_nested_generic_types() {
    let source = r#"
        namespace A.B;

        internal partial class Outer<T> where T : notnull
        {
            private partial struct Middle
            {
                public partial record Inner(int Value)
                {
                    public int Doubled => Value * 2;
                }
            }
        }
    "#;

    let unit = parse(source).unwrap();
    let serialized = serialize(&unit);
    let reparsed = parse(&serialized).unwrap();

    assert_eq!(shape(&unit), shape(&reparsed));
    assert!(serialized.starts_with("namespace A.B;\n"));
    assert!(serialized.contains("public partial record Inner(int Value)"));
}

#[test]
fn test_roundtrip_initializers_and_lambdas() {
    let source = r#"
        class Registry
        {
            private readonly List<int> values = new() { 1, 2, 3 };

            private readonly Dictionary<string, Func<int>> factories = new()
            {
                ["one"] = () => 1,
            };

            public void Each(Action<int> action)
            {
                values.ForEach(v => { action(v); });
            }
        }
    "#;

    let unit = parse(source).unwrap();
    let serialized = serialize(&unit);
    let reparsed = parse(&serialized)
        .unwrap_or_else(|e| panic!("Failed to reparse: {}\n{}", e, serialized));

    assert_eq!(shape(&unit), shape(&reparsed));
    assert!(serialized.contains("private readonly List<int> values = new() { 1, 2, 3 };"));
}
