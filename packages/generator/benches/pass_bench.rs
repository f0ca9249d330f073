use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stencil_generator::{add_references, generate_all, EmbeddedTemplates, HandlerRegistry};
use stencil_semantics::Compilation;

fn view_models(count: usize) -> String {
    let mut source = String::from("using Stencil.ComponentModel;\n\nnamespace Bench.ViewModels\n{\n");
    for i in 0..count {
        source.push_str(&format!(
            "    [ObservableObject]\n    public partial class ViewModel{i}\n    {{\n        private int value{i};\n    }}\n\n"
        ));
        source.push_str(&format!(
            "    [ObservableRecipient]\n    public partial class Recipient{i} : ObservableObject\n    {{\n    }}\n\n"
        ));
    }
    source.push_str("}\n");
    source
}

fn compilation(count: usize) -> Compilation {
    let mut compilation = Compilation::new();
    add_references(&mut compilation).unwrap();
    compilation
        .add_source("ViewModels.cs", view_models(count))
        .unwrap();
    compilation
}

fn build_model(c: &mut Criterion) {
    let compilation = compilation(100);
    c.bench_function("semantic_model_200_types", |b| {
        b.iter(|| black_box(&compilation).semantic_model())
    });
}

fn generate_builtin(c: &mut Criterion) {
    let compilation = compilation(100);
    let model = compilation.semantic_model();
    let registry = HandlerRegistry::new();

    c.bench_function("generate_all_200_usages", |b| {
        b.iter(|| generate_all(&registry, black_box(&model), &EmbeddedTemplates))
    });
}

criterion_group!(benches, build_model, generate_builtin);
criterion_main!(benches);
