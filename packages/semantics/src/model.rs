use crate::collector::DeclarationCollector;
use crate::compilation::{Compilation, SyntaxTree, TreeId};
use crate::names::{attribute_candidates, qualify, split_generic, strip_global};
use crate::symbols::{DeclarationSite, LookupScope, ScopeLevel, TypeId, TypeSymbol};
use std::collections::{HashMap, HashSet, VecDeque};
use stencil_common::visitor::Visitor;
use stencil_parser::ast::Attribute;
use tracing::{debug, instrument, trace};

/// Symbol table over an immutable [`Compilation`].
///
/// Types are keyed by full name and arity; partial declarations of the same
/// type (across trees or within one tree) merge into one symbol.
pub struct SemanticModel<'c> {
    compilation: &'c Compilation,
    sites: Vec<DeclarationSite<'c>>,
    site_symbols: Vec<TypeId>,
    symbols: Vec<TypeSymbol>,
    by_name: HashMap<(String, usize), TypeId>,
    /// Site index by span id, per tree
    by_span: HashMap<TreeId, HashMap<&'c str, usize>>,
}

impl<'c> SemanticModel<'c> {
    #[instrument(skip_all, fields(trees = compilation.trees().len()))]
    pub fn build(compilation: &'c Compilation) -> Self {
        let mut sites = Vec::new();
        for tree in compilation.trees() {
            let mut collector = DeclarationCollector::new(tree.id, sites.len());
            collector.visit_compilation_unit(&tree.unit);
            sites.extend(collector.sites);
        }

        let mut model = Self {
            compilation,
            sites: Vec::new(),
            site_symbols: Vec::with_capacity(sites.len()),
            symbols: Vec::new(),
            by_name: HashMap::new(),
            by_span: HashMap::new(),
        };

        // Sites arrive in pre-order, so a parent always has its symbol first
        for (index, site) in sites.iter().enumerate() {
            let key = (site.full_name.clone(), site.decl.arity());
            let id = match model.by_name.get(&key) {
                Some(id) => *id,
                None => {
                    let id = TypeId(model.symbols.len());
                    model.symbols.push(TypeSymbol {
                        id,
                        name: site.decl.name.clone(),
                        arity: site.decl.arity(),
                        kind: site.decl.kind,
                        namespace: site.namespace.clone(),
                        containing: site.parent.map(|parent| model.site_symbols[parent]),
                        full_name: site.full_name.clone(),
                        type_params: site
                            .decl
                            .type_param_names()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                        bases: Vec::new(),
                        unresolved_bases: Vec::new(),
                        sites: Vec::new(),
                    });
                    model.by_name.insert(key, id);
                    id
                }
            };

            model.symbols[id.0].sites.push(index);
            model.site_symbols.push(id);
            model
                .by_span
                .entry(site.tree)
                .or_default()
                .insert(site.decl.span.id.as_str(), index);
        }
        model.sites = sites;

        model.resolve_bases();

        debug!(
            symbols = model.symbols.len(),
            declarations = model.sites.len(),
            "built semantic model"
        );
        model
    }

    fn resolve_bases(&mut self) {
        for index in 0..self.symbols.len() {
            let mut bases = Vec::new();
            let mut unresolved = Vec::new();

            for &site_index in &self.symbols[index].sites {
                let site = &self.sites[site_index];
                let type_params = site.decl.type_param_names();

                for base in &site.decl.base_list {
                    match self.resolve_type(&site.scope, &base.name) {
                        Some(id) if !bases.contains(&id) => bases.push(id),
                        Some(_) => {}
                        None if type_params.contains(&base.name.as_str()) => {}
                        None => {
                            trace!(base = %base.name, ty = %site.full_name, "unresolved base type");
                            unresolved.push(base.name.clone());
                        }
                    }
                }
            }

            self.symbols[index].bases = bases;
            self.symbols[index].unresolved_bases = unresolved;
        }
    }

    pub fn compilation(&self) -> &'c Compilation {
        self.compilation
    }

    pub fn tree_of(&self, site: &DeclarationSite<'c>) -> &'c SyntaxTree {
        self.compilation.tree(site.tree)
    }

    pub fn symbols(&self) -> &[TypeSymbol] {
        &self.symbols
    }

    pub fn symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.symbols[id.0]
    }

    /// Look up a type by its full name (no `global::`, no type arguments)
    pub fn type_by_name(&self, full_name: &str, arity: usize) -> Option<TypeId> {
        self.by_name.get(&(full_name.to_string(), arity)).copied()
    }

    /// Declaration site of the type declaration in `tree` whose span carries
    /// `span_id`. Span ids are only unique within one tree.
    pub fn declaration(&self, tree: TreeId, span_id: &str) -> Option<&DeclarationSite<'c>> {
        self.site_index(tree, span_id).map(|index| &self.sites[index])
    }

    /// Symbol declared by the type declaration in `tree` whose span carries `span_id`
    pub fn declared_symbol(&self, tree: TreeId, span_id: &str) -> Option<TypeId> {
        self.site_index(tree, span_id).map(|index| self.site_symbols[index])
    }

    fn site_index(&self, tree: TreeId, span_id: &str) -> Option<usize> {
        self.by_span.get(&tree)?.get(span_id).copied()
    }

    /// All declarations of a symbol, in tree order
    pub fn declarations(&self, id: TypeId) -> impl Iterator<Item = &DeclarationSite<'c>> {
        self.symbols[id.0].sites.iter().map(|index| &self.sites[*index])
    }

    /// Resolve a type name as written at a point in source.
    ///
    /// Enclosing types are searched innermost first. Then, for each enclosing
    /// namespace from innermost to the global namespace, the types it
    /// declares, then the aliases and imported namespaces of the `using`
    /// directives written in that namespace body. A `global::` prefix skips
    /// straight to the global namespace.
    pub fn resolve_type(&self, scope: &LookupScope, name: &str) -> Option<TypeId> {
        let (global, name) = strip_global(name);
        let (base, arity) = split_generic(name);
        if base.is_empty() {
            return None;
        }
        if global {
            return self.type_by_name(&base, arity);
        }

        for containing in &scope.containing_types {
            if let Some(id) = self.type_by_name(&qualify(containing, &base), arity) {
                return Some(id);
            }
        }

        scope
            .levels
            .iter()
            .find_map(|level| self.resolve_in_level(level, &base, arity))
    }

    fn resolve_in_level(&self, level: &ScopeLevel, base: &str, arity: usize) -> Option<TypeId> {
        if let Some(id) = self.type_by_name(&qualify(&level.namespace, base), arity) {
            return Some(id);
        }

        let (first, rest) = match base.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (base, None),
        };
        if let Some((_, target)) = level.aliases.iter().find(|(alias, _)| alias == first) {
            let (_, target) = strip_global(target);
            let (target_base, target_arity) = split_generic(target);
            let found = match rest {
                Some(rest) => self.type_by_name(&qualify(&target_base, rest), arity),
                None => self.type_by_name(&target_base, target_arity),
            };
            if found.is_some() {
                return found;
            }
        }

        level
            .usings
            .iter()
            .find_map(|using| self.type_by_name(&qualify(using, base), arity))
    }

    /// Resolve an attribute name, trying the `Attribute` suffix first
    pub fn resolve_attribute(&self, scope: &LookupScope, name: &str) -> Option<TypeId> {
        attribute_candidates(name)
            .iter()
            .find_map(|candidate| self.resolve_type(scope, candidate))
    }

    /// Attributes applied to any declaration of `id`, with their resolved types
    pub fn attributes_of(&self, id: TypeId) -> Vec<(&'c Attribute, Option<TypeId>)> {
        let mut out = Vec::new();
        for site in self.declarations(id) {
            for list in &site.decl.attributes {
                for attribute in &list.attributes {
                    out.push((attribute, self.resolve_attribute(&site.scope, &attribute.name)));
                }
            }
        }
        out
    }

    /// Transitive base types of `id` (classes and interfaces), breadth-first.
    /// Inheritance cycles are cut at the first repeated type.
    pub fn all_bases(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<TypeId> = self.symbol(id).bases.iter().copied().collect();
        let mut out = Vec::new();

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            queue.extend(self.symbol(next).bases.iter().copied());
        }

        out
    }

    /// Base class chain of `id`, nearest first
    pub fn base_classes(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::from([id]);
        let mut out = Vec::new();
        let mut current = id;

        while let Some(next) = self
            .symbol(current)
            .bases
            .iter()
            .copied()
            .find(|base| self.symbol(*base).is_class())
        {
            if !seen.insert(next) {
                break;
            }
            out.push(next);
            current = next;
        }

        out
    }

    /// Whether `id` implements the interface `full_name`, directly or through
    /// any base type
    pub fn implements(&self, id: TypeId, full_name: &str) -> bool {
        self.all_bases(id).into_iter().any(|base| {
            let symbol = self.symbol(base);
            symbol.is_interface() && symbol.full_name == full_name
        })
    }

    /// Whether `id` derives from the class `full_name`
    pub fn inherits_from(&self, id: TypeId, full_name: &str) -> bool {
        self.base_classes(id)
            .into_iter()
            .any(|base| self.symbol(base).full_name == full_name)
    }

    /// Whether any declaration of `id` carries an attribute resolving to `full_name`
    pub fn has_attribute(&self, id: TypeId, full_name: &str) -> bool {
        self.attributes_of(id)
            .into_iter()
            .any(|(_, resolved)| resolved.is_some_and(|ty| self.symbol(ty).full_name == full_name))
    }

    /// Whether `id` or any of its base classes carries the attribute `full_name`
    pub fn has_attribute_in_hierarchy(&self, id: TypeId, full_name: &str) -> bool {
        std::iter::once(id)
            .chain(self.base_classes(id))
            .any(|ty| self.has_attribute(ty, full_name))
    }
}
