use serde::{Deserialize, Serialize};

/// Span information for source location tracking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub id: String,
}

impl Span {
    pub fn new(start: usize, end: usize, id: String) -> Self {
        Self { start, end, id }
    }

    /// Span for nodes built in memory rather than parsed from text
    pub fn synthetic() -> Self {
        Self::new(0, 0, String::new())
    }
}

/// A token kept verbatim inside an opaque run (member bodies, attribute
/// arguments, constraint clauses)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    pub text: String,
    /// Whether whitespace preceded the token in the source
    pub spaced: bool,
}

impl RawToken {
    pub fn new(text: impl Into<String>, spaced: bool) -> Self {
        Self {
            text: text.into(),
            spaced,
        }
    }

    pub fn is_ident(&self) -> bool {
        let text = self.text.strip_prefix('@').unwrap_or(&self.text);
        text.chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
            && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// Join raw tokens back into a single line, collapsing whitespace
pub fn join_tokens(tokens: &[RawToken]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.spaced {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

/// Root node of one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    /// Attribute lists with an `assembly:`/`module:` target
    pub attributes: Vec<AttributeList>,
    pub members: Vec<NamespaceMember>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self {
            usings: Vec::new(),
            attributes: Vec::new(),
            members: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// All type declarations at any depth, outermost first
    pub fn type_declarations(&self) -> Vec<&TypeDecl> {
        let mut out = Vec::new();
        for member in &self.members {
            collect_namespace_member(member, &mut out);
        }
        out
    }
}

impl Default for CompilationUnit {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_namespace_member<'a>(member: &'a NamespaceMember, out: &mut Vec<&'a TypeDecl>) {
    match member {
        NamespaceMember::Namespace(ns) => {
            for member in &ns.members {
                collect_namespace_member(member, out);
            }
        }
        NamespaceMember::Type(decl) => collect_type(decl, out),
        NamespaceMember::Delegate(_) => {}
    }
}

fn collect_type<'a>(decl: &'a TypeDecl, out: &mut Vec<&'a TypeDecl>) {
    out.push(decl);
    for member in &decl.members {
        if let Member::Type(nested) = member {
            collect_type(nested, out);
        }
    }
}

/// `using X;`, `using static X;` or `using A = X;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsingDirective {
    pub is_static: bool,
    pub alias: Option<String>,
    pub name: String,
    pub span: Span,
}

/// Items allowed directly inside a namespace (or the compilation unit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NamespaceMember {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
    Delegate(OpaqueMember),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    pub file_scoped: bool,
    pub usings: Vec<UsingDirective>,
    pub members: Vec<NamespaceMember>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
    RecordStruct,
    Enum,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Record => "record",
            TypeKind::RecordStruct => "record struct",
            TypeKind::Enum => "enum",
        }
    }

    /// Whether arbitrary members (fields, methods, events) can be merged in
    pub fn accepts_members(&self) -> bool {
        !matches!(self, TypeKind::Interface | TypeKind::Enum)
    }
}

/// `[target: A, B(args)]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeList {
    pub target: Option<String>,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Name as written, possibly qualified (`Stencil.ComponentModel.ObservableObject`)
    pub name: String,
    pub arguments: Vec<AttributeArgument>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeArgument {
    pub name: Option<String>,
    /// `name: value` rather than `Name = value`
    pub uses_colon: bool,
    pub value: Vec<RawToken>,
}

impl AttributeArgument {
    pub fn value_text(&self) -> String {
        join_tokens(&self.value)
    }
}

/// One entry of a base list, e.g. `global::System.IDisposable` or `Base<T>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseType {
    pub name: String,
    /// Primary constructor arguments for record bases, `Base(X)`
    pub arguments: Option<Vec<RawToken>>,
    pub span: Span,
}

/// `where T : class, new()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintClause {
    pub type_param: String,
    pub constraints: Vec<RawToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub docs: Vec<String>,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<String>,
    pub kind: TypeKind,
    pub name: String,
    /// Type parameters as written, including variance (`in T`)
    pub type_params: Vec<String>,
    /// Primary constructor parameter list, without the parentheses
    pub parameters: Option<Vec<RawToken>>,
    pub base_list: Vec<BaseType>,
    pub constraints: Vec<ConstraintClause>,
    pub members: Vec<Member>,
    /// `record R(int X);` has no body
    pub has_body: bool,
    pub span: Span,
}

impl TypeDecl {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            docs: Vec::new(),
            attributes: Vec::new(),
            modifiers: Vec::new(),
            kind,
            name: name.into(),
            type_params: Vec::new(),
            parameters: None,
            base_list: Vec::new(),
            constraints: Vec::new(),
            members: Vec::new(),
            has_body: true,
            span: Span::synthetic(),
        }
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    /// Type parameter names without variance annotations
    pub fn type_param_names(&self) -> Vec<&str> {
        self.type_params
            .iter()
            .map(|p| p.rsplit(' ').next().unwrap_or(p.as_str()))
            .collect()
    }

    /// `Name<T, U>` as it would be written in source
    pub fn display_name(&self) -> String {
        if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_param_names().join(", "))
        }
    }

    /// Copy of the declaration header without any members
    pub fn shell(&self) -> TypeDecl {
        TypeDecl {
            members: Vec::new(),
            ..self.clone()
        }
    }

    /// Names declared by the members of this declaration
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| m.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Member {
    Type(TypeDecl),
    Opaque(OpaqueMember),
}

impl Member {
    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Type(decl) => Some(&decl.name),
            Member::Opaque(member) => member.name.as_deref(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Member::Type(decl) => &decl.span,
            Member::Opaque(member) => &member.span,
        }
    }
}

/// A member the engine does not need to understand structurally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueMember {
    pub docs: Vec<String>,
    pub attributes: Vec<AttributeList>,
    pub tokens: Vec<RawToken>,
    /// Declared name, derived from the token run
    pub name: Option<String>,
    pub span: Span,
}

impl OpaqueMember {
    pub fn from_tokens(tokens: Vec<RawToken>) -> Self {
        let name = member_name(&tokens);
        Self {
            docs: Vec::new(),
            attributes: Vec::new(),
            tokens,
            name,
            span: Span::synthetic(),
        }
    }

    /// Whether this member is a constructor of a type named `type_name`
    pub fn is_constructor_of(&self, type_name: &str) -> bool {
        let Some(open) = self.tokens.iter().position(|t| t.text == "(") else {
            return false;
        };
        open > 0
            && self.tokens[open - 1].text == type_name
            && self.tokens[..open - 1].iter().all(|t| is_modifier(&t.text))
    }
}

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "sealed", "partial",
    "readonly", "unsafe", "new", "virtual", "override", "extern", "async", "volatile", "const",
    "file", "required", "ref",
];

/// Whether a word is a declaration modifier
pub fn is_modifier(word: &str) -> bool {
    MODIFIERS.contains(&word)
}

/// Derive the declared name of a member from its token run.
///
/// The name is the identifier right before the first `(`, `=`, `=>`, `{` or
/// `;` at nesting depth zero, skipping a trailing generic parameter list.
pub fn member_name(tokens: &[RawToken]) -> Option<String> {
    let mut depth = 0usize;
    let mut stop = None;
    for (i, token) in tokens.iter().enumerate() {
        match token.text.as_str() {
            "<" => depth += 1,
            ">" => depth = depth.saturating_sub(1),
            "[" if depth == 0 && i > 0 && tokens[i - 1].text == "this" => {
                return Some("this[]".to_string());
            }
            "(" | "=" | "=>" | "{" | ";" if depth == 0 => {
                stop = Some(i);
                break;
            }
            _ => {}
        }
    }

    let stop = stop?;
    let mut end = stop;

    // Skip back over `<...>` on generic methods
    if end > 0 && tokens[end - 1].text == ">" {
        let mut nested = 0usize;
        while end > 0 {
            end -= 1;
            match tokens[end].text.as_str() {
                ">" => nested += 1,
                "<" => {
                    nested -= 1;
                    if nested == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    if end == 0 {
        return None;
    }

    let last = &tokens[end - 1];
    if end >= 2 && tokens[end - 2].text == "operator" {
        return Some(format!("operator {}", last.text));
    }
    if !last.is_ident() {
        return tokens[..end]
            .iter()
            .position(|t| t.text == "operator")
            .map(|i| {
                let op: Vec<&str> = tokens[i + 1..end].iter().map(|t| t.text.as_str()).collect();
                format!("operator {}", op.join(""))
            });
    }
    if end >= 2 && tokens[end - 2].text == "~" {
        return Some(format!("~{}", last.text));
    }
    Some(last.text.clone())
}
