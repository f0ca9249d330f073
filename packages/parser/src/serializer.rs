use crate::ast::*;

/// Serializer converts an AST back to source text.
///
/// Output is normalized rather than lossless: declarations use Allman braces,
/// members are separated by blank lines and token runs are re-spaced. Opaque
/// member bodies are laid out again from their tokens, so comments inside
/// bodies are not preserved.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "    ".to_string(), // 4 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize a compilation unit to source code
    pub fn serialize(&mut self, unit: &CompilationUnit) -> String {
        let mut output = String::new();

        self.serialize_usings(&unit.usings, &mut output);

        for list in &unit.attributes {
            self.serialize_attribute_list(list, &mut output);
        }
        if !unit.attributes.is_empty() {
            output.push('\n');
        }

        self.serialize_namespace_members(&unit.members, &mut output);

        output
    }

    fn serialize_usings(&mut self, usings: &[UsingDirective], output: &mut String) {
        for using in usings {
            self.write_indent(output);
            output.push_str("using ");
            if using.is_static {
                output.push_str("static ");
            }
            if let Some(alias) = &using.alias {
                output.push_str(alias);
                output.push_str(" = ");
            }
            output.push_str(&using.name);
            output.push_str(";\n");
        }

        if !usings.is_empty() {
            output.push('\n');
        }
    }

    fn serialize_namespace_members(&mut self, members: &[NamespaceMember], output: &mut String) {
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            match member {
                NamespaceMember::Namespace(ns) => self.serialize_namespace(ns, output),
                NamespaceMember::Type(decl) => self.serialize_type(decl, output),
                NamespaceMember::Delegate(delegate) => self.serialize_opaque(delegate, output),
            }
        }
    }

    fn serialize_namespace(&mut self, ns: &NamespaceDecl, output: &mut String) {
        self.write_indent(output);
        output.push_str("namespace ");
        output.push_str(&ns.name);

        if ns.file_scoped {
            output.push_str(";\n\n");
            self.serialize_usings(&ns.usings, output);
            self.serialize_namespace_members(&ns.members, output);
            return;
        }

        output.push('\n');
        self.open_block(output);
        self.serialize_usings(&ns.usings, output);
        self.serialize_namespace_members(&ns.members, output);
        self.close_block(output);
    }

    fn serialize_type(&mut self, decl: &TypeDecl, output: &mut String) {
        self.serialize_docs(&decl.docs, output);
        for list in &decl.attributes {
            self.serialize_attribute_list(list, output);
        }

        self.write_indent(output);
        for modifier in &decl.modifiers {
            output.push_str(modifier);
            output.push(' ');
        }
        output.push_str(decl.kind.keyword());
        output.push(' ');
        output.push_str(&decl.name);

        if !decl.type_params.is_empty() {
            output.push('<');
            output.push_str(&decl.type_params.join(", "));
            output.push('>');
        }

        if let Some(parameters) = &decl.parameters {
            output.push('(');
            output.push_str(&join_tokens(parameters));
            output.push(')');
        }

        for (i, base) in decl.base_list.iter().enumerate() {
            output.push_str(if i == 0 { " : " } else { ", " });
            output.push_str(&base.name);
            if let Some(arguments) = &base.arguments {
                output.push('(');
                output.push_str(&join_tokens(arguments));
                output.push(')');
            }
        }

        self.indent_level += 1;
        for clause in &decl.constraints {
            output.push('\n');
            self.write_indent(output);
            output.push_str("where ");
            output.push_str(&clause.type_param);
            output.push_str(" : ");
            output.push_str(&join_tokens(&clause.constraints));
        }
        self.indent_level -= 1;

        if !decl.has_body {
            output.push_str(";\n");
            return;
        }

        output.push('\n');
        self.open_block(output);
        for (i, member) in decl.members.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            match member {
                Member::Type(nested) => self.serialize_type(nested, output),
                Member::Opaque(opaque) => self.serialize_opaque(opaque, output),
            }
        }
        self.close_block(output);
    }

    fn serialize_opaque(&mut self, member: &OpaqueMember, output: &mut String) {
        self.serialize_docs(&member.docs, output);
        for list in &member.attributes {
            self.serialize_attribute_list(list, output);
        }
        self.serialize_tokens(&member.tokens, output);
    }

    fn serialize_docs(&mut self, docs: &[String], output: &mut String) {
        for line in docs {
            self.write_indent(output);
            output.push_str(line);
            output.push('\n');
        }
    }

    fn serialize_attribute_list(&mut self, list: &AttributeList, output: &mut String) {
        self.write_indent(output);
        output.push('[');
        if let Some(target) = &list.target {
            output.push_str(target);
            output.push_str(": ");
        }
        for (i, attribute) in list.attributes.iter().enumerate() {
            if i > 0 {
                output.push_str(", ");
            }
            output.push_str(&attribute.name);
            if !attribute.arguments.is_empty() {
                output.push('(');
                for (j, argument) in attribute.arguments.iter().enumerate() {
                    if j > 0 {
                        output.push_str(", ");
                    }
                    if let Some(name) = &argument.name {
                        output.push_str(name);
                        output.push_str(if argument.uses_colon { ": " } else { " = " });
                    }
                    output.push_str(&argument.value_text());
                }
                output.push(')');
            }
        }
        output.push_str("]\n");
    }

    /// Lay out a member's token run.
    ///
    /// Brace groups that hold statements or accessor bodies become Allman
    /// blocks with one statement per line; short groups such as `{ get; set; }`
    /// and collection initializers stay inline.
    fn serialize_tokens(&mut self, tokens: &[RawToken], output: &mut String) {
        // Paren depth at which each open block started; `None` for inline groups
        let mut groups: Vec<Option<usize>> = Vec::new();
        let mut parens = 0usize;
        let mut line_start = true;
        let mut prev: Option<&str> = None;

        for (i, token) in tokens.iter().enumerate() {
            let text = token.text.as_str();
            let next = tokens.get(i + 1).map(|t| t.text.as_str());

            match text {
                "{" if opens_block(tokens, i) => {
                    if !line_start {
                        output.push('\n');
                    }
                    self.write_indent(output);
                    output.push_str("{\n");
                    self.indent_level += 1;
                    groups.push(Some(parens));
                    line_start = true;
                }
                "{" => {
                    self.write_separator(line_start, prev, token, output);
                    output.push('{');
                    groups.push(None);
                    line_start = false;
                }
                "}" => match groups.pop() {
                    Some(Some(_)) => {
                        self.indent_level = self.indent_level.saturating_sub(1);
                        if !line_start {
                            output.push('\n');
                        }
                        self.write_indent(output);
                        output.push('}');
                        line_start = match next {
                            Some(";" | "," | ")" | "]") => false,
                            Some(_) => {
                                output.push('\n');
                                true
                            }
                            None => false,
                        };
                    }
                    _ => {
                        if !line_start {
                            output.push(' ');
                        } else {
                            self.write_indent(output);
                        }
                        output.push('}');
                        line_start = false;
                    }
                },
                ";" => {
                    output.push(';');
                    line_start = false;
                    if next.is_some() && groups.last() == Some(&Some(parens)) {
                        output.push('\n');
                        line_start = true;
                    }
                }
                _ => {
                    self.write_separator(line_start, prev, token, output);
                    output.push_str(text);
                    line_start = false;
                    match text {
                        "(" | "[" => parens += 1,
                        ")" | "]" => parens = parens.saturating_sub(1),
                        _ => {}
                    }
                }
            }

            prev = Some(text);
        }

        if !line_start {
            output.push('\n');
        }
    }

    /// Whitespace before a token: indentation at the start of a line, else a
    /// single space where the source had one (always after `,` and inside
    /// inline braces)
    fn write_separator(
        &self,
        line_start: bool,
        prev: Option<&str>,
        token: &RawToken,
        output: &mut String,
    ) {
        if line_start {
            self.write_indent(output);
            return;
        }

        let spaced = match prev {
            Some("," | "{") => true,
            Some(";") => !matches!(token.text.as_str(), ";" | ")"),
            Some(_) => token.spaced,
            None => false,
        };
        if spaced {
            output.push(' ');
        }
    }

    fn open_block(&mut self, output: &mut String) {
        self.write_indent(output);
        output.push_str("{\n");
        self.indent_level += 1;
    }

    fn close_block(&mut self, output: &mut String) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.write_indent(output);
        output.push_str("}\n");
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

const BLOCK_KEYWORDS: &[&str] = &[
    "get", "set", "init", "add", "remove", "else", "try", "catch", "finally", "do", "checked",
    "unchecked", "unsafe", "=>",
];

/// Whether the `{` at `index` opens a statement block rather than an inline group
fn opens_block(tokens: &[RawToken], index: usize) -> bool {
    let Some(prev) = index.checked_sub(1).map(|i| &tokens[i]) else {
        return true;
    };

    if prev.text == ")" {
        return !follows_constructor_call(tokens, index - 1);
    }
    if BLOCK_KEYWORDS.contains(&prev.text.as_str()) {
        return true;
    }

    // A property whose accessors have bodies: `Name { get { .. } set => .. }`
    if prev.is_ident() {
        let mut depth = 0usize;
        for token in &tokens[index + 1..] {
            match token.text.as_str() {
                "{" if depth == 0 => return true,
                "=>" if depth == 0 => return true,
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" if depth == 0 => return false,
                "}" | ")" | "]" => depth -= 1,
                _ => {}
            }
        }
    }

    false
}

/// Whether the `)` at `close` ends `new T(...)`, making the following brace
/// group an object or collection initializer
fn follows_constructor_call(tokens: &[RawToken], close: usize) -> bool {
    let mut depth = 0usize;
    let mut i = close;
    loop {
        match tokens[i].text.as_str() {
            ")" => depth += 1,
            "(" => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        if i == 0 {
            return false;
        }
        i -= 1;
    }

    // Walk back over the constructed type name
    let mut angles = 0usize;
    let mut prev_ident = false;
    while i > 0 {
        i -= 1;
        let token = &tokens[i];
        match token.text.as_str() {
            "new" if angles == 0 => return true,
            ">" => angles += 1,
            "<" => angles = angles.saturating_sub(1),
            "." | "?" | "::" => {}
            _ if angles > 0 => {}
            _ if token.is_ident() => {
                // `void F` is a declaration, not a type name
                if prev_ident {
                    return false;
                }
                prev_ident = true;
                continue;
            }
            _ => return false,
        }
        prev_ident = false;
    }

    false
}

/// Serialize a compilation unit with the default 4-space indentation
pub fn serialize(unit: &CompilationUnit) -> String {
    let mut serializer = Serializer::new();
    serializer.serialize(unit)
}
