use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IDGenerator;
use crate::tokenizer::{try_tokenize, Token};

/// Recursive-descent parser for the declaration language.
///
/// Namespaces, type declarations, attribute lists, base lists and constraint
/// clauses are parsed structurally. Everything else inside a type body is
/// kept as an [`OpaqueMember`]: a balanced token run with a derived name.
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, std::ops::Range<usize>)>,
    pos: usize,
    source_len: usize,
    id_generator: IDGenerator,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, id_generator: IDGenerator) -> ParseResult<Self> {
        let tokens = try_tokenize(source)?;
        Ok(Self {
            tokens,
            pos: 0,
            source_len: source.len(),
            id_generator,
        })
    }

    /// Parse a complete source file
    pub fn parse_compilation_unit(&mut self) -> ParseResult<CompilationUnit> {
        let mut unit = CompilationUnit::new();

        unit.usings = self.parse_usings()?;

        while self.is_targeted_attribute_list() {
            unit.attributes.push(self.parse_attribute_list()?);
        }

        unit.members = self.parse_namespace_members(true)?;
        unit.span = Span::new(0, self.source_len, self.id_generator.new_id());

        Ok(unit)
    }

    fn parse_usings(&mut self) -> ParseResult<Vec<UsingDirective>> {
        let mut usings = Vec::new();
        while self.check(Token::Using) {
            usings.push(self.parse_using()?);
        }
        Ok(usings)
    }

    /// Parse `using X;`, `using static X;` or `using A = X;`
    fn parse_using(&mut self) -> ParseResult<UsingDirective> {
        let start = self.peek_span().start;
        self.expect(Token::Using)?;

        let is_static = self.match_ident("static");

        let alias = match (self.peek(), self.peek_ahead(1)) {
            (Some((Token::Ident(alias), _)), Some((Token::Equals, _))) => {
                let alias = alias.to_string();
                self.advance();
                self.advance();
                Some(alias)
            }
            _ => None,
        };

        let name = self.parse_type_name()?;
        self.expect(Token::Semicolon)?;

        Ok(UsingDirective {
            is_static,
            alias,
            name,
            span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
        })
    }

    /// Parse namespace members until `}` (nested) or end of file (top level)
    fn parse_namespace_members(&mut self, top_level: bool) -> ParseResult<Vec<NamespaceMember>> {
        let mut members = Vec::new();

        loop {
            match self.peek() {
                None if top_level => break,
                None => return Err(ParseError::unexpected_eof(self.source_len, "'}'")),
                Some((Token::RBrace, _)) if !top_level => break,
                Some((Token::Semicolon, _)) => {
                    self.advance();
                }
                Some((Token::Namespace, _)) => {
                    members.push(NamespaceMember::Namespace(self.parse_namespace()?));
                }
                _ => members.push(self.parse_namespace_item()?),
            }
        }

        Ok(members)
    }

    fn parse_namespace(&mut self) -> ParseResult<NamespaceDecl> {
        let start = self.peek_span().start;
        self.expect(Token::Namespace)?;

        let name = self.parse_dotted_name()?;

        let (file_scoped, usings, members) = if self.match_token(Token::Semicolon) {
            // File-scoped: the rest of the file belongs to this namespace
            let usings = self.parse_usings()?;
            let members = self.parse_namespace_members(true)?;
            (true, usings, members)
        } else {
            self.expect(Token::LBrace)?;
            let usings = self.parse_usings()?;
            let members = self.parse_namespace_members(false)?;
            self.expect(Token::RBrace)?;
            (false, usings, members)
        };

        Ok(NamespaceDecl {
            name,
            file_scoped,
            usings,
            members,
            span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
        })
    }

    fn parse_namespace_item(&mut self) -> ParseResult<NamespaceMember> {
        let start = self.peek_span().start;
        let mut docs = self.parse_docs();
        let attributes = self.parse_attribute_lists()?;
        docs.extend(self.parse_docs());

        if self.looks_like_type_decl() {
            let modifiers = self.parse_modifiers();
            let decl = self.parse_type_decl(docs, attributes, modifiers, start)?;
            return Ok(NamespaceMember::Type(decl));
        }

        if self.looks_like_delegate() {
            let tokens = self.parse_opaque_tokens()?;
            return Ok(NamespaceMember::Delegate(OpaqueMember {
                docs,
                attributes,
                name: member_name(&tokens),
                tokens,
                span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
            }));
        }

        Err(ParseError::unexpected_token_span(
            self.peek_span(),
            "type declaration",
            Self::format_token(self.peek()),
        ))
    }

    /// Parse a class, struct, interface, record or enum declaration.
    /// Modifiers, docs and attributes have already been consumed.
    fn parse_type_decl(
        &mut self,
        docs: Vec<String>,
        attributes: Vec<AttributeList>,
        modifiers: Vec<String>,
        start: usize,
    ) -> ParseResult<TypeDecl> {
        let kind = match self.peek() {
            Some((Token::Class, _)) => TypeKind::Class,
            Some((Token::Struct, _)) => TypeKind::Struct,
            Some((Token::Interface, _)) => TypeKind::Interface,
            Some((Token::Enum, _)) => TypeKind::Enum,
            Some((Token::Record, _)) => TypeKind::Record,
            _ => {
                return Err(ParseError::unexpected_token_span(
                    self.peek_span(),
                    "'class', 'struct', 'interface', 'record' or 'enum'",
                    Self::format_token(self.peek()),
                ))
            }
        };
        self.advance();

        let kind = match kind {
            TypeKind::Record if self.match_token(Token::Struct) => TypeKind::RecordStruct,
            TypeKind::Record => {
                self.match_token(Token::Class);
                TypeKind::Record
            }
            other => other,
        };

        let name = self.expect_ident()?;

        let type_params = if self.check(Token::LAngle) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };

        let parameters = if self.check(Token::LParen) {
            Some(self.parse_group(Token::LParen, Token::RParen)?)
        } else {
            None
        };

        let mut base_list = Vec::new();
        if self.match_token(Token::Colon) {
            loop {
                let base_start = self.peek_span().start;
                let name = self.parse_type_name()?;
                let arguments = if self.check(Token::LParen) {
                    Some(self.parse_group(Token::LParen, Token::RParen)?)
                } else {
                    None
                };
                base_list.push(BaseType {
                    name,
                    arguments,
                    span: Span::new(base_start, self.prev_end(), self.id_generator.new_id()),
                });

                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }

        let mut constraints = Vec::new();
        while self.match_token(Token::Where) {
            let type_param = self.expect_ident()?;
            self.expect(Token::Colon)?;
            constraints.push(ConstraintClause {
                type_param,
                constraints: self.parse_constraint_tokens()?,
            });
        }

        let (members, has_body) = if self.match_token(Token::LBrace) {
            let members = self.parse_members()?;
            self.expect(Token::RBrace)?;
            self.match_token(Token::Semicolon);
            (members, true)
        } else {
            self.expect(Token::Semicolon)?;
            (Vec::new(), false)
        };

        Ok(TypeDecl {
            docs,
            attributes,
            modifiers,
            kind,
            name,
            type_params,
            parameters,
            base_list,
            constraints,
            members,
            has_body,
            span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
        })
    }

    /// Parse `<in T, U>` on a type declaration
    fn parse_type_parameters(&mut self) -> ParseResult<Vec<String>> {
        self.expect(Token::LAngle)?;

        let mut params = Vec::new();
        loop {
            // Attributes on type parameters carry no meaning for synthesis
            self.parse_attribute_lists()?;

            let first = self.expect_ident()?;
            let param = if (first == "in" || first == "out") && self.check_ident() {
                format!("{} {}", first, self.expect_ident()?)
            } else {
                first
            };
            params.push(param);

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RAngle)?;
        Ok(params)
    }

    fn parse_members(&mut self) -> ParseResult<Vec<Member>> {
        let mut members = Vec::new();

        while !self.check(Token::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_eof(self.source_len, "'}'"));
            }
            if self.match_token(Token::Semicolon) {
                continue;
            }
            members.push(self.parse_member()?);
        }

        Ok(members)
    }

    fn parse_member(&mut self) -> ParseResult<Member> {
        let start = self.peek_span().start;
        let mut docs = self.parse_docs();
        let attributes = self.parse_attribute_lists()?;
        docs.extend(self.parse_docs());

        if self.looks_like_type_decl() {
            let modifiers = self.parse_modifiers();
            let decl = self.parse_type_decl(docs, attributes, modifiers, start)?;
            return Ok(Member::Type(decl));
        }

        let tokens = self.parse_opaque_tokens()?;
        Ok(Member::Opaque(OpaqueMember {
            docs,
            attributes,
            name: member_name(&tokens),
            tokens,
            span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
        }))
    }

    /// Collect the tokens of one member.
    ///
    /// A member ends at a `;` outside any brackets, or at the `}` closing a
    /// body unless an initializer follows (`{ get; } = 5;`). A `}` closing the
    /// enclosing type also ends the run (enum bodies).
    fn parse_opaque_tokens(&mut self) -> ParseResult<Vec<RawToken>> {
        let mut tokens = Vec::new();
        let mut braces = 0usize;
        let mut parens = 0usize;
        let mut assigned = false;

        loop {
            let Some((token, span)) = self.peek().cloned() else {
                return Err(ParseError::unexpected_eof(self.source_len, "';' or '}'"));
            };

            match token {
                Token::RBrace if braces == 0 => {
                    if tokens.is_empty() {
                        return Err(ParseError::unexpected_token_span(
                            span,
                            "member declaration",
                            "'}'",
                        ));
                    }
                    break;
                }
                Token::DocComment(_) => {
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let spaced = self.is_spaced();
            self.advance();
            tokens.push(RawToken::new(token.text(), spaced));

            match token {
                Token::LBrace => braces += 1,
                Token::RBrace => {
                    braces -= 1;
                    if braces == 0 && parens == 0 && !assigned && !self.check(Token::Equals) {
                        break;
                    }
                }
                Token::LParen | Token::LBracket => parens += 1,
                Token::RParen | Token::RBracket => parens = parens.saturating_sub(1),
                Token::Equals | Token::Arrow if braces == 0 && parens == 0 => assigned = true,
                Token::Semicolon if braces == 0 && parens == 0 => break,
                _ => {}
            }
        }

        Ok(tokens)
    }

    fn parse_attribute_lists(&mut self) -> ParseResult<Vec<AttributeList>> {
        let mut lists = Vec::new();
        while self.check(Token::LBracket) {
            lists.push(self.parse_attribute_list()?);
        }
        Ok(lists)
    }

    /// Parse `[target: A, B(args)]`
    fn parse_attribute_list(&mut self) -> ParseResult<AttributeList> {
        let start = self.peek_span().start;
        self.expect(Token::LBracket)?;

        let target = match (self.peek(), self.peek_ahead(1)) {
            (Some((Token::Ident(target), _)), Some((Token::Colon, _))) => {
                let target = target.to_string();
                self.advance();
                self.advance();
                Some(target)
            }
            _ => None,
        };

        let mut attributes = Vec::new();
        loop {
            attributes.push(self.parse_attribute()?);
            if !self.match_token(Token::Comma) || self.check(Token::RBracket) {
                break;
            }
        }

        self.expect(Token::RBracket)?;

        Ok(AttributeList {
            target,
            attributes,
            span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
        })
    }

    fn parse_attribute(&mut self) -> ParseResult<Attribute> {
        let start = self.peek_span().start;
        let name = self.parse_type_name()?;

        let mut arguments = Vec::new();
        if self.match_token(Token::LParen) {
            while !self.check(Token::RParen) {
                arguments.push(self.parse_attribute_argument()?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }

        Ok(Attribute {
            name,
            arguments,
            span: Span::new(start, self.prev_end(), self.id_generator.new_id()),
        })
    }

    fn parse_attribute_argument(&mut self) -> ParseResult<AttributeArgument> {
        let (name, uses_colon) = match (self.peek(), self.peek_ahead(1)) {
            (Some((Token::Ident(name), _)), Some((Token::Equals, _))) => {
                let name = name.to_string();
                self.advance();
                self.advance();
                (Some(name), false)
            }
            (Some((Token::Ident(name), _)), Some((Token::Colon, _))) => {
                let name = name.to_string();
                self.advance();
                self.advance();
                (Some(name), true)
            }
            _ => (None, false),
        };

        let mut value = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(ParseError::unexpected_eof(self.source_len, "')'")),
                Some((Token::Comma | Token::RParen, _)) if depth == 0 => break,
                Some((token, _)) => {
                    let token = token.clone();
                    match token {
                        Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                        Token::RParen | Token::RBracket | Token::RBrace => {
                            depth = depth.saturating_sub(1)
                        }
                        _ => {}
                    }
                    let spaced = self.is_spaced();
                    self.advance();
                    value.push(RawToken::new(token.text(), spaced));
                }
            }
        }

        if value.is_empty() {
            return Err(ParseError::invalid_syntax_span(
                self.peek_span(),
                "Expected attribute argument value",
            ));
        }

        Ok(AttributeArgument {
            name,
            uses_colon,
            value,
        })
    }

    /// Tokens of a `where` clause up to the next clause or the body
    fn parse_constraint_tokens(&mut self) -> ParseResult<Vec<RawToken>> {
        let mut tokens = Vec::new();
        let mut parens = 0usize;

        loop {
            match self.peek() {
                None => return Err(ParseError::unexpected_eof(self.source_len, "'{'")),
                Some((Token::Where | Token::LBrace | Token::Semicolon, _)) if parens == 0 => break,
                Some((token, _)) => {
                    let token = token.clone();
                    match token {
                        Token::LParen => parens += 1,
                        Token::RParen => parens = parens.saturating_sub(1),
                        _ => {}
                    }
                    let spaced = self.is_spaced();
                    self.advance();
                    tokens.push(RawToken::new(token.text(), spaced));
                }
            }
        }

        if tokens.is_empty() {
            return Err(ParseError::invalid_syntax_span(
                self.peek_span(),
                "Expected type parameter constraint",
            ));
        }

        Ok(tokens)
    }

    /// Tokens between a pair of delimiters; the delimiters themselves are dropped
    fn parse_group(&mut self, open: Token<'src>, close: Token<'src>) -> ParseResult<Vec<RawToken>> {
        self.expect(open.clone())?;

        let mut tokens = Vec::new();
        let mut depth = 1usize;
        loop {
            let Some((token, _)) = self.peek().cloned() else {
                return Err(ParseError::unexpected_eof(
                    self.source_len,
                    Self::format_expected_token(&close),
                ));
            };

            if token == open {
                depth += 1;
            } else if token == close {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    break;
                }
            }

            let spaced = self.is_spaced();
            self.advance();
            tokens.push(RawToken::new(token.text(), spaced));
        }

        Ok(tokens)
    }

    /// Parse a possibly qualified, possibly generic type name such as
    /// `global::System.Collections.Generic.IEnumerable<T>`
    fn parse_type_name(&mut self) -> ParseResult<String> {
        let mut name = String::new();

        if let (Some((Token::Ident(alias), _)), Some((Token::ColonColon, _))) =
            (self.peek(), self.peek_ahead(1))
        {
            name.push_str(alias);
            name.push_str("::");
            self.advance();
            self.advance();
        }

        name.push_str(&self.expect_ident()?);

        loop {
            if self.check(Token::LAngle) {
                let args = self.parse_group(Token::LAngle, Token::RAngle)?;
                name.push('<');
                name.push_str(&join_tokens(&args));
                name.push('>');
            }

            match (self.peek(), self.peek_ahead(1)) {
                (Some((Token::Dot, _)), Some((Token::Ident(_), _))) => {
                    self.advance();
                    name.push('.');
                    name.push_str(&self.expect_ident()?);
                }
                _ => break,
            }
        }

        Ok(name)
    }

    /// Parse `A.B.C` (namespace names)
    fn parse_dotted_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident()?;
        while self.match_token(Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    fn parse_docs(&mut self) -> Vec<String> {
        let mut docs = Vec::new();
        while let Some((Token::DocComment(text), _)) = self.peek() {
            docs.push(text.trim_end().to_string());
            self.advance();
        }
        docs
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while let Some((Token::Ident(word), _)) = self.peek() {
            if !is_modifier(word) {
                break;
            }
            modifiers.push(word.to_string());
            self.advance();
        }
        modifiers
    }

    /// Index of the first token after any modifiers, starting at the cursor
    fn skip_modifiers_ahead(&self) -> usize {
        let mut i = self.pos;
        while let Some((Token::Ident(word), _)) = self.tokens.get(i) {
            if !is_modifier(word) {
                break;
            }
            i += 1;
        }
        i
    }

    fn looks_like_type_decl(&self) -> bool {
        let i = self.skip_modifiers_ahead();
        match self.tokens.get(i) {
            Some((Token::Class | Token::Struct | Token::Interface | Token::Enum, _)) => true,
            Some((Token::Record, _)) => matches!(
                self.tokens.get(i + 1),
                Some((Token::Ident(_) | Token::Class | Token::Struct, _))
            ),
            _ => false,
        }
    }

    fn looks_like_delegate(&self) -> bool {
        let i = self.skip_modifiers_ahead();
        matches!(self.tokens.get(i), Some((Token::Delegate, _)))
    }

    fn is_targeted_attribute_list(&self) -> bool {
        matches!(
            (self.peek(), self.peek_ahead(1), self.peek_ahead(2)),
            (
                Some((Token::LBracket, _)),
                Some((Token::Ident("assembly" | "module"), _)),
                Some((Token::Colon, _))
            )
        )
    }

    // Helper methods

    fn peek(&self) -> Option<&(Token<'src>, std::ops::Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_ahead(&self, offset: usize) -> Option<&(Token<'src>, std::ops::Range<usize>)> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, std::ops::Range<usize>)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn check_ident(&self) -> bool {
        matches!(self.peek(), Some((Token::Ident(_), _)))
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_ident(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some((Token::Ident(w), _)) if *w == word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(ParseError::unexpected_eof(
                self.source_len,
                Self::format_expected_token(&token),
            ))
        } else {
            Err(ParseError::unexpected_token_span(
                self.peek_span(),
                Self::format_expected_token(&token),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            None => Err(ParseError::unexpected_eof(self.source_len, "identifier")),
            _ => Err(ParseError::unexpected_token_span(
                self.peek_span(),
                "identifier",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Whether whitespace (or a comment) separates the next token from the previous one
    fn is_spaced(&self) -> bool {
        match (self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)), self.peek()) {
            (Some((_, prev)), Some((_, next))) => prev.end < next.start,
            _ => false,
        }
    }

    /// End offset of the token we just consumed
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    /// Get the span of the next token (the one we're about to consume)
    fn peek_span(&self) -> std::ops::Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or(self.source_len..self.source_len)
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&(Token, std::ops::Range<usize>)>) -> String {
        match token {
            None => "end of file".to_string(),
            Some((token, _)) => token.to_string(),
        }
    }

    fn format_expected_token(token: &Token) -> String {
        match token {
            Token::Ident(_) => "identifier".to_string(),
            token => token.to_string(),
        }
    }
}

pub fn parse(source: &str) -> ParseResult<CompilationUnit> {
    parse_with_path(source, "<anonymous>")
}

pub fn parse_with_path(source: &str, path: &str) -> ParseResult<CompilationUnit> {
    let id_generator = IDGenerator::new(path);
    let mut parser = Parser::new(source, id_generator)?;
    parser.parse_compilation_unit()
}
