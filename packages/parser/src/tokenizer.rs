use crate::error::{ParseError, ParseResult};
use logos::Logos;
use std::fmt;

/// Token types for the declaration language
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//([^/\n][^\n]*)?")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
#[logos(skip r"#[^\n]*")]
pub enum Token<'src> {
    // Doc comments are kept so they can be re-emitted above declarations
    #[regex(r"///[^\n]*", |lex| lex.slice())]
    DocComment(&'src str),

    // Structural keywords
    #[token("using")]
    Using,

    #[token("namespace")]
    Namespace,

    #[token("class")]
    Class,

    #[token("struct")]
    Struct,

    #[token("interface")]
    Interface,

    #[token("record")]
    Record,

    #[token("enum")]
    Enum,

    #[token("delegate")]
    Delegate,

    #[token("where")]
    Where,

    // Identifiers (modifiers and contextual keywords are identifiers too)
    #[regex(r"@?[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    // String literals: regular, verbatim and interpolated
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r#"@"([^"]|"")*""#, |lex| lex.slice())]
    #[regex(r#"\$"([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r#"(\$@|@\$)"([^"]|"")*""#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r"'([^'\\\n]|\\[^\n])*'", |lex| lex.slice())]
    Char(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?[fFdDmMuUlL]*", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F_]+[uUlL]*", |lex| lex.slice())]
    Number(&'src str),

    // Symbols
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(":")]
    Colon,

    #[token("::")]
    ColonColon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=")]
    Equals,

    #[token("=>")]
    Arrow,

    #[token("?")]
    Question,

    // Every other operator; the parser never needs to tell them apart
    #[regex(r"[+\-*/%!&|^~]|==|!=|<=|>=|&&|\|\||\+\+|--|\?\?|\?\?=|\?\.|[+\-*/%&|^]=|<<|\.\.", |lex| lex.slice())]
    Operator(&'src str),
}

impl<'src> Token<'src> {
    /// Source text of the token
    pub fn text(&self) -> &'src str {
        match self {
            Token::DocComment(s)
            | Token::Ident(s)
            | Token::String(s)
            | Token::Char(s)
            | Token::Number(s)
            | Token::Operator(s) => s,
            Token::Using => "using",
            Token::Namespace => "namespace",
            Token::Class => "class",
            Token::Struct => "struct",
            Token::Interface => "interface",
            Token::Record => "record",
            Token::Enum => "enum",
            Token::Delegate => "delegate",
            Token::Where => "where",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LAngle => "<",
            Token::RAngle => ">",
            Token::Colon => ":",
            Token::ColonColon => "::",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Equals => "=",
            Token::Arrow => "=>",
            Token::Question => "?",
        }
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::DocComment(_) => write!(f, "doc comment"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Char(c) => write!(f, "char {}", c),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Operator(op) => write!(f, "'{}'", op),
            Token::Using
            | Token::Namespace
            | Token::Class
            | Token::Struct
            | Token::Interface
            | Token::Record
            | Token::Enum
            | Token::Delegate
            | Token::Where => write!(f, "keyword '{}'", self.text()),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

/// Tokenize a source string, dropping anything the lexer does not recognise
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

/// Tokenize a source string, failing on the first unrecognised character
pub fn try_tokenize(source: &str) -> ParseResult<Vec<(Token, std::ops::Range<usize>)>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(ParseError::lexer_error(span.start)),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "using namespace class struct interface record enum delegate where";
        let tokens = tokenize(source);

        assert_eq!(tokens[0].0, Token::Using);
        assert_eq!(tokens[1].0, Token::Namespace);
        assert_eq!(tokens[2].0, Token::Class);
        assert_eq!(tokens[3].0, Token::Struct);
        assert_eq!(tokens[4].0, Token::Interface);
        assert_eq!(tokens[5].0, Token::Record);
        assert_eq!(tokens[6].0, Token::Enum);
        assert_eq!(tokens[7].0, Token::Delegate);
        assert_eq!(tokens[8].0, Token::Where);
    }

    #[test]
    fn test_identifiers_and_modifiers() {
        let source = "public partial MainViewModel _field @class";
        let tokens = tokenize(source);

        assert_eq!(tokens[0].0, Token::Ident("public"));
        assert_eq!(tokens[1].0, Token::Ident("partial"));
        assert_eq!(tokens[2].0, Token::Ident("MainViewModel"));
        assert_eq!(tokens[3].0, Token::Ident("_field"));
        assert_eq!(tokens[4].0, Token::Ident("@class"));
    }

    #[test]
    fn test_string_forms() {
        let source = r#""plain \"quoted\"" @"C:\path" $"Hello {name}" $@"raw {x}""#;
        let tokens = tokenize(source);

        assert_eq!(tokens.len(), 4);
        assert!(tokens.iter().all(|(t, _)| matches!(t, Token::String(_))));
    }

    #[test]
    fn test_numbers_and_chars() {
        let source = "42 3.14 1e10 0xFF 10u 2.5m 'a' '\\n'";
        let tokens = tokenize(source);

        assert_eq!(tokens[0].0, Token::Number("42"));
        assert_eq!(tokens[1].0, Token::Number("3.14"));
        assert_eq!(tokens[2].0, Token::Number("1e10"));
        assert_eq!(tokens[3].0, Token::Number("0xFF"));
        assert_eq!(tokens[4].0, Token::Number("10u"));
        assert_eq!(tokens[5].0, Token::Number("2.5m"));
        assert_eq!(tokens[6].0, Token::Char("'a'"));
        assert_eq!(tokens[7].0, Token::Char("'\\n'"));
    }

    #[test]
    fn test_punctuation() {
        let source = "global::System.Action<T>? x => y == z;";
        let tokens = tokenize(source);
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.text()).collect();

        assert_eq!(
            kinds,
            vec![
                "global", "::", "System", ".", "Action", "<", "T", ">", "?", "x", "=>", "y",
                "==", "z", ";"
            ]
        );
    }

    #[test]
    fn test_comments_and_directives_skipped() {
        let source = r#"
            // line comment
            #pragma warning disable
            class /* block */ Foo
            /// <summary>Kept</summary>
        "#;
        let tokens = tokenize(source);

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].0, Token::Class);
        assert_eq!(tokens[1].0, Token::Ident("Foo"));
        assert_eq!(tokens[2].0, Token::DocComment("/// <summary>Kept</summary>"));
    }

    #[test]
    fn test_try_tokenize_reports_position() {
        let err = try_tokenize("class Foo ` {}").unwrap_err();
        assert!(matches!(err, ParseError::LexerError { pos: 10 }));
    }
}
