//! Token definition table
//!
//! Every token class is an anchored regular expression with a tie-break
//! priority. Lower priorities are preferred; see [`super::Lexer`] for the
//! full selection rule.

use super::tokens::{Token, TokenKind};
use crate::util::span::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// How a definition recognises its lexeme
#[derive(Clone)]
enum Matcher {
    /// Anchored regular expression
    Pattern(Regex),
    /// Hand-written scanner returning the matched byte length
    Rule(fn(&str) -> Option<usize>),
}

impl fmt::Debug for Matcher {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Matcher::Pattern(pattern) => write!(f, "Pattern({})", pattern.as_str()),
            Matcher::Rule(_) => f.write_str("Rule"),
        }
    }
}

/// One lexical rule: pattern, name, priority and the kind of token it builds
#[derive(Debug, Clone)]
pub struct TokenDefinition {
    pub name: &'static str,
    pub kind: TokenKind,
    pub priority: i32,
    matcher: Matcher,
}

impl TokenDefinition {
    /// Build a definition. The pattern is anchored at the match position.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression. Definitions
    /// are static configuration, so this is a programming error.
    pub fn new(
        name: &'static str,
        pattern: &str,
        kind: TokenKind,
        priority: i32,
    ) -> Self {
        let anchored = format!("^(?:{})", pattern);
        let pattern = Regex::new(&anchored)
            .unwrap_or_else(|e| panic!("invalid pattern for token definition {}: {}", name, e));
        Self {
            name,
            kind,
            priority,
            matcher: Matcher::Pattern(pattern),
        }
    }

    /// Build a definition from a scanning rule, for lexemes a regular
    /// expression cannot describe
    pub fn with_rule(
        name: &'static str,
        rule: fn(&str) -> Option<usize>,
        kind: TokenKind,
        priority: i32,
    ) -> Self {
        Self {
            name,
            kind,
            priority,
            matcher: Matcher::Rule(rule),
        }
    }

    /// Length in bytes of the match at the start of `rest`, if non-empty
    pub fn match_len(
        &self,
        rest: &str,
    ) -> Option<usize> {
        let len = match &self.matcher {
            Matcher::Pattern(pattern) => pattern.find(rest).map(|m| m.end()),
            Matcher::Rule(rule) => rule(rest),
        };
        len.filter(|&len| len > 0)
    }

    /// Construct the token for a matched lexeme
    pub fn build(
        &self,
        text: &str,
        span: Span,
    ) -> Token {
        Token::new(self.kind, text, span)
    }
}

/// Reserved type names (`method` and `class` route to nested bodies)
pub const TYPE_NAMES: &[&str] = &[
    "int", "float", "str", "char", "bool", "void", "method", "class",
];

/// Reserved keywords
pub const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "return", "switch", "case", "break", "continue",
];

/// Names lexed as builtin calls
pub const BUILTIN_NAMES: &[&str] = &["print", "println", "input"];

fn word_set(words: &[&str]) -> String {
    format!(r"(?:{})\b", words.join("|"))
}

/// Length of a comment opened by `open` and closed by the matching `close`,
/// counting nested pairs. `None` when `rest` does not start with `open` or
/// the outermost pair is never closed.
pub fn nested_comment_len(
    rest: &str,
    open: &str,
    close: &str,
) -> Option<usize> {
    if !rest.starts_with(open) {
        return None;
    }
    let mut depth = 1usize;
    let mut index = open.len();
    while index < rest.len() {
        let tail = &rest[index..];
        if tail.starts_with(close) {
            depth -= 1;
            index += close.len();
            if depth == 0 {
                return Some(index);
            }
        } else if tail.starts_with(open) {
            depth += 1;
            index += open.len();
        } else {
            index += tail.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

fn doc_comment(rest: &str) -> Option<usize> {
    nested_comment_len(rest, "###_", "_###")
}

fn block_comment(rest: &str) -> Option<usize> {
    nested_comment_len(rest, "#_", "_#")
}

/// The Sapling lexical grammar, in declaration order
pub static TOKEN_DEFINITIONS: Lazy<Vec<TokenDefinition>> = Lazy::new(|| {
    vec![
        TokenDefinition::with_rule(
            "Multi-Line Embedded Documentation Comment",
            doc_comment,
            TokenKind::Comment,
            -2,
        ),
        TokenDefinition::with_rule("Multi-Line Comment", block_comment, TokenKind::Comment, -1),
        TokenDefinition::new("Comment", r"#[^\n]*", TokenKind::Comment, 0),
        TokenDefinition::new("Ternary", r"[?:]", TokenKind::Ternary, 1),
        TokenDefinition::new("Delimiter", r"[(){};?:,]", TokenKind::Delimiter, 1),
        TokenDefinition::new("Keyword", &word_set(KEYWORDS), TokenKind::Keyword, 2),
        TokenDefinition::new("Type", &word_set(TYPE_NAMES), TokenKind::Type, 3),
        TokenDefinition::new("Builtin", &word_set(BUILTIN_NAMES), TokenKind::Builtin, 3),
        TokenDefinition::new("FloatLiteral", r"\d+\.\d+", TokenKind::FloatLiteral, 4),
        TokenDefinition::new("CharacterLiteral", r"'[^']'", TokenKind::CharacterLiteral, 4),
        TokenDefinition::new("BooleanLiteral", r"(?:True|False)\b", TokenKind::BooleanLiteral, 4),
        TokenDefinition::new("IntegerLiteral", r"\d+", TokenKind::IntegerLiteral, 5),
        TokenDefinition::new("StringLiteral", r#""[^"]*""#, TokenKind::StringLiteral, 5),
        TokenDefinition::new(
            "ComparisonOperator",
            r"==|!=|>=|<=|>|<",
            TokenKind::ComparisonOperator,
            6,
        ),
        TokenDefinition::new("Assign", r"=", TokenKind::Assign, 6),
        // `=` is shadowed by Assign (same priority and length, declared first)
        TokenDefinition::new(
            "ArithmeticOperator",
            r"[=+\-*/]",
            TokenKind::ArithmeticOperator,
            6,
        ),
        TokenDefinition::new("BooleanOperator", r"&&|\|\||\^", TokenKind::BooleanOperator, 6),
        TokenDefinition::new("Identifier", r"[A-Za-z_]\w*", TokenKind::Identifier, 100),
    ]
});

/// The static definition table
pub fn definitions() -> &'static [TokenDefinition] {
    &TOKEN_DEFINITIONS
}

/// Whether `name` is lexed as a builtin
pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}
