//! Lexical building blocks: whitespace, comments, names and literals.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1, one_of, satisfy},
    combinator::{not, opt, peek, recognize, value, verify},
    multi::many0,
    sequence::{pair, preceded, terminated, tuple},
};

use crate::ast::Literal;
use crate::compiler::keywords;

pub type PResult<'a, T> = IResult<&'a str, T>;

/// Words that can never name a variable.
const RESERVED: &[&str] = &[
    "def",
    "if",
    "else",
    "return",
    "new",
    "true",
    "false",
    "null",
    "in",
    "instanceof",
    "as",
    "class",
];

const PRIMITIVES: &[&str] = &[
    "int", "long", "short", "byte", "boolean", "double", "float", "char", "void",
];

pub const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
];

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

fn line_comment(input: &str) -> PResult<'_, &str> {
    recognize(pair(tag("//"), take_while(|c| c != '\n')))(input)
}

fn block_comment(input: &str) -> PResult<'_, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Skip spaces, tabs and comments on the current line.
pub fn hs(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0(alt((
            take_while1(|c| c == ' ' || c == '\t' || c == '\r'),
            line_comment,
            block_comment,
        ))),
    )(input)
}

/// At least one space or tab.
pub fn hs1(input: &str) -> PResult<'_, ()> {
    value((), pair(take_while1(|c| c == ' ' || c == '\t'), hs))(input)
}

/// Skip all whitespace, newlines included, and comments.
pub fn ws(input: &str) -> PResult<'_, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment))))(input)
}

/// Skip whitespace, comments and statement separators.
pub fn separators(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0(alt((multispace1, tag(";"), line_comment, block_comment))),
    )(input)
}

/// Match `kw` as a whole word.
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| terminated(tag(kw), not(satisfy(is_ident_char)))(input)
}

pub fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(is_ident_char),
    ))(input)
}

/// An identifier that is not a reserved word.
pub fn name(input: &str) -> PResult<'_, &str> {
    verify(identifier, |s: &str| !is_reserved(s))(input)
}

/// `a.b.C`
pub fn qualified_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(identifier, many0(pair(char('.'), identifier))))(input)
}

/// A type name usable in a declaration: capitalized or primitive, and never a
/// query keyword (so `From childOf = key` stays a query statement).
pub fn type_name(input: &str) -> PResult<'_, &str> {
    verify(qualified_name, |s: &str| {
        let last = s.rsplit('.').next().unwrap_or(s);
        let capitalized = last.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        (capitalized || PRIMITIVES.contains(&s)) && !keywords::is_keyword(s)
    })(input)
}

pub fn modifier(input: &str) -> PResult<'_, &str> {
    verify(identifier, |s: &str| MODIFIERS.contains(&s))(input)
}

/// Single or double quoted string with backslash escapes.
pub fn string_literal(input: &str) -> PResult<'_, String> {
    let (rest, quote) = one_of("\"'")(input)?;
    let mut out = String::new();
    let mut chars = rest.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            return Ok((&rest[idx + 1..], out));
        }
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            '\n' => break,
            _ => out.push(c),
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Integer or decimal literal.
pub fn number(input: &str) -> PResult<'_, Literal> {
    let (rest, text) = terminated(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        not(satisfy(is_ident_char)),
    )(input)?;
    if text.contains('.') {
        Ok((rest, Literal::Decimal(text.to_string())))
    } else {
        match text.parse::<i64>() {
            Ok(n) => Ok((rest, Literal::Int(n))),
            Err(_) => Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Digit,
            ))),
        }
    }
}

/// `true`, `false` or `null`.
pub fn word_literal(input: &str) -> PResult<'_, Literal> {
    alt((
        value(Literal::Bool(true), keyword("true")),
        value(Literal::Bool(false), keyword("false")),
        value(Literal::Null, keyword("null")),
    ))(input)
}

/// Lookahead: the next character can begin a paren-less command argument.
pub fn starts_command_argument(input: &str) -> PResult<'_, ()> {
    value(
        (),
        preceded(
            not(alt((keyword("in"), keyword("instanceof"), keyword("as")))),
            peek(satisfy(|c| is_ident_char(c) || c == '"' || c == '\'' || c == '[')),
        ),
    )(input)
}
