//! Selector lexer using logos.

use logos::Logos;

use crate::ParseError;

/// A span in the source input (byte offsets).
pub type Span = std::ops::Range<usize>;

/// A token with its source span.
pub type SpannedToken = (Token, Span);

/// An integer literal before it is narrowed to an int or long constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteral {
    pub value: i64,
    /// Whether the literal carried an explicit `L` suffix.
    pub long: bool,
}

/// Selector tokens.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // === Numeric Literals ===

    // Hex: 0x1F, 0X1FL
    #[regex(r"0[xX][0-9a-fA-F]+[lL]?", lex_hex_int)]
    // Octal (including a bare zero): 0, 017, 017L
    #[regex(r"0[0-7]*[lL]?", lex_octal_int)]
    // Decimal: 123, 123L
    #[regex(r"[1-9][0-9]*[lL]?", lex_decimal_int)]
    Int(IntLiteral),

    // Float with decimal point and optional exponent: 1.5, 1., 1.5e10
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", lex_float)]
    // Float with a leading decimal point: .5, .5e3
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", lex_float)]
    // Float with exponent only: 1e10, 1E-5
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", lex_float)]
    Float(f64),

    // === String Literals ===
    #[regex(r"'", lex_string)]
    String(String),

    // === Keywords (case-insensitive) ===
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("like", ignore(ascii_case))]
    Like,
    #[token("escape", ignore(ascii_case))]
    Escape,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("between", ignore(ascii_case))]
    Between,
    #[token("is", ignore(ascii_case))]
    Is,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,

    // === Identifier ===
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Operators (multi-char first) ===
    #[token("<>")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(n) if n.long => write!(f, "{}L", n.value),
            Token::Int(n) => write!(f, "{}", n.value),
            Token::Float(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::Escape => write!(f, "ESCAPE"),
            Token::In => write!(f, "IN"),
            Token::Between => write!(f, "BETWEEN"),
            Token::Is => write!(f, "IS"),
            Token::Null => write!(f, "NULL"),
            Token::True => write!(f, "TRUE"),
            Token::False => write!(f, "FALSE"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Ne => write!(f, "<>"),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::Eq => write!(f, "="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

// === Lexer Callbacks for Numbers ===

/// Splits an optional `L` suffix off an integer literal.
fn strip_long_suffix(s: &str) -> (&str, bool) {
    match s.strip_suffix(['l', 'L']) {
        Some(digits) => (digits, true),
        None => (s, false),
    }
}

fn lex_decimal_int(lex: &mut logos::Lexer<Token>) -> Option<IntLiteral> {
    let (digits, long) = strip_long_suffix(lex.slice());
    let value = digits.parse().ok()?;
    Some(IntLiteral { value, long })
}

fn lex_hex_int(lex: &mut logos::Lexer<Token>) -> Option<IntLiteral> {
    let (digits, long) = strip_long_suffix(&lex.slice()[2..]); // Skip 0x
    // Full 64-bit patterns wrap into the signed range.
    let value = u64::from_str_radix(digits, 16).ok()? as i64;
    Some(IntLiteral { value, long })
}

fn lex_octal_int(lex: &mut logos::Lexer<Token>) -> Option<IntLiteral> {
    let (digits, long) = strip_long_suffix(lex.slice());
    let value = u64::from_str_radix(digits, 8).ok()? as i64;
    Some(IntLiteral { value, long })
}

fn lex_float(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

// === Lexer Callbacks for Strings ===

/// Lex a single-quoted string. A doubled quote (`''`) stands for one quote.
fn lex_string(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let remainder = lex.remainder();
    let mut chars = remainder.chars().peekable();
    let mut result = String::new();
    let mut consumed = 0;

    while let Some(c) = chars.next() {
        consumed += c.len_utf8();
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                consumed += 1;
                result.push('\'');
            } else {
                lex.bump(consumed);
                return Some(result);
            }
        } else {
            result.push(c);
        }
    }

    None // Unclosed string
}

// === Public Lexer API ===

/// Tokenize the input string.
pub fn lex(input: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                let slice = &input[span.clone()];
                let message = if slice.starts_with('\'') {
                    "unterminated string literal".to_string()
                } else if slice.starts_with(|c: char| c.is_ascii_digit()) {
                    format!("invalid numeric literal '{}'", slice)
                } else {
                    format!("unexpected character '{}'", slice)
                };
                return Err(ParseError { message, span });
            }
        }
    }

    Ok(tokens)
}
