//! Expression lexer
//!
//! Hand-written character scanner for predicate and HAVING condition text.
//! Aggregate alias tokens (`<digits>_<func>_<column-or-*>`) are recognized
//! here as single field-reference tokens so the canonical alias survives as
//! one field key.

use crate::config::compile_time::expression::MAX_STRING_LENGTH;
use crate::expr::error::ExprError;
use crate::phi::nodes::AggFunc;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// Lexical tokens of the expression language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier (becomes a field reference unless it is a keyword)
    Ident(String),
    /// Aggregate alias reference, already canonicalized
    FieldRef(String),
    Int(i64),
    Float(f64),
    Str(String),
    True,
    False,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{}", name),
            Token::FieldRef(alias) => write!(f, "{}", alias),
            Token::Int(value) => write!(f, "{}", value),
            Token::Float(value) => write!(f, "{}", value),
            Token::Str(value) => write!(f, "'{}'", value),
            Token::True => write!(f, "True"),
            Token::False => write!(f, "False"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// A token with its byte offset in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: usize,
}

/// Tokenize expression text
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => push_simple(&mut tokens, &mut chars, Token::LParen, position),
            ')' => push_simple(&mut tokens, &mut chars, Token::RParen, position),
            '+' => push_simple(&mut tokens, &mut chars, Token::Plus, position),
            '-' => push_simple(&mut tokens, &mut chars, Token::Minus, position),
            '*' => push_simple(&mut tokens, &mut chars, Token::Star, position),
            '/' => push_simple(&mut tokens, &mut chars, Token::Slash, position),
            '%' => push_simple(&mut tokens, &mut chars, Token::Percent, position),
            '=' => {
                chars.next();
                // Both `=` and `==` are equality in this language
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                }
                tokens.push(SpannedToken {
                    token: Token::Eq,
                    position,
                });
            }
            '!' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(SpannedToken {
                        token: Token::Ne,
                        position,
                    });
                } else {
                    return Err(ExprError::UnexpectedCharacter {
                        character: '!',
                        position,
                    });
                }
            }
            '<' => {
                chars.next();
                let token = if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    Token::Le
                } else {
                    Token::Lt
                };
                tokens.push(SpannedToken { token, position });
            }
            '>' => {
                chars.next();
                let token = if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    Token::Ge
                } else {
                    Token::Gt
                };
                tokens.push(SpannedToken { token, position });
            }
            '\'' => {
                chars.next();
                let token = scan_string(&mut chars, position)?;
                tokens.push(SpannedToken { token, position });
            }
            '0'..='9' => {
                let token = scan_number_or_aggregate_ref(&mut chars, position)?;
                tokens.push(SpannedToken { token, position });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let token = scan_word(&mut chars);
                tokens.push(SpannedToken { token, position });
            }
            other => {
                return Err(ExprError::UnexpectedCharacter {
                    character: other,
                    position,
                });
            }
        }
    }

    Ok(tokens)
}

fn push_simple(
    tokens: &mut Vec<SpannedToken>,
    chars: &mut Peekable<CharIndices<'_>>,
    token: Token,
    position: usize,
) {
    chars.next();
    tokens.push(SpannedToken { token, position });
}

fn scan_string(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<Token, ExprError> {
    let mut content = String::new();

    loop {
        match chars.next() {
            Some((_, '\'')) => {
                return Ok(Token::Str(content));
            }
            Some((_, c)) => {
                content.push(c);
                if content.len() > MAX_STRING_LENGTH {
                    return Err(ExprError::StringTooLong {
                        length: content.len(),
                        max: MAX_STRING_LENGTH,
                    });
                }
            }
            None => {
                return Err(ExprError::UnterminatedString { position: start });
            }
        }
    }
}

fn scan_word(chars: &mut Peekable<CharIndices<'_>>) -> Token {
    let word = take_ident(chars);
    match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        _ => Token::Ident(word),
    }
}

/// Scan a numeric literal, or an aggregate alias reference when the digits
/// are immediately followed by an underscore.
fn scan_number_or_aggregate_ref(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<Token, ExprError> {
    let digits = take_while(chars, |c| c.is_ascii_digit());

    match chars.peek().copied() {
        Some((_, '_')) => scan_aggregate_ref(chars, digits, start),
        Some((_, '.')) => {
            let mut text = digits;
            text.push('.');
            chars.next();
            let fraction = take_while(chars, |c| c.is_ascii_digit());
            if fraction.is_empty() {
                return Err(ExprError::InvalidNumber {
                    text,
                    position: start,
                });
            }
            text.push_str(&fraction);
            reject_trailing_ident(chars, &text, start)?;
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Token::Float(value)),
                _ => Err(ExprError::InvalidNumber {
                    text,
                    position: start,
                }),
            }
        }
        _ => {
            reject_trailing_ident(chars, &digits, start)?;
            digits
                .parse::<i64>()
                .map(Token::Int)
                .map_err(|_| ExprError::InvalidNumber {
                    text: digits,
                    position: start,
                })
        }
    }
}

fn scan_aggregate_ref(
    chars: &mut Peekable<CharIndices<'_>>,
    digits: String,
    start: usize,
) -> Result<Token, ExprError> {
    let mut text = digits.clone();

    // first underscore
    chars.next();
    text.push('_');

    let func_word = take_while(chars, |c| c.is_ascii_alphabetic());
    text.push_str(&func_word);
    let function = AggFunc::parse(&func_word).ok_or_else(|| ExprError::InvalidAggregateRef {
        text: text.clone(),
        position: start,
    })?;

    match chars.peek().copied() {
        Some((_, '_')) => {
            chars.next();
            text.push('_');
        }
        _ => {
            return Err(ExprError::InvalidAggregateRef {
                text,
                position: start,
            });
        }
    }

    let column = match chars.peek().copied() {
        Some((_, '*')) => {
            chars.next();
            text.push('*');
            "*".to_string()
        }
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {
            let ident = take_ident(chars);
            text.push_str(&ident);
            ident
        }
        _ => {
            return Err(ExprError::InvalidAggregateRef {
                text,
                position: start,
            });
        }
    };

    Ok(Token::FieldRef(format!(
        "{}_{}_{}",
        digits,
        function.as_str(),
        column
    )))
}

fn reject_trailing_ident(
    chars: &mut Peekable<CharIndices<'_>>,
    text: &str,
    start: usize,
) -> Result<(), ExprError> {
    if let Some((_, c)) = chars.peek().copied() {
        if c.is_ascii_alphanumeric() || c == '_' {
            let trailing = take_ident(chars);
            return Err(ExprError::InvalidNumber {
                text: format!("{}{}", text, trailing),
                position: start,
            });
        }
    }
    Ok(())
}

fn take_ident(chars: &mut Peekable<CharIndices<'_>>) -> String {
    take_while(chars, |c| c.is_ascii_alphanumeric() || c == '_')
}

fn take_while(chars: &mut Peekable<CharIndices<'_>>, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if pred(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            kinds("qty > 10"),
            vec![Token::Ident("qty".to_string()), Token::Gt, Token::Int(10)]
        );
        // Single = and double == are both equality
        assert_eq!(kinds("a = 1")[1], Token::Eq);
        assert_eq!(kinds("a == 1")[1], Token::Eq);
        assert_eq!(kinds("a != 1")[1], Token::Ne);
        assert_eq!(kinds("a <= 1")[1], Token::Le);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(kinds("not True and False or x")[0], Token::Not);
        assert_eq!(kinds("NOT x")[0], Token::Not);
        assert_eq!(kinds("True")[0], Token::True);
        assert_eq!(kinds("true")[0], Token::True);
    }

    #[test]
    fn test_aggregate_ref_lexes_as_single_field() {
        assert_eq!(
            kinds("1_sum_quant > 100"),
            vec![
                Token::FieldRef("1_sum_quant".to_string()),
                Token::Gt,
                Token::Int(100)
            ]
        );
    }

    #[test]
    fn test_aggregate_ref_canonicalized() {
        assert_eq!(
            kinds("2_COUNT_* < 5")[0],
            Token::FieldRef("2_count_*".to_string())
        );
    }

    #[test]
    fn test_malformed_aggregate_ref_rejected() {
        assert_matches!(
            tokenize("1_foo_bar").unwrap_err(),
            ExprError::InvalidAggregateRef { .. }
        );
        assert_matches!(
            tokenize("1_sum").unwrap_err(),
            ExprError::InvalidAggregateRef { .. }
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42")[0], Token::Int(42));
        assert_eq!(kinds("3.5")[0], Token::Float(3.5));
        assert_matches!(tokenize("12abc").unwrap_err(), ExprError::InvalidNumber { .. });
        assert_matches!(tokenize("1.").unwrap_err(), ExprError::InvalidNumber { .. });
    }

    #[test]
    fn test_strings() {
        assert_eq!(kinds("'NY'")[0], Token::Str("NY".to_string()));
        assert_matches!(
            tokenize("'open").unwrap_err(),
            ExprError::UnterminatedString { .. }
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_matches!(
            tokenize("a ? b").unwrap_err(),
            ExprError::UnexpectedCharacter { character: '?', .. }
        );
        assert_matches!(
            tokenize("a ! b").unwrap_err(),
            ExprError::UnexpectedCharacter { character: '!', .. }
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let tokens = tokenize("qty >= 10").unwrap();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 4);
        assert_eq!(tokens[2].position, 7);
    }
}
