//! Recursive-descent expression parser
//!
//! Precedence, lowest to highest: `or`, `and`, `not`, comparison,
//! additive, multiplicative, unary minus. Comparison operators are
//! left-associative; parenthesized subexpressions recurse through the
//! full grammar with a compile-time depth bound.

use crate::config::compile_time::expression::MAX_NESTING_DEPTH;
use crate::expr::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::expr::error::ExprError;
use crate::expr::lexer::{tokenize, SpannedToken, Token};

/// Parse expression text into an AST
pub fn parse_expression(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = ExprParser::new(tokens);
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    Ok(expr)
}

struct ExprParser {
    tokens: Vec<SpannedToken>,
    position: usize,
    depth: usize,
}

impl ExprParser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ExprError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        self.enter()?;
        let mut lhs = self.parse_and()?;
        while matches!(self.current(), Some(t) if t.token == Token::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
        }
        self.leave();
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_not()?;
        while matches!(self.current(), Some(t) if t.token == Token::And) {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.current(), Some(t) if t.token == Token::Not) {
            self.advance();
            self.enter()?;
            let operand = self.parse_not()?;
            self.leave();
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current().map(|t| &t.token) {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current().map(|t| &t.token) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().map(|t| &t.token) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.current(), Some(t) if t.token == Token::Minus) {
            self.advance();
            self.enter()?;
            let operand = self.parse_unary()?;
            self.leave();
            return Ok(Expr::unary(UnaryOp::Neg, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let spanned = match self.advance() {
            Some(spanned) => spanned.clone(),
            None => return Err(ExprError::UnexpectedEnd),
        };

        match spanned.token {
            Token::Int(value) => Ok(Expr::Literal(Literal::Int(value))),
            Token::Float(value) => Ok(Expr::Literal(Literal::Float(value))),
            Token::Str(value) => Ok(Expr::Literal(Literal::Str(value))),
            Token::True => Ok(Expr::Literal(Literal::Bool(true))),
            Token::False => Ok(Expr::Literal(Literal::Bool(false))),
            Token::Ident(name) => Ok(Expr::Field(name)),
            Token::FieldRef(alias) => Ok(Expr::Field(alias)),
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(t) if t.token == Token::RParen => Ok(inner),
                    Some(t) => Err(ExprError::UnexpectedToken {
                        found: t.token.to_string(),
                        position: t.position,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            other => Err(ExprError::UnexpectedToken {
                found: other.to_string(),
                position: spanned.position,
            }),
        }
    }

    fn expect_end(&mut self) -> Result<(), ExprError> {
        match self.current() {
            None => Ok(()),
            Some(t) => Err(ExprError::UnexpectedToken {
                found: t.token.to_string(),
                position: t.position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_simple_comparison() {
        let expr = parse_expression("qty > 10").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Gt, Expr::field("qty"), Expr::int(10))
        );
    }

    #[test]
    fn test_single_equals_is_equality() {
        assert_eq!(
            parse_expression("month = 1").unwrap(),
            parse_expression("month == 1").unwrap()
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_expression("a and b or c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Or,
                Expr::binary(BinaryOp::And, Expr::field("a"), Expr::field("b")),
                Expr::field("c")
            )
        );
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        let expr = parse_expression("not a and b").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::And,
                Expr::unary(UnaryOp::Not, Expr::field("a")),
                Expr::field("b")
            )
        );
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = parse_expression("price + tax * 2 > 100").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Gt,
                Expr::binary(
                    BinaryOp::Add,
                    Expr::field("price"),
                    Expr::binary(BinaryOp::Mul, Expr::field("tax"), Expr::int(2))
                ),
                Expr::int(100)
            )
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse_expression("(a or b) and c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::And,
                Expr::binary(BinaryOp::Or, Expr::field("a"), Expr::field("b")),
                Expr::field("c")
            )
        );
    }

    #[test]
    fn test_aggregate_alias_becomes_field() {
        let expr = parse_expression("1_sum_quant > 2 * 1_avg_quant").unwrap();
        assert_eq!(expr.referenced_fields(), vec!["1_sum_quant", "1_avg_quant"]);
    }

    #[test]
    fn test_string_and_bool_literals() {
        let expr = parse_expression("state == 'NY' and active == True").unwrap();
        assert_eq!(expr.referenced_fields(), vec!["state", "active"]);
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse_expression("delta > -5").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Gt,
                Expr::field("delta"),
                Expr::unary(UnaryOp::Neg, Expr::int(5))
            )
        );
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert_matches!(
            parse_expression("a > 1 )").unwrap_err(),
            ExprError::UnexpectedToken { .. }
        );
    }

    #[test]
    fn test_incomplete_expression_rejected() {
        assert_matches!(parse_expression("a >").unwrap_err(), ExprError::UnexpectedEnd);
        assert_matches!(parse_expression("").unwrap_err(), ExprError::UnexpectedEnd);
    }

    #[test]
    fn test_unclosed_paren_rejected() {
        assert_matches!(
            parse_expression("(a > 1").unwrap_err(),
            ExprError::UnexpectedEnd
        );
    }
}
