//! Explicit expression evaluator
//!
//! Consumes a parsed expression against a field mapping at query time. No
//! dynamic code execution: every operator has fixed typed semantics with
//! Int/Float coercion on comparison and arithmetic.

use crate::expr::ast::{BinaryOp, Expr, Literal, UnaryOp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime values produced by evaluation and supplied through field mappings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }
}

/// Evaluation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error("type mismatch: cannot apply {operation} to {lhs} and {rhs}")]
    TypeMismatch {
        operation: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {operation}")]
    Overflow { operation: &'static str },
}

/// Evaluate an expression against a field mapping
pub fn eval(expr: &Expr, fields: &HashMap<String, Value>) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(literal) => Ok(match literal {
            Literal::Int(value) => Value::Int(*value),
            Literal::Float(value) => Value::Float(*value),
            Literal::Str(value) => Value::Str(value.clone()),
            Literal::Bool(value) => Value::Bool(*value),
        }),

        Expr::Field(name) => fields
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownField { name: name.clone() }),

        Expr::Unary { op, operand } => match op {
            UnaryOp::Not => match eval(operand, fields)? {
                Value::Bool(value) => Ok(Value::Bool(!value)),
                other => Err(EvalError::TypeMismatch {
                    operation: "not",
                    lhs: other.type_name(),
                    rhs: "bool",
                }),
            },
            UnaryOp::Neg => match eval(operand, fields)? {
                Value::Int(value) => value
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or(EvalError::Overflow { operation: "-" }),
                Value::Float(value) => Ok(Value::Float(-value)),
                other => Err(EvalError::TypeMismatch {
                    operation: "-",
                    lhs: other.type_name(),
                    rhs: "number",
                }),
            },
        },

        Expr::Binary { op, lhs, rhs } => match op {
            // Short-circuit boolean connectives
            BinaryOp::And => match eval(lhs, fields)? {
                Value::Bool(false) => Ok(Value::Bool(false)),
                Value::Bool(true) => expect_bool(eval(rhs, fields)?, "and"),
                other => Err(EvalError::TypeMismatch {
                    operation: "and",
                    lhs: other.type_name(),
                    rhs: "bool",
                }),
            },
            BinaryOp::Or => match eval(lhs, fields)? {
                Value::Bool(true) => Ok(Value::Bool(true)),
                Value::Bool(false) => expect_bool(eval(rhs, fields)?, "or"),
                other => Err(EvalError::TypeMismatch {
                    operation: "or",
                    lhs: other.type_name(),
                    rhs: "bool",
                }),
            },

            BinaryOp::Eq => compare_eq(eval(lhs, fields)?, eval(rhs, fields)?, false),
            BinaryOp::Ne => compare_eq(eval(lhs, fields)?, eval(rhs, fields)?, true),

            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                compare_ord(*op, eval(lhs, fields)?, eval(rhs, fields)?)
            }

            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                arithmetic(*op, eval(lhs, fields)?, eval(rhs, fields)?)
            }
        },
    }
}

fn expect_bool(value: Value, operation: &'static str) -> Result<Value, EvalError> {
    match value {
        Value::Bool(_) => Ok(value),
        other => Err(EvalError::TypeMismatch {
            operation,
            lhs: other.type_name(),
            rhs: "bool",
        }),
    }
}

fn compare_eq(lhs: Value, rhs: Value, negate: bool) -> Result<Value, EvalError> {
    let equal = match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => {
                return Err(EvalError::TypeMismatch {
                    operation: if negate { "!=" } else { "==" },
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                })
            }
        },
    };
    Ok(Value::Bool(equal != negate))
}

fn compare_ord(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    let operation = match op {
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        _ => unreachable!("not an ordering operator"),
    };

    let ordering = match (&lhs, &rhs) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => {
                a.partial_cmp(&b).ok_or(EvalError::TypeMismatch {
                    operation,
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                })?
            }
            _ => {
                return Err(EvalError::TypeMismatch {
                    operation,
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                })
            }
        },
    };

    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    // String concatenation keeps its usual meaning
    if let (BinaryOp::Add, Value::Str(a), Value::Str(b)) = (op, &lhs, &rhs) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }

    let operation = match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        _ => unreachable!("not an arithmetic operator"),
    };

    // Division always produces a float
    if op == BinaryOp::Div {
        let (a, b) = match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(EvalError::TypeMismatch {
                    operation,
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                })
            }
        };
        if b == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        return Ok(Value::Float(a / b));
    }

    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::Mod => {
                    if *b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a.checked_rem(*b)
                }
                _ => unreachable!(),
            };
            result
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation })
        }
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => {
                let result = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Mod => {
                        if b == 0.0 {
                            return Err(EvalError::DivisionByZero);
                        }
                        a % b
                    }
                    _ => unreachable!(),
                };
                Ok(Value::Float(result))
            }
            _ => Err(EvalError::TypeMismatch {
                operation,
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse_expression;
    use assert_matches::assert_matches;

    fn fields(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn eval_str(input: &str, fields_map: &HashMap<String, Value>) -> Result<Value, EvalError> {
        eval(&parse_expression(input).unwrap(), fields_map)
    }

    #[test]
    fn test_comparison_over_fields() {
        let env = fields(&[("qty", Value::Int(12))]);
        assert_eq!(eval_str("qty > 10", &env).unwrap(), Value::Bool(true));
        assert_eq!(eval_str("qty == 12", &env).unwrap(), Value::Bool(true));
        assert_eq!(eval_str("qty < 10", &env).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_int_float_coercion() {
        let env = fields(&[("avg", Value::Float(2.5))]);
        assert_eq!(eval_str("avg > 2", &env).unwrap(), Value::Bool(true));
        assert_eq!(eval_str("avg == 2.5", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_boolean_connectives_short_circuit() {
        let env = fields(&[("a", Value::Bool(false))]);
        // rhs references an unknown field but must not be evaluated
        assert_eq!(eval_str("a and missing > 1", &env).unwrap(), Value::Bool(false));

        let env = fields(&[("a", Value::Bool(true))]);
        assert_eq!(eval_str("a or missing > 1", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_not() {
        let env = fields(&[("flag", Value::Bool(true))]);
        assert_eq!(eval_str("not flag", &env).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_aggregate_alias_lookup() {
        let env = fields(&[("1_sum_quant", Value::Int(150)), ("month", Value::Int(1))]);
        assert_eq!(
            eval_str("1_sum_quant > 100 and month = 1", &env).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_string_comparison() {
        let env = fields(&[("state", Value::Str("NY".to_string()))]);
        assert_eq!(eval_str("state == 'NY'", &env).unwrap(), Value::Bool(true));
        assert_eq!(eval_str("state != 'NJ'", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_arithmetic() {
        let env = fields(&[("price", Value::Int(10)), ("tax", Value::Int(2))]);
        assert_eq!(eval_str("price + tax * 2", &env).unwrap(), Value::Int(14));
        assert_eq!(eval_str("price / 4", &env).unwrap(), Value::Float(2.5));
        assert_eq!(eval_str("price % 3", &env).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_unknown_field() {
        let env = fields(&[]);
        assert_matches!(
            eval_str("missing > 1", &env).unwrap_err(),
            EvalError::UnknownField { ref name } if name == "missing"
        );
    }

    #[test]
    fn test_type_mismatch() {
        let env = fields(&[("state", Value::Str("NY".to_string()))]);
        assert_matches!(
            eval_str("state > 5", &env).unwrap_err(),
            EvalError::TypeMismatch { .. }
        );
        assert_matches!(
            eval_str("state and True", &env).unwrap_err(),
            EvalError::TypeMismatch { .. }
        );
    }

    #[test]
    fn test_division_by_zero() {
        let env = fields(&[("n", Value::Int(0))]);
        assert_matches!(eval_str("1 / n", &env).unwrap_err(), EvalError::DivisionByZero);
        assert_matches!(eval_str("1 % n", &env).unwrap_err(), EvalError::DivisionByZero);
    }
}
