//! Sandboxed arithmetic: a tokenizer and recursive-descent evaluator over
//! `+ - * / % ( )`, decimal numbers, the constants `pi` and `e`, and the
//! functions `abs` and `round`. Nothing else evaluates — there is no name
//! lookup and no host-language escape hatch.

use std::sync::LazyLock;

use regex::Regex;

// Arithmetic-looking spans in free text: digits, operators, parens, dots.
static EXPR_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9+\-*/%().\s]+").expect("valid regex"));

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CalcError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("division by zero")]
    DivisionByZero,
}

/// Longest arithmetic-looking span in the utterance, or `None` when the
/// text contains nothing that could be a calculation.
pub fn extract_expression(text: &str) -> Option<String> {
    EXPR_SPAN_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| s.chars().any(|c| c.is_ascii_digit()))
        .max_by_key(|s| s.len())
        .map(|s| s.to_string())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal.parse::<f64>().map_err(|_| CalcError::UnexpectedToken)?;
                tokens.push(Token::Number(value));
            }
            'a'..='z' | 'A'..='Z' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphabetic() {
                        ident.push(d.to_ascii_lowercase());
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(CalcError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), CalcError> {
        match self.next() {
            Some(ref t) if t == expected => Ok(()),
            Some(_) => Err(CalcError::UnexpectedToken),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Plus => {
                    self.next();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Star => {
                    self.next();
                    value *= self.unary()?;
                }
                Token::Slash => {
                    self.next();
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= rhs;
                }
                Token::Percent => {
                    self.next();
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value %= rhs;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // unary := '-' unary | primary
    fn unary(&mut self) -> Result<f64, CalcError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.next();
            return Ok(-self.unary()?);
        }
        self.primary()
    }

    // primary := number | 'pi' | 'e' | ('abs' | 'round') '(' expr ')' | '(' expr ')'
    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(v)) => Ok(v),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                "abs" | "round" => {
                    self.expect(&Token::LParen)?;
                    let arg = self.expr()?;
                    self.expect(&Token::RParen)?;
                    Ok(if name == "abs" { arg.abs() } else { arg.round() })
                }
                _ => Err(CalcError::UnknownName(name)),
            },
            Some(_) => Err(CalcError::UnexpectedToken),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression. Any failure — stray characters,
/// unknown names, bad syntax, division by zero — comes back as a
/// `CalcError`, never a panic.
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(CalcError::UnexpectedEnd);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.peek().is_some() {
        return Err(CalcError::UnexpectedToken);
    }
    if !value.is_finite() {
        return Err(CalcError::DivisionByZero);
    }
    Ok(value)
}

/// Shortest display form: integers without a trailing `.0`.
pub fn format_result(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_precedence() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
    }

    #[test]
    fn test_decimals_and_parens() {
        assert_eq!(evaluate("12.5*(3+2)").unwrap(), 62.5);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate("-3+5").unwrap(), 2.0);
        assert_eq!(evaluate("2*-3").unwrap(), -6.0);
    }

    #[test]
    fn test_modulo() {
        assert_eq!(evaluate("10%3").unwrap(), 1.0);
    }

    #[test]
    fn test_constants_and_functions() {
        assert!((evaluate("2*pi").unwrap() - std::f64::consts::TAU).abs() < 1e-12);
        assert_eq!(evaluate("abs(-4)").unwrap(), 4.0);
        assert_eq!(evaluate("round(2.6)").unwrap(), 3.0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("1/0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("5%0"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_rejects_unknown_names() {
        assert_eq!(
            evaluate("__import__('os')"),
            Err(CalcError::UnexpectedChar('_'))
        );
        assert_eq!(
            evaluate("system(1)"),
            Err(CalcError::UnknownName("system".to_string()))
        );
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        assert!(evaluate("2+2)").is_err());
        assert!(evaluate("2 2").is_err());
    }

    #[test]
    fn test_extract_expression() {
        assert_eq!(
            extract_expression("calc 12.5*(3+2)").as_deref(),
            Some("12.5*(3+2)")
        );
        assert_eq!(extract_expression("hello there"), None);
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(62.5), "62.5");
        assert_eq!(format_result(5.0), "5");
    }
}
