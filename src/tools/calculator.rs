//! Calculator tool - arithmetic expressions and unit conversion
//!
//! Expressions are evaluated with a tokenizer and recursive-descent parser
//! over numbers and `+ - * / ( )` plus unary sign; there is no dynamic code
//! evaluation anywhere in this path.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

/// Lexical token of an arithmetic expression
#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, HandlerError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

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
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| HandlerError::invalid(format!("invalid number: {}", literal)))?;
                tokens.push(Token::Number(number));
            }
            other => {
                return Err(HandlerError::invalid(format!("unexpected character: {}", other)));
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent evaluator
///
/// Grammar:
///   expression := term (('+' | '-') term)*
///   term       := factor (('*' | '/') factor)*
///   factor     := NUMBER | '(' expression ')' | ('+' | '-') factor
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expression(&mut self) -> Result<f64, HandlerError> {
        let mut value = self.term()?;

        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    fn term(&mut self) -> Result<f64, HandlerError> {
        let mut value = self.factor()?;

        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(HandlerError::invalid("division by zero"));
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, HandlerError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(HandlerError::invalid("missing closing parenthesis")),
                }
            }
            Some(token) => Err(HandlerError::invalid(format!("unexpected token: {:?}", token))),
            None => Err(HandlerError::invalid("unexpected end of expression")),
        }
    }
}

/// Evaluate an arithmetic expression
fn evaluate(expression: &str) -> Result<f64, HandlerError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(HandlerError::invalid("empty expression"));
    }

    let mut parser = Parser::new(tokens);
    let value = parser.expression()?;

    if parser.peek().is_some() {
        return Err(HandlerError::invalid("trailing input after expression"));
    }

    Ok(value)
}

/// Conversion factor to the base unit (meters or grams)
fn unit_factor(unit: &str) -> Option<f64> {
    match unit {
        // Length (meters)
        "m" => Some(1.0),
        "km" => Some(1000.0),
        "cm" => Some(0.01),
        "mm" => Some(0.001),
        "ft" => Some(0.3048),
        "in" => Some(0.0254),
        "mi" => Some(1609.34),
        // Weight (grams)
        "g" => Some(1.0),
        "kg" => Some(1000.0),
        "mg" => Some(0.001),
        "lb" => Some(453.592),
        "oz" => Some(28.3495),
        _ => None,
    }
}

fn is_temperature_unit(unit: &str) -> bool {
    matches!(unit, "c" | "f" | "k")
}

fn convert_temperature(value: f64, from_unit: &str, to_unit: &str) -> Result<f64, HandlerError> {
    let celsius = match from_unit {
        "c" => value,
        "f" => (value - 32.0) * 5.0 / 9.0,
        "k" => value - 273.15,
        other => return Err(HandlerError::invalid(format!("unknown temperature unit: {}", other))),
    };

    match to_unit {
        "c" => Ok(celsius),
        "f" => Ok(celsius * 9.0 / 5.0 + 32.0),
        "k" => Ok(celsius + 273.15),
        other => Err(HandlerError::invalid(format!("unknown temperature unit: {}", other))),
    }
}

fn convert(value: f64, from_unit: &str, to_unit: &str) -> Result<f64, HandlerError> {
    let from_unit = from_unit.to_lowercase();
    let to_unit = to_unit.to_lowercase();

    if is_temperature_unit(&from_unit) || is_temperature_unit(&to_unit) {
        return convert_temperature(value, &from_unit, &to_unit);
    }

    let from_factor =
        unit_factor(&from_unit).ok_or_else(|| HandlerError::invalid(format!("unknown unit: {}", from_unit)))?;
    let to_factor =
        unit_factor(&to_unit).ok_or_else(|| HandlerError::invalid(format!("unknown unit: {}", to_unit)))?;

    Ok(value * from_factor / to_factor)
}

/// Math tool: calculate, convert, solve
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn description(&self) -> &'static str {
        "Perform mathematical calculations and conversions"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["calculate", "math", "convert", "equation", "plus", "minus", "multiply"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "calculate" | "execute" => {
                let expression = params["expression"]
                    .as_str()
                    .ok_or_else(|| HandlerError::invalid("no expression provided"))?;

                let result = evaluate(expression)?;

                Ok(json!({
                    "action": "calculate",
                    "expression": expression,
                    "result": result
                }))
            }
            "convert" => {
                let value = params["value"]
                    .as_f64()
                    .ok_or_else(|| HandlerError::invalid("missing 'value' parameter"))?;
                let from_unit = params["from_unit"]
                    .as_str()
                    .ok_or_else(|| HandlerError::invalid("missing 'from_unit' parameter"))?;
                let to_unit = params["to_unit"]
                    .as_str()
                    .ok_or_else(|| HandlerError::invalid("missing 'to_unit' parameter"))?;

                let result = convert(value, from_unit, to_unit)?;

                Ok(json!({
                    "action": "convert",
                    "value": value,
                    "from_unit": from_unit,
                    "to_unit": to_unit,
                    "result": (result * 10_000.0).round() / 10_000.0
                }))
            }
            "solve" => {
                let equation = params["equation"].as_str().unwrap_or_default();
                Ok(json!({
                    "action": "solve",
                    "equation": equation,
                    "note": "symbolic solving is not supported; use calculate for numeric expressions"
                }))
            }
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_addition() {
        assert_eq!(evaluate("2 + 3").unwrap(), 5.0);
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("2 * 3 + 4").unwrap(), 10.0);
    }

    #[test]
    fn test_evaluate_parentheses() {
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("((1 + 1) * (2 + 2))").unwrap(), 8.0);
    }

    #[test]
    fn test_evaluate_unary_minus() {
        assert_eq!(evaluate("-5").unwrap(), -5.0);
        assert_eq!(evaluate("3 * -2").unwrap(), -6.0);
        assert_eq!(evaluate("-(2 + 3)").unwrap(), -5.0);
    }

    #[test]
    fn test_evaluate_unary_plus() {
        assert_eq!(evaluate("+5").unwrap(), 5.0);
    }

    #[test]
    fn test_evaluate_decimals() {
        assert!((evaluate("0.1 + 0.2").unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(evaluate("1.5 * 2").unwrap(), 3.0);
    }

    #[test]
    fn test_evaluate_division() {
        assert_eq!(evaluate("10 / 4").unwrap(), 2.5);
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        let err = evaluate("1 / 0").unwrap_err();
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn test_evaluate_left_associative() {
        assert_eq!(evaluate("10 - 3 - 2").unwrap(), 5.0);
        assert_eq!(evaluate("24 / 4 / 2").unwrap(), 3.0);
    }

    #[test]
    fn test_evaluate_empty() {
        assert!(evaluate("").is_err());
        assert!(evaluate("   ").is_err());
    }

    #[test]
    fn test_evaluate_invalid_character() {
        let err = evaluate("2 + x").unwrap_err();
        assert!(err.to_string().contains("unexpected character"));
    }

    #[test]
    fn test_evaluate_trailing_input() {
        assert!(evaluate("2 + 3 4").is_err());
        assert!(evaluate("(2 + 3))").is_err());
    }

    #[test]
    fn test_evaluate_unclosed_paren() {
        let err = evaluate("(2 + 3").unwrap_err();
        assert!(err.to_string().contains("parenthesis"));
    }

    #[test]
    fn test_evaluate_dangling_operator() {
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("* 2").is_err());
    }

    #[test]
    fn test_convert_length() {
        assert!((convert(1.0, "km", "m").unwrap() - 1000.0).abs() < 1e-9);
        assert!((convert(12.0, "in", "ft").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_weight() {
        assert!((convert(1.0, "kg", "g").unwrap() - 1000.0).abs() < 1e-9);
        assert!((convert(16.0, "oz", "lb").unwrap() - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_convert_temperature() {
        assert!((convert(0.0, "c", "f").unwrap() - 32.0).abs() < 1e-9);
        assert!((convert(212.0, "F", "C").unwrap() - 100.0).abs() < 1e-9);
        assert!((convert(0.0, "c", "k").unwrap() - 273.15).abs() < 1e-9);
    }

    #[test]
    fn test_convert_unknown_unit() {
        assert!(convert(1.0, "furlong", "m").is_err());
    }

    #[tokio::test]
    async fn test_execute_calculate() {
        let tool = CalculatorTool::new();
        let result = tool
            .execute("calculate", &json!({"expression": "6 * 7"}))
            .await
            .unwrap();

        assert_eq!(result["result"], 42.0);
        assert_eq!(result["expression"], "6 * 7");
    }

    #[tokio::test]
    async fn test_execute_generic_action_calculates() {
        let tool = CalculatorTool::new();
        let result = tool.execute("execute", &json!({"expression": "1 + 1"})).await.unwrap();
        assert_eq!(result["result"], 2.0);
    }

    #[tokio::test]
    async fn test_execute_calculate_missing_expression() {
        let tool = CalculatorTool::new();
        let err = tool.execute("calculate", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("no expression"));
    }

    #[tokio::test]
    async fn test_execute_convert() {
        let tool = CalculatorTool::new();
        let result = tool
            .execute(
                "convert",
                &json!({"value": 2.0, "from_unit": "km", "to_unit": "mi"}),
            )
            .await
            .unwrap();

        let miles = result["result"].as_f64().unwrap();
        assert!((miles - 1.2427).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_execute_solve_is_informational() {
        let tool = CalculatorTool::new();
        let result = tool.execute("solve", &json!({"equation": "x + 1 = 2"})).await.unwrap();
        assert_eq!(result["action"], "solve");
        assert!(result["note"].as_str().unwrap().contains("not supported"));
    }

    #[tokio::test]
    async fn test_execute_unknown_action() {
        let tool = CalculatorTool::new();
        let err = tool.execute("derive", &json!({})).await.unwrap_err();
        assert!(matches!(err, HandlerError::UnknownAction { .. }));
    }
}
