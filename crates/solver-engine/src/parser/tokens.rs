//! Tokenizer for expression text

use crate::error::ParseError;

/// Infix/prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// Binding power for Pratt parsing
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

impl Token {
    /// Short rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Identifier(name) => name.clone(),
            Token::Operator(op) => op.symbol().to_string(),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
            Token::Comma => ",".to_string(),
        }
    }
}

/// Tokenize expression text
///
/// Accepts both `**` and `^` for exponentiation (SymPy and calculator
/// notation respectively). Numbers may carry a decimal part and a
/// scientific exponent.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        match ch {
            c if c.is_whitespace() => pos += 1,
            '+' => {
                tokens.push(Token::Operator(Operator::Add));
                pos += 1;
            }
            '-' => {
                tokens.push(Token::Operator(Operator::Sub));
                pos += 1;
            }
            '*' => {
                if chars.get(pos + 1) == Some(&'*') {
                    tokens.push(Token::Operator(Operator::Pow));
                    pos += 2;
                } else {
                    tokens.push(Token::Operator(Operator::Mul));
                    pos += 1;
                }
            }
            '/' => {
                tokens.push(Token::Operator(Operator::Div));
                pos += 1;
            }
            '^' => {
                tokens.push(Token::Operator(Operator::Pow));
                pos += 1;
            }
            '(' => {
                tokens.push(Token::LeftParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RightParen);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (token, next) = read_number(&chars, pos)?;
                tokens.push(token);
                pos = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                let name: String = chars[start..pos].iter().collect();
                tokens.push(Token::Identifier(name));
            }
            other => return Err(ParseError::UnknownCharacter { ch: other, pos }),
        }
    }

    Ok(tokens)
}

fn read_number(chars: &[char], start: usize) -> Result<(Token, usize), ParseError> {
    let mut pos = start;
    let mut seen_dot = false;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_ascii_digit() {
            pos += 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            pos += 1;
        } else {
            break;
        }
    }

    // Scientific exponent, only when followed by digits
    if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
        let mut exp_end = pos + 1;
        if exp_end < chars.len() && (chars[exp_end] == '+' || chars[exp_end] == '-') {
            exp_end += 1;
        }
        if exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            pos = exp_end;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let text: String = chars[start..pos].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(text.clone()))?;
    Ok((Token::Number(value), pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_arithmetic() {
        let tokens = tokenize("2 + 3*4").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(2.0),
                Token::Operator(Operator::Add),
                Token::Number(3.0),
                Token::Operator(Operator::Mul),
                Token::Number(4.0),
            ]
        );
    }

    #[test]
    fn tokenize_double_star_power() {
        let tokens = tokenize("x**2").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("x".to_string()),
                Token::Operator(Operator::Pow),
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn caret_is_power() {
        assert_eq!(tokenize("x^2").unwrap(), tokenize("x**2").unwrap());
    }

    #[test]
    fn tokenize_scientific_number() {
        let tokens = tokenize("1.5e3").unwrap();
        assert_eq!(tokens, vec![Token::Number(1500.0)]);
    }

    #[test]
    fn tokenize_function_call() {
        let tokens = tokenize("sin(x)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("sin".to_string()),
                Token::LeftParen,
                Token::Identifier("x".to_string()),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn unknown_character_is_error() {
        let err = tokenize("2 @ 3").unwrap_err();
        assert_eq!(err, ParseError::UnknownCharacter { ch: '@', pos: 2 });
    }
}
