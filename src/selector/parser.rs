//! Selector Parser
//!
//! Parses token streams into an unresolved selector: steps still carry raw
//! namespace prefixes, resolved later by the compiler against the
//! configuration's namespace map.
//!
//! Grammar:
//! ```text
//! selector  := '/'? step ('/' step)*
//! step      := [prefix ':'] (localName | '*') ('[' predicates ']')*
//! predicates:= predicate ((',' | 'and') predicate)*
//! predicate := '@' [prefix ':'] name '=' value
//!            | 'text()' '=' value
//!            | integer
//! value     := quoted-literal | number
//! ```

use super::lexer::{Lexer, Token};
use super::NameTest;

/// Unresolved selector path
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSelector {
    pub absolute: bool,
    pub steps: Vec<ParsedStep>,
}

/// One step with its prefix still unresolved
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStep {
    pub prefix: Option<String>,
    pub name: NameTest,
    pub predicates: Vec<ParsedPredicate>,
}

/// One predicate with attribute prefixes still unresolved
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPredicate {
    AttributeEquals {
        prefix: Option<String>,
        name: String,
        value: String,
    },
    TextEquals {
        value: String,
    },
    PositionIndex(usize),
}

/// Parse selector text
pub fn parse(text: &str) -> Result<ParsedSelector, String> {
    let tokens = Lexer::new(text).tokenize();
    let mut parser = Parser { tokens, pos: 0 };

    let absolute = parser.eat(&Token::Slash);
    let mut steps = vec![parser.parse_step()?];
    while parser.eat(&Token::Slash) {
        steps.push(parser.parse_step()?);
    }

    match parser.next() {
        Token::Eof => {}
        other => return Err(format!("unexpected trailing token {:?}", other)),
    }

    Ok(ParsedSelector { absolute, steps })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn next(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_step(&mut self) -> Result<ParsedStep, String> {
        let (prefix, name) = match self.next() {
            Token::Name(local) => (None, NameTest::Name(local)),
            Token::Star => (None, NameTest::Any),
            Token::QName { prefix, local } => {
                let test = if local == "*" {
                    NameTest::Any
                } else {
                    NameTest::Name(local)
                };
                (Some(prefix), test)
            }
            other => return Err(format!("expected an element name, found {:?}", other)),
        };

        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            loop {
                predicates.push(self.parse_predicate()?);
                if self.eat(&Token::Comma) || self.eat(&Token::And) {
                    continue;
                }
                break;
            }
            if !self.eat(&Token::RBracket) {
                return Err("expected ']' to close a predicate list".to_string());
            }
        }

        Ok(ParsedStep {
            prefix,
            name,
            predicates,
        })
    }

    fn parse_predicate(&mut self) -> Result<ParsedPredicate, String> {
        match self.next() {
            Token::At => {
                let (prefix, name) = match self.next() {
                    Token::Name(name) => (None, name),
                    Token::QName { prefix, local } => (Some(prefix), local),
                    other => {
                        return Err(format!(
                            "expected an attribute name after '@', found {:?}",
                            other
                        ))
                    }
                };
                if !self.eat(&Token::Eq) {
                    return Err("expected '=' in an attribute predicate".to_string());
                }
                let value = self.parse_value()?;
                Ok(ParsedPredicate::AttributeEquals {
                    prefix,
                    name,
                    value,
                })
            }
            Token::TextFn => {
                if !self.eat(&Token::Eq) {
                    return Err("expected '=' after 'text()'".to_string());
                }
                let value = self.parse_value()?;
                Ok(ParsedPredicate::TextEquals { value })
            }
            Token::Number(raw) => {
                let index: usize = raw
                    .parse()
                    .map_err(|_| format!("invalid position index '{}'", raw))?;
                if index == 0 {
                    return Err("position predicates are 1-based".to_string());
                }
                Ok(ParsedPredicate::PositionIndex(index))
            }
            other => Err(format!("unexpected predicate token {:?}", other)),
        }
    }

    fn parse_value(&mut self) -> Result<String, String> {
        match self.next() {
            Token::Literal(value) => Ok(value),
            Token::Number(raw) => Ok(raw),
            other => Err(format!(
                "expected a quoted literal or number, found {:?}",
                other
            )),
        }
    }
}
