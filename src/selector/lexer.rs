//! Selector Lexer
//!
//! Tokenizes selector text into tokens.

/// Selector token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Slash,    // /
    At,       // @
    Eq,       // =
    Star,     // *
    Comma,    // ,
    And,      // and
    LBracket, // [
    RBracket, // ]

    /// text()
    TextFn,

    /// NCName
    Name(String),
    /// prefix:local or prefix:*
    QName { prefix: String, local: String },
    /// Bare number, kept as written
    Number(String),
    /// Quoted literal, either quote character
    Literal(String),

    Eof,
}

/// Selector lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Get the remaining input
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current character
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '/' => {
                self.advance(1);
                Token::Slash
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '*' => {
                self.advance(1);
                Token::Star
            }
            ',' => {
                self.advance(1);
                Token::Comma
            }
            '[' => {
                self.advance(1);
                Token::LBracket
            }
            ']' => {
                self.advance(1);
                Token::RBracket
            }
            '"' | '\'' => self.read_literal(),
            '0'..='9' => self.read_number(),
            _ if is_name_start_char(c) => self.read_name(),
            _ => {
                // Invalid character; the parser reports it
                self.advance(c.len_utf8());
                Token::Name(c.to_string())
            }
        }
    }

    /// Read a number literal, kept as written
    fn read_number(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance(1);
            } else {
                break;
            }
        }

        if self.peek() == Some('.') {
            self.advance(1);
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance(1);
                } else {
                    break;
                }
            }
        }

        Token::Number(self.input[start..self.pos].to_string())
    }

    /// Read a quoted literal
    fn read_literal(&mut self) -> Token {
        // Caller guarantees peek() matched a quote char.
        let quote = self.peek().unwrap_or('"');
        self.advance(1); // Skip opening quote

        let start = self.pos;

        while let Some(c) = self.peek() {
            if c == quote {
                break;
            }
            self.advance(c.len_utf8());
        }

        let value = self.input[start..self.pos].to_string();
        self.advance(1); // Skip closing quote

        Token::Literal(value)
    }

    /// Read a name, keyword, qualified name, or node-type function
    fn read_name(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }

        let name = &self.input[start..self.pos];

        if name == "and" {
            return Token::And;
        }

        if name == "text" && self.remaining().starts_with("()") {
            self.advance(2);
            return Token::TextFn;
        }

        // Check for namespace prefix
        if self.peek() == Some(':') {
            self.advance(1); // Skip ':'
            if self.peek() == Some('*') {
                self.advance(1);
                return Token::QName {
                    prefix: name.to_string(),
                    local: "*".to_string(),
                };
            }

            let local_start = self.pos;
            while let Some(c) = self.peek() {
                if is_name_char(c) {
                    self.advance(c.len_utf8());
                } else {
                    break;
                }
            }
            return Token::QName {
                prefix: name.to_string(),
                local: self.input[local_start..self.pos].to_string(),
            };
        }

        Token::Name(name.to_string())
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
