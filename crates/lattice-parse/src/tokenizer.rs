//! Formula tokenizer (spec §4.2).
//!
//! Lexing is longest-match with priority BOOL > CELLID > NAME for runs that
//! begin with a letter: the whole alphanumeric run is scanned first, then
//! classified by shape, with one exception forced by context — a run
//! immediately followed by `(` is always a function NAME, since no
//! well-formed `cellref`/`BOOL` is ever called.

use std::fmt;

use lattice_common::CellId;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Bool(bool),
    /// A bare `CELLID`, e.g. `A1`, `$B$3` — sheet-less at this point.
    CellId(CellId),
    /// A identifier run classified as a function name (shape-independent
    /// because it precedes `(`) or because it doesn't fit BOOL/CELLID shape.
    Name(String),
    /// An identifier run immediately followed by `!` — a sheet qualifier.
    SheetName(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Amp,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Colon,
    Comma,
    Bang,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {n}"),
            TokenKind::Str(s) => write!(f, "string {s:?}"),
            TokenKind::Bool(b) => write!(f, "{b}"),
            TokenKind::CellId(c) => write!(f, "cell id {c}"),
            TokenKind::Name(n) => write!(f, "name `{n}`"),
            TokenKind::SheetName(n) => write!(f, "sheet name `{n}`"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Ne => write!(f, "'<>'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenizerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tokenizer error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for TokenizerError {}

/// Strip a leading `=` if present (spec §4.2 — storage keeps it, the parser
/// doesn't need it).
pub fn strip_leading_equals(formula: &str) -> &str {
    formula.strip_prefix('=').unwrap_or(formula)
}

pub fn tokenize(formula: &str) -> Result<Vec<Token>, TokenizerError> {
    Tokenizer::new(formula).run()
}

struct Tokenizer<'a> {
    bytes: &'a [u8],
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Tokenizer {
            bytes: src.as_bytes(),
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn error(&self, message: impl Into<String>) -> TokenizerError {
        TokenizerError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let (line, column) = (self.line, self.column);
            let Some(b) = self.peek() else { break };

            let kind = match b {
                b'+' => {
                    self.advance();
                    TokenKind::Plus
                }
                b'-' => {
                    self.advance();
                    TokenKind::Minus
                }
                b'*' => {
                    self.advance();
                    TokenKind::Star
                }
                b'/' => {
                    self.advance();
                    TokenKind::Slash
                }
                b'^' => {
                    self.advance();
                    TokenKind::Caret
                }
                b'&' => {
                    self.advance();
                    TokenKind::Amp
                }
                b':' => {
                    self.advance();
                    TokenKind::Colon
                }
                b',' => {
                    self.advance();
                    TokenKind::Comma
                }
                b'!' => {
                    self.advance();
                    TokenKind::Bang
                }
                b'(' => {
                    self.advance();
                    TokenKind::LParen
                }
                b')' => {
                    self.advance();
                    TokenKind::RParen
                }
                b'=' => {
                    self.advance();
                    TokenKind::Eq
                }
                b'<' => {
                    self.advance();
                    if self.peek() == Some(b'>') {
                        self.advance();
                        TokenKind::Ne
                    } else if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::Le
                    } else {
                        TokenKind::Lt
                    }
                }
                b'>' => {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::Ge
                    } else {
                        TokenKind::Gt
                    }
                }
                b'"' => self.scan_string()?,
                b'0'..=b'9' => self.scan_number()?,
                b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.scan_number()?,
                b'$' | b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_identifier_like()?,
                other => {
                    return Err(self.error(format!("unexpected character {:?}", other as char)));
                }
            };

            tokens.push(Token { kind, line, column });
        }
        Ok(tokens)
    }

    fn scan_number(&mut self) -> Result<TokenKind, TokenizerError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            let mut lookahead = self.pos + 1;
            if matches!(self.bytes.get(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if matches!(self.bytes.get(lookahead), Some(b'0'..=b'9')) {
                while self.pos < lookahead {
                    self.advance();
                }
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.advance();
                }
            } else {
                self.pos = save;
            }
        }
        let text = &self.src[start..self.pos];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(format!("invalid number literal: {text}")))
    }

    fn scan_string(&mut self) -> Result<TokenKind, TokenizerError> {
        self.advance(); // opening quote
        let content_start = self.pos;
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string literal")),
                Some(b'"') => {
                    if self.peek() == Some(b'"') {
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => {}
            }
        }
        // self.pos now sits just past the closing quote; the raw content,
        // still carrying doubled internal quotes, is the slice in between.
        let raw = &self.src[content_start..self.pos - 1];
        Ok(TokenKind::Str(raw.replace("\"\"", "\"")))
    }

    /// Scan a maximal run of `[A-Za-z0-9_.$]` starting at a letter, `_`, or
    /// `$`, then classify it.
    fn scan_identifier_like(&mut self) -> Result<TokenKind, TokenizerError> {
        let start = self.pos;
        let has_dollar_prefix = self.peek() == Some(b'$');
        if has_dollar_prefix {
            self.advance();
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'$')
        {
            self.advance();
        }
        let text = &self.src[start..self.pos];

        // A run immediately followed by '(' is a function name regardless of
        // shape (e.g. `LOG10(` is the function, not a cell id).
        if self.peek() == Some(b'(') {
            if has_dollar_prefix {
                return Err(self.error(format!("'{text}' is not a valid function name")));
            }
            return Ok(TokenKind::Name(text.to_string()));
        }

        // A run immediately followed by '!' is a sheet qualifier.
        if self.peek() == Some(b'!') {
            if has_dollar_prefix {
                return Err(self.error(format!("'{text}' is not a valid sheet name")));
            }
            return Ok(TokenKind::SheetName(text.to_string()));
        }

        if has_dollar_prefix {
            return parse_cell_id_token(text, self.error(""));
        }

        if text.eq_ignore_ascii_case("TRUE") {
            return Ok(TokenKind::Bool(true));
        }
        if text.eq_ignore_ascii_case("FALSE") {
            return Ok(TokenKind::Bool(false));
        }

        if let Ok(cell) = CellId::parse(text) {
            return Ok(TokenKind::CellId(cell));
        }

        Ok(TokenKind::Name(text.to_string()))
    }
}

fn parse_cell_id_token(text: &str, err: TokenizerError) -> Result<TokenKind, TokenizerError> {
    CellId::parse(text)
        .map(TokenKind::CellId)
        .map_err(|_| TokenizerError {
            message: format!("invalid cell id: {text}"),
            ..err
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            kinds("A1+A2"),
            vec![
                TokenKind::CellId(CellId::parse("A1").unwrap()),
                TokenKind::Plus,
                TokenKind::CellId(CellId::parse("A2").unwrap()),
            ]
        );
    }

    #[test]
    fn lexes_function_name_over_cellid_shape() {
        // "LOG10" has CELLID shape (<=3 letters + digits) but precedes '(' so
        // it must lex as a function name, not a cell id.
        assert_eq!(kinds("LOG10(A1)")[0], TokenKind::Name("LOG10".to_string()));
    }

    #[test]
    fn lexes_bool_over_cellid_and_name() {
        assert_eq!(kinds("TRUE"), vec![TokenKind::Bool(true)]);
        assert_eq!(kinds("false"), vec![TokenKind::Bool(false)]);
    }

    #[test]
    fn lexes_sheet_qualified_ref() {
        assert_eq!(
            kinds("Sheet1!A1"),
            vec![
                TokenKind::SheetName("Sheet1".to_string()),
                TokenKind::CellId(CellId::parse("A1").unwrap()),
            ]
        );
    }

    #[test]
    fn lexes_string_with_escaped_quote() {
        assert_eq!(
            kinds(r#""say ""hi""""#),
            vec![TokenKind::Str("say \"hi\"".to_string())]
        );
    }

    #[test]
    fn lexes_comparison_operators() {
        assert_eq!(kinds("<>"), vec![TokenKind::Ne]);
        assert_eq!(kinds("<="), vec![TokenKind::Le]);
        assert_eq!(kinds(">="), vec![TokenKind::Ge]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt]);
        assert_eq!(kinds(">"), vec![TokenKind::Gt]);
    }

    #[test]
    fn lexes_number_with_exponent() {
        assert_eq!(kinds("3.14e-2"), vec![TokenKind::Number(3.14e-2)]);
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(tokenize("\"abc").is_err());
    }
}
