//! Tokenizer for the subset of Swift the scanner needs

use thiserror::Error;

use super::{LineColumn, LineIndex, SourceRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword; back-ticks are stripped
    Ident(String),
    /// String literal; `value` is `None` when the literal interpolates
    Str { value: Option<String> },
    Number,
    Arrow,
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: SourceRange,
    /// First token on its line
    pub newline_before: bool,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(ident) if ident == name)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct LexError {
    pub location: LineColumn,
    pub message: String,
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    newline_before: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            newline_before: true,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> LexError {
        LexError {
            location: LineIndex::new(self.source).location(self.source, offset),
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.newline_before = true;
                    self.bump();
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            if self.rest().starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if self.rest().starts_with("*/") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            } else {
                match self.bump() {
                    Some('\n') => self.newline_before = true,
                    Some(_) => {}
                    None => return Err(self.error(start, "unterminated block comment")),
                }
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '"' => self.string(0)?,
            '#' if self.raw_string_hashes().is_some() => {
                let hashes = self.raw_string_hashes().unwrap_or(0);
                self.pos += hashes;
                self.string(hashes)?
            }
            '`' => {
                self.bump();
                let ident_start = self.pos;
                while !matches!(self.peek(), None | Some('`') | Some('\n')) {
                    self.bump();
                }
                if self.peek() != Some('`') {
                    return Err(self.error(start, "unterminated back-ticked identifier"));
                }
                let ident = self.source[ident_start..self.pos].to_string();
                self.bump();
                TokenKind::Ident(ident)
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$')
                {
                    self.bump();
                }
                TokenKind::Ident(self.source[start..self.pos].to_string())
            }
            c if c.is_ascii_digit() => {
                self.number();
                TokenKind::Number
            }
            '-' if self.peek_at(1) == Some('>') => {
                self.pos += 2;
                TokenKind::Arrow
            }
            _ => {
                self.bump();
                TokenKind::Punct(c)
            }
        };

        let newline_before = std::mem::replace(&mut self.newline_before, false);
        Ok(Some(Token {
            kind,
            range: SourceRange::new(start, self.pos),
            newline_before,
        }))
    }

    fn number(&mut self) {
        while let Some(c) = self.peek() {
            let fraction = c == '.' && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == '_' || fraction {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Number of `#` before a raw string's opening quote
    fn raw_string_hashes(&self) -> Option<usize> {
        let rest = self.rest();
        let hashes = rest.len() - rest.trim_start_matches('#').len();
        (hashes > 0 && rest[hashes..].starts_with('"')).then_some(hashes)
    }

    /// Lex a string literal starting at the opening quote; `hashes` raw-string
    /// delimiters have already been consumed.
    fn string(&mut self, hashes: usize) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let closing_hashes = "#".repeat(hashes);
        let multiline = self.rest().starts_with("\"\"\"");
        let quote = if multiline { "\"\"\"" } else { "\"" };
        self.pos += quote.len();
        let terminator = format!("{quote}{closing_hashes}");
        let escape = format!("\\{closing_hashes}");

        let mut value = String::new();
        let mut interpolated = false;
        loop {
            if self.rest().starts_with(&terminator) {
                self.pos += terminator.len();
                break;
            }
            if self.rest().starts_with(&escape) {
                self.pos += escape.len();
                match self.bump() {
                    Some('(') => {
                        interpolated = true;
                        self.skip_interpolation(start)?;
                    }
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('u') if self.peek() == Some('{') => value.push(self.unicode_escape(start)?),
                    Some('\n') if multiline => {}
                    Some(other) => value.push(other),
                    None => return Err(self.error(start, "unterminated string literal")),
                }
                continue;
            }
            match self.bump() {
                Some('\n') if !multiline => {
                    return Err(self.error(start, "unterminated string literal"))
                }
                Some(c) => value.push(c),
                None => return Err(self.error(start, "unterminated string literal")),
            }
        }

        if multiline {
            value = strip_multiline_indentation(&value);
        }
        Ok(TokenKind::Str {
            value: (!interpolated).then_some(value),
        })
    }

    fn skip_interpolation(&mut self, string_start: usize) -> Result<(), LexError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some('"') => {
                    self.string(0)?;
                }
                Some('(') => {
                    depth += 1;
                    self.bump();
                }
                Some(')') => {
                    depth -= 1;
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.error(string_start, "unterminated string interpolation")),
            }
        }
        Ok(())
    }

    fn unicode_escape(&mut self, string_start: usize) -> Result<char, LexError> {
        self.bump();
        let digits_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.bump();
        }
        let digits = &self.source[digits_start..self.pos];
        if self.bump() != Some('}') {
            return Err(self.error(string_start, "malformed unicode escape"));
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(string_start, "malformed unicode escape"))
    }
}

/// Multi-line literals drop the first newline and the closing delimiter's
/// indentation from every line.
fn strip_multiline_indentation(raw: &str) -> String {
    let body = raw.strip_prefix('\n').unwrap_or(raw);
    let (body, indent) = match body.rfind('\n') {
        Some(last) if body[last + 1..].trim().is_empty() => (&body[..last], &body[last + 1..]),
        _ => (body, ""),
    };
    body.lines()
        .map(|line| line.strip_prefix(indent).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.to_string())
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            kinds("@Foo var `default`: Int? = 5"),
            vec![
                TokenKind::Punct('@'),
                ident("Foo"),
                ident("var"),
                ident("default"),
                TokenKind::Punct(':'),
                ident("Int"),
                TokenKind::Punct('?'),
                TokenKind::Punct('='),
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped_and_newlines_tracked() {
        let tokens = Lexer::new("a /* x /* nested */ y */ b // tail\nc")
            .tokenize()
            .unwrap();
        let idents: Vec<_> = tokens.iter().filter_map(Token::ident).collect();
        assert_eq!(idents, vec!["a", "b", "c"]);
        assert!(tokens[0].newline_before);
        assert!(!tokens[1].newline_before);
        assert!(tokens[2].newline_before);
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            kinds(r#""a\"b\u{41}""#),
            vec![TokenKind::Str {
                value: Some("a\"bA".to_string())
            }]
        );
        assert_eq!(
            kinds(r#""count: \(items.map { "\($0)" }.count)""#),
            vec![TokenKind::Str { value: None }]
        );
        assert_eq!(
            kinds(r##"#"raw \n "quoted""#"##),
            vec![TokenKind::Str {
                value: Some(r#"raw \n "quoted""#.to_string())
            }]
        );
    }

    #[test]
    fn test_multiline_string() {
        let source = "let s = \"\"\"\n    one\n      two\n    \"\"\"";
        let tokens = Lexer::new(source).tokenize().unwrap();
        assert_eq!(
            tokens.last().map(|t| t.kind.clone()),
            Some(TokenKind::Str {
                value: Some("one\n  two".to_string())
            })
        );
    }

    #[test]
    fn test_freestanding_hash_is_punct() {
        assert_eq!(
            kinds("#color(\"fff\")")[..2],
            [TokenKind::Punct('#'), ident("color")]
        );
    }

    #[test]
    fn test_arrow_and_ranges() {
        assert_eq!(
            kinds("() -> 1..<2"),
            vec![
                TokenKind::Punct('('),
                TokenKind::Punct(')'),
                TokenKind::Arrow,
                TokenKind::Number,
                TokenKind::Punct('.'),
                TokenKind::Punct('.'),
                TokenKind::Punct('<'),
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_reports_location() {
        let err = Lexer::new("let a = 1\nlet b = \"oops\n").tokenize().unwrap_err();
        assert_eq!(err.location, LineColumn { line: 2, column: 9 });
        assert_matches!(Lexer::new("/* open").tokenize(), Err(LexError { .. }));
    }
}
