//! Scanner that lifts attribute-annotated declarations and freestanding
//! macro expressions out of a token stream

use super::ast::{
    Argument, AttachedSite, AttributeSyntax, DeclSyntax, ExprSyntax, FreestandingSyntax,
    Mutability, NominalKind, PatternBinding, SourceFileSyntax, TypeDecl, TypeSyntax, VariableDecl,
};
use super::lexer::{LexError, Lexer, Token, TokenKind};
use super::SourceRange;

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "fileprivate",
    "internal",
    "package",
    "open",
    "static",
    "final",
    "override",
    "mutating",
    "nonmutating",
    "lazy",
    "weak",
    "unowned",
    "nonisolated",
    "dynamic",
    "required",
    "convenience",
    "optional",
    "indirect",
    "distributed",
];

const OTHER_DECL_KEYWORDS: &[&str] = &[
    "func",
    "init",
    "deinit",
    "subscript",
    "typealias",
    "associatedtype",
    "case",
    "import",
    "operator",
    "macro",
    "precedencegroup",
];

/// Tokenize and scan `source`
pub fn parse_source(source: &str) -> Result<SourceFileSyntax, LexError> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(Scanner::new(source, &tokens).scan())
}

/// A type body the cursor is inside of
struct Scope {
    name: Option<String>,
    end: usize,
}

struct Scanner<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    scopes: Vec<Scope>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Scanner {
            source,
            tokens,
            pos: 0,
            scopes: Vec::new(),
        }
    }

    fn scan(mut self) -> SourceFileSyntax {
        let mut file = SourceFileSyntax::default();
        while self.pos < self.tokens.len() {
            self.leave_closed_scopes();
            if self.at_attribute() {
                if let Some(site) = self.attached_site() {
                    file.declarations.push(site);
                }
            } else if self.at_freestanding() {
                let resume = self.pos + 2;
                if let Some(expr) = self.freestanding() {
                    file.freestanding.push(expr);
                }
                self.pos = resume;
            } else if let Some(kind) = self.at_type_keyword() {
                let keyword_end = self.tokens[self.pos].range.end;
                self.pos += 1;
                let (ty, _) = self.type_decl(kind, Vec::new(), keyword_end);
                self.enter(&ty);
            } else {
                self.pos += 1;
            }
        }
        file
    }

    fn leave_closed_scopes(&mut self) {
        let Some(offset) = self.peek().map(|t| t.range.start) else {
            return;
        };
        while self.scopes.last().is_some_and(|scope| scope.end <= offset) {
            self.scopes.pop();
        }
    }

    fn enter(&mut self, ty: &TypeDecl) {
        if let Some(body) = ty.body {
            self.scopes.push(Scope {
                name: ty.name.clone(),
                end: body.end,
            });
        }
    }

    fn enclosing(&self) -> Vec<String> {
        self.scopes.iter().filter_map(|scope| scope.name.clone()).collect()
    }

    /// A type-introducing keyword followed by the type's name. `class var`
    /// is a modifier, `.class` a member and `import struct` an import.
    fn at_type_keyword(&self) -> Option<NominalKind> {
        let kind = NominalKind::from_keyword(self.peek()?.ident()?)?;
        let name = self.peek_nth(1)?.ident()?;
        let previous = self.pos.checked_sub(1).and_then(|prev| self.tokens.get(prev));
        let not_a_type = previous.is_some_and(|prev| prev.is_punct('.') || prev.is_ident("import"));
        let class_modifier = kind == NominalKind::Class
            && matches!(name, "var" | "let" | "func" | "subscript" | "init");
        (!not_a_type && !class_modifier).then_some(kind)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_punct(c))
    }

    fn text(&self, range: SourceRange) -> &'a str {
        &self.source[range.start..range.end]
    }

    /// `x` immediately followed by an identifier, with no space between
    fn at_adjacent_ident_after(&self, c: char) -> bool {
        match (self.peek(), self.peek_nth(1)) {
            (Some(sigil), Some(next)) => {
                sigil.is_punct(c) && next.ident().is_some() && sigil.range.end == next.range.start
            }
            _ => false,
        }
    }

    fn at_attribute(&self) -> bool {
        self.at_adjacent_ident_after('@')
    }

    fn at_freestanding(&self) -> bool {
        self.at_adjacent_ident_after('#')
    }

    /// Parse an attribute group and the declaration it annotates. On return
    /// the cursor sits where scanning should resume: past a variable's
    /// keyword, inside a type's body, or past whatever was consumed.
    fn attached_site(&mut self) -> Option<AttachedSite> {
        let start = self.peek()?.range.start;
        // Outermost body end, taken before the declaration opens its own
        let outer_end = self.scopes.first().map(|scope| scope.end);
        let mut attributes = Vec::new();
        while self.at_attribute() {
            attributes.push(self.attribute());
        }

        let modifiers = self.modifiers();
        let keyword_token = self.peek()?;
        let keyword = keyword_token.ident()?;

        let (decl, end) = if keyword == "var" || keyword == "let" {
            self.pos += 1;
            let resume = self.pos;
            let mutability = if keyword == "var" {
                Mutability::Var
            } else {
                Mutability::Let
            };
            let bindings = self.bindings();
            self.pos = resume;
            let end = bindings
                .last()
                .map(|b| b.range.end)
                .unwrap_or(keyword_token.range.end);
            let decl = DeclSyntax::Variable(VariableDecl {
                modifiers,
                mutability,
                keyword_range: keyword_token.range,
                bindings,
            });
            (decl, end)
        } else if let Some(kind) = NominalKind::from_keyword(keyword) {
            self.pos += 1;
            let (ty, end) = self.type_decl(kind, modifiers, keyword_token.range.end);
            self.enter(&ty);
            (DeclSyntax::Type(ty), end)
        } else if OTHER_DECL_KEYWORDS.contains(&keyword) {
            self.pos += 1;
            let decl = DeclSyntax::Other {
                keyword: keyword.to_string(),
            };
            (decl, keyword_token.range.end)
        } else {
            return None;
        };

        Some(AttachedSite {
            attributes,
            decl,
            range: SourceRange::new(start, end),
            scope_end: outer_end.unwrap_or(end),
        })
    }

    fn attribute(&mut self) -> AttributeSyntax {
        let start = self.tokens[self.pos].range.start;
        self.pos += 1;
        let (name, mut end) = self.dotted_name();
        let mut arguments = Vec::new();
        if let Some(open) = self.peek() {
            if open.is_punct('(') && open.range.start == end {
                let (args, close) = self.arguments();
                arguments = args;
                end = close;
            }
        }
        AttributeSyntax {
            name,
            arguments,
            range: SourceRange::new(start, end),
        }
    }

    fn freestanding(&mut self) -> Option<FreestandingSyntax> {
        let start = self.peek()?.range.start;
        self.pos += 1;
        let name_token = self.peek()?;
        let name = name_token.ident()?.to_string();
        self.pos += 1;
        let open = self.peek()?;
        if !open.is_punct('(') {
            return None;
        }
        let (arguments, end) = self.arguments();
        Some(FreestandingSyntax {
            name,
            arguments,
            range: SourceRange::new(start, end),
        })
    }

    /// `A.B.C`; returns the last component and the end offset
    fn dotted_name(&mut self) -> (String, usize) {
        let mut name = String::new();
        let mut end = self.peek().map(|t| t.range.start).unwrap_or_default();
        while let Some(token) = self.peek() {
            let Some(ident) = token.ident() else { break };
            name = ident.to_string();
            end = token.range.end;
            self.pos += 1;
            let continues = self.at_punct('.')
                && self.peek_nth(1).is_some_and(|t| t.ident().is_some());
            if !continues {
                break;
            }
            self.pos += 1;
        }
        (name, end)
    }

    fn modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while let Some(token) = self.peek() {
            let Some(ident) = token.ident() else { break };
            let class_modifier = ident == "class"
                && self
                    .peek_nth(1)
                    .and_then(Token::ident)
                    .is_some_and(|next| matches!(next, "var" | "let" | "func" | "subscript"));
            if !MODIFIERS.contains(&ident) && !class_modifier {
                break;
            }
            self.pos += 1;
            let mut modifier = ident.to_string();
            // private(set), unowned(safe)
            if self.at_punct('(') {
                if let Some(range) = self.skip_balanced('(', ')') {
                    modifier.push_str(self.text(range));
                }
            }
            modifiers.push(modifier);
        }
        modifiers
    }

    fn bindings(&mut self) -> Vec<PatternBinding> {
        let mut bindings = Vec::new();
        loop {
            let Some(pattern) = self.peek() else { break };
            let (name, pattern_range) = match &pattern.kind {
                TokenKind::Ident(ident) => {
                    self.pos += 1;
                    let name = (ident != "_").then(|| ident.clone());
                    (name, pattern.range)
                }
                TokenKind::Punct('(') => match self.skip_balanced('(', ')') {
                    Some(range) => (None, range),
                    None => break,
                },
                _ => break,
            };

            let mut end = pattern_range.end;
            let type_annotation = if self.at_punct(':') {
                self.pos += 1;
                self.type_annotation().inspect(|ty| end = ty.range.end)
            } else {
                None
            };

            let mut initializer = None;
            let mut accessor_block = None;
            if self.at_punct('=') {
                self.pos += 1;
                initializer = self.initializer();
                if let Some(expr) = &initializer {
                    end = expr.range.end;
                }
            } else if self.at_punct('{') {
                accessor_block = self.skip_balanced('{', '}');
                if let Some(range) = accessor_block {
                    end = range.end;
                }
            }

            bindings.push(PatternBinding {
                name,
                pattern_range,
                type_annotation,
                initializer,
                accessor_block,
                range: SourceRange::new(pattern_range.start, end),
            });

            if self.at_punct(',') {
                self.pos += 1;
            } else {
                break;
            }
        }
        bindings
    }

    fn type_annotation(&mut self) -> Option<TypeSyntax> {
        let first = self.pos;
        let mut depth = 0usize;
        let mut angles = 0usize;
        while let Some(token) = self.peek() {
            let stops = matches!(token.kind, TokenKind::Punct('=' | '{' | ',' | ';' | '}'))
                || (self.pos > first && token.newline_before);
            if depth == 0 && angles == 0 && stops {
                break;
            }
            match token.kind {
                TokenKind::Punct('(' | '[') => depth += 1,
                TokenKind::Punct(')' | ']') if depth == 0 => break,
                TokenKind::Punct(')' | ']') => depth -= 1,
                TokenKind::Punct('<') => angles += 1,
                TokenKind::Punct('>') if angles > 0 => angles -= 1,
                _ => {}
            }
            self.pos += 1;
        }
        self.span_between(first, self.pos).map(|range| TypeSyntax {
            text: self.text(range).to_string(),
            range,
        })
    }

    fn initializer(&mut self) -> Option<ExprSyntax> {
        let first = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 {
                if matches!(token.kind, TokenKind::Punct(',' | ';')) {
                    break;
                }
                if self.pos > first && token.newline_before && !self.continues_expression(token) {
                    break;
                }
            }
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') if depth == 0 => break,
                TokenKind::Punct(')' | ']' | '}') => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
        self.expr_between(first, self.pos)
    }

    /// Whether a token starting a new line continues the previous expression
    fn continues_expression(&self, token: &Token) -> bool {
        if token.is_punct('.') {
            return true;
        }
        let previous = self.tokens.get(self.pos.wrapping_sub(1));
        previous.is_some_and(|prev| {
            matches!(
                prev.kind,
                TokenKind::Punct('+' | '-' | '*' | '/' | '&' | '|' | '=' | '<' | '>' | '?' | ':')
            )
        })
    }

    fn type_decl(
        &mut self,
        kind: NominalKind,
        modifiers: Vec<String>,
        keyword_end: usize,
    ) -> (TypeDecl, usize) {
        let mut end = keyword_end;
        let name = if self.peek().is_some_and(|t| t.ident().is_some()) {
            let start = self.pos;
            let (last, name_end) = self.dotted_name();
            end = name_end;
            let full = self.span_between(start, self.pos).map(|r| self.text(r).to_string());
            // Extensions keep the full path, nominal types only have one component
            match kind {
                NominalKind::Extension => full,
                _ => Some(last),
            }
        } else {
            None
        };

        if self.at_punct('<') {
            if let Some(range) = self.skip_balanced('<', '>') {
                end = range.end;
            }
        }

        let mut inherited = Vec::new();
        if self.at_punct(':') {
            self.pos += 1;
            let mut depth = 0usize;
            let mut item_start = self.pos;
            while let Some(token) = self.peek() {
                let at_top = depth == 0;
                if at_top && (token.is_punct('{') || token.is_ident("where")) {
                    break;
                }
                match token.kind {
                    TokenKind::Punct('(' | '[' | '<') => depth += 1,
                    TokenKind::Punct(')' | ']' | '>') => depth = depth.saturating_sub(1),
                    TokenKind::Punct(',') if at_top => {
                        inherited.extend(self.item_text(item_start, self.pos));
                        item_start = self.pos + 1;
                    }
                    _ => {}
                }
                end = token.range.end;
                self.pos += 1;
            }
            inherited.extend(self.item_text(item_start, self.pos));
        }

        // Skip a generic where clause
        while let Some(token) = self.peek() {
            if token.is_punct('{') {
                break;
            }
            end = token.range.end;
            self.pos += 1;
        }

        let body = if self.at_punct('{') {
            let open_pos = self.pos;
            let body = self.skip_balanced('{', '}');
            // Resume scanning inside the body
            self.pos = open_pos + 1;
            body
        } else {
            None
        };
        if let Some(range) = body {
            end = range.end;
        }

        let decl = TypeDecl {
            kind,
            modifiers,
            name,
            inherited,
            body,
            enclosing: self.enclosing(),
        };
        (decl, end)
    }

    fn item_text(&self, first: usize, last: usize) -> Option<String> {
        self.span_between(first, last)
            .map(|range| self.text(range).trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// Parse `( ... )` as a call argument list; returns the arguments and the
    /// offset just past the closing parenthesis.
    fn arguments(&mut self) -> (Vec<Argument>, usize) {
        let open = self.pos;
        let close_range = self.skip_balanced('(', ')');
        let close_index = self.pos.saturating_sub(1);
        let end = close_range.map(|r| r.end).unwrap_or_else(|| {
            self.tokens
                .get(close_index)
                .map(|t| t.range.end)
                .unwrap_or_default()
        });

        let inner_end = if close_range.is_some() {
            close_index
        } else {
            self.pos
        };
        let mut arguments = Vec::new();
        let mut depth = 0usize;
        let mut item_start = open + 1;
        for index in open + 1..=inner_end {
            let at_separator = match self.tokens.get(index).map(|t| &t.kind) {
                Some(TokenKind::Punct('(' | '[' | '{')) => {
                    depth += 1;
                    false
                }
                Some(TokenKind::Punct(')' | ']' | '}')) if depth > 0 => {
                    depth -= 1;
                    false
                }
                Some(TokenKind::Punct(',')) => depth == 0,
                _ => false,
            };
            if at_separator || index == inner_end {
                arguments.extend(self.argument(item_start, index));
                item_start = index + 1;
            }
        }
        (arguments, end)
    }

    fn argument(&self, first: usize, last: usize) -> Option<Argument> {
        let range = self.span_between(first, last)?;
        let labelled = last - first >= 2
            && self.tokens[first].ident().is_some()
            && self.tokens[first + 1].is_punct(':');
        let (label, value_first) = if labelled {
            (self.tokens[first].ident().map(str::to_string), first + 2)
        } else {
            (None, first)
        };
        // `label:` with nothing after it keeps an empty value
        let value = match self.expr_between(value_first, last) {
            Some(value) => value,
            None if labelled => ExprSyntax {
                text: String::new(),
                range: SourceRange::empty(range.end),
                string_literal: None,
            },
            None => return None,
        };
        Some(Argument {
            label,
            value,
            range,
        })
    }

    fn expr_between(&self, first: usize, last: usize) -> Option<ExprSyntax> {
        let range = self.span_between(first, last)?;
        let string_literal = match &self.tokens[first..last] {
            [Token {
                kind: TokenKind::Str { value },
                ..
            }] => value.clone(),
            _ => None,
        };
        Some(ExprSyntax {
            text: self.text(range).to_string(),
            range,
            string_literal,
        })
    }

    /// Source range covering tokens `first..last`
    fn span_between(&self, first: usize, last: usize) -> Option<SourceRange> {
        if first >= last {
            return None;
        }
        let start = self.tokens.get(first)?.range.start;
        let end = self.tokens.get(last - 1)?.range.end;
        Some(SourceRange::new(start, end))
    }

    /// Skip from an opening delimiter to its match. Returns `None` and stops
    /// at the end of input when the delimiter is never closed.
    fn skip_balanced(&mut self, open: char, close: char) -> Option<SourceRange> {
        let start = self.peek()?.range.start;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    return Some(SourceRange::new(start, token.range.end));
                }
            }
        }
        None
    }
}
