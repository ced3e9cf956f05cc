use super::SourceRange;
use crate::access::AccessLevel;

/// An expression kept as source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprSyntax {
    pub text: String,
    pub range: SourceRange,
    /// Set when the expression is exactly one non-interpolated string literal
    pub string_literal: Option<String>,
}

impl ExprSyntax {
    /// `.name` member access, e.g. an access level written as `.public`
    pub fn member_access(&self) -> Option<&str> {
        let name = self.text.strip_prefix('.')?;
        let is_ident = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        is_ident.then_some(name)
    }

    /// String literal contents or a bare `.member` name
    pub fn string_or_member(&self) -> Option<&str> {
        self.string_literal.as_deref().or_else(|| self.member_access())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: ExprSyntax,
    pub range: SourceRange,
}

/// `@Name` or `@Name(arguments)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSyntax {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub range: SourceRange,
}

impl AttributeSyntax {
    pub fn argument(&self, label: &str) -> Option<&ExprSyntax> {
        self.arguments
            .iter()
            .find(|arg| arg.label.as_deref() == Some(label))
            .map(|arg| &arg.value)
    }
}

/// `#name(arguments)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreestandingSyntax {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntax {
    pub text: String,
    pub range: SourceRange,
}

impl TypeSyntax {
    /// The wrapped type when this is `T?` or `Optional<T>`
    pub fn optional_wrapped(&self) -> Option<&str> {
        let text = self.text.trim();
        if let Some(inner) = text.strip_suffix('?') {
            let inner = inner.trim();
            let unwrapped = strip_parens(inner);
            // `(A) -> B?` is a function returning an optional
            if unwrapped.len() == inner.len() && inner.contains("->") {
                return None;
            }
            return Some(unwrapped);
        }
        text.strip_prefix("Optional<")
            .and_then(|rest| rest.strip_suffix('>'))
            .map(str::trim)
    }

    /// Spelling of this type with a trailing `?`
    pub fn made_optional(&self) -> String {
        let text = self.text.trim();
        let needs_parens = text.contains("->")
            || text.contains('&')
            || text.starts_with("some ")
            || text.starts_with("any ");
        if needs_parens {
            format!("({text})?")
        } else {
            format!("{text}?")
        }
    }
}

/// `(T)` → `T` when the parentheses wrap the whole type
fn strip_parens(text: &str) -> &str {
    let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        return text;
    };
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return text;
        }
    }
    inner
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Var,
    Let,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternBinding {
    /// `None` for tuple or wildcard patterns
    pub name: Option<String>,
    pub pattern_range: SourceRange,
    pub type_annotation: Option<TypeSyntax>,
    pub initializer: Option<ExprSyntax>,
    pub accessor_block: Option<SourceRange>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub modifiers: Vec<String>,
    pub mutability: Mutability,
    pub keyword_range: SourceRange,
    pub bindings: Vec<PatternBinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominalKind {
    Struct,
    Class,
    Enum,
    Actor,
    Protocol,
    Extension,
}

impl NominalKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "struct" => NominalKind::Struct,
            "class" => NominalKind::Class,
            "enum" => NominalKind::Enum,
            "actor" => NominalKind::Actor,
            "protocol" => NominalKind::Protocol,
            "extension" => NominalKind::Extension,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: NominalKind,
    pub modifiers: Vec<String>,
    pub name: Option<String>,
    pub inherited: Vec<String>,
    pub body: Option<SourceRange>,
    /// Names of the types this one is nested in, outermost first
    pub enclosing: Vec<String>,
}

impl TypeDecl {
    /// Whether the inheritance clause names `capability`, qualified or not
    pub fn inherits(&self, capability: &str) -> bool {
        self.inherited.iter().any(|inherited| {
            inherited
                .rsplit('.')
                .next()
                .is_some_and(|last| last.trim() == capability)
        })
    }

    /// `Outer.Inner` path that names this type from file scope
    pub fn qualified_name(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        let mut path = self.enclosing.clone();
        path.push(name.to_string());
        Some(path.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclSyntax {
    Variable(VariableDecl),
    Type(TypeDecl),
    /// func, init, typealias, ...; only the introducing keyword is kept
    Other { keyword: String },
}

impl DeclSyntax {
    pub fn modifiers(&self) -> &[String] {
        match self {
            DeclSyntax::Variable(var) => &var.modifiers,
            DeclSyntax::Type(ty) => &ty.modifiers,
            DeclSyntax::Other { .. } => &[],
        }
    }

    /// Explicit access modifier, or `internal`
    pub fn access_level(&self) -> AccessLevel {
        AccessLevel::from_modifiers(self.modifiers())
    }
}

/// A declaration together with its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedSite {
    pub attributes: Vec<AttributeSyntax>,
    pub decl: DeclSyntax,
    /// From the first attribute to the end of the declaration
    pub range: SourceRange,
    /// End of the outermost type body around the declaration, or
    /// `range.end` at file scope
    pub scope_end: usize,
}

/// Everything the scanner found in one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileSyntax {
    pub declarations: Vec<AttachedSite>,
    pub freestanding: Vec<FreestandingSyntax>,
}
