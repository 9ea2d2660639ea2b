//! Strongly-typed HCL tree shared by both conversion directions.
//!
//! The frontend builds it from source text (every node carries its byte span),
//! the synthesizer builds it from JSON (no spans), the backend renders it and
//! the serializer turns it back into JSON.
use indexmap::IndexMap;
use serde_json::Value;
use std::ops::Range;

pub type Span = Range<usize>;

// ————————————————————————————————————————————————————————————————————————————
// STRUCTURE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub attributes: IndexMap<String, Attribute>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub ty: String,
    pub labels: Vec<String>,
    pub body: Body,
}

impl Body {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.blocks.is_empty()
    }

    /// Sets an attribute. A name that is already present keeps its position
    /// and gets the new expression.
    pub fn set_attribute(&mut self, name: impl Into<String>, expr: Expr) {
        let name = name.into();
        self.attributes.insert(name.clone(), Attribute { name, expr });
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn attribute(&self, name: &str) -> Option<&Expr> {
        self.attributes.get(name).map(|attr| &attr.expr)
    }
}

impl Block {
    pub fn new(ty: impl Into<String>, labels: Vec<String>, body: Body) -> Self {
        Self { ty: ty.into(), labels, body }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

/// An expression node. `span` is `None` for synthesized nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Option<Span>,
}

/// Closed set of expression kinds. Anything the frontend cannot decompose
/// into one of the structured arms lands in `Opaque`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Null, bool, number or string scalar.
    Literal(Value),
    Traversal(Traversal),
    Template(Vec<TemplatePart>),
    Conditional(Box<Conditional>),
    For(Box<ForExpr>),
    Unary(UnaryOp, Box<Expr>),
    Tuple(Vec<Expr>),
    Object(Vec<ObjectItem>),
    /// Verbatim source text, emitted as-is.
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub root: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Attr(String),
    /// `[0]`, `["key"]` or the legacy `.0` form.
    Index(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Embedded(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expr,
    pub then: Expr,
    pub otherwise: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub key_var: Option<String>,
    pub value_var: String,
    pub collection: Expr,
    pub body: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectItem {
    pub key: Expr,
    pub value: Expr,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl Traversal {
    pub fn is_bare(&self) -> bool { self.steps.is_empty() }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self { Self { kind, span: None } }

    pub fn spanned(kind: ExprKind, span: Span) -> Self { Self { kind, span: Some(span) } }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(ExprKind::Literal(value.into()))
    }

    /// Quoted string with no interpolation.
    pub fn string(text: impl Into<String>) -> Self {
        Self::new(ExprKind::Template(vec![TemplatePart::Literal(text.into())]))
    }

    /// Bare identifier such as `string` or `count`.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Traversal(Traversal { root: name.into(), steps: Vec::new() }))
    }

    pub fn opaque(text: impl Into<String>) -> Self {
        Self::new(ExprKind::Opaque(text.into()))
    }

    pub fn tuple(elements: Vec<Expr>) -> Self { Self::new(ExprKind::Tuple(elements)) }

    pub fn object(items: Vec<ObjectItem>) -> Self { Self::new(ExprKind::Object(items)) }
}

/// `true` for names usable as a bare attribute name, object key or block label.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut body = Body::new();
        body.set_attribute("a", Expr::literal(1));
        body.set_attribute("b", Expr::literal(2));
        body.set_attribute("a", Expr::literal(3));
        let names: Vec<_> = body.attributes.keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(body.attribute("a"), Some(&Expr::literal(3)));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("aws_instance"));
        assert!(is_identifier("my-bucket"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a.b"));
    }
}
