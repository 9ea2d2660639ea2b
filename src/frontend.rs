//! HCL native syntax → [`Body`].
//!
//! `hcl-edit` does the parsing; this module lowers its lossless syntax tree
//! onto the closed [`ExprKind`] union. Every expression keeps the byte span
//! `hcl-edit` reports for it so the serializer can re-emit anything it does
//! not decompose exactly as written.
use std::ops::Range;

use hcl_edit::expr::{Expression, ObjectKey, TraversalOperator, UnaryOperator};
use hcl_edit::structure::{self, BlockLabel, Structure};
use hcl_edit::template::{Directive, Element, Template};
use hcl_edit::Span as _;
use serde_json::Value;

use crate::error::ParseError;
use crate::model::{
    Block, Body, Conditional, Expr, ExprKind, ForExpr, ObjectItem, Step, TemplatePart, Traversal, UnaryOp,
};

/// Parse a whole HCL file into its root body.
pub fn parse(src: &str) -> Result<Body, ParseError> {
    let parsed = hcl_edit::parser::parse_body(src).map_err(|err| {
        let location = err.location();
        ParseError { message: err.message().to_string(), line: location.line(), column: location.column() }
    })?;
    let body = Lowering { src }.body(&parsed)?;
    tracing::trace!(attributes = body.attributes.len(), blocks = body.blocks.len(), "parsed hcl body");
    Ok(body)
}

// ————————————————————————————————————————————————————————————————————————————
// LOWERING
// ————————————————————————————————————————————————————————————————————————————

struct Lowering<'s> {
    src: &'s str,
}

impl Lowering<'_> {
    fn body(&self, parsed: &structure::Body) -> Result<Body, ParseError> {
        let mut body = Body::new();
        for structure in parsed.iter() {
            match structure {
                Structure::Attribute(attr) => {
                    let name = attr.key.as_str();
                    if body.attributes.contains_key(name) {
                        let offset = attr.key.span().or_else(|| attr.span()).map_or(0, |span| span.start);
                        return Err(ParseError::at(self.src, offset, format!("attribute {name} redefined")));
                    }
                    body.set_attribute(name, self.expr(&attr.value));
                }
                Structure::Block(block) => {
                    let labels = block.labels.iter().map(label).collect();
                    body.push_block(Block::new(block.ident.as_str(), labels, self.body(&block.body)?));
                }
            }
        }
        Ok(body)
    }

    fn expr(&self, expr: &Expression) -> Expr {
        let span = expr.span();
        let kind = match expr {
            Expression::Null(_) => ExprKind::Literal(Value::Null),
            Expression::Bool(b) => ExprKind::Literal(Value::Bool(*b.value())),
            Expression::Number(n) => match number(n.value()) {
                Some(value) => ExprKind::Literal(value),
                None => self.opaque(expr),
            },
            Expression::String(text) => ExprKind::Template(vec![TemplatePart::Literal(text.value().clone())]),
            Expression::Array(array) => ExprKind::Tuple(array.iter().map(|e| self.expr(e)).collect()),
            Expression::Object(object) => ExprKind::Object(
                object
                    .iter()
                    .map(|(key, value)| ObjectItem { key: self.object_key(key), value: self.expr(value.expr()) })
                    .collect(),
            ),
            Expression::StringTemplate(template) => return self.template(template, span, true),
            Expression::HeredocTemplate(heredoc) => return self.template(&heredoc.template, span, true),
            Expression::Variable(name) => ExprKind::Traversal(Traversal { root: name.as_str().to_string(), steps: Vec::new() }),
            Expression::Traversal(traversal) => match self.traversal(traversal) {
                Some(traversal) => ExprKind::Traversal(traversal),
                None => self.opaque(expr),
            },
            Expression::UnaryOp(unary) => {
                let op = match unary.operator.value() {
                    UnaryOperator::Neg => UnaryOp::Negate,
                    UnaryOperator::Not => UnaryOp::Not,
                };
                ExprKind::Unary(op, Box::new(self.expr(&unary.expr)))
            }
            Expression::Conditional(cond) => ExprKind::Conditional(Box::new(Conditional {
                condition: self.expr(&cond.cond_expr),
                then: self.expr(&cond.true_expr),
                otherwise: Some(self.expr(&cond.false_expr)),
            })),
            // binary operations, calls, parentheses, `for` expressions
            _ => self.opaque(expr),
        };
        Expr { kind, span }
    }

    /// Exact source text. Nodes without a span fall back to their encoded form.
    fn opaque(&self, expr: &Expression) -> ExprKind {
        let text = expr.span().and_then(|span| self.src.get(span)).map(str::to_string);
        ExprKind::Opaque(text.unwrap_or_else(|| expr.to_string()))
    }

    /// `root.attr[0]["key"]`. Splats and computed indexes are not decomposed.
    fn traversal(&self, traversal: &hcl_edit::expr::Traversal) -> Option<Traversal> {
        let Expression::Variable(root) = &traversal.expr else {
            return None;
        };
        let steps = traversal
            .operators
            .iter()
            .map(|operator| match operator.value() {
                TraversalOperator::GetAttr(name) => Some(Step::Attr(name.as_str().to_string())),
                TraversalOperator::LegacyIndex(index) => Some(Step::Index(Value::from(*index.value()))),
                TraversalOperator::Index(Expression::Number(n)) => number(n.value()).map(Step::Index),
                TraversalOperator::Index(Expression::String(key)) => Some(Step::Index(Value::String(key.value().clone()))),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Traversal { root: root.as_str().to_string(), steps })
    }

    /// Quoted keys stay templates, so `"${a}"` keeps its interpolation and is
    /// not mistaken for the bare key `a`.
    fn object_key(&self, key: &ObjectKey) -> Expr {
        match key {
            ObjectKey::Ident(ident) => Expr {
                kind: ExprKind::Traversal(Traversal { root: ident.as_str().to_string(), steps: Vec::new() }),
                span: ident.span(),
            },
            ObjectKey::Expression(expr @ Expression::StringTemplate(template)) => {
                self.template(template, expr.span(), false)
            }
            ObjectKey::Expression(expr) => self.expr(expr),
        }
    }

    /// A template holding nothing but one `${…}` is that expression when
    /// `unwrap` is set. An empty template is the empty string.
    fn template(&self, template: &Template, span: Option<Range<usize>>, unwrap: bool) -> Expr {
        if unwrap {
            let mut elements = template.iter();
            if let (Some(Element::Interpolation(interpolation)), None) = (elements.next(), elements.next()) {
                return self.expr(&interpolation.expr);
            }
        }
        let mut parts = Vec::new();
        for element in template.iter() {
            match element {
                Element::Literal(text) => push_literal(&mut parts, text.as_str()),
                Element::Interpolation(interpolation) => parts.push(TemplatePart::Embedded(self.expr(&interpolation.expr))),
                Element::Directive(directive) => parts.push(TemplatePart::Embedded(self.directive(directive))),
            }
        }
        if parts.is_empty() {
            parts.push(TemplatePart::Literal(String::new()));
        }
        Expr { kind: ExprKind::Template(parts), span }
    }

    fn directive(&self, directive: &Directive) -> Expr {
        let kind = match directive {
            Directive::If(directive) => ExprKind::Conditional(Box::new(Conditional {
                condition: self.expr(&directive.if_expr.cond_expr),
                then: self.template(&directive.if_expr.template, None, false),
                otherwise: directive.else_expr.as_ref().map(|e| self.template(&e.template, None, false)),
            })),
            Directive::For(directive) => {
                let intro = &directive.for_expr;
                ExprKind::For(Box::new(ForExpr {
                    key_var: intro.key_var.as_ref().map(|key| key.as_str().to_string()),
                    value_var: intro.value_var.as_str().to_string(),
                    collection: self.expr(&intro.collection_expr),
                    body: self.template(&intro.template, None, false),
                }))
            }
        };
        Expr::new(kind)
    }
}

// ---- helpers ---- //

fn label(label: &BlockLabel) -> String {
    match label {
        BlockLabel::Ident(ident) => ident.as_str().to_string(),
        BlockLabel::String(text) => text.as_str().to_string(),
    }
}

fn push_literal(parts: &mut Vec<TemplatePart>, text: &str) {
    match parts.last_mut() {
        Some(TemplatePart::Literal(last)) => last.push_str(text),
        _ => parts.push(TemplatePart::Literal(text.to_string())),
    }
}

/// Integers stay exact (i64, then u64); everything else must be a finite f64.
fn number(n: &hcl_edit::Number) -> Option<Value> {
    if n.is_f64() {
        return n.as_f64().and_then(serde_json::Number::from_f64).map(Value::Number);
    }
    n.as_i64().map(Value::from).or_else(|| n.as_u64().map(Value::from))
}
