//! [`Body`] → formatted HCL text.
//!
//! The tree is lowered onto `hcl-rs` structures and written with
//! [`hcl::format`]: attributes before blocks, blank lines around blocks,
//! two-space indentation. Nodes `hcl-rs` has no exact counterpart for (number
//! literals, traversals, templates with interpolations, opaque source) are
//! handed over as raw expressions.
use hcl::expr::{Conditional, Expression, ObjectKey, Operation, RawExpression, UnaryOp as HclUnaryOp, UnaryOperator};
use hcl::{BlockLabel, Identifier, Structure};
use serde_json::Value;

use crate::error::Result;
use crate::model::{Body, Expr, ExprKind, Step, TemplatePart, Traversal, UnaryOp, is_identifier};

/// Render a whole document. Non-empty output ends with a newline.
pub fn render(body: &Body) -> Result<String> {
    let mut text = hcl::format::to_string(&lower_body(body)?)?;
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Render one expression as it would appear on the right of `=` at the top
/// level.
pub fn render_expr(expr: &Expr) -> Result<String> {
    Ok(hcl::format::to_string(&lower(expr)?)?)
}

// ————————————————————————————————————————————————————————————————————————————
// LOWERING
// ————————————————————————————————————————————————————————————————————————————

fn lower_body(body: &Body) -> Result<hcl::Body> {
    let mut structures = Vec::with_capacity(body.attributes.len() + body.blocks.len());
    for attr in body.attributes.values() {
        let key = Identifier::unchecked(attr.name.as_str());
        structures.push(Structure::Attribute(hcl::Attribute::new(key, lower(&attr.expr)?)));
    }
    for block in &body.blocks {
        structures.push(Structure::Block(hcl::Block {
            identifier: Identifier::unchecked(block.ty.as_str()),
            labels: block.labels.iter().cloned().map(BlockLabel::String).collect(),
            body: lower_body(&block.body)?,
        }));
    }
    Ok(hcl::Body(structures))
}

fn lower(expr: &Expr) -> Result<Expression> {
    let lowered = match &expr.kind {
        ExprKind::Literal(value) => literal(value),
        ExprKind::Traversal(traversal) => raw(traversal_text(traversal)),
        ExprKind::Template(parts) => match parts.as_slice() {
            [] => Expression::String(String::new()),
            [TemplatePart::Literal(text)] => Expression::String(text.clone()),
            _ => raw(format!("\"{}\"", template_text(parts)?)),
        },
        ExprKind::Conditional(cond) => {
            let otherwise = match &cond.otherwise {
                Some(otherwise) => lower(otherwise)?,
                None => Expression::Null,
            };
            Expression::Conditional(Box::new(Conditional::new(lower(&cond.condition)?, lower(&cond.then)?, otherwise)))
        }
        ExprKind::For(_) => {
            let mut text = String::new();
            directive(&mut text, expr)?;
            raw(format!("\"{text}\""))
        }
        ExprKind::Unary(op, operand) => {
            let operator = match op {
                UnaryOp::Negate => UnaryOperator::Neg,
                UnaryOp::Not => UnaryOperator::Not,
            };
            Expression::Operation(Box::new(Operation::Unary(HclUnaryOp::new(operator, lower(operand)?))))
        }
        ExprKind::Tuple(elements) => Expression::Array(elements.iter().map(lower).collect::<Result<_>>()?),
        ExprKind::Object(items) => Expression::Object(
            items
                .iter()
                .map(|item| Ok((object_key(&item.key)?, lower(&item.value)?)))
                .collect::<Result<_>>()?,
        ),
        ExprKind::Opaque(text) => raw(text.clone()),
    };
    Ok(lowered)
}

fn literal(value: &Value) -> Expression {
    match value {
        Value::Null => Expression::Null,
        Value::Bool(b) => Expression::Bool(*b),
        Value::Number(n) => raw(n.to_string()),
        Value::String(text) => Expression::String(text.clone()),
        Value::Array(items) => Expression::Array(items.iter().map(literal).collect()),
        Value::Object(map) => Expression::Object(
            map.iter()
                .map(|(key, value)| (ObjectKey::Expression(Expression::String(key.clone())), literal(value)))
                .collect(),
        ),
    }
}

fn raw(text: String) -> Expression {
    Expression::Raw(RawExpression::new(text))
}

/// Bare when the key is a usable identifier, quoted otherwise.
fn object_key(key: &Expr) -> Result<ObjectKey> {
    let bare = |name: &str| is_identifier(name) && !matches!(name, "for" | "in" | "if");
    let ident = |name: &str| ObjectKey::Identifier(Identifier::unchecked(name));
    let key = match &key.kind {
        ExprKind::Traversal(t) if t.is_bare() && bare(&t.root) => ident(&t.root),
        ExprKind::Traversal(t) if t.is_bare() => ObjectKey::Expression(Expression::String(t.root.clone())),
        ExprKind::Template(parts) => match parts.as_slice() {
            [TemplatePart::Literal(text)] if bare(text) => ident(text),
            _ => ObjectKey::Expression(lower(key)?),
        },
        ExprKind::Literal(Value::String(text)) if bare(text) => ident(text),
        _ => ObjectKey::Expression(lower(key)?),
    };
    Ok(key)
}

// ---- template text ---- //

fn traversal_text(traversal: &Traversal) -> String {
    let mut out = traversal.root.clone();
    for step in &traversal.steps {
        match step {
            Step::Attr(name) => {
                out.push('.');
                out.push_str(name);
            }
            Step::Index(Value::String(key)) => {
                out.push_str("[\"");
                push_escaped(&mut out, key);
                out.push_str("\"]");
            }
            Step::Index(key) => out.push_str(&format!("[{key}]")),
        }
    }
    out
}

/// Template contents without the surrounding quotes.
fn template_text(parts: &[TemplatePart]) -> Result<String> {
    let mut out = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(text) => push_escaped(&mut out, text),
            TemplatePart::Embedded(expr) => match &expr.kind {
                ExprKind::Conditional(_) | ExprKind::For(_) => directive(&mut out, expr)?,
                _ => {
                    out.push_str("${");
                    out.push_str(&render_expr(expr)?);
                    out.push('}');
                }
            },
        }
    }
    Ok(out)
}

fn directive(out: &mut String, expr: &Expr) -> Result<()> {
    match &expr.kind {
        ExprKind::Conditional(cond) => {
            out.push_str(&format!("%{{ if {} }}", render_expr(&cond.condition)?));
            out.push_str(&template_body(&cond.then)?);
            if let Some(otherwise) = &cond.otherwise {
                out.push_str("%{ else }");
                out.push_str(&template_body(otherwise)?);
            }
            out.push_str("%{ endif }");
        }
        ExprKind::For(for_expr) => {
            let vars = match &for_expr.key_var {
                Some(key) => format!("{key}, {}", for_expr.value_var),
                None => for_expr.value_var.clone(),
            };
            out.push_str(&format!("%{{ for {vars} in {} }}", render_expr(&for_expr.collection)?));
            out.push_str(&template_body(&for_expr.body)?);
            out.push_str("%{ endfor }");
        }
        _ => out.push_str(&render_expr(expr)?),
    }
    Ok(())
}

fn template_body(expr: &Expr) -> Result<String> {
    match &expr.kind {
        ExprKind::Template(parts) => template_text(parts),
        _ => template_text(std::slice::from_ref(&TemplatePart::Embedded(expr.clone()))),
    }
}

fn push_escaped(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}
