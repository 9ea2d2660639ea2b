use serde_json::{Map, Number, Value};

use crate::backend;
use crate::model::{Expr, ExprKind, TemplatePart, UnaryOp};

/// Expression → JSON value. Total: anything without a JSON shape becomes an
/// interpolation string holding its source text.
pub(super) struct ExprSerializer<'s> {
    source: &'s str,
}

impl<'s> ExprSerializer<'s> {
    pub fn new(source: &'s str) -> Self { Self { source } }

    pub fn value(&self, expr: &Expr) -> Value {
        match &expr.kind {
            ExprKind::Literal(value) => value.clone(),
            ExprKind::Traversal(traversal) if traversal.is_bare() => Value::String(traversal.root.clone()),
            ExprKind::Unary(op, operand) => match (op, &operand.kind) {
                (UnaryOp::Negate, ExprKind::Literal(Value::Number(n))) => {
                    negate(n).map(Value::Number).unwrap_or_else(|| self.wrap(expr))
                }
                (UnaryOp::Not, ExprKind::Literal(Value::Bool(b))) => Value::Bool(!b),
                _ => self.wrap(expr),
            },
            ExprKind::Template(parts) => Value::String(self.template(parts)),
            ExprKind::Tuple(elements) => Value::Array(elements.iter().map(|e| self.value(e)).collect()),
            ExprKind::Object(items) => {
                let mut map = Map::new();
                for item in items {
                    map.insert(self.key(&item.key), self.value(&item.value));
                }
                Value::Object(map)
            }
            _ => self.wrap(expr),
        }
    }

    /// Object keys: traversals keep their source text, anything else is
    /// read as a string part.
    fn key(&self, key: &Expr) -> String {
        match &key.kind {
            ExprKind::Traversal(_) => self.source_text(key),
            _ => self.string_part(key),
        }
    }

    fn template(&self, parts: &[TemplatePart]) -> String {
        parts
            .iter()
            .map(|part| match part {
                TemplatePart::Literal(text) => escape(text),
                TemplatePart::Embedded(expr) => self.string_part(expr),
            })
            .collect()
    }

    /// An expression embedded in string context.
    fn string_part(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(Value::String(text)) => escape(text),
            ExprKind::Literal(value) => escape(&value.to_string()),
            ExprKind::Template(parts) => self.template(parts),
            ExprKind::Conditional(cond) => {
                let then = self.string_part(&cond.then);
                let otherwise = cond.otherwise.as_ref().map(|e| self.string_part(e)).unwrap_or_default();
                let condition = self.source_text(&cond.condition);
                if otherwise.is_empty() {
                    format!("%{{if {condition}}}{then}%{{endif}}")
                } else {
                    format!("%{{if {condition}}}{then}%{{else}}{otherwise}%{{endif}}")
                }
            }
            ExprKind::For(for_expr) => {
                let vars = match &for_expr.key_var {
                    Some(key) => format!("{key}, {}", for_expr.value_var),
                    None => for_expr.value_var.clone(),
                };
                let collection = self.source_text(&for_expr.collection);
                let body = self.string_part(&for_expr.body);
                format!("%{{for {vars} in {collection}}}{body}%{{endfor}}")
            }
            _ => self.wrap(expr).as_str().map(str::to_string).unwrap_or_default(),
        }
    }

    fn wrap(&self, expr: &Expr) -> Value {
        let text = self.source_text(expr);
        tracing::debug!(expr = %text, "wrapping expression as interpolation");
        Value::String(format!("${{{text}}}"))
    }

    /// Exact source text, or the rendered form for synthesized nodes. A range
    /// that opens more parentheses than it closes takes the `)` right after
    /// it.
    fn source_text(&self, expr: &Expr) -> String {
        let Some(span) = expr.span.clone() else {
            return backend::render_expr(expr).unwrap_or_default();
        };
        let Some(text) = self.source.get(span.clone()) else {
            return backend::render_expr(expr).unwrap_or_default();
        };
        let unbalanced = text.matches('(').count() > text.matches(')').count();
        if unbalanced && self.source.as_bytes().get(span.end) == Some(&b')') {
            return format!("{text})");
        }
        text.to_string()
    }
}

/// `${` and `%{` in literal text are doubled so the JSON string stays a
/// literal when read back as a template.
fn escape(text: &str) -> String {
    text.replace("${", "$${").replace("%{", "%%{")
}

fn negate(n: &Number) -> Option<Number> {
    if let Some(i) = n.as_i64() {
        return i.checked_neg().map(Number::from);
    }
    if let Some(u) = n.as_u64() {
        // only i64::MIN survives the trip through u64
        return (u == i64::MIN.unsigned_abs()).then(|| Number::from(i64::MIN));
    }
    n.as_f64().and_then(|f| Number::from_f64(-f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend;
    use serde_json::json;

    fn convert(src: &str) -> Value {
        let body = frontend::parse(src).unwrap();
        let exprs = ExprSerializer::new(src);
        exprs.value(body.attribute("x").unwrap())
    }

    #[test]
    fn literals_and_identifiers() {
        assert_eq!(convert("x = 1\n"), json!(1));
        assert_eq!(convert("x = \"a\"\n"), json!("a"));
        assert_eq!(convert("x = string\n"), json!("string"));
        assert_eq!(convert("x = null\n"), json!(null));
    }

    #[test]
    fn references_are_wrapped() {
        assert_eq!(convert("x = var.region\n"), json!("${var.region}"));
        assert_eq!(convert("x = \"${var.region}\"\n"), json!("${var.region}"));
        assert_eq!(convert("x = length(var.list) + 1\n"), json!("${length(var.list) + 1}"));
        assert_eq!(convert("x = a ? b : c\n"), json!("${a ? b : c}"));
    }

    #[test]
    fn unary_on_literals_evaluates() {
        assert_eq!(convert("x = -5\n"), json!(-5));
        assert_eq!(convert("x = -1.5\n"), json!(-1.5));
        assert_eq!(convert("x = !true\n"), json!(false));
        assert_eq!(convert("x = !1\n"), json!("${!1}"));
        assert_eq!(convert("x = -9223372036854775808\n"), json!(i64::MIN));
        assert_eq!(convert("x = -var.n\n"), json!("${-var.n}"));
    }

    #[test]
    fn templates() {
        assert_eq!(convert("x = \"hello ${name}!\"\n"), json!("hello ${name}!"));
        assert_eq!(convert("x = \"cost: $${price}\"\n"), json!("cost: $${price}"));
        assert_eq!(convert("x = \"n=${1}\"\n"), json!("n=1"));
        assert_eq!(convert("x = \"%{if on}yes%{endif}\"\n"), json!("%{if on}yes%{endif}"));
        assert_eq!(convert("x = \"%{if on}y%{else}n%{endif}\"\n"), json!("%{if on}y%{else}n%{endif}"));
        assert_eq!(convert("x = \"%{for k, v in m}${k}%{endfor}\"\n"), json!("%{for k, v in m}${k}%{endfor}"));
    }

    #[test]
    fn collections() {
        assert_eq!(convert("x = [1, \"a\", var.b]\n"), json!([1, "a", "${var.b}"]));
        assert_eq!(
            convert("x = {\n  name = \"a\"\n  \"two words\" = 2\n  (k) = 3\n}\n"),
            json!({"name": "a", "two words": 2, "${(k)}": 3})
        );
        assert_eq!(convert("x = {\n  \"${var.a}\" = 1\n}\n"), json!({"${var.a}": 1}));
        assert_eq!(convert("x = {\n  \"p-${var.a}\" = 1\n}\n"), json!({"p-${var.a}": 1}));
    }

    #[test]
    fn unbalanced_ranges_take_the_closing_paren() {
        let src = "x = f(a\n)";
        let exprs = ExprSerializer::new(src);
        let expr = Expr::spanned(ExprKind::Opaque("f(a".into()), 4..7);
        assert_eq!(exprs.source_text(&expr), "f(a");
        let src = "x = f(a)";
        let exprs = ExprSerializer::new(src);
        assert_eq!(exprs.source_text(&expr), "f(a)");
        let balanced = Expr::spanned(ExprKind::Opaque("g(a)".into()), 4..8);
        let exprs = ExprSerializer::new("x = g(a))");
        assert_eq!(exprs.source_text(&balanced), "g(a)");
    }

    #[test]
    fn synthesized_nodes_use_rendered_text() {
        let exprs = ExprSerializer::new("");
        let expr = Expr::opaque("a + b");
        assert_eq!(exprs.value(&expr), json!("${a + b}"));
    }
}
