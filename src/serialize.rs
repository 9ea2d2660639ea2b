//! Parsed HCL tree → JSON document.
//!
//! Attributes come first in source order, then blocks. Each block lands
//! under its type with one nested object per label; the innermost key holds
//! the list of block bodies. Collisions between attributes and blocks, or
//! between labelled and unlabelled blocks of one type, fail the document.
mod expr;
mod tree;

use serde_json::Value;

use crate::error::Result;
use crate::model::Body;

use expr::ExprSerializer;
use tree::TreeBuilder;

/// `source` is the text `body` was parsed from; spans index into it.
pub fn serialize_document(body: &Body, source: &str) -> Result<Value> {
    let exprs = ExprSerializer::new(source);
    serialize_body(&exprs, body)
}

fn serialize_body(exprs: &ExprSerializer, body: &Body) -> Result<Value> {
    let mut tree = TreeBuilder::new();
    for attr in body.attributes.values() {
        tree.set_attribute(&attr.name, exprs.value(&attr.expr));
    }
    for block in &body.blocks {
        let content = serialize_body(exprs, &block.body)?;
        let path: Vec<&str> = std::iter::once(block.ty.as_str())
            .chain(block.labels.iter().map(String::as_str))
            .collect();
        tree.append_block(&path, content)?;
    }
    Ok(tree.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frontend;
    use serde_json::json;

    fn convert(src: &str) -> Result<Value> {
        let body = frontend::parse(src)?;
        serialize_document(&body, src)
    }

    #[test]
    fn resource_block() {
        let src = r#"
resource "aws_instance" "web" {
  ami           = "ami-1"
  instance_type = var.instance_type
}
"#;
        assert_eq!(
            convert(src).unwrap(),
            json!({"resource": {"aws_instance": {"web": [{"ami": "ami-1", "instance_type": "${var.instance_type}"}]}}})
        );
    }

    #[test]
    fn nested_blocks_and_repeats() {
        let src = r#"
name = "t"
attribute {
  name = "id"
  type = "S"
}
attribute {
  name = "ts"
  type = "N"
}
ttl {
  enabled = true
}
"#;
        assert_eq!(
            convert(src).unwrap(),
            json!({
                "name": "t",
                "attribute": [{"name": "id", "type": "S"}, {"name": "ts", "type": "N"}],
                "ttl": [{"enabled": true}],
            })
        );
    }

    #[test]
    fn attributes_precede_blocks() {
        let value = convert("b {}\na = 1\n").unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn conflicts_fail_the_document() {
        let err = convert("tags = {}\ntags {}\n").unwrap_err();
        assert!(matches!(err, Error::StructuralConflict { .. }));
        let err = convert("provider \"aws\" {}\nprovider {}\n").unwrap_err();
        assert!(matches!(err, Error::StructuralConflict { .. }));
    }
}
