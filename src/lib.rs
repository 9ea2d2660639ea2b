//! Semantic conversion between JSON documents and HCL native syntax.
//!
//! JSON → HCL goes through [`synthesize`], which decides per field whether
//! the JSON structure is a block or an attribute, and [`backend`], which
//! renders the resulting tree. HCL → JSON goes through [`frontend`], which
//! parses the text into the same tree, and [`serialize`], which maps it back
//! onto the nested-object convention used for labelled blocks.
//!
//! ```
//! use json_hcl::{Dialect, hcl_to_json, json_to_hcl};
//!
//! let hcl = json_to_hcl(r#"{"variable":{"region":[{"type":"string"}]}}"#, Dialect::BlockPreferring).unwrap();
//! assert_eq!(hcl, "variable \"region\" {\n  type = string\n}\n");
//!
//! let json = hcl_to_json(&hcl).unwrap();
//! assert_eq!(json, serde_json::json!({"variable": {"region": [{"type": "string"}]}}));
//! ```
pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod json;
pub mod model;
pub mod serialize;
pub mod synthesize;

use serde_json::Value;

pub use error::{Error, ParseError, Result};
pub use synthesize::Dialect;

/// JSON text → formatted HCL text.
pub fn json_to_hcl(src: &str, dialect: Dialect) -> Result<String> {
    let doc = json::parse(src)?;
    let body = synthesize::synthesize_document(&doc, dialect)?;
    backend::render(&body)
}

/// HCL text → JSON value.
pub fn hcl_to_json(src: &str) -> Result<Value> {
    let body = frontend::parse(src)?;
    serialize::serialize_document(&body, src)
}
