// Strongly-typed schema IR for the mapped output. No serde_json::Value here
// except at the emission boundary.

use serde_json::{json, Value};

/// String format hints carried into the emitted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Dynamic byte string (`bytes` with no size suffix).
    Byte,
    /// 20-byte account address rendered as text.
    EthereumAddress,
}

impl StringFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StringFormat::Byte => "byte",
            StringFormat::EthereumAddress => "ethereum-address",
        }
    }
}

/// Mapped schema node. Finite-depth and acyclic: depth is bounded by the
/// nesting of the source descriptor, and the source grammar cannot express
/// self-referential types.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Integer,
    Boolean,
    String {
        format: Option<StringFormat>,
        /// For fixed-size `bytesN`: bounds the raw byte count (so
        /// `bytes32` → 32), not the length of any textual encoding.
        max_length: Option<u32>,
    },
    ArrayList {
        item: Box<SchemaNode>,
        /// Both bounds set (and equal) for fixed-size arrays; absent for
        /// dynamic ones.
        min_items: Option<u32>,
        max_items: Option<u32>,
    },
    Object {
        /// Declaration order is preserved for deterministic output.
        properties: Vec<Property>,
        required: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: SchemaNode,
}

impl SchemaNode {
    pub fn plain_string() -> Self {
        SchemaNode::String { format: None, max_length: None }
    }

    pub fn string_with_format(format: StringFormat) -> Self {
        SchemaNode::String { format: Some(format), max_length: None }
    }

    /// Emit the node as an OpenAPI-style schema object.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::Integer => json!({ "type": "integer" }),
            SchemaNode::Boolean => json!({ "type": "boolean" }),

            SchemaNode::String { format, max_length } => {
                let mut o = json!({ "type": "string" });
                if let Some(f) = format {
                    o["format"] = Value::from(f.as_str());
                }
                if let Some(n) = max_length {
                    o["maxLength"] = Value::from(*n);
                }
                o
            }

            SchemaNode::ArrayList { item, min_items, max_items } => {
                let mut o = json!({
                    "type": "array",
                    "items": item.to_json(),
                });
                if let Some(mn) = min_items { o["minItems"] = Value::from(*mn); }
                if let Some(mx) = max_items { o["maxItems"] = Value::from(*mx); }
                o
            }

            SchemaNode::Object { properties, required } => {
                let mut props = serde_json::Map::new();
                for p in properties {
                    props.insert(p.name.clone(), p.schema.to_json());
                }
                let mut o = json!({ "type": "object", "properties": props });
                if !required.is_empty() {
                    o["required"] = Value::Array(
                        required.iter().cloned().map(Value::from).collect(),
                    );
                }
                o
            }
        }
    }
}
