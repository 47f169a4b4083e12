//! Document assembly: contract interface → OpenAPI 3.0.0 document.
//!
//! One endpoint per `function` entry; reads become `get` with query
//! parameters, writes become `post` with a JSON body. The document is built
//! fresh per invocation and emitted as deterministic JSON (no filesystem or
//! network I/O here).

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::abi::{AbiEntry, EntryKind, Mutability, TypeDescriptor};
use crate::mapper::{Diagnostic, Mapper};
use crate::schema::{Property, SchemaNode};

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const DOCUMENT_VERSION: &str = "1.0.0";
const DOCUMENT_DESCRIPTION: &str = "Generated API docs from Solidity ABI";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    /// Reads are side-effect-free; everything else goes through `post`.
    pub fn for_mutability(mutability: Mutability) -> Self {
        if mutability.is_read() { Verb::Get } else { Verb::Post }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required query parameter of a `get` operation.
#[derive(Debug, Clone)]
pub struct QueryParameter {
    pub name: String,
    pub schema: SchemaNode,
    /// Raw declared type text, surfaced for operator visibility.
    pub description: String,
}

/// One field of a `post` JSON body.
#[derive(Debug, Clone)]
pub struct BodyField {
    pub name: String,
    pub schema: SchemaNode,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestBody {
    pub fields: Vec<BodyField>,
    pub required: Vec<String>,
}

/// Shape of the `200` response body.
#[derive(Debug, Clone)]
pub enum SuccessBody {
    /// No declared outputs: a transaction identifier or bare success text.
    TransactionAck,
    Schema(SchemaNode),
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub summary: String,
    pub parameters: Vec<QueryParameter>,
    pub request_body: Option<RequestBody>,
    pub success: SuccessBody,
}

#[derive(Debug, Clone, Default)]
pub struct PathOperations {
    pub get: Option<Operation>,
    pub post: Option<Operation>,
}

/// The assembled document. `paths` keeps ABI order.
#[derive(Debug, Clone)]
pub struct ApiDocument {
    pub title: String,
    pub paths: IndexMap<String, PathOperations>,
}

/// Document plus every diagnostic the mapper emitted while building it.
#[derive(Debug)]
pub struct Assembled {
    pub document: ApiDocument,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// Nothing callable: empty interface, or no `function`-tagged entries.
    #[error("no callable entries in the interface")]
    InputAbsent,
    /// Overloaded functions land on the same path and verb; the path scheme
    /// cannot disambiguate them, so the interface is rejected outright.
    #[error("overloaded function `{name}` collides at {verb} {path}")]
    PathCollision { name: String, path: String, verb: Verb },
}

// ————————————————————————————————————————————————————————————————————————————
// ASSEMBLY
// ————————————————————————————————————————————————————————————————————————————

/// Build one document from the full entry list. Non-function entries are
/// skipped; an interface with nothing callable is a hard error.
pub fn assemble(
    entries: &[AbiEntry],
    contract_name: &str,
    title: &str,
) -> Result<Assembled, AssembleError> {
    let mut mapper = Mapper::new();
    let mut paths: IndexMap<String, PathOperations> = IndexMap::new();
    let mut callable = 0usize;

    for entry in entries {
        if entry.kind != EntryKind::Function {
            continue;
        }
        callable += 1;

        let path = format!("/api/{contract_name}/{}", entry.name);
        let verb = Verb::for_mutability(entry.state_mutability);
        let operation = build_operation(&mut mapper, entry);

        let slot = paths.entry(path.clone()).or_default();
        let cell = match verb {
            Verb::Get => &mut slot.get,
            Verb::Post => &mut slot.post,
        };
        if cell.is_some() {
            return Err(AssembleError::PathCollision { name: entry.name.clone(), path, verb });
        }
        *cell = Some(operation);
    }

    if callable == 0 {
        return Err(AssembleError::InputAbsent);
    }

    Ok(Assembled {
        document: ApiDocument {
            title: format!("{contract_name} {title}"),
            paths,
        },
        diagnostics: mapper.into_diagnostics(),
    })
}

fn build_operation(mapper: &mut Mapper, entry: &AbiEntry) -> Operation {
    let mut parameters = Vec::new();
    let mut request_body = None;

    if entry.state_mutability.is_read() {
        parameters = entry
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| QueryParameter {
                name: parameter_key(input, i),
                schema: mapper.map(input),
                description: input.raw_type.clone(),
            })
            .collect();
    } else {
        let mut fields: Vec<BodyField> = entry
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| BodyField {
                name: parameter_key(input, i),
                schema: mapper.map(input),
                description: None,
            })
            .collect();

        // the native-currency amount is not a declared parameter
        if entry.state_mutability == Mutability::Payable {
            fields.push(BodyField {
                name: "value".into(),
                schema: SchemaNode::Integer,
                description: Some("amount transferred with the call".into()),
            });
        }

        let required = fields.iter().map(|f| f.name.clone()).collect();
        request_body = Some(RequestBody { fields, required });
    }

    let success = match entry.outputs.len() {
        0 => SuccessBody::TransactionAck,
        1 => SuccessBody::Schema(mapper.map(&entry.outputs[0])),
        _ => {
            let properties = entry
                .outputs
                .iter()
                .enumerate()
                .map(|(i, output)| Property {
                    name: return_key(output, i),
                    schema: mapper.map(output),
                })
                .collect();
            SuccessBody::Schema(SchemaNode::Object { properties, required: Vec::new() })
        }
    };

    Operation {
        summary: format!("Call {} function", entry.name),
        parameters,
        request_body,
        success,
    }
}

/// Input key fallback: declared name → internal type → `param{index}`.
fn parameter_key(descriptor: &TypeDescriptor, index: usize) -> String {
    if !descriptor.name.is_empty() {
        return descriptor.name.clone();
    }
    if let Some(internal) = descriptor.internal_type.as_deref() {
        if !internal.is_empty() {
            return internal.to_string();
        }
    }
    format!("param{index}")
}

/// Output key fallback: declared name → `return{index}`.
fn return_key(descriptor: &TypeDescriptor, index: usize) -> String {
    if descriptor.name.is_empty() {
        format!("return{index}")
    } else {
        descriptor.name.clone()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EMISSION
// ————————————————————————————————————————————————————————————————————————————

impl ApiDocument {
    /// Emit the full OpenAPI 3.0.0 document as deterministic JSON.
    pub fn to_json(&self) -> Value {
        let mut paths = serde_json::Map::new();
        for (path, ops) in &self.paths {
            let mut item = serde_json::Map::new();
            if let Some(op) = &ops.get {
                item.insert("get".into(), op.to_json());
            }
            if let Some(op) = &ops.post {
                item.insert("post".into(), op.to_json());
            }
            paths.insert(path.clone(), Value::Object(item));
        }

        json!({
            "openapi": OPENAPI_VERSION,
            "info": {
                "title": self.title,
                "version": DOCUMENT_VERSION,
                "description": DOCUMENT_DESCRIPTION,
            },
            "paths": paths,
            "components": { "schemas": {} }
        })
    }
}

impl Operation {
    fn to_json(&self) -> Value {
        let parameters: Vec<Value> = self
            .parameters
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "in": "query",
                    "required": true,
                    "schema": p.schema.to_json(),
                    "description": p.description,
                })
            })
            .collect();

        let success_schema = match &self.success {
            SuccessBody::TransactionAck => {
                json!({ "type": "string", "example": "Transaction hash or success" })
            }
            SuccessBody::Schema(schema) => schema.to_json(),
        };

        let mut o = json!({
            "summary": self.summary,
            "parameters": parameters,
            "responses": {
                "200": {
                    "description": "Success",
                    "content": { "application/json": { "schema": success_schema } },
                },
                "400": { "description": "Invalid input" },
                "500": { "description": "Contract error" },
            },
        });

        if let Some(body) = &self.request_body {
            o["requestBody"] = body.to_json();
        }
        o
    }
}

impl RequestBody {
    fn to_json(&self) -> Value {
        let mut props = serde_json::Map::new();
        for field in &self.fields {
            let mut schema = field.schema.to_json();
            if let Some(d) = &field.description {
                schema["description"] = Value::from(d.clone());
            }
            props.insert(field.name.clone(), schema);
        }

        json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": {
                        "type": "object",
                        "properties": props,
                        "required": self.required,
                    },
                },
            },
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
