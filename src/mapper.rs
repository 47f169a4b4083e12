//! Declared-type → schema mapping.
//!
//! Pure, recursive translation of one `TypeDescriptor` into one
//! `SchemaNode`. Total over the type grammar: unrecognized input degrades to
//! a plain string schema plus a diagnostic, never an error.
//!
//! Design goals:
//! - First-match-wins dispatch; rule order matters (arrays strip before the
//!   base type is classified).
//! - No side channel: diagnostics accumulate on the `Mapper` so callers can
//!   log, ignore, or assert on them.
//! - Depth-guarded recursion; pathological nesting degrades predictably
//!   instead of overflowing the stack.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::abi::TypeDescriptor;
use crate::schema::{Property, SchemaNode, StringFormat};

// ------------------------------- Policy ---------------------------------- //

const MAX_TYPE_DEPTH: usize = 32;  // nesting levels before the guard trips

/// Fixed-size array suffix, e.g. `bytes32[4]`. The lazy base capture plus
/// the end anchor strips exactly one (the rightmost) dimension, so
/// `uint256[2][3]` peels `[3]` here and `[2]` on the recursive call.
static FIXED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\[([0-9]+)\]$").unwrap()
});

/// Numeric primitives: `uint`/`int`/`fixed`/`ufixed`, optional width digits.
static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(uint|int|fixed|ufixed)[0-9]*$").unwrap()
});

// ----------------------------- Diagnostics -------------------------------- //

/// Non-fatal irregularity observed while mapping. Distinct from the mapped
/// result; the document is still produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No rule matched; the type was coarsened to a plain string.
    UnknownType { raw_type: String },
    /// Nesting exceeded `MAX_TYPE_DEPTH`; the subtree was coarsened.
    DepthExceeded { raw_type: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnknownType { raw_type } => {
                write!(f, "unknown type `{raw_type}`, falling back to string")
            }
            Diagnostic::DepthExceeded { raw_type } => {
                write!(f, "type nesting deeper than {MAX_TYPE_DEPTH} at `{raw_type}`, falling back to string")
            }
        }
    }
}

// ------------------------------- Mapper ----------------------------------- //

/// Front API: map descriptors, then collect whatever diagnostics piled up.
#[derive(Debug, Default)]
pub struct Mapper {
    diagnostics: Vec<Diagnostic>,
}

impl Mapper {
    pub fn new() -> Self { Self::default() }

    /// Map one descriptor. Never fails.
    pub fn map(&mut self, descriptor: &TypeDescriptor) -> SchemaNode {
        self.map_parts(&descriptor.raw_type, descriptor.components.as_deref(), 0)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn map_parts(
        &mut self,
        raw_type: &str,
        components: Option<&[TypeDescriptor]>,
        depth: usize,
    ) -> SchemaNode {
        if depth > MAX_TYPE_DEPTH {
            self.diagnostics.push(Diagnostic::DepthExceeded {
                raw_type: raw_type.to_string(),
            });
            return SchemaNode::plain_string();
        }

        // 1) Dynamic array: type[]
        if let Some(base) = raw_type.strip_suffix("[]") {
            // components travel with the base type (array-of-tuple case)
            return SchemaNode::ArrayList {
                item: Box::new(self.map_parts(base, components, depth + 1)),
                min_items: None,
                max_items: None,
            };
        }

        // 2) Fixed-size array: type[M]
        if let Some(caps) = FIXED_ARRAY.captures(raw_type) {
            if let Ok(size) = caps[2].parse::<u32>() {
                let base = &caps[1];
                return SchemaNode::ArrayList {
                    item: Box::new(self.map_parts(base, components, depth + 1)),
                    min_items: Some(size),
                    max_items: Some(size),
                };
            }
            // digits too large for a length bound: treated as unrecognized below
        }

        // 3) Structured type: tuple / struct
        if raw_type == "tuple" || raw_type.starts_with("struct") {
            let mut properties = Vec::new();
            let mut required = Vec::new();
            if let Some(comps) = components {
                for comp in comps {
                    let key = component_key(comp);
                    let schema =
                        self.map_parts(&comp.raw_type, comp.components.as_deref(), depth + 1);
                    properties.push(Property { name: key.clone(), schema });
                    // the grammar has no optional marker; every field is required
                    required.push(key);
                }
            }
            return SchemaNode::Object { properties, required };
        }

        // 4) Numeric primitives (fixed-point coarsened to integer)
        if NUMERIC.is_match(raw_type) {
            return SchemaNode::Integer;
        }

        // 5) Boolean
        if raw_type == "bool" {
            return SchemaNode::Boolean;
        }

        // 6) UTF-8 string
        if raw_type == "string" {
            return SchemaNode::plain_string();
        }

        // 7) Account address
        if raw_type == "address" {
            return SchemaNode::string_with_format(StringFormat::EthereumAddress);
        }

        // 8) Byte sequences
        if let Some(suffix) = raw_type.strip_prefix("bytes") {
            if suffix.is_empty() {
                return SchemaNode::string_with_format(StringFormat::Byte);
            }
            if suffix.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = suffix.parse::<u32>() {
                    // maxLength bounds the raw byte count, not an encoding
                    return SchemaNode::String { format: None, max_length: Some(n) };
                }
            }
            // non-numeric suffix is outside the grammar; fall through
        }

        // 9) Fallback
        self.diagnostics.push(Diagnostic::UnknownType {
            raw_type: raw_type.to_string(),
        });
        SchemaNode::plain_string()
    }
}

/// Structured-field key fallback: declared name → internal type → `unnamed`.
pub fn component_key(descriptor: &TypeDescriptor) -> String {
    if !descriptor.name.is_empty() {
        return descriptor.name.clone();
    }
    if let Some(internal) = descriptor.internal_type.as_deref() {
        if !internal.is_empty() {
            return internal.to_string();
        }
    }
    "unnamed".to_string()
}

/// One-shot convenience: map a descriptor and hand back the diagnostics.
pub fn map_type(descriptor: &TypeDescriptor) -> (SchemaNode, Vec<Diagnostic>) {
    let mut mapper = Mapper::new();
    let schema = mapper.map(descriptor);
    (schema, mapper.into_diagnostics())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::TypeDescriptor;

    fn map_ok(raw: &str) -> SchemaNode {
        let (schema, diags) = map_type(&TypeDescriptor::of(raw));
        assert!(diags.is_empty(), "unexpected diagnostics for `{raw}`: {diags:?}");
        schema
    }

    #[test]
    fn numeric_grammar_maps_to_integer() {
        for raw in [
            "uint8", "uint16", "uint32", "uint64", "uint128", "uint256",
            "int8", "int128", "int256", "uint", "int",
            "fixed", "ufixed", "fixed128", "ufixed256",
        ] {
            assert_eq!(map_ok(raw), SchemaNode::Integer, "raw = {raw}");
        }
    }

    #[test]
    fn scalar_rules() {
        assert_eq!(map_ok("bool"), SchemaNode::Boolean);
        assert_eq!(map_ok("string"), SchemaNode::plain_string());
        assert_eq!(
            map_ok("address"),
            SchemaNode::string_with_format(StringFormat::EthereumAddress),
        );
    }

    #[test]
    fn bytes_rules() {
        assert_eq!(map_ok("bytes"), SchemaNode::string_with_format(StringFormat::Byte));
        assert_eq!(
            map_ok("bytes32"),
            SchemaNode::String { format: None, max_length: Some(32) },
        );
        assert_eq!(
            map_ok("bytes1"),
            SchemaNode::String { format: None, max_length: Some(1) },
        );
    }

    #[test]
    fn dynamic_array_has_no_bounds() {
        assert_eq!(
            map_ok("uint256[]"),
            SchemaNode::ArrayList {
                item: Box::new(SchemaNode::Integer),
                min_items: None,
                max_items: None,
            },
        );
    }

    #[test]
    fn fixed_array_bounds_both_ends() {
        assert_eq!(
            map_ok("address[2]"),
            SchemaNode::ArrayList {
                item: Box::new(SchemaNode::string_with_format(StringFormat::EthereumAddress)),
                min_items: Some(2),
                max_items: Some(2),
            },
        );
    }

    #[test]
    fn multi_dimensional_fixed_arrays_strip_one_dimension_per_call() {
        // rightmost bracket group peels first: [2][3] → outer 3 of inner 2
        assert_eq!(
            map_ok("uint256[2][3]"),
            SchemaNode::ArrayList {
                item: Box::new(SchemaNode::ArrayList {
                    item: Box::new(SchemaNode::Integer),
                    min_items: Some(2),
                    max_items: Some(2),
                }),
                min_items: Some(3),
                max_items: Some(3),
            },
        );
    }

    #[test]
    fn tuple_round_trip() {
        let descriptor = TypeDescriptor {
            raw_type: "tuple".into(),
            components: Some(vec![
                TypeDescriptor::named("a", "uint256"),
                TypeDescriptor::named("b", "bool"),
            ]),
            ..TypeDescriptor::default()
        };
        let (schema, diags) = map_type(&descriptor);
        assert!(diags.is_empty());
        assert_eq!(
            schema,
            SchemaNode::Object {
                properties: vec![
                    Property { name: "a".into(), schema: SchemaNode::Integer },
                    Property { name: "b".into(), schema: SchemaNode::Boolean },
                ],
                required: vec!["a".into(), "b".into()],
            },
        );
    }

    #[test]
    fn struct_prefix_counts_as_structured() {
        let descriptor = TypeDescriptor {
            raw_type: "struct Exchange.Order".into(),
            components: Some(vec![TypeDescriptor::named("maker", "address")]),
            ..TypeDescriptor::default()
        };
        let (schema, _) = map_type(&descriptor);
        assert!(matches!(schema, SchemaNode::Object { .. }));
    }

    #[test]
    fn array_of_tuple_carries_components_through() {
        let descriptor = TypeDescriptor {
            raw_type: "tuple[]".into(),
            components: Some(vec![TypeDescriptor::named("x", "uint8")]),
            ..TypeDescriptor::default()
        };
        let (schema, diags) = map_type(&descriptor);
        assert!(diags.is_empty());
        let SchemaNode::ArrayList { item, .. } = schema else {
            panic!("expected array, got {schema:?}");
        };
        assert_eq!(
            *item,
            SchemaNode::Object {
                properties: vec![Property { name: "x".into(), schema: SchemaNode::Integer }],
                required: vec!["x".into()],
            },
        );
    }

    #[test]
    fn component_key_fallback_chain() {
        let named = TypeDescriptor::named("field", "uint8");
        assert_eq!(component_key(&named), "field");

        let internal_only = TypeDescriptor {
            raw_type: "tuple".into(),
            internal_type: Some("struct V.Pos".into()),
            ..TypeDescriptor::default()
        };
        assert_eq!(component_key(&internal_only), "struct V.Pos");

        let bare = TypeDescriptor::of("uint8");
        assert_eq!(component_key(&bare), "unnamed");
    }

    #[test]
    fn unknown_type_falls_back_with_exactly_one_diagnostic() {
        let (schema, diags) = map_type(&TypeDescriptor::of("someNewType"));
        assert_eq!(schema, SchemaNode::plain_string());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0],
            Diagnostic::UnknownType { raw_type: "someNewType".into() },
        );
    }

    #[test]
    fn bytes_with_non_numeric_suffix_is_unknown() {
        let (schema, diags) = map_type(&TypeDescriptor::of("bytesXYZ"));
        assert_eq!(schema, SchemaNode::plain_string());
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], Diagnostic::UnknownType { .. }));
    }

    #[test]
    fn idempotent_mapping() {
        let descriptor = TypeDescriptor {
            raw_type: "tuple[4]".into(),
            components: Some(vec![
                TypeDescriptor::named("who", "address"),
                TypeDescriptor::named("flags", "bool[]"),
            ]),
            ..TypeDescriptor::default()
        };
        let (first, d1) = map_type(&descriptor);
        let (second, d2) = map_type(&descriptor);
        assert_eq!(first, second);
        assert_eq!(d1, d2);
    }

    #[test]
    fn depth_guard_degrades_instead_of_overflowing() {
        let raw = format!("uint256{}", "[]".repeat(MAX_TYPE_DEPTH + 4));
        let (schema, diags) = map_type(&TypeDescriptor::of(raw));
        // still a schema: arrays down to the guard, then a string leaf
        assert!(matches!(schema, SchemaNode::ArrayList { .. }));
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], Diagnostic::DepthExceeded { .. }));
    }

    #[test]
    fn oversized_fixed_array_length_is_unknown() {
        let (schema, diags) = map_type(&TypeDescriptor::of("uint8[99999999999999999999]"));
        assert_eq!(schema, SchemaNode::plain_string());
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], Diagnostic::UnknownType { .. }));
    }
}
