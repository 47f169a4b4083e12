//! Contract-interface input model.
//!
//! Mirrors the JSON shape a compiled-artifact source supplies: an ordered
//! list of entries (`function`, `event`, `constructor`, …), each with typed
//! inputs/outputs and a mutability classification. Read once, never mutated.

use serde::Deserialize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One declared Solidity-style type, possibly nested.
///
/// `components` is populated only when the array-stripped base type is a
/// tuple; each component is itself a full descriptor, so nesting depth is
/// arbitrary but always finite (the grammar cannot express cycles).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeDescriptor {
    /// Canonical textual form, e.g. `uint256`, `address[]`, `bytes32[4]`, `tuple`.
    #[serde(rename = "type")]
    pub raw_type: String,

    /// Declared field/parameter name; empty when the ABI omits it.
    #[serde(default)]
    pub name: String,

    /// Compiler-internal label, e.g. `struct Vault.Position`. Used as a
    /// naming fallback when `name` is empty.
    #[serde(default, rename = "internalType")]
    pub internal_type: Option<String>,

    #[serde(default)]
    pub components: Option<Vec<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Bare type with no name and no components (test/fixture convenience).
    pub fn of(raw_type: impl Into<String>) -> Self {
        Self { raw_type: raw_type.into(), ..Self::default() }
    }

    /// Named field of a bare type.
    pub fn named(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self { raw_type: raw_type.into(), name: name.into(), ..Self::default() }
    }
}

/// Entry tag. Closed over the tags the assembler cares about; anything
/// foreign parses as `Other` and is skipped rather than failing the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Function,
    Constructor,
    Event,
    Error,
    Fallback,
    Receive,
    #[serde(other)]
    Other,
}

/// Declared side-effect classification of a callable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl Default for Mutability {
    // Legacy artifacts omit stateMutability; a write is the safe reading.
    fn default() -> Self { Mutability::Nonpayable }
}

impl Mutability {
    /// Reads (`pure`/`view`) are side-effect-free; everything else mutates.
    pub fn is_read(self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mutability::Pure => "pure",
            Mutability::View => "view",
            Mutability::Nonpayable => "nonpayable",
            Mutability::Payable => "payable",
        }
    }
}

/// One interface entry as the artifact source supplies it.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Constructors/fallbacks carry no name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub inputs: Vec<TypeDescriptor>,

    #[serde(default)]
    pub outputs: Vec<TypeDescriptor>,

    #[serde(default, rename = "stateMutability")]
    pub state_mutability: Mutability,
}

/// A compiled-artifact file: either the full artifact object (hardhat
/// style, carrying the contract name) or a bare ABI array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArtifactFile {
    Artifact {
        #[serde(rename = "contractName")]
        contract_name: String,
        abi: Vec<AbiEntry>,
    },
    Bare(Vec<AbiEntry>),
}

impl ArtifactFile {
    pub fn contract_name(&self) -> Option<&str> {
        match self {
            ArtifactFile::Artifact { contract_name, .. } => Some(contract_name),
            ArtifactFile::Bare(_) => None,
        }
    }

    pub fn abi(&self) -> &[AbiEntry] {
        match self {
            ArtifactFile::Artifact { abi, .. } => abi,
            ArtifactFile::Bare(abi) => abi,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PARSING
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, thiserror::Error)]
#[error("at JSON path {path} → {message}")]
pub struct ParseError {
    pub path: String,
    pub message: String,
}

/// Deserialize an artifact file with JSON-path context in error messages.
pub fn parse_artifact(src: &str) -> Result<ArtifactFile, ParseError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, ArtifactFile>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ParseError { path, message: err.into_inner().to_string() })
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
