// crates/token-sale-harness/src/artifact.rs
// ============================================================================
// Module: Deployment Artifacts
// Description: Parsing of compiled-contract artifact files.
// Purpose: Turn Hardhat/Foundry JSON into an ABI plus deployable bytecode.
// Dependencies: alloy-json-abi, alloy-dyn-abi, alloy-primitives, serde_json
// ============================================================================

//! ## Overview
//! A [`DeploymentArtifact`] is read once per contract per run and is immutable
//! afterwards. Parsing is strict: missing fields, non-hex bytecode, empty
//! bytecode (interfaces, abstract contracts) and unresolved library links are
//! all rejected before anything is sent to a chain.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use alloy_dyn_abi::DynSolValue;
use alloy_dyn_abi::JsonAbiExt;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use alloy_primitives::hex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading or using an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact file could not be read.
    #[error("failed to read artifact {}: {source}", path.display())]
    Read {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The artifact is not valid JSON or lacks `abi`/`bytecode`.
    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        /// Artifact path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The bytecode is empty or not hex.
    #[error("invalid bytecode in {}: {reason}", path.display())]
    Bytecode {
        /// Artifact path.
        path: PathBuf,
        /// Failure detail.
        reason: String,
    },
    /// The bytecode references libraries that were never linked.
    #[error("artifact {} has unlinked libraries: {libraries}", path.display())]
    LinkReferences {
        /// Artifact path.
        path: PathBuf,
        /// Comma separated `source:library` names.
        libraries: String,
    },
    /// Arguments do not match the ABI.
    #[error("cannot encode {target} for {contract}: {reason}")]
    Encode {
        /// Contract name.
        contract: String,
        /// `constructor` or the function name.
        target: String,
        /// Failure detail.
        reason: String,
    },
}

// ============================================================================
// SECTION: Wire Format
// ============================================================================

/// On-disk artifact; only the fields the harness needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// Hardhat records the contract name; Foundry does not.
    #[serde(default)]
    contract_name: Option<String>,
    /// Interface description.
    abi: JsonAbi,
    /// Creation bytecode.
    bytecode: RawBytecode,
    /// Hardhat library link placeholders keyed by source then library.
    #[serde(default)]
    link_references: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Hardhat stores a hex string, Foundry an object with `object`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// `"bytecode": "0x..."`
    Hex(String),
    /// `"bytecode": { "object": "0x..." }`
    Object {
        /// Hex bytecode.
        object: String,
    },
}

impl RawBytecode {
    /// Returns the hex payload regardless of layout.
    fn as_hex(&self) -> &str {
        match self {
            Self::Hex(code) | Self::Object { object: code } => code,
        }
    }
}

// ============================================================================
// SECTION: Artifact
// ============================================================================

/// Parsed compiled-contract artifact.
#[derive(Debug, Clone)]
pub struct DeploymentArtifact {
    /// Contract name.
    name: String,
    /// File the artifact was read from.
    path: PathBuf,
    /// Interface description.
    abi: JsonAbi,
    /// Decoded creation bytecode.
    bytecode: Bytes,
}

impl DeploymentArtifact {
    /// Reads and parses an artifact file.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(path, &bytes)
    }

    /// Parses artifact JSON; `path` is used for naming and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the JSON or bytecode is malformed.
    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let raw: RawArtifact =
            serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if !raw.link_references.is_empty() {
            let libraries = raw
                .link_references
                .iter()
                .flat_map(|(source, libs)| libs.keys().map(move |lib| format!("{source}:{lib}")))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ArtifactError::LinkReferences {
                path: path.to_path_buf(),
                libraries,
            });
        }
        let bytecode = decode_bytecode(path, raw.bytecode.as_hex())?;
        let name = raw
            .contract_name
            .or_else(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .unwrap_or_default();
        Ok(Self {
            name,
            path: path.to_path_buf(),
            abi: raw.abi,
            bytecode,
        })
    }

    /// Contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source path of the artifact.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Interface description.
    #[must_use]
    pub const fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Creation bytecode without constructor arguments.
    #[must_use]
    pub const fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Builds deployment input: bytecode followed by the ABI-encoded
    /// constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Encode`] when the arguments do not match the
    /// constructor inputs.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        let encoded = match self.abi.constructor() {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|err| self.encode_error("constructor", err.to_string()))?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(self.encode_error(
                    "constructor",
                    format!("no constructor in abi but {} arguments supplied", args.len()),
                ));
            }
        };
        let mut code = Vec::with_capacity(self.bytecode.len() + encoded.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(&encoded);
        Ok(Bytes::from(code))
    }

    /// Encodes a call to `function` (selector followed by arguments). The
    /// first overload whose arity matches is used.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Encode`] when the function is unknown or the
    /// arguments do not type-check.
    pub fn encode_call(&self, function: &str, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        let overloads = self
            .abi
            .function(function)
            .ok_or_else(|| self.encode_error(function, "function not found in abi".to_string()))?;
        let selected = overloads
            .iter()
            .find(|candidate| candidate.inputs.len() == args.len())
            .ok_or_else(|| {
                self.encode_error(function, format!("no overload takes {} arguments", args.len()))
            })?;
        selected
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|err| self.encode_error(function, err.to_string()))
    }

    /// Builds an [`ArtifactError::Encode`] for this contract.
    fn encode_error(&self, target: &str, reason: String) -> ArtifactError {
        ArtifactError::Encode {
            contract: self.name.clone(),
            target: target.to_string(),
            reason,
        }
    }
}

/// Decodes `0x`-prefixed or bare hex bytecode.
fn decode_bytecode(path: &Path, raw: &str) -> Result<Bytes, ArtifactError> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if stripped.is_empty() {
        return Err(ArtifactError::Bytecode {
            path: path.to_path_buf(),
            reason: "empty bytecode (interface or abstract contract)".to_string(),
        });
    }
    if stripped.contains("__") {
        return Err(ArtifactError::LinkReferences {
            path: path.to_path_buf(),
            libraries: "unresolved placeholder in bytecode".to_string(),
        });
    }
    hex::decode(stripped).map(Bytes::from).map_err(|err| ArtifactError::Bytecode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
