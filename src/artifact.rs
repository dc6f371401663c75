//! Compiled contract artifacts as written by Hardhat
//! (`artifacts/contracts/Foo.sol/Foo.json`) or Foundry
//! (`out/Foo.sol/Foo.json`).

use std::path::{Path, PathBuf};

use ethers::abi::token::{LenientTokenizer, Tokenizer};
use ethers::abi::{Abi, ParamType, Token};
use ethers::types::Bytes;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::forge_utils::ContractSpec;

const BUILD_INFO_DIR: &str = "build-info";

#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Fully qualified spec of the resolved contract
    pub spec: ContractSpec,
    pub path: PathBuf,
    pub abi: Abi,
    pub bytecode: Bytes,
    pub compiler_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    source_name: Option<String>,
    abi: Abi,
    bytecode: RawBytecode,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

impl RawBytecode {
    fn as_str(&self) -> &str {
        match self {
            RawBytecode::Hex(hex) => hex,
            RawBytecode::Object { object } => object,
        }
    }
}

impl ContractArtifact {
    /// Finds and parses the artifact for `spec` below `artifacts_dir`.
    pub fn resolve(
        artifacts_dir: &Path,
        spec: &ContractSpec,
    ) -> Result<Self, ConfigError> {
        let path = find_artifact(artifacts_dir, spec)?;

        let content = std::fs::read_to_string(&path).map_err(|err| {
            artifact_error(spec, format!("reading {}: {err}", path.display()))
        })?;

        Self::parse(spec, &path, &content)
    }

    pub fn parse(
        spec: &ContractSpec,
        path: &Path,
        content: &str,
    ) -> Result<Self, ConfigError> {
        let raw: RawArtifact = serde_json::from_str(content).map_err(|err| {
            artifact_error(spec, format!("parsing {}: {err}", path.display()))
        })?;

        let code = raw.bytecode.as_str().trim_start_matches("0x");

        if code.contains("__") {
            return Err(artifact_error(
                spec,
                "bytecode has unlinked library references",
            ));
        }

        if code.is_empty() {
            return Err(artifact_error(
                spec,
                "bytecode is empty, is it an interface or abstract contract?",
            ));
        }

        let bytecode = hex::decode(code)
            .map_err(|err| artifact_error(spec, format!("bytecode: {err}")))?;

        let source = raw
            .source_name
            .map(PathBuf::from)
            .or_else(|| spec.path.clone())
            .or_else(|| {
                path.parent()
                    .and_then(Path::file_name)
                    .map(PathBuf::from)
            });

        let compiler_version = raw
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.pointer("/compiler/version"))
            .and_then(|version| version.as_str())
            .map(ToString::to_string);

        Ok(Self {
            spec: ContractSpec {
                path: source,
                name: spec.name.clone(),
            },
            path: path.to_owned(),
            abi: raw.abi,
            bytecode: bytecode.into(),
            compiler_version,
        })
    }

    fn constructor_tokens(
        &self,
        args: &[String],
    ) -> Result<Vec<Token>, ConfigError> {
        let Some(constructor) = self.abi.constructor() else {
            if args.is_empty() {
                return Ok(vec![]);
            }

            return Err(constructor_error(
                &self.spec,
                format!("contract has no constructor but {} given", args.len()),
            ));
        };

        if constructor.inputs.len() != args.len() {
            return Err(constructor_error(
                &self.spec,
                format!(
                    "expected {} arguments, got {}",
                    constructor.inputs.len(),
                    args.len()
                ),
            ));
        }

        constructor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let arg = match param.kind {
                    ParamType::Address
                    | ParamType::Bytes
                    | ParamType::FixedBytes(_) => arg.trim_start_matches("0x"),
                    _ => arg.as_str(),
                };

                LenientTokenizer::tokenize(&param.kind, arg).map_err(|err| {
                    constructor_error(
                        &self.spec,
                        format!("{} ({}): {err}", param.name, param.kind),
                    )
                })
            })
            .collect()
    }

    /// Bytecode followed by the ABI encoded constructor arguments.
    pub fn creation_code(&self, args: &[String]) -> Result<Bytes, ConfigError> {
        let tokens = self.constructor_tokens(args)?;

        let Some(constructor) = self.abi.constructor() else {
            return Ok(self.bytecode.clone());
        };

        constructor
            .encode_input(self.bytecode.to_vec(), &tokens)
            .map(Bytes::from)
            .map_err(|err| constructor_error(&self.spec, err.to_string()))
    }

    /// ABI encoded constructor arguments alone, as block explorers expect
    /// them for verification.
    pub fn encoded_constructor_args(
        &self,
        args: &[String],
    ) -> Result<Bytes, ConfigError> {
        let tokens = self.constructor_tokens(args)?;

        Ok(ethers::abi::encode(&tokens).into())
    }

    /// `None` when the artifact does not record the compiler version.
    pub fn compiled_with(&self, version: &str) -> Option<bool> {
        let compiled = self.compiler_version.as_deref()?;

        Some(
            compiled == version
                || compiled
                    .strip_prefix(version)
                    .is_some_and(|rest| rest.starts_with('+')),
        )
    }
}

fn find_artifact(
    artifacts_dir: &Path,
    spec: &ContractSpec,
) -> Result<PathBuf, ConfigError> {
    let file_name = format!("{}.json", spec.name);

    if let Some(source) = spec.path.as_deref() {
        let mut candidates = vec![artifacts_dir.join(source).join(&file_name)];

        if let Some(source_file) = source.file_name() {
            candidates
                .push(artifacts_dir.join(source_file).join(&file_name));
        }

        return candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                artifact_error(
                    spec,
                    format!("not found in {}", artifacts_dir.display()),
                )
            });
    }

    let mut found = vec![];
    collect_artifacts(artifacts_dir, &file_name, &mut found).map_err(
        |err| {
            artifact_error(
                spec,
                format!("scanning {}: {err}", artifacts_dir.display()),
            )
        },
    )?;

    match found.len() {
        0 => Err(artifact_error(
            spec,
            format!(
                "not found in {}, was the project compiled?",
                artifacts_dir.display()
            ),
        )),
        1 => Ok(found.remove(0)),
        _ => {
            found.sort();
            let found = found
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");

            Err(artifact_error(
                spec,
                format!("ambiguous name, use a fully qualified one: {found}"),
            ))
        }
    }
}

fn collect_artifacts(
    dir: &Path,
    file_name: &str,
    found: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            if entry.file_name() != BUILD_INFO_DIR {
                collect_artifacts(&path, file_name, found)?;
            }
            continue;
        }

        let in_source_dir = dir
            .extension()
            .is_some_and(|ext| ext == "sol" || ext == "vy");

        if in_source_dir && entry.file_name() == file_name {
            found.push(path);
        }
    }

    Ok(())
}

fn artifact_error(spec: &ContractSpec, reason: impl ToString) -> ConfigError {
    ConfigError::Artifact {
        contract: spec.to_string(),
        reason: reason.to_string(),
    }
}

fn constructor_error(spec: &ContractSpec, reason: impl ToString) -> ConfigError {
    ConfigError::ConstructorArgs {
        contract: spec.to_string(),
        reason: reason.to_string(),
    }
}
