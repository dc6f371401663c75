use std::fs::Permissions;
use std::io::Write;
use std::path::Path;

use ethers::types::Address;
use ethers::utils::to_checksum;
use strum::EnumString;
use tracing::{info, instrument};

use crate::error::DeployError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AddressFileFormat {
    #[strum(serialize = "js", serialize = "mjs", serialize = "cjs")]
    JavaScript,
    #[strum(serialize = "ts", serialize = "mts")]
    TypeScript,
    #[strum(serialize = "json")]
    Json,
}

impl AddressFileFormat {
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or(AddressFileFormat::JavaScript)
    }

    pub fn render(&self, export_name: &str, address: Address) -> String {
        let address = to_checksum(&address, None);

        match self {
            AddressFileFormat::JavaScript | AddressFileFormat::TypeScript => {
                format!("export const {export_name} = \"{address}\";\n")
            }
            AddressFileFormat::Json => {
                let value = serde_json::json!({ export_name: address });
                format!("{value:#}\n")
            }
        }
    }
}

/// Replaces `path` with a file exporting `address` as `export_name`. The
/// content is written to a temporary file next to `path` and renamed over
/// it, readers see either the previous record or the new one.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn record_address(
    path: &Path,
    export_name: &str,
    address: Address,
) -> Result<(), DeployError> {
    let content = AddressFileFormat::from_path(path).render(export_name, address);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir)
        .map_err(|err| DeployError::file_write(dir, err))?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|err| DeployError::file_write(path, err))?;

    file.write_all(content.as_bytes())
        .and_then(|()| match record_permissions(path) {
            Some(permissions) => file.as_file().set_permissions(permissions),
            None => Ok(()),
        })
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| DeployError::file_write(path, err))?;

    file.persist(path)
        .map_err(|err| DeployError::file_write(path, err.error))?;

    info!("Recorded {export_name} = {:?}", address);

    Ok(())
}

/// Permissions the record should end up with: those of the record being
/// replaced, or world readable for a new one. Temporary files are created
/// owner-only.
fn record_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_record_permissions(),
    }
}

#[cfg(unix)]
fn new_record_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_record_permissions() -> Option<Permissions> {
    None
}
