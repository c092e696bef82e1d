use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use datafreeze_introspect::CatalogOptions;
use serde::{Deserialize, Serialize};

use crate::CliError;

pub const SETTINGS_FILE: &str = "datafreeze.toml";

#[derive(Debug, Deserialize)]
struct AppSettings {
    #[serde(rename = "ConnectionStrings", default)]
    connection_strings: Option<BTreeMap<String, String>>,
}

/// Tool settings read from `datafreeze.toml`.
///
/// Every field is optional; command line flags win over whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub namespace: Option<String>,
    pub fallback_namespace: Option<String>,
    pub output_file: Option<String>,
    pub escape_literals: Option<bool>,
    pub skip_failed_tables: Option<bool>,
    pub catalog: CatalogOptions,
}

/// Named connection strings from an `appsettings.json` style document, in key order.
pub fn parse_connection_strings(text: &str) -> Result<BTreeMap<String, String>, CliError> {
    let settings: AppSettings = serde_json::from_str(text)?;
    let connections = settings.connection_strings.unwrap_or_default();
    if connections.is_empty() {
        return Err(CliError::InvalidConfig(
            "no entries under ConnectionStrings".to_string(),
        ));
    }
    Ok(connections)
}

pub fn load_connection_strings(path: &Path) -> Result<BTreeMap<String, String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        CliError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
    })?;
    parse_connection_strings(&text)
}

pub fn parse_settings(text: &str) -> Result<ToolSettings, CliError> {
    Ok(toml::from_str(text)?)
}

/// Load tool settings from `explicit`, or from `datafreeze.toml` next to the
/// configuration document when present.
pub fn load_settings(explicit: Option<&Path>, config_path: &Path) -> Result<ToolSettings, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = sibling(config_path, SETTINGS_FILE);
            if !candidate.is_file() {
                return Ok(ToolSettings::default());
            }
            candidate
        }
    };

    let text = std::fs::read_to_string(&path).map_err(|err| {
        CliError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
    })?;
    parse_settings(&text)
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}
