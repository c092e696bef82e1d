use std::fs;
use std::path::{Component, Path, PathBuf};

use datafreeze_core::sanitize_identifier;

use crate::errors::EmitError;

pub const DEFAULT_OUTPUT_FILE: &str = "FrozenData.cs";
pub const FALLBACK_NAMESPACE: &str = "FrozenData";

const MODELS_DIR: &str = "Models";
const PROJECT_EXTENSION: &str = "csproj";

/// Where the generated file goes and the namespace its project implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    /// Namespace derived from the project file, if one sits next to the config.
    pub project_namespace: Option<String>,
}

/// Resolve the destination for `file_name` relative to the configuration document.
///
/// The file goes into a `Models` directory beside the configuration when one
/// exists, otherwise beside the configuration itself. The project namespace is
/// the stem of the first `*.csproj` (by file name), with `.Models` appended when
/// writing into `Models`.
pub fn resolve_output(config_path: &Path, file_name: &str) -> Result<OutputTarget, EmitError> {
    let mut components = Path::new(file_name).components();
    let plain = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
    if !plain {
        return Err(EmitError::InvalidPath(file_name.to_string()));
    }

    let base = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let models = base.join(MODELS_DIR);
    let in_models = models.is_dir();
    let path = if in_models {
        models.join(file_name)
    } else {
        base.join(file_name)
    };

    let project_namespace = project_name(&base)?.map(|name| {
        if in_models {
            format!("{name}.{MODELS_DIR}")
        } else {
            name
        }
    });

    Ok(OutputTarget {
        path,
        project_namespace,
    })
}

fn project_name(dir: &Path) -> Result<Option<String>, EmitError> {
    let mut stems = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some(PROJECT_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();

    Ok(stems.first().and_then(|stem| namespace_from_stem(stem)))
}

// Project names like `Shop.Web` keep their dots; each segment is sanitized.
fn namespace_from_stem(stem: &str) -> Option<String> {
    let segments: Vec<String> = stem
        .split('.')
        .filter_map(|segment| sanitize_identifier(segment).ok())
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datafreeze-{label}-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn writes_beside_config_without_models_dir() {
        let dir = scratch_dir("plain");
        fs::write(dir.join("appsettings.json"), "{}").unwrap();

        let target = resolve_output(&dir.join("appsettings.json"), DEFAULT_OUTPUT_FILE).unwrap();

        assert_eq!(target.path, dir.join("FrozenData.cs"));
        assert_eq!(target.project_namespace, None);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn prefers_models_dir_and_suffixes_namespace() {
        let dir = scratch_dir("models");
        fs::create_dir_all(dir.join("Models")).unwrap();
        fs::write(dir.join("Shop.Web.csproj"), "<Project />").unwrap();
        fs::write(dir.join("Zeta.csproj"), "<Project />").unwrap();

        let target = resolve_output(&dir.join("appsettings.json"), DEFAULT_OUTPUT_FILE).unwrap();

        assert_eq!(target.path, dir.join("Models").join("FrozenData.cs"));
        assert_eq!(target.project_namespace.as_deref(), Some("Shop.Web.Models"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn project_name_is_sanitized() {
        assert_eq!(namespace_from_stem("1st-App.Core"), Some("stApp.Core".to_string()));
        assert_eq!(namespace_from_stem("___"), None);
    }

    #[test]
    fn rejects_nested_file_names() {
        let err = resolve_output(Path::new("appsettings.json"), "../escape.cs").unwrap_err();
        assert!(matches!(err, EmitError::InvalidPath(_)));
        assert!(resolve_output(Path::new("appsettings.json"), "").is_err());
    }
}
