//! Prompt template loading.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("TEMPLATE_DIR is empty and no default template directory applies")]
    DirectoryUnset,

    #[error("template file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("error reading template file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template file {} is empty", .0.display())]
    Empty(PathBuf),
}

/// Reads `name` from `dir`. The content is returned untouched; only a
/// whitespace-only file is rejected.
pub fn load(dir: Option<&Path>, name: &str) -> Result<String, TemplateError> {
    let dir = dir.ok_or(TemplateError::DirectoryUnset)?;
    let path = dir.join(name);
    if !path.is_file() {
        return Err(TemplateError::NotFound(path));
    }
    let content = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
        path: path.clone(),
        source,
    })?;
    if content.trim().is_empty() {
        return Err(TemplateError::Empty(path));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_template_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t.txt"), "Summarize: {text}\n").unwrap();
        assert_eq!(
            load(Some(dir.path()), "t.txt").unwrap(),
            "Summarize: {text}\n"
        );
    }

    #[test]
    fn unset_directory_fails() {
        assert!(matches!(
            load(None, "t.txt").unwrap_err(),
            TemplateError::DirectoryUnset
        ));
    }

    #[test]
    fn missing_file_reports_resolved_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(dir.path()), "missing.txt").unwrap_err();
        assert!(matches!(&err, TemplateError::NotFound(p) if *p == dir.path().join("missing.txt")));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn whitespace_only_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blank.txt"), "  \n\t\n").unwrap();
        assert!(matches!(
            load(Some(dir.path()), "blank.txt").unwrap_err(),
            TemplateError::Empty(_)
        ));
    }
}
