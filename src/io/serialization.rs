// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation export and re-import.
//!
//! This module writes project snapshots in YAML or JSON, choosing the
//! format from the file extension.

use crate::models::project::ProjectData;
use anyhow::{bail, Result};
use std::path::Path;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Yaml,
    Json,
}

impl ExportFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str());
        match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("yaml") | Some("yml") => Ok(ExportFormat::Yaml),
            Some("json") => Ok(ExportFormat::Json),
            _ => bail!("Unsupported file extension: {:?}", extension),
        }
    }
}

/// Export project data, choosing the format from the extension.
pub fn export(data: &ProjectData, path: &Path) -> Result<()> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Yaml => export_yaml(data, path),
        ExportFormat::Json => export_json(data, path),
    }
}

/// Export project data to YAML format.
pub fn export_yaml(data: &ProjectData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export project data to JSON format.
pub fn export_json(data: &ProjectData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read an export back, choosing the format from the extension.
pub fn import(path: &Path) -> Result<ProjectData> {
    let text = std::fs::read_to_string(path)?;
    let data = match ExportFormat::from_path(path)? {
        ExportFormat::Yaml => serde_yaml::from_str(&text)?,
        ExportFormat::Json => serde_json::from_str(&text)?,
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotationBox;
    use crate::models::selection::{SelectedFile, SelectionSet};
    use crate::models::store::{AnnotationStore, PageKey};
    use std::sync::Arc;

    fn project() -> ProjectData {
        let selection = SelectionSet::replace(vec![SelectedFile {
            name: "a.pdf".into(),
            size: 0,
            bytes: Arc::new(Vec::new()),
            document: Err("not loaded".into()),
        }]);
        let store = AnnotationStore::new().add_box(PageKey::new(0, 1), AnnotationBox::new(1.0, 2.0, 3.0, 4.0));
        ProjectData::capture(&selection, &store)
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.yml")).unwrap(), ExportFormat::Yaml);
        assert_eq!(ExportFormat::from_path(Path::new("a.YAML")).unwrap(), ExportFormat::Yaml);
        assert_eq!(ExportFormat::from_path(Path::new("a.json")).unwrap(), ExportFormat::Json);
        assert!(ExportFormat::from_path(Path::new("a.txt")).is_err());
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_export_yaml_and_json_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let data = project();
        for name in ["annotations.yaml", "annotations.json"] {
            let path = dir.path().join(name);
            export(&data, &path).unwrap();
            assert_eq!(import(&path).unwrap(), data);
        }
    }

    #[test]
    fn test_export_unsupported_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.csv");
        assert!(export(&project(), &path).is_err());
        assert!(!path.exists());
    }
}
