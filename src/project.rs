//! Project management for Code Nexus
//! 
//! A project is a directory of source files plus an optional
//! `nexus.toml` remembering its name and active file.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use nexus_core::files::{validate_file_name, FileCollection, Language, SourceFile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Project manifest (nexus.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Project name
    pub name: String,
    /// Name of the file opened on load
    #[serde(default)]
    pub active_file: Option<String>,
}

/// Default file name for a new project in a language
pub fn starter_file_name(language: Language) -> &'static str {
    match language {
        Language::Python => "main.py",
        Language::C => "main.c",
        Language::Cpp => "main.cpp",
        Language::Java => "Main.java",
        Language::JavaScript => "script.js",
        Language::Html => "index.html",
        Language::Css => "style.css",
        Language::React => "App.jsx",
    }
}

/// Project manager for Code Nexus
pub struct ProjectManager {
    manifest_filename: String,
}

impl ProjectManager {
    /// Create a new project manager
    pub fn new() -> Self {
        Self {
            manifest_filename: "nexus.toml".to_string(),
        }
    }

    /// Read the manifest, if the directory has one
    pub fn manifest(&self, project_dir: &Path) -> Result<Option<ProjectManifest>> {
        let path = project_dir.join(&self.manifest_filename);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let manifest = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(Some(manifest))
    }

    /// Load every recognised source file in the directory
    pub fn load(&self, project_dir: &Path) -> Result<FileCollection> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(project_dir)
            .with_context(|| format!("Failed to read project directory {:?}", project_dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        let mut files = Vec::new();
        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(language) = Language::from_file_name(name) else {
                debug!("Skipping {}: unknown language", name);
                continue;
            };
            if validate_file_name(name).is_err() {
                debug!("Skipping {}: invalid file name", name);
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            files.push(SourceFile::with_content(name, language, content));
        }

        if files.is_empty() {
            anyhow::bail!("No source files found in {:?}", project_dir);
        }

        let active = self
            .manifest(project_dir)?
            .and_then(|m| m.active_file)
            .and_then(|name| files.iter().find(|f| f.name == name).map(|f| f.id.clone()));

        info!("Loaded {} file(s) from {:?}", files.len(), project_dir);
        Ok(FileCollection::from_parts(files, active)?)
    }

    /// Write every file back and remember the active one
    pub fn save(&self, project_dir: &Path, files: &FileCollection) -> Result<()> {
        std::fs::create_dir_all(project_dir)
            .with_context(|| format!("Failed to create {:?}", project_dir))?;
        for file in files.iter() {
            std::fs::write(project_dir.join(&file.name), &file.content)
                .with_context(|| format!("Failed to write {}", file.name))?;
        }

        let name = project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();
        let mut manifest = self
            .manifest(project_dir)?
            .unwrap_or(ProjectManifest { name, active_file: None });
        manifest.active_file = Some(files.active().name.clone());
        self.write_manifest(project_dir, &manifest)
    }

    fn write_manifest(&self, project_dir: &Path, manifest: &ProjectManifest) -> Result<()> {
        let content = toml::to_string_pretty(manifest)
            .context("Failed to serialize project manifest")?;
        std::fs::write(project_dir.join(&self.manifest_filename), content)
            .context("Failed to write nexus.toml")?;
        Ok(())
    }

    /// Create a new project with one starter file
    pub fn create(&self, parent_dir: &Path, name: &str, language: Language) -> Result<PathBuf> {
        validate_file_name(name)?;
        let project_dir = parent_dir.join(name);

        if project_dir.exists() {
            anyhow::bail!("Directory already exists: {:?}", project_dir);
        }

        info!("Creating project: {:?}", project_dir);
        std::fs::create_dir_all(&project_dir)
            .context("Failed to create project directory")?;

        let file_name = starter_file_name(language);
        std::fs::write(project_dir.join(file_name), language.snippet())
            .with_context(|| format!("Failed to write {}", file_name))?;

        self.write_manifest(
            &project_dir,
            &ProjectManifest {
                name: name.to_string(),
                active_file: Some(file_name.to_string()),
            },
        )?;

        info!("Project created successfully!");
        Ok(project_dir)
    }
}

impl Default for ProjectManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_load() {
        let temp = TempDir::new().unwrap();
        let manager = ProjectManager::new();
        let dir = manager.create(temp.path(), "demo", Language::Java).unwrap();

        let files = manager.load(&dir).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files.active().name, "Main.java");
        assert_eq!(files.active().content, Language::Java.snippet());

        assert!(manager.create(temp.path(), "demo", Language::Java).is_err());
    }

    #[test]
    fn test_load_skips_unknown_files_and_restores_active() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.py"), "print(1)").unwrap();
        std::fs::write(temp.path().join("b.css"), "p{}").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(temp.path().join("nexus.toml"), "name = \"x\"\nactive_file = \"b.css\"\n").unwrap();

        let files = ProjectManager::new().load(temp.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.py", "b.css"]);
        assert_eq!(files.active().name, "b.css");
    }

    #[test]
    fn test_empty_directory_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(ProjectManager::new().load(temp.path()).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let manager = ProjectManager::new();
        let mut files = FileCollection::default();
        let id = files.create("page.html", Language::Html).unwrap().id.clone();
        files.update_content(&id, "<p>hi</p>").unwrap();

        manager.save(temp.path(), &files).unwrap();
        let loaded = manager.load(temp.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.active().name, "page.html");
        assert_eq!(loaded.active().content, "<p>hi</p>");
    }
}
