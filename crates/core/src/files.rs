//! Source Files
//! 
//! The editable file set: supported languages, starter snippets,
//! file name validation and the ordered collection with its active file.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NexusError, Result};

/// Content shorter than this is replaced by the snippet on a language change
const SNIPPET_REPLACE_THRESHOLD: usize = 50;

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    C,
    #[serde(rename = "C++")]
    Cpp,
    Java,
    JavaScript,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    React,
}

impl Language {
    /// Every supported language, in menu order
    pub const ALL: [Language; 8] = [
        Language::Python,
        Language::C,
        Language::Html,
        Language::JavaScript,
        Language::Java,
        Language::React,
        Language::Cpp,
        Language::Css,
    ];

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::React => "React",
        }
    }

    /// Highlighting grammar identifier
    pub fn grammar_id(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::Html => "html",
            Language::Css => "css",
            Language::React => "jsx",
        }
    }

    /// Tag-based languages get auto-indent after an open tag
    pub fn is_markup(&self) -> bool {
        matches!(self, Language::Html | Language::React)
    }

    /// Starter content for a new file
    pub fn snippet(&self) -> &'static str {
        match self {
            Language::Python => "print(\"Hello World\")",
            Language::C => "#include <stdio.h>\nint main() { printf(\"Hello\"); return 0; }",
            Language::Cpp => "#include <iostream>\nint main() { std::cout << \"Hello\"; return 0; }",
            Language::Java => {
                "class Main { public static void main(String[] a) { System.out.println(\"Hi\"); } }"
            }
            Language::JavaScript => "console.log(\"Hello\")",
            Language::Html => HTML_SNIPPET,
            Language::Css => "body { background: #f0f0f0; }",
            Language::React => "export default function App() { return <h1>Hi</h1> }",
        }
    }

    /// Detect the language from a file name's extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let (_, ext) = lower.rsplit_once('.')?;
        match ext {
            "py" => Some(Language::Python),
            "c" => Some(Language::C),
            "cpp" | "cc" => Some(Language::Cpp),
            "html" | "htm" => Some(Language::Html),
            "css" => Some(Language::Css),
            "java" => Some(Language::Java),
            "jsx" | "tsx" => Some(Language::React),
            "js" | "ts" => Some(Language::JavaScript),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| {
                lang.display_name().eq_ignore_ascii_case(s) || lang.grammar_id().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| NexusError::InvalidInput(format!("unknown language '{}'", s)))
    }
}

const HTML_SNIPPET: &str = r##"<!DOCTYPE html>
<html>
<head>
  <style>
    body { margin: 0; overflow: hidden; background: #111; }
    canvas { display: block; }
  </style>
</head>
<body>
  <canvas id="game"></canvas>
  <script>
    const canvas = document.getElementById("game");
    const ctx = canvas.getContext("2d");

    function resize() {
      canvas.width = window.innerWidth;
      canvas.height = window.innerHeight;
    }
    window.onresize = resize;
    resize();

    let x = 100, y = 100;
    let dx = 3, dy = 3;

    function update() {
      ctx.fillStyle = "rgba(0,0,0,0.1)";
      ctx.fillRect(0, 0, canvas.width, canvas.height);

      ctx.fillStyle = "#3b82f6";
      ctx.beginPath();
      ctx.arc(x, y, 20, 0, Math.PI * 2);
      ctx.fill();

      if(x < 0 || x > canvas.width) dx = -dx;
      if(y < 0 || y > canvas.height) dy = -dy;
      x += dx; y += dy;

      requestAnimationFrame(update);
    }
    update();
  </script>
</body>
</html>"##;

/// Opaque file identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single editable file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: FileId,
    pub name: String,
    pub language: Language,
    pub content: String,
}

impl SourceFile {
    /// Create a file seeded with the language snippet
    pub fn new(name: impl Into<String>, language: Language) -> Self {
        Self::with_content(name, language, language.snippet())
    }

    /// Create a file with explicit content
    pub fn with_content(name: impl Into<String>, language: Language, content: impl Into<String>) -> Self {
        Self {
            id: FileId::generate(),
            name: name.into(),
            language,
            content: content.into(),
        }
    }
}

/// Check a name against the allowed character set
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NexusError::InvalidFileName("file name must not be empty".into()));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    if !name.chars().all(allowed) {
        return Err(NexusError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// Ordered file set with an active file.
///
/// Never empty, and the active id always names a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCollection {
    files: Vec<SourceFile>,
    active: FileId,
}

impl FileCollection {
    /// Build a collection, making the first file active
    pub fn new(files: Vec<SourceFile>) -> Result<Self> {
        let active = files
            .first()
            .map(|f| f.id.clone())
            .ok_or_else(|| NexusError::InvalidInput("file collection cannot be empty".into()))?;
        Ok(Self { files, active })
    }

    /// Rebuild from persisted parts; an unknown active id falls back to the first file
    pub fn from_parts(files: Vec<SourceFile>, active: Option<FileId>) -> Result<Self> {
        let mut collection = Self::new(files)?;
        if let Some(id) = active {
            if collection.contains(&id) {
                collection.active = id;
            } else {
                debug!("Active file {} not in collection, using first file", id);
            }
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Files of one language, in collection order
    pub fn by_language(&self, language: Language) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(move |f| f.language == language)
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.files.iter().any(|f| &f.id == id)
    }

    pub fn get(&self, id: &FileId) -> Option<&SourceFile> {
        self.files.iter().find(|f| &f.id == id)
    }

    fn get_mut(&mut self, id: &FileId) -> Result<&mut SourceFile> {
        self.files
            .iter_mut()
            .find(|f| &f.id == id)
            .ok_or_else(|| NexusError::NotFound(format!("file {}", id)))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn active_id(&self) -> &FileId {
        &self.active
    }

    /// The active file
    pub fn active(&self) -> &SourceFile {
        self.get(&self.active).unwrap_or(&self.files[0])
    }

    /// Switch the active file
    pub fn set_active(&mut self, id: &FileId) -> Result<()> {
        if !self.contains(id) {
            return Err(NexusError::NotFound(format!("file {}", id)));
        }
        self.active = id.clone();
        Ok(())
    }

    /// Validate a candidate name, ignoring the file being renamed
    pub fn check_name(&self, name: &str, ignore: Option<&FileId>) -> Result<()> {
        validate_file_name(name)?;
        let taken = self
            .files
            .iter()
            .filter(|f| Some(&f.id) != ignore)
            .any(|f| f.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(NexusError::DuplicateFileName(name.to_string()));
        }
        Ok(())
    }

    /// Add a new file seeded with its language snippet and make it active
    pub fn create(&mut self, name: &str, language: Language) -> Result<&SourceFile> {
        self.check_name(name, None)?;
        let file = SourceFile::new(name, language);
        info!("Created {} ({})", file.name, language);
        self.active = file.id.clone();
        self.files.push(file);
        Ok(self.active())
    }

    /// Replace a file's content
    pub fn update_content(&mut self, id: &FileId, content: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.content = content.into();
        Ok(())
    }

    /// Remove a file; the last remaining file cannot be removed
    pub fn delete(&mut self, id: &FileId) -> Result<SourceFile> {
        if self.files.len() <= 1 {
            return Err(NexusError::LastFile);
        }
        let index = self
            .files
            .iter()
            .position(|f| &f.id == id)
            .ok_or_else(|| NexusError::NotFound(format!("file {}", id)))?;
        let removed = self.files.remove(index);
        if &self.active == id {
            self.active = self.files[0].id.clone();
        }
        info!("Deleted {}", removed.name);
        Ok(removed)
    }

    /// Rename a file, re-detecting its language from the new extension
    pub fn rename(&mut self, id: &FileId, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        self.check_name(new_name, Some(id))?;
        let file = self.get_mut(id)?;
        file.name = new_name.to_string();
        if let Some(language) = Language::from_file_name(new_name) {
            file.language = language;
        }
        Ok(())
    }

    /// Change a file's language; short content is swapped for the new snippet
    pub fn change_language(&mut self, id: &FileId, language: Language) -> Result<()> {
        let file = self.get_mut(id)?;
        if file.content.chars().count() < SNIPPET_REPLACE_THRESHOLD {
            file.content = language.snippet().to_string();
        }
        file.language = language;
        Ok(())
    }
}

impl Default for FileCollection {
    fn default() -> Self {
        let file = SourceFile::with_content(
            "main.py",
            Language::Python,
            "def hello_world():\n    print(\"Hello, world!\")\n\nif __name__ == \"__main__\":\n    hello_world()",
        );
        Self {
            active: file.id.clone(),
            files: vec![file],
        }
    }
}
