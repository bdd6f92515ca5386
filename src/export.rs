//! Export of the active file or the whole project

use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use nexus_core::files::SourceFile;
use nexus_core::{NexusError, Result};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default archive name for a project export
pub const PROJECT_ARCHIVE_NAME: &str = "nexus-project.zip";

/// Write one file's content into `out_dir` under its own name
pub fn export_file(file: &SourceFile, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&file.name);
    std::fs::write(&path, file.content.as_bytes())?;
    info!("Exported {} to {:?}", file.name, path);
    Ok(path)
}

/// Pack every file into a ZIP archive written to `writer`
pub fn write_archive<W: Write + Seek>(files: &[SourceFile], writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        zip.start_file(file.name.as_str(), options)
            .map_err(|e| NexusError::Export(format!("{}: {}", file.name, e)))?;
        zip.write_all(file.content.as_bytes())?;
    }

    zip.finish().map_err(|e| NexusError::Export(e.to_string()))
}

/// Pack every file into a ZIP archive at `path`
pub fn export_archive(files: &[SourceFile], path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_archive(files, file)?;
    info!("Exported {} file(s) to {:?}", files.len(), path);
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::files::Language;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    fn files() -> Vec<SourceFile> {
        vec![
            SourceFile::with_content("main.py", Language::Python, "print('hi')\n"),
            SourceFile::with_content("style.css", Language::Css, "body { margin: 0 }"),
        ]
    }

    #[test]
    fn test_archive_entries() {
        let cursor = write_archive(&files(), Cursor::new(Vec::new())).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive.by_name("main.py").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "print('hi')\n");
        assert!(archive.by_name("style.css").is_ok());
    }

    #[test]
    fn test_export_to_disk() {
        let temp = TempDir::new().unwrap();
        let files = files();

        let single = export_file(&files[1], temp.path()).unwrap();
        assert_eq!(std::fs::read_to_string(single).unwrap(), "body { margin: 0 }");

        let archive = export_archive(&files, &temp.path().join("out").join(PROJECT_ARCHIVE_NAME)).unwrap();
        assert!(archive.exists());
    }
}
