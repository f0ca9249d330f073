use crate::error::CommonError;
use crate::result::CommonResult;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File system abstraction for template lookup and testing
pub trait FileSystem {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> CommonResult<String>;

    /// Files directly inside `dir` with the given extension, sorted by path
    fn list_files(&self, dir: &Path, extension: &str) -> CommonResult<Vec<PathBuf>>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        std::fs::read_to_string(path).map_err(|source| CommonError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn list_files(&self, dir: &Path, extension: &str) -> CommonResult<Vec<PathBuf>> {
        let list_error = |source| CommonError::List {
            dir: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(list_error)? {
            let path = entry.map_err(list_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// In-memory file system for testing
#[derive(Debug, Default)]
pub struct MockFileSystem {
    pub files: BTreeMap<PathBuf, String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CommonError::NotFound(path.to_path_buf()))
    }

    fn list_files(&self, dir: &Path, extension: &str) -> CommonResult<Vec<PathBuf>> {
        // BTreeMap keys are already sorted
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_file_system() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/templates/Foo.cs", "class Foo { }");
        fs.add_file("/templates/Bar.cs", "class Bar { }");
        fs.add_file("/templates/notes.txt", "ignored");
        fs.add_file("/templates/nested/Baz.cs", "class Baz { }");

        assert!(fs.exists(Path::new("/templates/Foo.cs")));
        assert_eq!(
            fs.read_to_string(Path::new("/templates/Foo.cs")).unwrap(),
            "class Foo { }"
        );
        let missing = fs.read_to_string(Path::new("/missing.cs")).unwrap_err();
        assert!(matches!(&missing, CommonError::NotFound(path) if path == Path::new("/missing.cs")));
        assert_eq!(missing.to_string(), "File not found: /missing.cs");

        let files = fs.list_files(Path::new("/templates"), "cs").unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/templates/Bar.cs"),
                PathBuf::from("/templates/Foo.cs")
            ]
        );
    }

    #[test]
    fn test_real_file_system_errors_name_the_path() {
        let dir = std::env::temp_dir().join("stencil_common_missing_dir");
        let _ = std::fs::remove_dir_all(&dir);

        let error = RealFileSystem.list_files(&dir, "cs").unwrap_err();
        assert!(matches!(&error, CommonError::List { dir: listed, .. } if *listed == dir));
        assert!(error.to_string().contains("stencil_common_missing_dir"));

        let error = RealFileSystem.read_to_string(&dir.join("A.cs")).unwrap_err();
        assert!(matches!(error, CommonError::Read { .. }));
    }
}
