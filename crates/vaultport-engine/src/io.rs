use std::fs;
use std::path::{Path, PathBuf};

/// Directory names never descended into: attachment folders and tool state.
pub const SKIP_DIRS: &[&str] = &["files", ".obsidian", ".trash", ".git"];

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("invalid vault directory: {0}")]
    InvalidVaultDir(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One directory level of a vault: the subdirectories worth descending into
/// and the markdown notes, both sorted in reverse name order so the newest
/// date-prefixed notes come first.
#[derive(Debug, Default)]
pub struct DirListing {
    pub subdirs: Vec<PathBuf>,
    pub notes: Vec<PathBuf>,
}

pub fn validate_vault_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidVaultDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(())
}

/// Lists the migratable contents of one directory.
pub fn list_dir(dir: &Path) -> Result<DirListing, IoError> {
    let mut listing = DirListing::default();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir() {
            if !should_skip_dir(name) {
                listing.subdirs.push(path);
            }
        } else if name.to_lowercase().ends_with(".md") {
            listing.notes.push(path);
        }
    }

    listing.subdirs.sort_by(|a, b| b.cmp(a));
    listing.notes.sort_by(|a, b| b.cmp(a));
    Ok(listing)
}

fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || SKIP_DIRS.contains(&name.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for d in dirs {
            fs::create_dir_all(root.join(d)).unwrap();
        }
    }

    #[test]
    fn skips_attachment_and_hidden_directories() {
        let v = TempDir::new().unwrap();
        mkdirs(v.path(), ["files", ".obsidian", ".git", "Projects"].as_ref());
        fs::write(v.path().join("note.md"), "x").unwrap();
        fs::write(v.path().join("image.png"), "x").unwrap();

        let listing = list_dir(v.path()).unwrap();
        assert_eq!(listing.subdirs, vec![v.path().join("Projects")]);
        assert_eq!(listing.notes, vec![v.path().join("note.md")]);
    }

    #[test]
    fn notes_are_reverse_sorted() {
        let v = TempDir::new().unwrap();
        fs::write(v.path().join("2024-01-01 a.md"), "x").unwrap();
        fs::write(v.path().join("2024-06-01 b.md"), "x").unwrap();

        let listing = list_dir(v.path()).unwrap();
        assert_eq!(
            listing.notes[0].file_name().unwrap(),
            "2024-06-01 b.md"
        );
    }

    #[test]
    fn validates_vault_directory() {
        let v = TempDir::new().unwrap();
        assert!(validate_vault_dir(v.path()).is_ok());
        assert!(matches!(
            validate_vault_dir(Path::new("/no/such/dir")),
            Err(IoError::InvalidVaultDir(_))
        ));
    }
}
