use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maps raw reference strings from note bodies to files on disk.
///
/// Resolution is deliberately permissive: several candidate layouts are tried
/// in order and the first hit wins, trading the risk of same-name false
/// positives for fewer missed attachments. Filesystem state is read fresh on
/// every call; nothing is cached here.
pub struct Resolver {
    vault_root: PathBuf,
    vault_search: bool,
}

impl Resolver {
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            vault_search: true,
        }
    }

    /// A resolver with the exhaustive vault-wide fallback disabled, so tests
    /// can exercise the primary candidate ladder in isolation.
    pub fn without_vault_search(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            vault_search: false,
        }
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    /// Resolves a reference relative to the directory of the note that
    /// contains it. Returns `None` when no candidate exists; the caller
    /// records the failure.
    ///
    /// Candidates, first match wins, the full ladder run for the URL-decoded
    /// form before the raw form:
    /// 1. `<note_dir>/files/<ref>` (attachments conventionally live in a
    ///    sibling `files/` folder)
    /// 2. `<note_dir>/files/<basename(ref)>`
    /// 3. `<note_dir>/<ref>`
    /// 4. `<vault_root>/<ref>`
    /// 5. any `files/` entry whose name or stem matches the reference's
    /// 6. last resort: a vault-wide walk for the basename (if enabled)
    pub fn resolve(&self, reference: &str, note_dir: &Path) -> Option<PathBuf> {
        let reference = reference.trim();
        let decoded = match urlencoding::decode(reference) {
            Ok(d) => d.into_owned(),
            Err(_) => reference.to_string(),
        };

        let mut forms = vec![decoded.as_str()];
        if decoded != reference {
            forms.push(reference);
        }

        let files_dir = note_dir.join("files");
        for form in &forms {
            if let Some(found) = self.try_candidates(form, note_dir, &files_dir) {
                return Some(found);
            }
        }

        if self.vault_search {
            let names: Vec<&str> = forms
                .iter()
                .filter_map(|f| Path::new(f).file_name().and_then(|n| n.to_str()))
                .collect();
            if let Some(found) = self.search_vault(&self.vault_root, &names) {
                info!(
                    reference,
                    path = %found.display(),
                    "found reference at alternate location"
                );
                return Some(found);
            }
        }

        debug!(reference, "could not resolve file reference");
        None
    }

    fn try_candidates(&self, form: &str, note_dir: &Path, files_dir: &Path) -> Option<PathBuf> {
        if files_dir.is_dir() {
            let candidate = files_dir.join(form);
            if candidate.exists() {
                return Some(candidate);
            }
            if let Some(name) = Path::new(form).file_name() {
                let candidate = files_dir.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        let candidate = note_dir.join(form);
        if candidate.exists() {
            return Some(candidate);
        }

        let candidate = self.vault_root.join(form);
        if candidate.exists() {
            return Some(candidate);
        }

        if files_dir.is_dir() {
            let form_path = Path::new(form);
            let name = form_path.file_name();
            let stem = form_path.file_stem();
            let mut entries: Vec<PathBuf> = fs::read_dir(files_dir)
                .ok()?
                .flatten()
                .map(|e| e.path())
                .collect();
            entries.sort();
            for entry in entries {
                if entry.file_name() == name || entry.file_stem() == stem {
                    return Some(entry);
                }
            }
        }

        None
    }

    /// Walks the whole vault looking for any file whose name equals one of
    /// `names`, skipping hidden directories. Files in a directory are checked
    /// before its subdirectories are descended into.
    fn search_vault(&self, dir: &Path, names: &[&str]) -> Option<PathBuf> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir).ok()?.flatten().map(|e| e.path()).collect();
        entries.sort();

        for entry in &entries {
            if entry.is_file()
                && let Some(file_name) = entry.file_name().and_then(|n| n.to_str())
                && names.contains(&file_name)
            {
                return Some(entry.clone());
            }
        }

        for entry in &entries {
            if entry.is_dir() {
                let hidden = entry
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if hidden {
                    continue;
                }
                if let Some(found) = self.search_vault(entry, names) {
                    return Some(found);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn vault() -> TempDir {
        TempDir::new().unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn resolves_from_sibling_files_dir() {
        let v = vault();
        let note_dir = v.path().join("projects");
        touch(&note_dir.join("files/diagram.png"));

        let resolver = Resolver::without_vault_search(v.path());
        let found = resolver.resolve("diagram.png", &note_dir).unwrap();
        assert_eq!(found, note_dir.join("files/diagram.png"));
    }

    #[test]
    fn resolves_basename_when_reference_has_directories() {
        let v = vault();
        let note_dir = v.path().join("projects");
        touch(&note_dir.join("files/diagram.png"));

        let resolver = Resolver::without_vault_search(v.path());
        let found = resolver
            .resolve("attachments/diagram.png", &note_dir)
            .unwrap();
        assert_eq!(found, note_dir.join("files/diagram.png"));
    }

    #[test]
    fn resolves_url_encoded_reference() {
        let v = vault();
        let note_dir = v.path().join("notes");
        touch(&note_dir.join("files/my file.pdf"));

        let resolver = Resolver::without_vault_search(v.path());
        let found = resolver.resolve("my%20file.pdf", &note_dir).unwrap();
        assert_eq!(found, note_dir.join("files/my file.pdf"));
    }

    #[test]
    fn resolves_relative_to_note_dir_and_vault_root() {
        let v = vault();
        let note_dir = v.path().join("notes");
        touch(&note_dir.join("local.csv"));
        touch(&v.path().join("shared/top.csv"));

        let resolver = Resolver::without_vault_search(v.path());
        assert_eq!(
            resolver.resolve("local.csv", &note_dir).unwrap(),
            note_dir.join("local.csv")
        );
        assert_eq!(
            resolver.resolve("shared/top.csv", &note_dir).unwrap(),
            v.path().join("shared/top.csv")
        );
    }

    #[test]
    fn resolves_by_stem_inside_files_dir() {
        let v = vault();
        let note_dir = v.path().join("notes");
        touch(&note_dir.join("files/photo.jpeg"));

        let resolver = Resolver::without_vault_search(v.path());
        let found = resolver.resolve("photo.jpg", &note_dir).unwrap();
        assert_eq!(found, note_dir.join("files/photo.jpeg"));
    }

    #[test]
    fn vault_wide_search_finds_deeply_nested_file() {
        let v = vault();
        let note_dir = v.path().join("notes");
        fs::create_dir_all(&note_dir).unwrap();
        touch(&v.path().join("archive/2021/diagram.png"));

        let resolver = Resolver::new(v.path());
        let found = resolver.resolve("diagram.png", &note_dir).unwrap();
        assert_eq!(found, v.path().join("archive/2021/diagram.png"));
    }

    #[test]
    fn vault_wide_search_skips_hidden_directories() {
        let v = vault();
        let note_dir = v.path().join("notes");
        fs::create_dir_all(&note_dir).unwrap();
        touch(&v.path().join(".obsidian/diagram.png"));

        let resolver = Resolver::new(v.path());
        assert!(resolver.resolve("diagram.png", &note_dir).is_none());
    }

    #[test]
    fn disabled_vault_search_leaves_reference_unresolved() {
        let v = vault();
        let note_dir = v.path().join("notes");
        fs::create_dir_all(&note_dir).unwrap();
        touch(&v.path().join("elsewhere/diagram.png"));

        let resolver = Resolver::without_vault_search(v.path());
        assert!(resolver.resolve("diagram.png", &note_dir).is_none());
    }

    #[test]
    fn missing_file_is_none() {
        let v = vault();
        let note_dir = v.path().join("notes");
        fs::create_dir_all(&note_dir).unwrap();

        let resolver = Resolver::new(v.path());
        assert!(resolver.resolve("missing.pdf", &note_dir).is_none());
    }
}
