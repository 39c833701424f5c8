//! Directory scans shared by the mapping drivers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::AppError;

/// List mapping documents directly inside `dir` whose file name ends with
/// one of `suffixes`. Mapping directories are flat: entity names are encoded
/// in the file names, so subdirectories are not descended into. Results are
/// sorted by file name for a stable scan order.
pub fn mapping_documents(dir: &Path, suffixes: &[&str]) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && mapping_stem(name, suffixes).is_some()
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Recursively list `.rs` sources under `root`, sorted by path.
pub fn rust_sources(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();
    collect_rust_sources(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_rust_sources(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), AppError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_rust_sources(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    Ok(())
}

/// Strip a mapping suffix from a file name. `crm.Customer.entity.xml` with
/// suffix `.entity.xml` gives `crm.Customer`.
pub fn mapping_stem<'a>(file_name: &'a str, suffixes: &[&str]) -> Option<&'a str> {
    suffixes
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
}

/// Resolve the document path for `stem` inside `dir`, trying each suffix in
/// order.
pub fn locate_document(dir: &Path, stem: &str, suffixes: &[&str]) -> Option<PathBuf> {
    suffixes.iter().map(|suffix| dir.join(format!("{stem}{suffix}"))).find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_documents_are_sorted_and_filtered() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("b.entity.xml"), "").unwrap();
        fs::write(temp.path().join("a.entity.xml"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/c.entity.xml"), "").unwrap();

        let files = mapping_documents(temp.path(), &[".entity.xml"]).unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.entity.xml", "b.entity.xml"]);
    }

    #[test]
    fn mapping_documents_propagates_missing_dir() {
        let temp = tempfile::tempdir().unwrap();
        let result = mapping_documents(&temp.path().join("absent"), &[".entity.xml"]);
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn rust_sources_recurse() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("crm")).unwrap();
        fs::write(temp.path().join("crm/customer.rs"), "").unwrap();
        fs::write(temp.path().join("lib.rs"), "").unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();

        let files = rust_sources(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("crm/customer.rs"));
        assert!(files[1].ends_with("lib.rs"));
    }

    #[test]
    fn mapping_stem_requires_nonempty_stem() {
        assert_eq!(mapping_stem("crm.Customer.entity.xml", &[".entity.xml"]), Some("crm.Customer"));
        assert_eq!(mapping_stem(".entity.xml", &[".entity.xml"]), None);
        assert_eq!(mapping_stem("crm.Customer.xml", &[".entity.xml"]), None);
    }

    #[test]
    fn locate_document_tries_suffixes_in_order() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("Foo.entity.yml"), "").unwrap();

        let found = locate_document(temp.path(), "Foo", &[".entity.yaml", ".entity.yml"]);
        assert_eq!(found, Some(temp.path().join("Foo.entity.yml")));
        assert_eq!(locate_document(temp.path(), "Bar", &[".entity.yaml"]), None);
    }
}
