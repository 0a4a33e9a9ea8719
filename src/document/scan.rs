use std::fs;
use std::path::{Path, PathBuf};

const DOCUMENT_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDocument {
    pub name: String,
    pub path: PathBuf,
}

/// Lists visible markdown documents in `dir`, sorted by name. A missing
/// directory yields nothing; so does one that cannot be listed.
pub fn scan_folder(dir: &Path) -> Vec<ScannedDocument> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut documents: Vec<ScannedDocument> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !is_eligible_name(&name) {
                return None;
            }
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            Some(ScannedDocument { name, path })
        })
        .collect();
    documents.sort_by(|a, b| a.name.cmp(&b.name));
    documents
}

fn is_eligible_name(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    Path::new(name).extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXTENSION)
}
