//! `*.tf` file discovery

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Every `*.tf` file under `dir`, recursively, in sorted order.
///
/// Directories named in `skip_dirs` are pruned wherever they occur. Ignore
/// files and hidden-file rules do not apply: Terraform reads what is on disk.
pub fn discover_tf_files(dir: &Path, skip_dirs: &[String]) -> Vec<PathBuf> {
    let skip: Vec<String> = skip_dirs.to_vec();
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            let skipped = entry
                .file_name()
                .to_str()
                .is_some_and(|name| skip.iter().any(|s| s == name));
            !(is_dir && entry.depth() > 0 && skipped)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Error walking directory: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == "tf") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}
