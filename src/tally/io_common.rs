use std::path::{Path, PathBuf};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The lowercase extension of a file, if any.
pub fn file_extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Paths in a configuration file are relative to the directory of this file.
pub fn resolve_path(root: &Path, path: &str) -> String {
    let p: PathBuf = [root, Path::new(path)].iter().collect();
    p.as_path().display().to_string()
}

/// Is this output path the standard output?
pub fn is_stdout(path: &str) -> bool {
    path.is_empty() || path == "stdout" || path == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(simplify_file_name("/tmp/scans/aisle1.txt"), "aisle1.txt");
        assert_eq!(file_extension("stock.XLSX"), Some("xlsx".to_string()));
        assert_eq!(file_extension("stock"), None);
        assert_eq!(
            resolve_path(Path::new("/data/session"), "stock.csv"),
            "/data/session/stock.csv"
        );
        assert_eq!(resolve_path(Path::new("/data"), "/abs/stock.csv"), "/abs/stock.csv");
        assert_eq!(resolve_path(Path::new(""), "stock.csv"), "stock.csv");
        assert!(is_stdout("stdout"));
        assert!(!is_stdout("out.csv"));
    }
}
