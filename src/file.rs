// src/file.rs

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::config::consts::{DEFAULT_FILE, DEFAULT_OUT_DIR};

/// Where a workbook should be written, given an optional `-o` value.
///
/// - nothing given: `out/basket.xlsx`
/// - an existing directory, or a path ending in a separator: `<dir>/basket.xlsx`
/// - anything else: taken as the file path
///
/// The target directory is created when missing.
pub fn resolve_out_path(user_o: Option<&Path>) -> io::Result<PathBuf> {
    let path = match user_o {
        None => PathBuf::from(DEFAULT_OUT_DIR).join(DEFAULT_FILE),
        Some(p) => {
            let p = PathBuf::from(normalize_separators(&p.to_string_lossy()));
            if looks_like_dir_hint(&p) || p.is_dir() {
                p.join(DEFAULT_FILE)
            } else {
                p
            }
        }
    };
    ensure_parent(&path)?;
    Ok(path)
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c=='/'||c=='\\' { sep } else { c }).collect()
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}
