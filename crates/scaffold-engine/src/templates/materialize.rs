//! Renaming of marker-tagged template files after a template tree is copied
//!
//! Some files cannot live under their real name inside the template tree
//! (`.gitignore` would hide other template files, `package.json` would be
//! picked up as a workspace member). They are stored with a `.template` marker
//! in their name and renamed once the tree has been copied into the project.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Marker inserted into template file names
pub const TEMPLATE_MARKER: &str = ".template";

/// A rename performed by [`materialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Insert the marker before the last extension.
///
/// Names without an extension, or whose only dot is the leading one, get the
/// marker appended instead.
pub fn to_template_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => format!(
            "{}{}{}",
            &file_name[..pos],
            TEMPLATE_MARKER,
            &file_name[pos..]
        ),
        _ => format!("{}{}", file_name, TEMPLATE_MARKER),
    }
}

/// Remove the first marker occurrence from a file name
pub fn from_template_name(file_name: &str) -> String {
    file_name.replacen(TEMPLATE_MARKER, "", 1)
}

/// Whether a file name carries the marker
pub fn is_template_name(file_name: &str) -> bool {
    file_name.contains(TEMPLATE_MARKER)
}

/// Find every marker-tagged file below `root`
pub fn find_template_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(is_template_name)
        {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Rename every marker-tagged file below `root` to its real name.
///
/// All files are discovered before any rename happens, and the future only
/// completes once every rename has finished.
pub async fn materialize(root: &Path) -> io::Result<Vec<Rename>> {
    let root = root.to_path_buf();
    let found = tokio::task::spawn_blocking(move || find_template_files(&root))
        .await
        .map_err(io::Error::other)??;

    let mut renames = Vec::with_capacity(found.len());
    for from in found {
        let Some(name) = from.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let to = from.with_file_name(from_template_name(name));
        log::debug!("Renaming {} -> {}", from.display(), to.display());
        fs::rename(&from, &to).await?;
        renames.push(Rename { from, to });
    }

    Ok(renames)
}
