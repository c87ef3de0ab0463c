//! Project naming and remote normalization

use crate::error::EngineError;
use std::path::Path;
use url::Url;

const ACCENTED: &str = "àáâäæãåāăąçćčđďèéêëēėęěğǵḧîïíīįìıİłḿñńǹňôöòóœøōõőṕŕřßśšşșťțûüùúūǘůűųẃẍÿýžźż·/_,:;";
const PLAIN: &str = "aaaaaaaaaacccddeeeeeeeegghiiiiiiiilmnnnnoooooooooprrsssssttuuuuuuuuuwxyyzzz------";

fn fold_char(c: char) -> Option<char> {
    ACCENTED
        .chars()
        .position(|a| a == c)
        .and_then(|i| PLAIN.chars().nth(i))
}

/// Lowercase, dash-separated folder name made of ASCII word characters
pub fn slugify(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        if c.is_whitespace() {
            folded.push('-');
        } else if c == '&' {
            folded.push_str("-and-");
        } else if let Some(plain) = fold_char(c) {
            folded.push(plain);
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            folded.push(c);
        }
    }

    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}

/// First of `base`, `base1`, `base2`, … that does not exist in `parent`
pub fn unique_name(parent: &Path, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut n = 0u32;
    while parent.join(&candidate).exists() {
        n += 1;
        candidate = format!("{}{}", base, n);
    }
    if candidate != base {
        log::info!(
            "Using name {} because {} folder already exists",
            candidate,
            base
        );
    }
    candidate
}

/// Turn user input into a git remote URL.
///
/// Empty input means "no remote". Anything containing a scheme is kept as
/// given after validation; otherwise the input is a GitHub `org/repo` slug.
pub fn normalize_remote(input: &str) -> Result<Option<String>, EngineError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let remote = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://github.com/{}.git", input.trim_matches('/'))
    };

    Url::parse(&remote).map_err(|source| EngineError::InvalidRemote {
        remote: input.to_string(),
        source,
    })?;

    Ok(Some(remote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My App"), "my-app");
        assert_eq!(slugify("  Crème Brûlée!  "), "creme-brulee");
        assert_eq!(slugify("rock & roll"), "rock-and-roll");
        assert_eq!(slugify("org/repo_name"), "org-repo-name");
        assert_eq!(slugify("--a---b--"), "a-b");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_unique_name_skips_existing_folders() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(unique_name(tmp.path(), "foo"), "foo");

        std::fs::create_dir(tmp.path().join("foo")).unwrap();
        assert_eq!(unique_name(tmp.path(), "foo"), "foo1");

        std::fs::create_dir(tmp.path().join("foo1")).unwrap();
        assert_eq!(unique_name(tmp.path(), "foo"), "foo2");
    }

    #[test]
    fn test_normalize_remote() {
        assert_eq!(normalize_remote("").unwrap(), None);
        assert_eq!(normalize_remote("   ").unwrap(), None);
        assert_eq!(
            normalize_remote("me/demo").unwrap().as_deref(),
            Some("https://github.com/me/demo.git")
        );
        assert_eq!(
            normalize_remote("https://gitlab.com/me/demo.git")
                .unwrap()
                .as_deref(),
            Some("https://gitlab.com/me/demo.git")
        );
    }

    #[test]
    fn test_invalid_remote_url() {
        let err = normalize_remote("https://").unwrap_err();
        assert!(matches!(err, EngineError::InvalidRemote { .. }));
    }
}
