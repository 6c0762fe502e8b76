//! Template substitution and the change-aware output write.
//!
//! Substitution is deliberately dumb: every `@NAME@` token is replaced
//! with its value, unknown tokens pass through untouched. The interesting
//! part is [`write_if_changed`], which keeps the output file's timestamp
//! stable when the rendered content has not changed, so downstream build
//! steps are not spuriously invalidated.

use std::io::Write;
use std::path::Path;

/// Substitute `@NAME@` tokens in `template` with the given field values.
pub fn render(template: &str, fields: &[(&'static str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in fields {
        out = out.replace(&format!("@{name}@"), value);
    }
    out
}

/// Write `content` to `path` only if it differs from what is already
/// there. Returns whether a write happened.
///
/// New content goes through a temp file in the same directory followed by
/// a rename, so a concurrent reader sees either the old file or the new
/// one, never a partial write.
pub fn write_if_changed(path: &Path, content: &str) -> std::io::Result<bool> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == content.as_bytes() {
            return Ok(false);
        }
    }

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(content.as_bytes())?;
    let file = tmp.persist(path).map_err(|e| e.error)?;

    // Temp files are created 0600; the rendered file is a normal source
    // file that other build users must be able to read.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    drop(file);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fields(pairs: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
        pairs.iter().map(|(n, v)| (*n, (*v).to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let out = render(
            "#define V \"@FULL@\" // @FULL@ @SHA@",
            &fields(&[("FULL", "1.2.3"), ("SHA", "")]),
        );
        assert_eq!(out, "#define V \"1.2.3\" // 1.2.3 ");
    }

    #[test]
    fn test_render_leaves_unknown_tokens() {
        let out = render("@FULL@ @UNKNOWN@", &fields(&[("FULL", "1.2")]));
        assert_eq!(out, "1.2 @UNKNOWN@");
    }

    #[test]
    fn test_write_if_changed_skips_identical_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("version.h");

        assert!(write_if_changed(&path, "one").unwrap());
        let first_mtime = std::fs::metadata(&path).unwrap().modified().unwrap();

        assert!(!write_if_changed(&path, "one").unwrap());
        let second_mtime = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(first_mtime, second_mtime);

        assert!(write_if_changed(&path, "two").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    #[cfg(unix)]
    fn test_written_file_is_readable_beyond_owner() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("version.h");

        write_if_changed(&path, "content").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o044, 0o044, "group/other read bits missing: {mode:o}");
    }
}
