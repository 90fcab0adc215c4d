//! SCSS partial-index generation.
//!
//! Each configured style directory gets a generated `_index.scss` that
//! `@forward`s every partial in it, so the root stylesheet only ever has to
//! `@use` the directory. The generated file lists partials in sorted order to
//! keep output stable across filesystems, and excludes itself so regeneration
//! is idempotent.

use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

pub const INDEX_FILE: &str = "_index.scss";

const HEADER: &str = "// Generated file. Do not edit; run `sitekit indexes` instead.\n";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error in {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Outcome of generating one directory's index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOutcome {
    pub dir: String,
    /// Number of partials forwarded.
    pub forwarded: usize,
    /// False when the existing index already had identical content.
    pub written: bool,
    /// True when the directory itself was missing and got skipped.
    pub skipped: bool,
}

/// Generate `_index.scss` files for every configured directory.
///
/// Missing directories are skipped with a note rather than failing the build,
/// since template projects routinely delete unused style groups.
pub fn generate_indexes(
    project_root: &Path,
    index_dirs: &[String],
) -> Result<Vec<IndexOutcome>, IndexError> {
    let mut outcomes = Vec::with_capacity(index_dirs.len());
    for dir in index_dirs {
        outcomes.push(generate_index(&project_root.join(dir), dir)?);
    }
    Ok(outcomes)
}

/// Generate the index for a single directory.
pub fn generate_index(dir: &Path, label: &str) -> Result<IndexOutcome, IndexError> {
    if !dir.is_dir() {
        return Ok(IndexOutcome {
            dir: label.to_string(),
            forwarded: 0,
            written: false,
            skipped: true,
        });
    }

    let partials = collect_partials(dir).map_err(|source| IndexError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let content = render_index(&partials);

    let index_path = dir.join(INDEX_FILE);
    let unchanged = fs::read_to_string(&index_path)
        .map(|existing| existing == content)
        .unwrap_or(false);
    if !unchanged {
        fs::write(&index_path, &content).map_err(|source| IndexError::Io {
            path: index_path.display().to_string(),
            source,
        })?;
    }

    Ok(IndexOutcome {
        dir: label.to_string(),
        forwarded: partials.len(),
        written: !unchanged,
        skipped: false,
    })
}

/// Collect forwardable partial paths under `dir`, recursively.
///
/// A partial is any `_name.scss` except the index itself. Paths are kept
/// relative to `dir` with a `./` prefix and forward slashes, which is the
/// form Sass expects in `@forward`.
fn collect_partials(dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let index_path = dir.join(INDEX_FILE);
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::other)?;
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !entry.file_type().is_file() || entry.path() == index_path {
            continue;
        }
        if file_name.starts_with('_') && file_name.ends_with(".scss") {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            paths.push(format!("./{rel}"));
        }
    }
    paths.sort();
    Ok(paths)
}

fn render_index(partials: &[String]) -> String {
    let mut out = String::from(HEADER);
    for path in partials {
        out.push_str(&format!("@forward '{path}';\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "// scss\n").unwrap();
    }

    #[test]
    fn forwards_partials_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "_header.scss");
        touch(tmp.path(), "_button.scss");
        touch(tmp.path(), "_card.scss");

        let outcome = generate_index(tmp.path(), "module").unwrap();
        assert_eq!(outcome.forwarded, 3);
        assert!(outcome.written);

        let content = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();
        let forwards: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(
            forwards,
            vec![
                "@forward './_button.scss';",
                "@forward './_card.scss';",
                "@forward './_header.scss';"
            ]
        );
    }

    #[test]
    fn recurses_and_ignores_non_partials() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "_button.scss");
        touch(tmp.path(), "main.scss"); // no underscore prefix
        touch(tmp.path(), "_notes.txt"); // wrong extension
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "_deep.scss");

        let outcome = generate_index(tmp.path(), "module").unwrap();
        assert_eq!(outcome.forwarded, 2);
        let content = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();
        assert!(content.contains("@forward './_button.scss';"));
        assert!(content.contains("@forward './nested/_deep.scss';"));
        assert!(!content.contains("main"));
        assert!(!content.contains("notes"));
    }

    #[test]
    fn regeneration_is_idempotent_and_self_excluding() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "_button.scss");

        let first = generate_index(tmp.path(), "module").unwrap();
        assert!(first.written);
        let content_first = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();

        // Second run sees the index file on disk but must not forward it,
        // and must not rewrite identical content.
        let second = generate_index(tmp.path(), "module").unwrap();
        assert_eq!(second.forwarded, 1);
        assert!(!second.written);
        let content_second = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();
        assert_eq!(content_first, content_second);
        assert!(!content_second.contains("index"));
    }

    #[test]
    fn missing_directory_skipped() {
        let tmp = TempDir::new().unwrap();
        let outcome = generate_index(&tmp.path().join("nope"), "nope").unwrap();
        assert!(outcome.skipped);
        assert_eq!(outcome.forwarded, 0);
    }

    #[test]
    fn empty_directory_gets_header_only_index() {
        let tmp = TempDir::new().unwrap();
        let outcome = generate_index(tmp.path(), "module").unwrap();
        assert_eq!(outcome.forwarded, 0);
        assert!(!outcome.skipped);
        let content = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn generate_indexes_walks_configured_dirs() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("styles/module");
        fs::create_dir_all(&module).unwrap();
        touch(&module, "_nav.scss");

        let outcomes = generate_indexes(
            tmp.path(),
            &["styles/module".to_string(), "styles/page".to_string()],
        )
        .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].forwarded, 1);
        assert!(outcomes[1].skipped);
    }
}
