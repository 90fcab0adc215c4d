//! Image directory watcher for development.
//!
//! Long-running companion to the dev server: watches the configured image
//! directories and generates missing `.webp` / `.avif` siblings for any
//! source bitmap that appears. Unlike a build, the watcher NEVER overwrites
//! an existing sibling, so a slow AVIF encode from a previous drop is not
//! redone every time the editor touches the source.
//!
//! Derived files themselves (`.webp`, `.avif`) are ignored as triggers,
//! otherwise the watcher's own writes would feed back into it.
//!
//! Watch runs use faster encoder settings than a build; the authoritative
//! encode happens at build time anyway.

use crate::config::ImagesConfig;
use crate::imaging::{ImageBackend, OutputFormat};
use crate::process::{EncodeSettings, ProcessError, scan_sources, sibling_path};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No watchable directories (checked: {0})")]
    NothingToWatch(String),
}

/// Encoder settings tuned for watch mode: maximum AVIF speed, everything
/// else as configured.
pub fn dev_settings(config: &ImagesConfig) -> EncodeSettings {
    let mut settings = EncodeSettings::from_config(config);
    settings.avif_speed = 10;
    settings
}

/// Decide which derived formats a path still needs.
///
/// Pure over `sibling_exists` so the rule is testable without a filesystem:
/// non-source paths get nothing, and a format whose sibling already exists
/// is never regenerated.
pub fn missing_siblings(
    source: &Path,
    settings: &EncodeSettings,
    sibling_exists: impl Fn(&Path) -> bool,
) -> Vec<OutputFormat> {
    if OutputFormat::from_source_path(source).is_none() {
        return Vec::new();
    }
    settings
        .derived_formats()
        .into_iter()
        .filter(|format| !sibling_exists(&sibling_path(source, *format)))
        .collect()
}

/// Generate the missing siblings for one path. Returns the extensions written.
pub fn handle_path(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &EncodeSettings,
) -> Result<Vec<&'static str>, ProcessError> {
    let needed = missing_siblings(source, settings, |p| p.exists());
    let mut written = Vec::new();
    for format in needed {
        let encoded = backend.encode(&settings.params_for(source, format))?;
        std::fs::write(sibling_path(source, format), &encoded)?;
        written.push(format.extension());
    }
    Ok(written)
}

/// One pass over the existing tree, filling in missing siblings.
/// Returns the number of files that got at least one new sibling.
pub fn initial_scan(
    backend: &impl ImageBackend,
    dirs: &[PathBuf],
    settings: &EncodeSettings,
    mut on_written: impl FnMut(&Path, &[&'static str]),
) -> usize {
    let mut updated = 0;
    for dir in dirs {
        for source in scan_sources(dir) {
            match handle_path(backend, &source, settings) {
                Ok(written) if !written.is_empty() => {
                    on_written(&source, &written);
                    updated += 1;
                }
                Ok(_) => {}
                Err(e) => crate::output::print_file_error(&source, &e.to_string()),
            }
        }
    }
    updated
}

fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Watch the configured image directories until interrupted.
///
/// Blocks on a channel fed by the platform watcher. Each relevant event is
/// handled inline; encodes are fast enough in dev settings that batching is
/// not worth the complexity.
pub fn watch(
    backend: &impl ImageBackend,
    project_root: &Path,
    config: &ImagesConfig,
) -> Result<(), WatchError> {
    let settings = dev_settings(config);

    let dirs: Vec<PathBuf> = config
        .source_dirs
        .iter()
        .map(|d| project_root.join(d))
        .filter(|d| d.is_dir())
        .collect();
    if dirs.is_empty() {
        return Err(WatchError::NothingToWatch(config.source_dirs.join(", ")));
    }

    let updated = initial_scan(backend, &dirs, &settings, |source, written| {
        crate::output::print_watch_written(source, written);
    });
    crate::output::print_watch_started(&dirs, updated);

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    for dir in &dirs {
        watcher.watch(dir, RecursiveMode::Recursive)?;
    }

    for result in rx {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                crate::output::print_warning(&format!("watch error: {e}"));
                continue;
            }
        };
        if !is_relevant(&event) {
            continue;
        }
        for path in &event.paths {
            if !path.is_file() {
                continue;
            }
            match handle_path(backend, path, &settings) {
                Ok(written) if !written.is_empty() => {
                    crate::output::print_watch_written(path, &written);
                }
                Ok(_) => {}
                Err(e) => crate::output::print_file_error(path, &e.to_string()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dev_settings_max_avif_speed() {
        let settings = dev_settings(&ImagesConfig::default());
        assert_eq!(settings.avif_speed, 10);
        assert_eq!(settings.jpeg_quality.value(), 80);
    }

    #[test]
    fn derived_and_unknown_paths_need_nothing() {
        let settings = EncodeSettings::default();
        // Derived formats must never trigger sibling generation.
        assert!(missing_siblings(Path::new("/img/a.webp"), &settings, |_| false).is_empty());
        assert!(missing_siblings(Path::new("/img/a.avif"), &settings, |_| false).is_empty());
        assert!(missing_siblings(Path::new("/img/notes.txt"), &settings, |_| false).is_empty());
    }

    #[test]
    fn existing_sibling_never_regenerated() {
        let mut config = ImagesConfig::default();
        config.convert.avif = true;
        let settings = EncodeSettings::from_config(&config);

        // .webp already on disk, .avif missing.
        let needed = missing_siblings(Path::new("/img/hero.png"), &settings, |p| {
            p.extension().is_some_and(|e| e == "webp")
        });
        assert_eq!(needed, vec![OutputFormat::Avif]);

        // Both exist: nothing to do.
        let needed = missing_siblings(Path::new("/img/hero.png"), &settings, |_| true);
        assert!(needed.is_empty());
    }

    #[test]
    fn handle_path_writes_only_missing() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("hero.png");
        fs::write(&src, vec![0u8; 100]).unwrap();
        let existing = tmp.path().join("hero.webp");
        fs::write(&existing, b"keep me").unwrap();

        let mut config = ImagesConfig::default();
        config.convert.avif = true;
        let settings = EncodeSettings::from_config(&config);

        let backend = MockBackend::new();
        let written = handle_path(&backend, &src, &settings).unwrap();
        assert_eq!(written, vec!["avif"]);
        // The pre-existing sibling survives byte for byte.
        assert_eq!(fs::read(&existing).unwrap(), b"keep me");
        assert!(tmp.path().join("hero.avif").exists());
    }

    #[test]
    fn initial_scan_fills_gaps() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.jpg"), vec![0u8; 50]).unwrap();
        fs::write(tmp.path().join("b.jpg"), vec![0u8; 50]).unwrap();
        fs::write(tmp.path().join("b.webp"), b"done").unwrap();

        let backend = MockBackend::new();
        let settings = EncodeSettings::default();
        let mut seen = Vec::new();
        let updated = initial_scan(
            &backend,
            &[tmp.path().to_path_buf()],
            &settings,
            |source, _| seen.push(source.to_path_buf()),
        );

        // Only a.jpg needed a sibling.
        assert_eq!(updated, 1);
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with("a.jpg"));
        assert_eq!(fs::read(tmp.path().join("b.webp")).unwrap(), b"done");
    }
}
