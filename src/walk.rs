//! File-tree traversal with exclusion filtering
//!
//! The walker visits files under each input path in a deterministic
//! (lexicographic) order and hands every matched file to a callback.
//! Paths whose decoded form matches any exclusion pattern are skipped;
//! excluded directories are not descended into.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

/// Decoding policy for filesystem names.
///
/// Most systems are UTF-8 today, but mounted filesystems created elsewhere
/// can still carry Latin-1 names. The chosen encoding affects how paths are
/// rendered for display and matched against exclusion patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FsEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl FsEncoding {
    /// Detects the encoding from the process locale (`LC_ALL`, `LC_CTYPE`,
    /// `LANG`, first non-empty wins). Anything that is not recognizably
    /// Latin-1 is treated as UTF-8.
    pub fn detect() -> Self {
        for var in ["LC_ALL", "LC_CTYPE", "LANG"] {
            match std::env::var(var) {
                Ok(value) if !value.is_empty() => {
                    let value = value.to_ascii_lowercase();
                    if value.contains("8859-1") || value.contains("latin") {
                        return FsEncoding::Latin1;
                    }
                    return FsEncoding::Utf8;
                }
                _ => continue,
            }
        }
        FsEncoding::Utf8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FsEncoding::Utf8 => "utf8",
            FsEncoding::Latin1 => "latin1",
        }
    }

    /// Decodes a filesystem name for display and pattern matching.
    pub fn decode<'a>(&self, name: &'a OsStr) -> Cow<'a, str> {
        match self {
            FsEncoding::Utf8 => name.to_string_lossy(),
            FsEncoding::Latin1 => decode_latin1(name),
        }
    }
}

#[cfg(unix)]
fn decode_latin1(name: &OsStr) -> Cow<'_, str> {
    use std::os::unix::ffi::OsStrExt;

    match std::str::from_utf8(name.as_bytes()) {
        // ASCII reads the same in both encodings, so borrow it.
        Ok(s) if s.is_ascii() => Cow::Borrowed(s),
        // Latin-1 maps each byte to the Unicode code point of the same value.
        _ => Cow::Owned(name.as_bytes().iter().map(|&b| b as char).collect()),
    }
}

#[cfg(not(unix))]
fn decode_latin1(name: &OsStr) -> Cow<'_, str> {
    name.to_string_lossy()
}

/// Recursive file-tree walker.
///
/// Exclusion patterns are regular expressions matched anywhere in the
/// decoded path. The interrupt flag is polled between entries so a SIGINT
/// stops the walk promptly without an error.
#[derive(Debug)]
pub struct Walker {
    excludes: Vec<Regex>,
    fs_encoding: FsEncoding,
}

impl Walker {
    /// Compiles the exclusion patterns. An invalid pattern is an error.
    pub fn new(patterns: &[String], fs_encoding: FsEncoding) -> Result<Self> {
        let mut excludes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let re = Regex::new(pattern)
                .with_context(|| format!("invalid exclude pattern '{}'", pattern))?;
            excludes.push(re);
        }
        Ok(Self {
            excludes,
            fs_encoding,
        })
    }

    /// Walks `root`, invoking `on_file` for every non-excluded file.
    ///
    /// A file root is handed to the callback directly (or silently skipped
    /// when excluded). A missing root is an error. Callback errors abort
    /// the walk and propagate.
    pub fn walk<F>(&self, root: &Path, interrupt: &AtomicBool, on_file: &mut F) -> Result<()>
    where
        F: FnMut(&Path) -> Result<()>,
    {
        let meta =
            fs::metadata(root).with_context(|| format!("cannot access {}", root.display()))?;

        if meta.is_file() {
            if !self.is_excluded(root) {
                on_file(root)?;
            }
            return Ok(());
        }

        self.walk_dir(root, interrupt, on_file)
    }

    fn walk_dir<F>(&self, dir: &Path, interrupt: &AtomicBool, on_file: &mut F) -> Result<()>
    where
        F: FnMut(&Path) -> Result<()>,
    {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("cannot read directory {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("cannot read directory {}", dir.display()))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            if interrupt.load(Ordering::Relaxed) {
                debug!("walk interrupted under {}", dir.display());
                return Ok(());
            }

            let path = entry.path();
            if self.is_excluded(&path) {
                debug!("excluded: {}", path.display());
                continue;
            }

            let file_type = entry
                .file_type()
                .with_context(|| format!("cannot stat {}", path.display()))?;

            if file_type.is_dir() {
                self.walk_dir(&path, interrupt, on_file)?;
            } else if file_type.is_file() {
                on_file(&path)?;
            } else if file_type.is_symlink() {
                // Follow symlinks to files; never descend symlinked
                // directories, and ignore broken links.
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => on_file(&path)?,
                    _ => debug!("skipping symlink: {}", path.display()),
                }
            }
        }

        Ok(())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let text = self.fs_encoding.decode(path.as_os_str());
        self.excludes.iter().any(|re| re.is_match(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    fn collect(walker: &Walker, root: &Path) -> Vec<PathBuf> {
        let interrupt = AtomicBool::new(false);
        let mut seen = Vec::new();
        walker
            .walk(root, &interrupt, &mut |p| {
                seen.push(p.to_path_buf());
                Ok(())
            })
            .unwrap();
        seen
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.txt"));
        touch(&dir.path().join("a.txt"));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/c.log"));
        touch(&dir.path().join("sub/d.txt"));
        dir
    }

    #[test]
    fn visits_files_in_sorted_order() {
        let dir = sample_tree();
        let walker = Walker::new(&[], FsEncoding::Utf8).unwrap();

        let names: Vec<_> = collect(&walker, dir.path())
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub/c.log"),
                PathBuf::from("sub/d.txt"),
            ]
        );
    }

    #[test]
    fn exclusion_skips_matching_files() {
        let dir = sample_tree();
        let walker = Walker::new(&[r"\.log$".to_string()], FsEncoding::Utf8).unwrap();

        let seen = collect(&walker, dir.path());
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|p| !p.to_string_lossy().ends_with(".log")));
    }

    #[test]
    fn exclusion_prunes_directories() {
        let dir = sample_tree();
        let walker = Walker::new(&["sub".to_string()], FsEncoding::Utf8).unwrap();

        let seen = collect(&walker, dir.path());
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|p| !p.to_string_lossy().contains("sub")));
    }

    #[test]
    fn file_root_is_handled_directly() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("only.txt");
        let mut f = File::create(&file).unwrap();
        writeln!(f, "hello").unwrap();

        let walker = Walker::new(&[], FsEncoding::Utf8).unwrap();
        let seen = collect(&walker, &file);
        assert_eq!(seen, vec![file]);
    }

    #[test]
    fn excluded_file_root_is_silently_skipped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("skip.me");
        touch(&file);

        let walker = Walker::new(&[r"skip\.me".to_string()], FsEncoding::Utf8).unwrap();
        assert!(collect(&walker, &file).is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let walker = Walker::new(&[], FsEncoding::Utf8).unwrap();
        let interrupt = AtomicBool::new(false);
        let err = walker
            .walk(Path::new("/nonexistent/rove-test"), &interrupt, &mut |_| {
                Ok(())
            })
            .unwrap_err();
        assert!(err.to_string().contains("cannot access"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = Walker::new(&["[".to_string()], FsEncoding::Utf8).unwrap_err();
        assert!(err.to_string().contains("invalid exclude pattern"));
    }

    #[test]
    fn interrupt_stops_the_walk() {
        let dir = sample_tree();
        let walker = Walker::new(&[], FsEncoding::Utf8).unwrap();
        let interrupt = AtomicBool::new(true);

        let mut seen = Vec::new();
        walker
            .walk(dir.path(), &interrupt, &mut |p| {
                seen.push(p.to_path_buf());
                Ok(())
            })
            .unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn callback_errors_abort_the_walk() {
        let dir = sample_tree();
        let walker = Walker::new(&[], FsEncoding::Utf8).unwrap();
        let interrupt = AtomicBool::new(false);

        let mut calls = 0;
        let result = walker.walk(dir.path(), &interrupt, &mut |_| {
            calls += 1;
            anyhow::bail!("handler failed")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[cfg(unix)]
    #[test]
    fn latin1_decoding_maps_bytes_to_code_points() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(&[b'f', 0xE9, b'e']);
        assert_eq!(FsEncoding::Latin1.decode(name), "f\u{e9}e");
        // The same bytes are not valid UTF-8.
        assert!(FsEncoding::Utf8.decode(name).contains('\u{fffd}'));
    }

    #[test]
    fn encoding_names_round_trip() {
        assert_eq!(FsEncoding::Utf8.as_str(), "utf8");
        assert_eq!(FsEncoding::Latin1.as_str(), "latin1");
    }
}
