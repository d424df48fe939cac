//! Module Resolution
//!
//! Resolves module specifiers found in declaration files:
//! - Relative imports (`./foo`, `../bar`) against the importing file
//! - Absolute paths
//! - Bare specifiers (`lodash`, `@scope/pkg`) are external to the bundle
//!
//! Relative specifiers try the exact path, declaration and source extensions,
//! `.js` → `.d.ts` style substitution, and finally a directory `index` file.
//! Files are looked up on disk or in an in-memory file set (tests and
//! programs built from strings).

use dtsz_common::diagnostics::diagnostic_messages;
use dtsz_common::{Diagnostic, diagnostic_codes, format_message};
use rustc_hash::{FxHashMap, FxHashSet};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Extensions appended to an extensionless specifier, in priority order.
const DECLARATION_EXTENSION_CANDIDATES: [&str; 7] =
    ["d.ts", "ts", "d.mts", "d.cts", "mts", "cts", "tsx"];

/// Extensions that name a file the bundler can read directly.
const TS_EXTENSIONS: [&str; 7] = [".d.ts", ".d.mts", ".d.cts", ".ts", ".mts", ".cts", ".tsx"];

/// Result of module resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Specifier resolved to a file of the program
    File(PathBuf),
    /// Bare specifier; the module stays an import of the bundle
    External,
}

/// Reason why module resolution failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// Relative or absolute specifier that matches no file
    NotFound {
        /// Module specifier that was not found
        specifier: String,
        /// File containing the import
        containing_file: String,
    },
}

impl ResolutionFailure {
    /// Convert a resolution failure to a TS2307 diagnostic at the specifier.
    pub fn to_diagnostic(&self, start: u32, length: u32) -> Diagnostic {
        match self {
            ResolutionFailure::NotFound {
                specifier,
                containing_file,
            } => Diagnostic::error(
                containing_file,
                start,
                length,
                format_message(diagnostic_messages::CANNOT_FIND_MODULE, &[specifier]),
                diagnostic_codes::CANNOT_FIND_MODULE,
            ),
        }
    }

    pub fn specifier(&self) -> &str {
        match self {
            ResolutionFailure::NotFound { specifier, .. } => specifier,
        }
    }
}

/// Where the resolver looks for files.
#[derive(Debug)]
enum FileLookup {
    Disk,
    InMemory(FxHashSet<PathBuf>),
}

/// Module resolver for declaration bundling.
#[derive(Debug)]
pub struct ModuleResolver {
    lookup: FileLookup,
    /// Cache of resolved modules by (containing directory, specifier)
    resolution_cache: FxHashMap<(PathBuf, String), Result<Resolution, ResolutionFailure>>,
}

impl ModuleResolver {
    /// Create a resolver that checks the file system.
    pub fn disk() -> Self {
        ModuleResolver {
            lookup: FileLookup::Disk,
            resolution_cache: FxHashMap::default(),
        }
    }

    /// Create a resolver over a fixed set of in-memory file paths.
    pub fn in_memory<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let files = files
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .collect();
        ModuleResolver {
            lookup: FileLookup::InMemory(files),
            resolution_cache: FxHashMap::default(),
        }
    }

    /// Resolve a module specifier from a containing file
    pub fn resolve(
        &mut self,
        specifier: &str,
        containing_file: &Path,
    ) -> Result<Resolution, ResolutionFailure> {
        let containing_dir = containing_file
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let cache_key = (containing_dir.clone(), specifier.to_string());
        if let Some(cached) = self.resolution_cache.get(&cache_key) {
            return cached.clone();
        }

        let result = if is_relative_specifier(specifier) {
            self.resolve_path(&containing_dir.join(specifier), specifier, containing_file)
        } else if Path::new(specifier).is_absolute() {
            self.resolve_path(Path::new(specifier), specifier, containing_file)
        } else {
            Ok(Resolution::External)
        };
        trace!(specifier, ?result, "resolved module specifier");

        self.resolution_cache.insert(cache_key, result.clone());
        result
    }

    fn resolve_path(
        &self,
        candidate: &Path,
        specifier: &str,
        containing_file: &Path,
    ) -> Result<Resolution, ResolutionFailure> {
        let candidate = normalize_path(candidate);
        if let Some(resolved) = self.try_file_or_directory(&candidate) {
            return Ok(Resolution::File(resolved));
        }
        Err(ResolutionFailure::NotFound {
            specifier: specifier.to_string(),
            containing_file: containing_file.display().to_string(),
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        match &self.lookup {
            FileLookup::Disk => path.is_file(),
            FileLookup::InMemory(files) => files.contains(path),
        }
    }

    fn try_file(&self, path: &Path) -> Option<PathBuf> {
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str())
            && let Some(rewritten) = js_extension_substitution(path, extension)
        {
            if let Some(found) = rewritten.into_iter().find(|c| self.is_file(c)) {
                return Some(found);
            }
        }

        if has_ts_extension(path) && self.is_file(path) {
            return Some(path.to_path_buf());
        }

        // Append rather than replace: `./foo.service` must try `foo.service.d.ts`
        for ext in DECLARATION_EXTENSION_CANDIDATES {
            let with_ext = append_extension(path, ext);
            if self.is_file(&with_ext) {
                return Some(with_ext);
            }
        }
        None
    }

    /// Try to resolve a path as a file or directory
    fn try_file_or_directory(&self, path: &Path) -> Option<PathBuf> {
        if let Some(resolved) = self.try_file(path) {
            return Some(resolved);
        }
        ["index.d.ts", "index.ts"]
            .into_iter()
            .map(|index| path.join(index))
            .find(|index| self.is_file(index))
    }
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn has_ts_extension(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    TS_EXTENSIONS.iter().any(|ext| path_str.ends_with(ext))
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn js_extension_substitution(path: &Path, extension: &str) -> Option<Vec<PathBuf>> {
    let replacements: &[&str] = match extension {
        "js" => &["d.ts", "ts", "tsx"],
        "jsx" => &["tsx", "d.ts"],
        "mjs" => &["d.mts", "mts"],
        "cjs" => &["d.cts", "cts"],
        _ => return None,
    };

    Some(
        replacements
            .iter()
            .map(|ext| path.with_extension(ext))
            .collect(),
    )
}

/// Lexically normalize a path (`.` and `..` components), without touching
/// the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(files: &[&str]) -> ModuleResolver {
        ModuleResolver::in_memory(files.iter().copied())
    }

    #[test]
    fn test_relative_prefers_declaration_file() {
        let mut r = resolver(&["/src/a.d.ts", "/src/b.d.ts", "/src/b.ts"]);
        let result = r.resolve("./b", Path::new("/src/a.d.ts"));
        assert_eq!(result, Ok(Resolution::File(PathBuf::from("/src/b.d.ts"))));
    }

    #[test]
    fn test_parent_directory_and_index() {
        let mut r = resolver(&["/src/lib/index.d.ts", "/src/util/x.d.ts"]);
        let result = r.resolve("../lib", Path::new("/src/util/x.d.ts"));
        assert_eq!(
            result,
            Ok(Resolution::File(PathBuf::from("/src/lib/index.d.ts")))
        );
    }

    #[test]
    fn test_js_extension_substitution() {
        let mut r = resolver(&["/src/a.d.ts", "/src/b.d.ts", "/src/c.d.mts"]);
        assert_eq!(
            r.resolve("./b.js", Path::new("/src/a.d.ts")),
            Ok(Resolution::File(PathBuf::from("/src/b.d.ts")))
        );
        assert_eq!(
            r.resolve("./c.mjs", Path::new("/src/a.d.ts")),
            Ok(Resolution::File(PathBuf::from("/src/c.d.mts")))
        );
    }

    #[test]
    fn test_dotted_file_name_appends_extension() {
        let mut r = resolver(&["/src/a.d.ts", "/src/foo.service.d.ts"]);
        assert_eq!(
            r.resolve("./foo.service", Path::new("/src/a.d.ts")),
            Ok(Resolution::File(PathBuf::from("/src/foo.service.d.ts")))
        );
    }

    #[test]
    fn test_bare_specifier_is_external() {
        let mut r = resolver(&["/src/a.d.ts"]);
        assert_eq!(
            r.resolve("react", Path::new("/src/a.d.ts")),
            Ok(Resolution::External)
        );
        assert_eq!(
            r.resolve("@scope/pkg/sub", Path::new("/src/a.d.ts")),
            Ok(Resolution::External)
        );
    }

    #[test]
    fn test_missing_relative_produces_ts2307() {
        let mut r = resolver(&["/src/a.d.ts"]);
        let failure = r.resolve("./missing", Path::new("/src/a.d.ts")).unwrap_err();
        assert_eq!(failure.specifier(), "./missing");
        let diag = failure.to_diagnostic(20, 11);
        assert_eq!(diag.code, diagnostic_codes::CANNOT_FIND_MODULE);
        assert_eq!(diag.file, "/src/a.d.ts");
        assert_eq!((diag.start, diag.length), (20, 11));
        assert!(diag.message_text.contains("'./missing'"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c.d.ts")),
            PathBuf::from("/a/c.d.ts")
        );
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }
}
