use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// The canonical fully-qualified name a source file is expected to declare:
/// a namespace (possibly empty, meaning global) and a non-empty short name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassName {
    namespace: String,
    name: String,
}

impl ClassName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse a fully-qualified name such as `Acme\Model\User`. A leading
    /// backslash is tolerated; everything after the last separator is the
    /// short name.
    pub fn parse(fqn: &str) -> Self {
        let fqn = fqn.trim_start_matches('\\');
        match fqn.rsplit_once('\\') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new("", fqn),
        }
    }

    /// Namespace component; empty string means the global namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Short name component.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}\\{}", self.namespace, self.name)
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no class candidate for path {}", path.display())]
    NoCandidate { path: PathBuf },
}

/// Maps a file location to the canonical class name it should declare.
///
/// Implementations rank plausible candidates; `best_candidate` exposes the
/// top of the ranking. The reconciler consumes only this seam.
pub trait CandidateResolver {
    /// The best canonical name for `path`, or `NoCandidate` when the path
    /// lies outside every recognized root.
    fn best_candidate(&self, path: &Path) -> Result<ClassName, ResolveError>;
}

/// One PSR-4 autoload rule: a namespace prefix rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psr4Mapping {
    /// Namespace prefix without a trailing separator; empty maps the
    /// global namespace.
    pub prefix: String,
    /// Directory the prefix is rooted at, relative to the workspace root.
    pub dir: PathBuf,
}

impl Psr4Mapping {
    pub fn new(prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('\\').to_string(),
            dir: dir.into(),
        }
    }
}

/// PSR-4 candidate resolver over a set of prefix -> directory mappings.
///
/// Candidates are ranked by the depth of the matched directory, deepest
/// first, so the most specific mapping wins.
#[derive(Debug, Clone)]
pub struct Psr4Resolver {
    root: PathBuf,
    mappings: Vec<Psr4Mapping>,
}

impl Psr4Resolver {
    pub fn new(root: impl Into<PathBuf>, mappings: Vec<Psr4Mapping>) -> Self {
        let mut mappings = mappings;
        mappings.sort_by_key(|m| std::cmp::Reverse(m.dir.components().count()));

        Self {
            root: root.into(),
            mappings,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mappings(&self) -> &[Psr4Mapping] {
        &self.mappings
    }

    /// All candidate class names for `path`, most specific mapping first.
    pub fn candidates(&self, path: &Path) -> Vec<ClassName> {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) => rel,
            Err(_) if path.is_relative() => path,
            Err(_) => return Vec::new(),
        };

        self.mappings
            .iter()
            .filter_map(|mapping| class_for_mapping(mapping, relative))
            .collect()
    }
}

impl CandidateResolver for Psr4Resolver {
    fn best_candidate(&self, path: &Path) -> Result<ClassName, ResolveError> {
        self.candidates(path)
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoCandidate {
                path: path.to_path_buf(),
            })
    }
}

fn class_for_mapping(mapping: &Psr4Mapping, relative: &Path) -> Option<ClassName> {
    let under_dir = relative.strip_prefix(&mapping.dir).ok()?;

    let name = under_dir.file_stem()?.to_str()?;
    if name.is_empty() {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    if !mapping.prefix.is_empty() {
        segments.push(&mapping.prefix);
    }
    for component in under_dir.parent().into_iter().flat_map(Path::components) {
        match component {
            Component::Normal(seg) => segments.push(seg.to_str()?),
            _ => return None,
        }
    }

    Some(ClassName::new(segments.join("\\"), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Psr4Resolver {
        Psr4Resolver::new(
            "/project",
            vec![
                Psr4Mapping::new("Acme\\", "src"),
                Psr4Mapping::new("Acme\\Tests\\", "tests"),
                Psr4Mapping::new("Acme\\Plugin\\", "src/Plugin"),
            ],
        )
    }

    #[test]
    fn parse_fqn() {
        let fqn = ClassName::parse("Acme\\Model\\User");
        assert_eq!(fqn.namespace(), "Acme\\Model");
        assert_eq!(fqn.name(), "User");
    }

    #[test]
    fn parse_global_name() {
        let fqn = ClassName::parse("User");
        assert_eq!(fqn.namespace(), "");
        assert_eq!(fqn.name(), "User");
    }

    #[test]
    fn parse_tolerates_leading_separator() {
        assert_eq!(ClassName::parse("\\Acme\\User").to_string(), "Acme\\User");
    }

    #[test]
    fn resolves_nested_path() {
        let fqn = resolver()
            .best_candidate(Path::new("/project/src/Model/User.php"))
            .unwrap();
        assert_eq!(fqn.to_string(), "Acme\\Model\\User");
    }

    #[test]
    fn resolves_top_level_file() {
        let fqn = resolver()
            .best_candidate(Path::new("/project/src/Kernel.php"))
            .unwrap();
        assert_eq!(fqn.namespace(), "Acme");
        assert_eq!(fqn.name(), "Kernel");
    }

    #[test]
    fn deepest_mapping_wins() {
        let fqn = resolver()
            .best_candidate(Path::new("/project/src/Plugin/Hook.php"))
            .unwrap();
        assert_eq!(fqn.to_string(), "Acme\\Plugin\\Hook");
    }

    #[test]
    fn ranking_lists_all_matches() {
        let candidates = resolver().candidates(Path::new("/project/src/Plugin/Hook.php"));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].to_string(), "Acme\\Plugin\\Hook");
        assert_eq!(candidates[1].to_string(), "Acme\\Plugin\\Hook");
    }

    #[test]
    fn relative_paths_resolve_against_mappings() {
        let fqn = resolver()
            .best_candidate(Path::new("src/Model/User.php"))
            .unwrap();
        assert_eq!(fqn.to_string(), "Acme\\Model\\User");
    }

    #[test]
    fn unmapped_path_has_no_candidate() {
        let err = resolver()
            .best_candidate(Path::new("/project/scripts/migrate.php"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoCandidate { .. }));
    }

    #[test]
    fn path_outside_root_has_no_candidate() {
        let err = resolver()
            .best_candidate(Path::new("/elsewhere/src/User.php"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoCandidate { .. }));
    }

    #[test]
    fn empty_prefix_maps_global_namespace() {
        let resolver = Psr4Resolver::new("/p", vec![Psr4Mapping::new("", "src")]);
        let fqn = resolver.best_candidate(Path::new("/p/src/Legacy.php")).unwrap();
        assert_eq!(fqn.namespace(), "");
        assert_eq!(fqn.name(), "Legacy");
    }
}
