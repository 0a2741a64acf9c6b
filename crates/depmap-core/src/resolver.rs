//! Import resolution: raw reference strings to canonical node identities
//!
//! Resolution is a pure function of the accepted summary set. The resolver
//! never touches the filesystem; a reference either names a scanned file
//! (after normalization) or becomes an external node named after itself.

use std::collections::{BTreeSet, HashMap};

use crate::model::Language;

/// Outcome of resolving one raw reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reference names a scanned file.
    Internal(String),
    /// The reference names something outside the scanned set.
    External(String),
}

impl Resolution {
    pub fn identity(&self) -> &str {
        match self {
            Resolution::Internal(id) | Resolution::External(id) => id,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Resolution::Internal(_))
    }
}

/// Lookup tables built once from the scanned identities.
#[derive(Debug, Default)]
pub struct ImportResolver {
    identities: BTreeSet<String>,
    /// Every `/`-boundary suffix of every extension-less path, including the
    /// parent directory of index files, mapped to the identities it names.
    suffixes: HashMap<String, BTreeSet<String>>,
}

impl ImportResolver {
    /// Build a resolver over already-normalized identities.
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resolver = ImportResolver::default();
        for identity in identities {
            resolver.insert(identity.into());
        }
        resolver
    }

    fn insert(&mut self, identity: String) {
        let (stem, _) = split_extension(&identity);
        let mut keys = vec![stem.to_string()];
        if let Some((parent, file_stem)) = stem.rsplit_once('/') {
            if is_index_stem(file_stem) {
                keys.push(parent.to_string());
            }
        }
        for key in keys {
            for suffix in path_suffixes(&key) {
                self.suffixes
                    .entry(suffix.to_string())
                    .or_default()
                    .insert(identity.clone());
            }
        }
        self.identities.insert(identity);
    }

    /// Whether `identity` is one of the scanned files.
    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }

    /// Resolve `raw`, found in the file `from`, to a node identity.
    /// Returns `None` for references that are empty after normalization.
    pub fn resolve(&self, from: &str, language: Language, raw: &str) -> Option<Resolution> {
        let reference = clean_reference(raw);
        if reference.is_empty() {
            return None;
        }

        // Relative specifiers are joined to the directory of `from` before
        // any identity lookup.
        if is_path_relative(&reference) {
            let joined = join_path(parent_dir(from), &reference);
            return Some(self.resolve_joined(joined, &reference, language));
        }

        if language == Language::Python && reference.starts_with('.') {
            let joined = python_relative(from, &reference);
            return Some(self.resolve_joined(joined, &reference, language));
        }

        let normalized = normalize_path(&reference);
        if normalized.is_empty() {
            return None;
        }
        if self.contains(&normalized) {
            return Some(Resolution::Internal(normalized));
        }

        if let Some(rooted) = normalized.strip_prefix('/') {
            if let Some(found) = self.resolve_path(rooted, language) {
                return Some(found);
            }
        }

        if language.resolves_bare_by_suffix() {
            for candidate in namespace_candidates(&reference, language) {
                if let Some(found) = self.lookup_suffix(&candidate, language) {
                    return Some(Resolution::Internal(found));
                }
            }
        }

        Some(Resolution::External(normalized))
    }

    /// A joined relative path, or an external node named after it. A path
    /// that joins to the root keeps the raw reference as its name.
    fn resolve_joined(&self, joined: String, reference: &str, language: Language) -> Resolution {
        match self.resolve_path(&joined, language) {
            Some(found) => found,
            None if joined.is_empty() => Resolution::External(reference.to_string()),
            None => Resolution::External(joined),
        }
    }

    /// Resolve a rooted, extension-optional path against the scanned set.
    fn resolve_path(&self, path: &str, language: Language) -> Option<Resolution> {
        if self.contains(path) {
            return Some(Resolution::Internal(path.to_string()));
        }
        let (stem, _) = split_extension(path);
        for ext in language.candidate_extensions() {
            let candidate = format!("{}.{}", path, ext);
            if self.contains(&candidate) {
                return Some(Resolution::Internal(candidate));
            }
            for index in language.index_stems() {
                let candidate = join_path(path, &format!("{}.{}", index, ext));
                if self.contains(&candidate) {
                    return Some(Resolution::Internal(candidate));
                }
            }
        }
        // Unknown languages: any scanned file with the same stem.
        if language == Language::Other {
            let exact = self.suffixes.get(stem)?;
            return exact
                .iter()
                .find(|id| split_extension(id).0 == stem)
                .map(|id| Resolution::Internal(id.clone()));
        }
        None
    }

    fn lookup_suffix(&self, candidate: &str, language: Language) -> Option<String> {
        let matches = self.suffixes.get(candidate)?;
        let allowed = language.candidate_extensions();
        matches
            .iter()
            .find(|id| allowed.is_empty() || allowed.contains(&split_extension(id).1))
            .cloned()
    }
}

/// Canonical form of a caller-supplied path identity.
pub fn normalize_identity(path: &str) -> String {
    normalize_path(&clean_reference(path))
}

/// Trim whitespace and one pair of matching quotes, unify separators.
fn clean_reference(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'', '`']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    unquoted.trim().replace('\\', "/")
}

/// Collapse `.`, `..` and empty segments. Leading `..` segments that climb
/// above the root are kept; a leading `/` is kept.
fn normalize_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if rooted { format!("/{}", joined) } else { joined }
}

fn is_path_relative(reference: &str) -> bool {
    reference == "."
        || reference == ".."
        || reference.starts_with("./")
        || reference.starts_with("../")
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// `from .models import X` style: one dot is the current package, each
/// further dot climbs one level.
fn python_relative(from: &str, reference: &str) -> String {
    let dots = reference.chars().take_while(|c| *c == '.').count();
    let rest = reference[dots..].replace('.', "/");
    let mut base = parent_dir(from).to_string();
    for _ in 1..dots {
        base = join_path(&base, "..");
    }
    join_path(&base, &rest)
}

/// `dir/rel`, normalized. An empty `dir` is the root of the scanned set.
fn join_path(dir: &str, rel: &str) -> String {
    if dir.is_empty() {
        normalize_path(rel)
    } else {
        normalize_path(&format!("{}/{}", dir, rel))
    }
}

/// Path-shaped spellings of a namespace reference, most specific first.
fn namespace_candidates(reference: &str, language: Language) -> Vec<String> {
    let mut candidates = Vec::new();
    match language {
        Language::Rust => {
            let path = rust_module_path(reference);
            let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            while !segments.is_empty() {
                candidates.push(segments.join("/"));
                segments.pop();
            }
        }
        _ => {
            let trimmed = reference
                .trim_start_matches('/')
                .trim_end_matches(".*")
                .trim_end_matches("/*");
            let path = normalize_path(trimmed);
            let allowed = language.candidate_extensions();
            let (stem, ext) = split_extension(&path);
            let strip = if allowed.is_empty() {
                path.contains('/')
            } else {
                allowed.contains(&ext)
            };
            candidates.push(if strip { stem.to_string() } else { path.clone() });
            if !path.contains('/') && path.contains('.') {
                candidates.push(path.replace('.', "/"));
            }
        }
    }
    candidates.dedup();
    candidates
}

/// `crate::a::b::{C, D}` becomes `a/b`.
fn rust_module_path(reference: &str) -> String {
    let without_group = reference
        .split_once('{')
        .map(|(head, _)| head)
        .unwrap_or(reference)
        .trim_end_matches("::")
        .trim_end_matches("::*");
    let mut rest = without_group;
    for prefix in ["crate::", "self::", "super::"] {
        while let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
        }
    }
    rest.replace("::", "/")
}

/// Split `dir/name.ext` into (`dir/name`, `ext`). `.d.ts` counts as one
/// extension. Dotfiles and extension-less names return an empty extension.
fn split_extension(path: &str) -> (&str, &str) {
    if let Some(stem) = path.strip_suffix(".d.ts") {
        return (stem, "d.ts");
    }
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(0) | None => (path, ""),
        Some(dot) => {
            let dot = name_start + dot;
            (&path[..dot], &path[dot + 1..])
        }
    }
}

fn is_index_stem(stem: &str) -> bool {
    matches!(stem, "index" | "__init__" | "mod")
}

/// `a/b/c` yields `a/b/c`, `b/c`, `c`.
fn path_suffixes(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once(path).chain(
        path.match_indices('/')
            .map(move |(i, _)| &path[i + 1..])
            .filter(|s| !s.is_empty()),
    )
}
