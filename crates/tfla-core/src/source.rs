//! Module source classification
//!
//! A raw `source` string is classified by a single ordered procedure, first
//! match wins:
//!
//! 1. **Git**: a git scheme prefix (`git::`, `git@`, `git://`), a well-known
//!    hosting domain at the start or as the URL host, or a `.git` path suffix
//!    anywhere (`repo.git`, `repo.git//sub`, `repo.git?ref=x`).
//! 2. **Registry**: not relative, not absolute, no `::` or `://`, and at least
//!    two `/` separators (`namespace/name/provider[//subpath]`).
//! 3. **Local**: starts with `./` or `../`, or contains no `/` and no `::`.
//! 4. **Unclassified**: everything else, including the empty string.

use serde::{Deserialize, Serialize};

use crate::model::ModuleType;

const GIT_PREFIXES: &[&str] = &["git::", "git@", "git://"];

/// Hosts whose repositories are named `owner/repo`.
const GIT_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// Ref used in browse URLs when the source pins none.
const DEFAULT_REF: &str = "main";

const PUBLIC_REGISTRY: &str = "registry.terraform.io";

/// Result of classifying a source string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum SourceClass {
    Git(GitSource),
    Registry(RegistrySource),
    Local,
    Unclassified,
}

impl SourceClass {
    /// Registry and git sources point at configuration that is never parsed.
    pub fn is_external(&self) -> bool {
        matches!(self, SourceClass::Git(_) | SourceClass::Registry(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, SourceClass::Local)
    }

    /// Module subtype for a call site with this source.
    pub fn module_type(&self) -> ModuleType {
        match self {
            SourceClass::Git(_) => ModuleType::Git,
            SourceClass::Registry(_) => ModuleType::Registry,
            SourceClass::Local | SourceClass::Unclassified => ModuleType::Local,
        }
    }
}

/// Classify an optional source string. Absent sources are unclassified.
pub fn classify_opt(source: Option<&str>) -> SourceClass {
    source.map_or(SourceClass::Unclassified, classify)
}

/// Classify a source string. Total: every input yields exactly one class.
pub fn classify(source: &str) -> SourceClass {
    let source = source.trim();
    if source.is_empty() {
        SourceClass::Unclassified
    } else if looks_like_git(source) {
        SourceClass::Git(GitSource::parse(source))
    } else if has_registry_shape(source) {
        SourceClass::Registry(RegistrySource::parse(source))
    } else if has_local_shape(source) {
        SourceClass::Local
    } else {
        SourceClass::Unclassified
    }
}

pub fn is_git_source(source: &str) -> bool {
    matches!(classify(source), SourceClass::Git(_))
}

pub fn is_registry_source(source: &str) -> bool {
    matches!(classify(source), SourceClass::Registry(_))
}

pub fn is_local_source(source: &str) -> bool {
    classify(source).is_local()
}

fn looks_like_git(source: &str) -> bool {
    GIT_PREFIXES.iter().any(|p| source.starts_with(p))
        || GIT_HOSTS.iter().any(|h| source.starts_with(h))
        || (source.contains("://") && is_known_host(&host_of(source)))
        || has_git_suffix(source)
}

/// `.git` ending a path segment, so `.github` does not count.
fn has_git_suffix(source: &str) -> bool {
    source.match_indices(".git").any(|(i, m)| {
        let rest = &source[i + m.len()..];
        rest.is_empty() || rest.starts_with(|c| matches!(c, '/' | '?' | '#'))
    })
}

fn is_relative(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../")
}

fn has_registry_shape(source: &str) -> bool {
    !is_relative(source)
        && !source.starts_with('/')
        && !source.contains("::")
        && !source.contains("://")
        && source.matches('/').count() >= 2
}

fn has_local_shape(source: &str) -> bool {
    is_relative(source) || (!source.contains('/') && !source.contains("::"))
}

/// A `namespace/name/provider[//subpath]` registry address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySource {
    /// `namespace/name/provider` part.
    pub base: String,
    /// Path after the first `//`, if any.
    pub subpath: Option<String>,
    /// Display name: the `name` segment.
    pub name: String,
    /// `submodule: <last segment>` or `main module`.
    pub submodule: String,
}

impl RegistrySource {
    pub fn parse(source: &str) -> Self {
        let (base, subpath) = match source.split_once("//") {
            Some((base, sub)) => (base, Some(sub)),
            None => (source, None),
        };
        let name = base
            .split('/')
            .nth(1)
            .filter(|s| !s.is_empty())
            .unwrap_or(base)
            .to_string();
        let submodule = match subpath {
            Some(sub) => {
                let last = sub.rsplit('/').find(|s| !s.is_empty()).unwrap_or(sub);
                format!("submodule: {last}")
            }
            None => "main module".to_string(),
        };
        RegistrySource {
            base: base.to_string(),
            subpath: subpath.map(str::to_string),
            name,
            submodule,
        }
    }

    /// Registry-qualified source, e.g. `registry.terraform.io/ns/name/provider`.
    pub fn registry_source(&self, raw: &str) -> String {
        format!("{PUBLIC_REGISTRY}/{raw}")
    }

    /// Browse URL of the module page.
    ///
    /// A base whose first segment is a hostname names a private registry and
    /// is linked on that host.
    pub fn browse_url(&self) -> String {
        let first = self.base.split('/').next().unwrap_or_default();
        if first.contains('.') {
            format!("https://{}", self.base)
        } else {
            format!("https://{PUBLIC_REGISTRY}/modules/{}", self.base)
        }
    }
}

/// A git repository address with optional subpath and ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    /// `owner/repo` on well-known hosts, the last path segment otherwise.
    pub repository: String,
    /// Subdirectory inside the repository.
    pub subpath: Option<String>,
    /// `ref` query parameter, `main` when absent.
    pub reference: String,
    /// Browsable tree URL.
    pub url: String,
}

impl GitSource {
    pub fn parse(source: &str) -> Self {
        let location = strip_git_scheme(source);
        let location = without_query(location);
        let (repo, subpath) = split_subpath(location);
        GitSource {
            repository: repository_name(repo),
            subpath: subpath.map(str::to_string),
            reference: git_ref(source),
            url: browsable_git_url(source),
        }
    }

    /// `path: <subpath>` or `root`.
    pub fn path_label(&self) -> String {
        match &self.subpath {
            Some(sub) => format!("path: {sub}"),
            None => "root".to_string(),
        }
    }
}

fn strip_git_scheme(source: &str) -> &str {
    source.strip_prefix("git::").unwrap_or(source)
}

fn without_fragment(s: &str) -> &str {
    s.split('#').next().unwrap_or(s)
}

fn without_query(s: &str) -> &str {
    let s = without_fragment(s);
    s.split('?').next().unwrap_or(s)
}

/// The `ref` query parameter, or `main`.
pub fn git_ref(source: &str) -> String {
    without_fragment(strip_git_scheme(source))
        .split_once('?')
        .and_then(|(_, query)| {
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "ref")
                .map(|(_, value)| value)
        })
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REF)
        .to_string()
}

/// Split `repo//subpath`, ignoring the `//` of a URL scheme.
fn split_subpath(location: &str) -> (&str, Option<&str>) {
    let skip = location.find("://").map_or(0, |i| i + 3);
    match location[skip..].find("//") {
        Some(i) => {
            let at = skip + i;
            let sub = location[at + 2..].trim_matches('/');
            (&location[..at], (!sub.is_empty()).then_some(sub))
        }
        None => (location, None),
    }
}

/// Build a browsable tree URL for a git source.
///
/// Sources without a `.git` segment ending are returned unchanged, using the
/// same rule as classification.
pub fn browsable_git_url(source: &str) -> String {
    let stripped = strip_git_scheme(source);
    if !has_git_suffix(stripped) {
        return source.to_string();
    }

    let reference = git_ref(source);
    let location = without_query(stripped);
    let (repo, subpath) = match location.find(".git//") {
        Some(i) => {
            let sub = location[i + 6..].trim_matches('/');
            (&location[..i + 4], (!sub.is_empty()).then_some(sub))
        }
        None => (location, None),
    };
    let base = repo.strip_suffix(".git").unwrap_or(repo);
    let base = https_base(base);

    let tree = if host_of(&base).contains("gitlab") {
        "/-/tree"
    } else {
        "/tree"
    };
    let mut url = format!("{base}{tree}/{reference}");
    if let Some(sub) = subpath {
        url.push('/');
        url.push_str(sub);
    }
    url
}

/// Rewrite ssh-style addresses (`git@host:owner/repo`, `ssh://git@host/...`)
/// to https; other strings are kept as they are.
fn https_base(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("ssh://") {
        let rest = rest.split_once('@').map_or(rest, |(_, r)| r);
        return format!("https://{rest}");
    }
    if !base.contains("://") {
        if let Some(rest) = base.strip_prefix("git@") {
            return format!("https://{}", rest.replacen(':', "/", 1));
        }
    }
    base.to_string()
}

/// Lowercased host of a URL-ish string; a scheme is assumed when missing.
fn host_of(s: &str) -> String {
    let after_scheme = s.split_once("://").map_or(s, |(_, rest)| rest);
    let authority = after_scheme.split('/').next().unwrap_or_default();
    let authority = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = authority.split(':').next().unwrap_or_default();
    host.to_ascii_lowercase()
}

fn is_known_host(host: &str) -> bool {
    GIT_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")))
}

/// Short repository display name for a repository location.
pub fn repository_name(location: &str) -> String {
    let location = https_base(location);
    let host = host_of(&location);
    let after_scheme = location
        .split_once("://")
        .map_or(location.as_str(), |(_, rest)| rest);
    let segments: Vec<&str> = after_scheme
        .split('/')
        .skip(1)
        .filter(|s| !s.is_empty())
        .collect();

    let trim = |s: &str| s.strip_suffix(".git").unwrap_or(s).to_string();
    if is_known_host(&host) && segments.len() >= 2 {
        return format!("{}/{}", segments[0], trim(segments[1]));
    }
    match segments.last() {
        Some(last) => trim(last),
        None => trim(after_scheme),
    }
}
