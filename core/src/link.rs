use std::fmt;

use percent_encoding::percent_decode_str;

pub const DEFAULT_VIEW_PREFIX: &str = "/view/";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativeLinks {
    AgainstDocument,
    Ignore,
}

/// Decides which hrefs count as internal documents and how they map to
/// resource paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPolicy {
    pub view_prefix: String,
    /// Page origin (`scheme://host[:port]`). Absolute URLs on this origin are
    /// treated like root-relative hrefs.
    pub origin: Option<String>,
    pub relative: RelativeLinks,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            view_prefix: DEFAULT_VIEW_PREFIX.to_string(),
            origin: None,
            relative: RelativeLinks::AgainstDocument,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    Empty,
    InPageAnchor,
    Script,
    External,
    OutsideViewPrefix,
    RelativeIgnored,
    DocumentOutsideRoot,
    EscapesRoot,
    Directory,
    Malformed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Empty => write!(f, "link has no target"),
            LinkError::InPageAnchor => write!(f, "link points inside the current page"),
            LinkError::Script => write!(f, "link is a script url"),
            LinkError::External => write!(f, "link points to another origin"),
            LinkError::OutsideViewPrefix => write!(f, "link is not under the document view prefix"),
            LinkError::RelativeIgnored => write!(f, "relative links are not previewed"),
            LinkError::DocumentOutsideRoot => {
                write!(f, "current document is not under the content root")
            }
            LinkError::EscapesRoot => write!(f, "link resolves outside the content root"),
            LinkError::Directory => write!(f, "link points at a directory, not a document"),
            LinkError::Malformed => write!(f, "link target is not valid utf-8 after decoding"),
        }
    }
}

impl std::error::Error for LinkError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HrefKind<'a> {
    Empty,
    Anchor,
    Script,
    /// Carries a scheme or is protocol-relative.
    Absolute(&'a str),
    Rooted(&'a str),
    Relative(&'a str),
}

pub fn classify_href(href: &str) -> HrefKind<'_> {
    let href = href.trim();
    if href.is_empty() {
        return HrefKind::Empty;
    }
    if href.starts_with('#') {
        return HrefKind::Anchor;
    }
    if has_scheme(href) {
        if href
            .get(..11)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        {
            return HrefKind::Script;
        }
        return HrefKind::Absolute(href);
    }
    if href.starts_with("//") {
        return HrefKind::Absolute(href);
    }
    if href.starts_with('/') {
        return HrefKind::Rooted(href);
    }
    HrefKind::Relative(href)
}

fn has_scheme(href: &str) -> bool {
    let Some(colon) = href.find(':') else {
        return false;
    };
    let scheme = &href[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

/// Strips the view prefix from a location pathname, yielding the resource
/// path of the document currently on screen.
pub fn document_path(pathname: &str, policy: &LinkPolicy) -> Option<String> {
    let rest = pathname.strip_prefix(policy.view_prefix.as_str())?;
    let decoded = decode(strip_suffixes(rest)).ok()?;
    let normalized = normalize(&[], &decoded).ok()?;
    if normalized.is_empty() {
        return None;
    }
    Some(normalized)
}

/// Resolves a raw href into a resource path. `document` is the resource path
/// of the current page, if it has one.
pub fn resolve_link(
    href: &str,
    document: Option<&str>,
    policy: &LinkPolicy,
) -> Result<String, LinkError> {
    match classify_href(href) {
        HrefKind::Empty => Err(LinkError::Empty),
        HrefKind::Anchor => Err(LinkError::InPageAnchor),
        HrefKind::Script => Err(LinkError::Script),
        HrefKind::Absolute(url) => {
            let rooted = strip_origin(url, policy).ok_or(LinkError::External)?;
            resolve_rooted(rooted, policy)
        }
        HrefKind::Rooted(path) => resolve_rooted(path, policy),
        HrefKind::Relative(path) => {
            if policy.relative == RelativeLinks::Ignore {
                return Err(LinkError::RelativeIgnored);
            }
            let document = document.ok_or(LinkError::DocumentOutsideRoot)?;
            let base = parent_segments(document);
            let decoded = decode(strip_suffixes(path))?;
            let resolved = normalize(&base, &decoded)?;
            if resolved.is_empty() {
                return Err(LinkError::EscapesRoot);
            }
            if names_directory(&decoded) {
                return Err(LinkError::Directory);
            }
            Ok(resolved)
        }
    }
}

fn strip_origin<'a>(url: &'a str, policy: &LinkPolicy) -> Option<&'a str> {
    let origin = policy.origin.as_deref()?.trim_end_matches('/');
    let rest = if url.starts_with("//") {
        let host = origin.split_once("://").map(|(_, host)| host)?;
        url[2..].strip_prefix(host)?
    } else {
        url.strip_prefix(origin)?
    };
    if rest.is_empty() {
        return Some("/");
    }
    if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn resolve_rooted(path: &str, policy: &LinkPolicy) -> Result<String, LinkError> {
    let rest = path
        .strip_prefix(policy.view_prefix.as_str())
        .ok_or(LinkError::OutsideViewPrefix)?;
    let decoded = decode(strip_suffixes(rest))?;
    let resolved = normalize(&[], &decoded)?;
    if resolved.is_empty() {
        return Err(LinkError::OutsideViewPrefix);
    }
    if names_directory(&decoded) {
        return Err(LinkError::Directory);
    }
    Ok(resolved)
}

/// True when the last segment is empty or a dot segment, e.g. `./`,
/// `notes/`, `..` or a bare query.
fn names_directory(path: &str) -> bool {
    matches!(path.rsplit('/').next(), None | Some("" | "." | ".."))
}

fn strip_suffixes(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    &raw[..end]
}

fn decode(raw: &str) -> Result<String, LinkError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|value| value.into_owned())
        .map_err(|_| LinkError::Malformed)
}

fn parent_segments(document: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = document.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments
}

fn normalize(base: &[&str], path: &str) -> Result<String, LinkError> {
    let mut out: Vec<&str> = base.to_vec();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if out.pop().is_none() {
                    return Err(LinkError::EscapesRoot);
                }
            }
            other => out.push(other),
        }
    }
    Ok(out.join("/"))
}
