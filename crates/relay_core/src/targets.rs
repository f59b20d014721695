use url::Url;

use crate::RequestError;

const ID_PATH_MARKERS: [&str; 4] = ["posts", "permalink", "videos", "photos"];

/// Ordered list of post identifiers. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetList {
    targets: Vec<String>,
}

impl TargetList {
    /// Split a comma-separated string into trimmed, non-empty identifiers.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let targets: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        if targets.is_empty() {
            return Err(RequestError::EmptyTargets);
        }
        Ok(Self { targets })
    }

    /// Resolve link entries to identifiers; entries that cannot be resolved
    /// are dropped and counted.
    pub fn resolve(self) -> Result<ResolvedTargets, RequestError> {
        let mut resolved = Vec::with_capacity(self.targets.len());
        let mut unresolved = Vec::new();
        for entry in self.targets {
            match resolve_target(&entry) {
                Some(id) => resolved.push(id),
                None => unresolved.push(entry),
            }
        }
        if resolved.is_empty() {
            return Err(RequestError::EmptyTargets);
        }
        Ok(ResolvedTargets {
            targets: TargetList { targets: resolved },
            unresolved,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.targets
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTargets {
    pub targets: TargetList,
    /// Link entries no identifier could be extracted from, in input order.
    pub unresolved: Vec<String>,
}

/// Map one target entry to a post identifier.
///
/// Plain entries pass through untouched. Links are resolved from the
/// `story_fbid`/`id` pair, then `fbid`, then the numeric path segment that
/// follows `posts`, `permalink`, `videos` or `photos`.
pub fn resolve_target(entry: &str) -> Option<String> {
    if !entry.contains("://") {
        return Some(entry.to_string());
    }
    let url = Url::parse(entry).ok()?;

    let query_value = |key: &str| {
        url.query_pairs()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.into_owned())
    };

    if let Some(story) = query_value("story_fbid") {
        return Some(match query_value("id") {
            Some(owner) => format!("{owner}_{story}"),
            None => story,
        });
    }
    if let Some(fbid) = query_value("fbid") {
        return Some(fbid);
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    segments
        .windows(2)
        .filter(|pair| ID_PATH_MARKERS.contains(&pair[0]))
        .map(|pair| pair[1])
        .find(|candidate| candidate.chars().all(|c| c.is_ascii_digit()))
        .map(ToOwned::to_owned)
}
