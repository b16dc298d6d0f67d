//! State shared across one mirroring run.

use crate::project::Project;
use std::collections::HashSet;

/// Package path prefixes excluded from the mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    prefixes: Vec<String>,
}

impl Blacklist {
    /// Parse a `/`-separated list such as `cmd/internal`.
    pub fn parse(list: &str) -> Self {
        Self {
            prefixes: list
                .split('/')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Whether `package` is a listed prefix or lies below one.
    pub fn contains(&self, package: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            package == prefix
                || package
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// The project under construction plus per-run bookkeeping.
#[derive(Debug)]
pub struct RunContext {
    pub project: Project,
    pub blacklist: Blacklist,
    assets: HashSet<String>,
}

impl RunContext {
    pub fn new(project: Project, blacklist: Blacklist) -> Self {
        Self {
            project,
            blacklist,
            assets: HashSet::new(),
        }
    }

    /// Record an asset URL; returns `false` if it was already seen this run.
    pub fn mark_asset(&mut self, url: &str) -> bool {
        self.assets.insert(url.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_parse() {
        let bl = Blacklist::parse(" cmd / internal//");
        assert_eq!(bl.prefixes(), ["cmd", "internal"]);
        assert!(Blacklist::parse("").is_empty());
    }

    #[test]
    fn test_blacklist_contains() {
        let bl = Blacklist::parse("cmd/internal");
        assert!(bl.contains("cmd"));
        assert!(bl.contains("cmd/go"));
        assert!(bl.contains("internal/poll"));
        assert!(!bl.contains("cmdline"));
        assert!(!bl.contains("go/internal"));
        assert!(!bl.contains("archive/tar"));
    }

    #[test]
    fn test_assets_are_marked_once() {
        let mut ctx = RunContext::new(Project::new("Go"), Blacklist::default());
        assert!(ctx.mark_asset("http://h/lib/style.css"));
        assert!(!ctx.mark_asset("http://h/lib/style.css"));
        assert!(ctx.mark_asset("http://h/lib/godocs.js"));
    }
}
