//! Index keyword classification and ordering.
//!
//! Index keywords are display labels such as `Get() (func in net/http)` or
//! `Do() (method of Client in net/http)`. They are parsed with a small
//! grammar into a [`ClassifiedKeyword`] and ordered by symbol name first, so
//! that all symbols called `Get` appear together, then by owning package,
//! declaration kind and enclosing type.

use crate::error::{MirrorError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Kind of declaration a keyword refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Const,
    Var,
    Func,
    Type,
    Method,
}

impl EntryKind {
    /// Fixed rank used for ordering keywords with the same name and package.
    pub fn rank(self) -> u8 {
        match self {
            EntryKind::Const => 1,
            EntryKind::Var => 2,
            EntryKind::Func => 3,
            EntryKind::Type => 4,
            EntryKind::Method => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Const => "const",
            EntryKind::Var => "var",
            EntryKind::Func => "func",
            EntryKind::Type => "type",
            EntryKind::Method => "method",
        }
    }

    fn parse(word: &str) -> Option<Self> {
        match word {
            "const" => Some(EntryKind::Const),
            "var" => Some(EntryKind::Var),
            "func" => Some(EntryKind::Func),
            "type" => Some(EntryKind::Type),
            "method" => Some(EntryKind::Method),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of an index keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedKeyword {
    /// The full label as it appears in the index.
    pub keyword: String,
    /// Leading word of the label.
    pub name: String,
    /// Declaration kind, when the label carries one.
    pub kind: Option<EntryKind>,
    /// Receiver type for methods, empty otherwise.
    pub enclosing_type: String,
    /// Owning package path, empty when the label names none.
    pub package: String,
}

/// One production of the keyword suffix grammar.
struct Production {
    pattern: Regex,
    build: fn(&Captures<'_>) -> (Option<EntryKind>, String, String),
}

static NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?-u:\w)+").unwrap());

/// Suffix productions, tried in order; the first match wins.
static GRAMMAR: LazyLock<[Production; 2]> = LazyLock::new(|| {
    [
        Production {
            pattern: Regex::new(r"\(method of ((?-u:\w)+?) in (.+)\)$").unwrap(),
            build: |c| (Some(EntryKind::Method), c[1].to_owned(), c[2].to_owned()),
        },
        Production {
            pattern: Regex::new(r"\((const|var|func|type) in (.+)\)$").unwrap(),
            build: |c| (EntryKind::parse(&c[1]), String::new(), c[2].to_owned()),
        },
    ]
});

/// Parse an index label into its parts.
pub fn classify(label: &str) -> Result<ClassifiedKeyword> {
    let name = NAME
        .find(label)
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| MirrorError::Format(format!("index keyword '{label}' has no name")))?;

    let (kind, enclosing_type, package) = GRAMMAR
        .iter()
        .find_map(|p| p.pattern.captures(label).map(|c| (p.build)(&c)))
        .unwrap_or_default();

    Ok(ClassifiedKeyword {
        keyword: label.to_owned(),
        name,
        kind,
        enclosing_type,
        package,
    })
}

/// Case-insensitive string comparison without allocating.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Compare two `/`-delimited package paths.
///
/// Paths with fewer segments come first; paths of equal depth compare
/// segment by segment, ignoring case.
pub fn compare_package_paths(p1: &str, p2: &str) -> Ordering {
    let s1: Vec<&str> = p1.split('/').collect();
    let s2: Vec<&str> = p2.split('/').collect();

    s1.len().cmp(&s2.len()).then_with(|| {
        s1.iter()
            .zip(s2.iter())
            .map(|(a, b)| cmp_ignore_case(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Total order for index display.
pub fn compare_entries(a: &ClassifiedKeyword, b: &ClassifiedKeyword) -> Ordering {
    let rank = |k: Option<EntryKind>| k.map_or(0, EntryKind::rank);

    cmp_ignore_case(&a.name, &b.name)
        .then_with(|| compare_package_paths(&a.package, &b.package))
        .then_with(|| rank(a.kind).cmp(&rank(b.kind)))
        .then_with(|| cmp_ignore_case(&a.enclosing_type, &b.enclosing_type))
        .then_with(|| cmp_ignore_case(&a.keyword, &b.keyword))
}

/// Whether `a` is displayed before `b`.
pub fn entry_precedes(a: &ClassifiedKeyword, b: &ClassifiedKeyword) -> bool {
    compare_entries(a, b) == Ordering::Less
}

/// How index keywords are ordered in the generated index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexOrder {
    /// Name, package, kind, enclosing type, keyword.
    #[default]
    Composite,
    /// Plain case-insensitive keyword order.
    Keyword,
}

impl FromStr for IndexOrder {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "composite" => Ok(IndexOrder::Composite),
            "keyword" => Ok(IndexOrder::Keyword),
            other => Err(MirrorError::Config(format!("unknown index order '{other}'"))),
        }
    }
}
