//! Help Mirror - offline HTML Help projects from generated reference documentation.
//!
//! The mirror crawls a documentation site's package listing, every package
//! page and each package's source files, rewrites the pages so they work
//! from disk, and builds the three files an HTML Help compiler needs:
//!
//! 1. a project manifest (`.hhp`) listing options, the default window and every file
//! 2. a hierarchical outline (`.hhc`) rebuilt from the site's indented listings
//! 3. a keyword index (`.hhk`) of packages, types, functions, methods, constants and variables
//!
//! With `compile` set, the saved project is then handed to the HTML Help
//! compiler.
//!
//! # Quick Start
//!
//! ```no_run
//! use help_mirror::{Blacklist, Mirror, MirrorConfig, MirrorOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MirrorConfig::load(None)?;
//!     let options = MirrorOptions {
//!         output_dir: "out".into(),
//!         blacklist: Blacklist::parse("cmd/internal"),
//!         use_cache: true,
//!         compile: false,
//!     };
//!
//!     let summary = Mirror::new(config, options)?
//!         .run("http://localhost:6060/pkg/")
//!         .await?;
//!     println!("{} pages, {} keywords", summary.pages, summary.index_keywords);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **paths**: URL to offline path mapping
//! - **OutlineTree / IndexTree**: the contents and index trees
//! - **LevelTreeBuilder**: rebuilds nesting from flat indented rows
//! - **keyword**: index keyword classification and ordering
//! - **Project**: manifest plus sitemap serialization
//! - **Mirror**: the crawl itself

pub mod cache;
pub mod compile;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod fetch;
pub mod index;
pub mod keyword;
pub mod level;
pub mod listing;
pub mod mirror;
pub mod package;
pub mod paths;
pub mod persistence;
pub mod project;
pub mod rewrite;
pub mod sitemap;
pub mod tree;

// Re-export commonly used types
pub use config::MirrorConfig;
pub use context::Blacklist;
pub use error::{MirrorError, Result, StructureError};
pub use index::{EntryId, IndexTree};
pub use keyword::{classify, compare_entries, ClassifiedKeyword, EntryKind, IndexOrder};
pub use level::{build_level_tree, LevelRecord, LevelTreeBuilder};
pub use mirror::{Mirror, MirrorOptions, MirrorSummary};
pub use project::Project;
pub use tree::{Icon, NodeId, OutlineTree};
