//! Crawl orchestration: listing page, packages, source files, assets.
//!
//! The crawl is sequential. Each page is fetched, read into owned values
//! (rows, symbols, asset references), rewritten for offline use and written
//! out before the next page is requested, so output is deterministic for a
//! given site.

use crate::cache::PageCache;
use crate::compile::compile_project;
use crate::config::{MirrorConfig, STYLESHEET_FILE};
use crate::context::{Blacklist, RunContext};
use crate::document::HtmlDocument;
use crate::error::{MirrorError, Result};
use crate::fetch::Fetcher;
use crate::level::LevelTreeBuilder;
use crate::listing::package_rows;
use crate::package::PackageIndexer;
use crate::paths::{absolute_path, absolute_url, local_filename, same_host};
use crate::persistence::{install_stylesheet, save_project, write_file};
use crate::project::Project;
use crate::rewrite::clean_page;
use crate::tree::{Icon, NodeId};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

/// Outline label of the entry pointing at the package listing.
pub const PACKAGES_LABEL: &str = "Packages";

/// How a run is set up.
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    /// Directory the offline tree and project files are written to.
    pub output_dir: PathBuf,
    pub blacklist: Blacklist,
    /// Keep responses in the cache database between runs.
    pub use_cache: bool,
    /// Run the help compiler on the saved project.
    pub compile: bool,
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct MirrorSummary {
    /// Pages fetched, rewritten and written.
    pub pages: usize,
    /// Assets written next to the pages.
    pub assets: usize,
    /// Bodies downloaded over the network (cache misses).
    pub downloads: usize,
    pub outline_nodes: usize,
    pub index_keywords: usize,
    /// Full paths of blacklisted packages.
    pub skipped_packages: Vec<String>,
    /// Project files written.
    pub written: Vec<PathBuf>,
    pub compiled: bool,
}

/// Tracks the full import path of listing rows as levels change, in step
/// with [`LevelTreeBuilder`].
#[derive(Debug, Default)]
struct PackagePath {
    parents: Vec<String>,
    previous: String,
    previous_level: usize,
}

impl PackagePath {
    /// Full path of a row named `name` at `level`.
    fn enter(&mut self, name: &str, level: usize) -> String {
        if level > self.previous_level {
            self.parents.push(std::mem::take(&mut self.previous));
        } else {
            for _ in level..self.previous_level {
                self.parents.pop();
            }
        }
        self.previous = name.to_owned();
        self.previous_level = level;

        self.parents
            .iter()
            .map(String::as_str)
            .chain([name])
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Mirrors a documentation site into a help project.
pub struct Mirror {
    config: MirrorConfig,
    output_dir: PathBuf,
    fetcher: Fetcher,
    ctx: RunContext,
    compile: bool,
    pages: usize,
    assets: usize,
    skipped: Vec<String>,
}

impl Mirror {
    /// Prepare a run; opens the response cache when requested.
    pub fn new(config: MirrorConfig, options: MirrorOptions) -> Result<Self> {
        config.validate()?;

        let cache = if options.use_cache {
            let path = options.output_dir.join(&config.fetch.cache_file);
            info!(path = %path.display(), "using response cache");
            Some(PageCache::open(&path)?)
        } else {
            None
        };
        let fetcher = Fetcher::new(&config.fetch, cache)?;

        let project = Project::new(&config.project.name).with_index_order(config.index.order);
        Ok(Self {
            ctx: RunContext::new(project, options.blacklist),
            output_dir: options.output_dir,
            compile: options.compile,
            config,
            fetcher,
            pages: 0,
            assets: 0,
            skipped: Vec::new(),
        })
    }

    pub fn project(&self) -> &Project {
        &self.ctx.project
    }

    /// Mirror everything reachable from the package listing at `listing_url`
    /// and save the project.
    pub async fn run(mut self, listing_url: &str) -> Result<MirrorSummary> {
        if !self.ctx.blacklist.is_empty() {
            info!(prefixes = ?self.ctx.blacklist.prefixes(), "blacklist");
        }
        let start_file = local_filename(listing_url)?;
        let outline = self.ctx.project.outline_mut();
        let root = outline.root();
        outline.add_child(root, PACKAGES_LABEL, Some(&start_file));
        self.ctx.project.set_start_file(&start_file);

        self.mirror_listing(listing_url).await?;

        if install_stylesheet(&self.config.project.stylesheet, &self.output_dir)? {
            info!(path = %self.config.project.stylesheet.display(), "installed stylesheet");
        }
        self.ctx.project.add_file(STYLESHEET_FILE);

        let written = save_project(&self.ctx.project, &self.output_dir)?;
        for path in &written {
            info!(path = %path.display(), "saved");
        }

        if self.compile {
            compile_project(
                &self.config.project.compiler,
                self.config.project.compiler_success_code,
                &self.output_dir,
                &self.ctx.project.manifest_filename(),
            )
            .await?;
        }

        let summary = MirrorSummary {
            pages: self.pages,
            assets: self.assets,
            downloads: self.fetcher.downloads(),
            outline_nodes: self.ctx.project.outline().node_count(),
            index_keywords: self.ctx.project.index().keyword_count(),
            skipped_packages: self.skipped,
            written,
            compiled: self.compile,
        };
        self.fetcher.close()?;
        Ok(summary)
    }

    async fn mirror_listing(&mut self, url: &str) -> Result<()> {
        info!(url, "reading package listing");
        let markup = self.fetch_markup(url).await?;
        let (rows, assets) = {
            let doc = HtmlDocument::parse(&markup);
            (
                package_rows(&doc, self.config.listing.indent_unit_px)?,
                doc.asset_refs()?,
            )
        };
        self.finish_page(url, &markup, assets).await?;

        let root = self.ctx.project.outline().root();
        let mut builder = LevelTreeBuilder::new(root);
        let mut path = PackagePath::default();

        for row in rows {
            let package = path.enter(&row.label, row.level);
            if self.ctx.blacklist.contains(&package) {
                info!(package = %package, "blacklisted, skipping");
                builder.skip(self.ctx.project.outline(), &row.label, row.level)?;
                self.skipped.push(package);
                continue;
            }

            let target = absolute_path(url, &row.href)?;
            let page_url = absolute_url(url, &row.href)?;
            builder.enter(self.ctx.project.outline(), &row.label, row.level)?;
            let node = builder.insert(self.ctx.project.outline_mut(), &row.label, Some(&target));

            self.mirror_package(&page_url, &package, node, &target).await?;
        }
        Ok(())
    }

    async fn mirror_package(
        &mut self,
        url: &str,
        package: &str,
        node: NodeId,
        target: &str,
    ) -> Result<()> {
        info!(package, url, "indexing package");
        let markup = self.fetch_markup(url).await?;

        let (report, assets) = {
            let doc = HtmlDocument::parse(&markup);
            let (outline, index) = self.ctx.project.trees_mut();
            let report = PackageIndexer::new(&doc, url, package).index(outline, index, node)?;
            (report, doc.asset_refs()?)
        };

        let (outline, index) = self.ctx.project.trees_mut();
        if report.is_directory {
            outline.tag(node, Icon::Directory);
        } else {
            let keyword = format!("{} (package {package})", outline.label(node));
            index.add_keyword(&keyword, target, &report.title);
            debug!(package, keywords = report.keywords, "indexed symbols");
        }

        self.finish_page(url, &markup, assets).await?;

        for file in &report.source_files {
            if !self.is_same_site(url, file)? {
                debug!(url = %file, "source file on another host, left remote");
                continue;
            }
            self.mirror_page(file).await?;
        }
        Ok(())
    }

    /// Fetch, rewrite and write a page that contributes nothing to the trees.
    async fn mirror_page(&mut self, url: &str) -> Result<()> {
        let markup = self.fetch_markup(url).await?;
        let assets = HtmlDocument::parse(&markup).asset_refs()?;
        self.finish_page(url, &markup, assets).await
    }

    async fn fetch_markup(&mut self, url: &str) -> Result<String> {
        let body = self.fetcher.fetch(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Download the page's assets, rewrite it and write it out.
    async fn finish_page(&mut self, url: &str, markup: &str, assets: Vec<String>) -> Result<()> {
        for asset in assets {
            self.download_asset(url, &asset).await?;
        }

        let cleaned = clean_page(url, markup)?;
        let file = local_filename(url)?;
        write_file(&self.output_dir, &file, cleaned.as_bytes())?;
        self.ctx.project.add_file(&file);
        self.pages += 1;
        Ok(())
    }

    /// Download an asset once per run. Failures are logged and skipped.
    async fn download_asset(&mut self, page_url: &str, href: &str) -> Result<()> {
        let url = absolute_url(page_url, href)?;
        if !self.ctx.mark_asset(&url) {
            return Ok(());
        }
        if !self.is_same_site(page_url, &url)? {
            debug!(url = %url, "asset on another host, left remote");
            return Ok(());
        }

        match self.fetcher.fetch(&url).await {
            Ok(body) => {
                let file = local_filename(&url)?;
                write_file(&self.output_dir, &file, &body)?;
                self.ctx.project.add_file(&file);
                self.assets += 1;
            }
            Err(e) => warn!(url = %url, error = %e, "asset download failed, skipping"),
        }
        Ok(())
    }

    fn is_same_site(&self, page_url: &str, url: &str) -> Result<bool> {
        let page = Url::parse(page_url).map_err(|e| MirrorError::path(page_url, e))?;
        let other = Url::parse(url).map_err(|e| MirrorError::path(url, e))?;
        Ok(same_host(&page, &other))
    }
}
