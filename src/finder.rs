//! # Page resolution
//!
//! [`PageFinder`] turns a command name, a preferred platform and an ordered
//! list of languages into page content: it consults the command index to
//! pick the best `(platform, language)` pair, then the local cache, then the
//! page source, writing successful fetches back to the cache.

use tracing::{debug, warn};

use crate::cache::PageCache;
use crate::config::Settings;
use crate::download::{self, Fetched, PAGE_TIMEOUT};
use crate::error::Result;
use crate::index::{DEFAULT_LANGUAGE, Index, Target};

/// Outcome of a page lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Page content, from cache or network.
    Found(String),
    /// The index has no usable platform/language for this command.
    NoMatch,
    /// The index listed the page but the source returned nothing for it.
    Missing,
}

impl Lookup {
    pub fn content(&self) -> Option<&str> {
        match self {
            Lookup::Found(content) => Some(content),
            Lookup::NoMatch | Lookup::Missing => None,
        }
    }
}

/// Locates tldr pages through the index, the cache and the page source.
#[derive(Debug, Clone)]
pub struct PageFinder {
    source_url: String,
    cache_enabled: bool,
    proxy_url: Option<String>,
    cache: PageCache,
}

impl PageFinder {
    /// Create a finder reading pages from `source_url`.
    ///
    /// `cache` always stores the index; pages go through it only while
    /// `cache_enabled` is set.
    pub fn new(source_url: impl Into<String>, cache: PageCache, cache_enabled: bool) -> Self {
        Self {
            source_url: source_url.into(),
            cache_enabled,
            proxy_url: None,
            cache,
        }
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url;
        self
    }

    /// Build a finder and its cache from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let cache = PageCache::new(&settings.cache_location, settings.cache_timeout)
            .with_download_url(&settings.download_url)
            .with_index(&settings.index_url, settings.index_timeout)
            .with_proxy(settings.proxy_url.clone());

        PageFinder::new(&settings.source_url, cache, settings.cache_enabled)
            .with_proxy(settings.proxy_url.clone())
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// URL of a page at the source, e.g. `<source>.de/common/tar.md`.
    pub fn page_url(&self, target: &Target) -> String {
        let base = self.source_url.trim_end_matches('/');
        let suffix = if target.language == DEFAULT_LANGUAGE {
            String::new()
        } else {
            format!(".{}", target.language)
        };
        format!("{base}{suffix}/{}/{}.md", target.platform, target.name)
    }

    /// The command index, refreshed first if it is missing, stale or unreadable.
    fn index(&self) -> Result<Index> {
        if self.cache.check_index() {
            if let Some(index) = self.cache.load_index() {
                return Ok(index);
            }
        }
        self.cache.update_index()
    }

    /// Resolve the best `(name, platform, language)` for a query.
    ///
    /// # Errors
    /// Fails only if the index has to be refreshed and that refresh fails.
    pub fn search(&self, name: &str, platform: &str, languages: &[String]) -> Result<Option<Target>> {
        Ok(self.index()?.search(name, platform, languages))
    }

    /// Find the page for `name`.
    ///
    /// A 404 from the source is reported as [`Lookup::Missing`], any other
    /// download failure is returned as an error.
    pub fn find(&self, name: &str, platform: &str, languages: &[String]) -> Result<Lookup> {
        let Some(target) = self.search(name, platform, languages)? else {
            debug!(name, platform, ?languages, "no matching page in index");
            return Ok(Lookup::NoMatch);
        };
        debug!(?target, "resolved target");

        if self.cache_enabled {
            let cached = self
                .cache
                .get(&target.name, &target.platform, &target.language)
                .filter(|content| !content.is_empty());
            if let Some(content) = cached {
                debug!("cache hit");
                return Ok(Lookup::Found(content));
            }
        }

        let url = self.page_url(&target);
        let body = match download::fetch(&url, self.proxy_url.as_deref(), PAGE_TIMEOUT)? {
            Fetched::Content(body) => body,
            Fetched::NotFound => {
                warn!(url, "index lists a page the source does not have");
                return Ok(Lookup::Missing);
            }
        };

        let content = String::from_utf8_lossy(&body).into_owned();
        if content.is_empty() {
            return Ok(Lookup::Missing);
        }

        if self.cache_enabled {
            if let Err(err) = self
                .cache
                .set(&target.name, &target.platform, &content, &target.language)
            {
                warn!(%err, "failed to cache page");
            }
        }
        Ok(Lookup::Found(content))
    }

    /// Refresh the whole page tree and the index.
    pub fn sync(&self) -> Result<()> {
        self.cache.update()?;
        self.cache.update_index()?;
        Ok(())
    }
}
