//! # Local page cache for tldr
//!
//! Pages are stored as `<location>/pages[.<language>]/<platform>/<name>.md`,
//! the compact command index as `<location>/index.json`. Freshness is read
//! from file modification times on every access; stale files are ignored,
//! never eagerly deleted. Writes replace whole files in place, so two
//! processes writing the same entry race and the last writer wins.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::download::{self, BULK_TIMEOUT};
use crate::error::{Result, TldrError};
use crate::index::{DEFAULT_LANGUAGE, Index};

const PAGES_DIR: &str = "pages";
const INDEX_FILE: &str = "index.json";

/// Filesystem-backed store of fetched pages and the command index.
#[derive(Debug, Clone)]
pub struct PageCache {
    /// TTL for pages, in hours.
    timeout: f64,
    /// TTL for the index, in hours.
    index_timeout: f64,
    location: PathBuf,
    download_url: String,
    index_url: String,
    proxy_url: Option<String>,
}

impl PageCache {
    /// Create a cache rooted at `location` whose entries live `timeout` hours.
    pub fn new(location: impl Into<PathBuf>, timeout: f64) -> Self {
        Self {
            timeout,
            index_timeout: timeout,
            location: location.into(),
            download_url: String::new(),
            index_url: String::new(),
            proxy_url: None,
        }
    }

    /// Set the URL of the bulk pages archive.
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = url.into();
        self
    }

    /// Set the URL of the upstream command manifest and the index TTL.
    pub fn with_index(mut self, url: impl Into<String>, timeout: f64) -> Self {
        self.index_url = url.into();
        self.index_timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url;
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Directory holding all pages of one language.
    fn pages_dir(&self, language: &str) -> PathBuf {
        if language.is_empty() || language == DEFAULT_LANGUAGE {
            self.location.join(PAGES_DIR)
        } else {
            self.location.join(format!("{PAGES_DIR}.{language}"))
        }
    }

    /// Expected path of a page file.
    pub fn page_file(&self, name: &str, platform: &str, language: &str) -> PathBuf {
        self.pages_dir(language)
            .join(platform)
            .join(format!("{name}.md"))
    }

    pub fn index_file(&self) -> PathBuf {
        self.location.join(INDEX_FILE)
    }

    /// Return the cached page if it exists and is younger than the TTL.
    ///
    /// Missing, stale and unreadable entries are all reported as `None`.
    pub fn get(&self, name: &str, platform: &str, language: &str) -> Option<String> {
        let page_file = self.page_file(name, platform, language);
        if !is_fresh(&page_file, self.timeout) {
            debug!(path = %page_file.display(), "page missing or stale");
            return None;
        }

        match fs::read_to_string(&page_file) {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(path = %page_file.display(), %err, "ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Store a page, creating missing directories and overwriting any prior value.
    ///
    /// # Errors
    /// Returns an error if a directory or the file cannot be written.
    pub fn set(&self, name: &str, platform: &str, content: &str, language: &str) -> Result<()> {
        let page_file = self.page_file(name, platform, language);
        if let Some(parent) = page_file.parent() {
            fs::create_dir_all(parent).map_err(|e| TldrError::io(parent, e))?;
        }
        fs::write(&page_file, content).map_err(|e| TldrError::io(&page_file, e))?;
        debug!(path = %page_file.display(), "page cached");
        Ok(())
    }

    /// Replace the whole page tree with the latest archive.
    ///
    /// The archive is downloaded and validated before anything on disk is
    /// touched; a failed download or a corrupt archive leaves the cache as it
    /// was. After extraction only page directories remain at the top level.
    ///
    /// # Errors
    /// Returns the download failure, an archive error, or an IO error.
    pub fn update(&self) -> Result<()> {
        info!(url = %self.download_url, "downloading pages archive");
        let data = download::download(&self.download_url, self.proxy_url.as_deref(), BULK_TIMEOUT)?;
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        fs::create_dir_all(&self.location).map_err(|e| TldrError::io(&self.location, e))?;
        self.clear_pages()?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let Some(relative) = entry.enclosed_name() else {
                warn!(name = entry.name(), "skipping archive entry outside cache root");
                continue;
            };
            let out_path = self.location.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| TldrError::io(&out_path, e))?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| TldrError::io(parent, e))?;
            }
            let mut out_file = File::create(&out_path).map_err(|e| TldrError::io(&out_path, e))?;
            io::copy(&mut entry, &mut out_file).map_err(|e| TldrError::io(&out_path, e))?;
        }

        // Manifest, license and any other loose files are not pages
        self.remove_loose_files()?;
        info!(entries = archive.len(), "pages archive extracted");
        Ok(())
    }

    /// Remove every `pages*` directory under the cache root.
    fn clear_pages(&self) -> Result<()> {
        let entries = fs::read_dir(&self.location).map_err(|e| TldrError::io(&self.location, e))?;
        for entry in entries {
            let path = entry.map_err(|e| TldrError::io(&self.location, e))?.path();
            let is_pages = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(PAGES_DIR));
            if is_pages && path.is_dir() {
                fs::remove_dir_all(&path).map_err(|e| TldrError::io(&path, e))?;
            }
        }
        Ok(())
    }

    fn remove_loose_files(&self) -> Result<()> {
        let entries = fs::read_dir(&self.location).map_err(|e| TldrError::io(&self.location, e))?;
        for entry in entries {
            let path = entry.map_err(|e| TldrError::io(&self.location, e))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| TldrError::io(&path, e))?;
            }
        }
        Ok(())
    }

    /// Whether the stored index exists and is younger than the index TTL.
    pub fn check_index(&self) -> bool {
        is_fresh(&self.index_file(), self.index_timeout)
    }

    /// Read the stored index; unreadable or malformed files yield `None`.
    pub fn load_index(&self) -> Option<Index> {
        let index_file = self.index_file();
        let data = fs::read(&index_file).ok()?;
        match Index::from_json(&data) {
            Ok(index) => Some(index),
            Err(err) => {
                warn!(path = %index_file.display(), %err, "ignoring malformed index");
                None
            }
        }
    }

    /// Download the command manifest, rebuild the index and persist it.
    ///
    /// # Errors
    /// Returns the download failure, a manifest parse error, or an IO error.
    pub fn update_index(&self) -> Result<Index> {
        info!(url = %self.index_url, "refreshing command index");
        let data = download::download(&self.index_url, self.proxy_url.as_deref(), BULK_TIMEOUT)?;
        let index = Index::from_manifest(&data)?;
        if index.is_empty() {
            warn!(url = %self.index_url, "command manifest lists no pages");
        }

        fs::create_dir_all(&self.location).map_err(|e| TldrError::io(&self.location, e))?;
        let index_file = self.index_file();
        fs::write(&index_file, index.to_json()?).map_err(|e| TldrError::io(&index_file, e))?;
        debug!(commands = index.len(), "index stored");
        Ok(index)
    }
}

/// A file is fresh if it exists and its age in hours does not exceed `timeout`.
///
/// Modification times in the future count as age zero.
pub fn is_fresh(path: &Path, timeout: f64) -> bool {
    let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    age.as_secs_f64() / 3600.0 <= timeout
}
