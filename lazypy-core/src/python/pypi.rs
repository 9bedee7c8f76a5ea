//! src/python/pypi.rs
//! ============================================================================
//! # Remote package index collaborator
//!
//! - The name list is scraped line by line from the simple index page: each
//!   line carrying an `href="/simple/<name>/"` contributes `<name>`.
//! - Package detail merges the metadata document with the download stats
//!   document. Stats are best-effort and never blank the metadata.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use compact_str::CompactString;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::IndexConfig;
use crate::controller::traits::PackageIndex;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadStats {
    #[serde(default)]
    pub last_day: u64,
    #[serde(default)]
    pub last_week: u64,
    #[serde(default)]
    pub last_month: u64,
}

/// Merged metadata record shown in the install picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDetail {
    pub name: String,
    pub version: String,
    pub summary: String,
    pub author_email: String,
    /// Size of the first release file of `version`, if published.
    pub size_bytes: Option<u64>,
    pub downloads: DownloadStats,
}

#[derive(Debug, Deserialize)]
struct MetadataDoc {
    info: InfoDoc,
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFileDoc>>,
}

#[derive(Debug, Deserialize)]
struct InfoDoc {
    name: String,
    version: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    author_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFileDoc {
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct StatsDoc {
    data: DownloadStats,
}

/// Extract the second path segment of the hyperlink on `line`, if any.
fn name_from_line(line: &str) -> Option<&str> {
    let start = line.find("href=\"")? + "href=\"".len();
    let href = &line[start..];
    let href = &href[..href.find('"')?];
    let name = href.split('/').nth(2)?.trim();
    (!name.is_empty()).then_some(name)
}

pub fn parse_simple_index(body: &str) -> Vec<CompactString> {
    body.lines().filter_map(name_from_line).map(CompactString::from).collect()
}

/// Merge the metadata document with an optional stats document.
pub fn parse_detail(metadata_json: &str, stats_json: Option<&str>) -> Result<PackageDetail, AppError> {
    let doc: MetadataDoc = serde_json::from_str(metadata_json)?;

    let size_bytes = doc
        .releases
        .get(&doc.info.version)
        .and_then(|files| files.first())
        .map(|f| f.size);

    let downloads = stats_json
        .and_then(|raw| match serde_json::from_str::<StatsDoc>(raw) {
            Ok(stats) => Some(stats.data),
            Err(e) => {
                warn!("Ignoring malformed download stats: {}", e);
                None
            }
        })
        .unwrap_or_default();

    Ok(PackageDetail {
        name: doc.info.name,
        version: doc.info.version,
        summary: doc.info.summary.unwrap_or_default(),
        author_email: doc.info.author_email.unwrap_or_default(),
        size_bytes,
        downloads,
    })
}

/// PyPI over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpPackageIndex {
    client: reqwest::Client,
    config: IndexConfig,
}

impl HttpPackageIndex {
    pub fn new(config: IndexConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lazypy/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_text(&self, url: &str) -> Result<String, AppError> {
        debug!("GET {}", url);
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl PackageIndex for HttpPackageIndex {
    #[instrument(level = "info", skip(self))]
    async fn fetch_names(&self) -> Result<Vec<CompactString>, AppError> {
        let body = self.get_text(&self.config.index_url).await?;
        let names = parse_simple_index(&body);
        info!("Indexed {} remote package names", names.len());
        Ok(names)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_detail(&self, name: &str) -> Result<PackageDetail, AppError> {
        let metadata = self.get_text(&self.config.detail_url(name)).await?;
        let stats = match self.get_text(&self.config.stats_url(name)).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Download stats unavailable for {}: {}", name, e);
                None
            }
        };
        parse_detail(&metadata, stats.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"{
        "info": {"name": "requests", "version": "2.32.3", "summary": "Python HTTP for Humans.", "author_email": null},
        "releases": {
            "2.32.2": [{"size": 1}],
            "2.32.3": [{"size": 64928}, {"size": 131218}]
        }
    }"#;

    #[test]
    fn test_parse_simple_index() {
        let body = "<!DOCTYPE html>\n<html>\n  <body>\n    <a href=\"/simple/requests/\">requests</a>\n    <a href=\"/simple/flask/\">flask</a>\n  </body>\n</html>\n";
        assert_eq!(parse_simple_index(body), vec!["requests", "flask"]);
    }

    #[test]
    fn test_lines_without_links_are_ignored() {
        assert!(parse_simple_index("<a href=\"/\">root</a>\nplain text\n<a name=\"x\">").is_empty());
    }

    #[test]
    fn test_parse_detail_with_stats() {
        let stats = r#"{"data": {"last_day": 10, "last_week": 70, "last_month": 300}, "package": "requests"}"#;
        let detail = parse_detail(METADATA, Some(stats)).unwrap();

        assert_eq!(detail.name, "requests");
        assert_eq!(detail.version, "2.32.3");
        assert_eq!(detail.author_email, "");
        assert_eq!(detail.size_bytes, Some(64928));
        assert_eq!(detail.downloads.last_week, 70);
    }

    #[test]
    fn test_bad_stats_do_not_blank_metadata() {
        let detail = parse_detail(METADATA, Some("<html>rate limited</html>")).unwrap();
        assert_eq!(detail.summary, "Python HTTP for Humans.");
        assert_eq!(detail.downloads, DownloadStats::default());

        let detail = parse_detail(METADATA, None).unwrap();
        assert_eq!(detail.version, "2.32.3");
    }

    #[test]
    fn test_parse_detail_rejects_invalid_metadata() {
        assert!(matches!(parse_detail("nope", None), Err(AppError::Serde(_))));
    }
}
