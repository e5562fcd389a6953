//! Release tag templates.
//!
//! Placeholders: `{NAME}`, `{VERSION}`, `{SHORT_SHA}` (first 7 characters of
//! the commit) and `{DATE_ISO_8601}` (UTC, `YYYY-MM-DDTHH-MM-SSZ`, safe in
//! file names and tags).

use chrono::{DateTime, Utc};

use crate::app_info::AppInfo;

/// Template used when none is given.
pub const DEFAULT_TAG_TEMPLATE: &str = "{NAME}-v{VERSION}";

const SHORT_SHA_LEN: usize = 7;

/// Values substituted into a tag template.
#[derive(Debug, Clone)]
pub struct TagData<'a> {
    pub app: &'a AppInfo,
    pub sha: &'a str,
    pub now: DateTime<Utc>,
}

/// Filename-safe ISO 8601 rendering of `date`.
pub fn iso8601_for_filename(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H-%M-%SZ").to_string()
}

/// Expand every placeholder in `template`. Unknown braces are left as is.
pub fn render_tag(template: &str, data: &TagData<'_>) -> String {
    let short_sha: String = data.sha.chars().take(SHORT_SHA_LEN).collect();
    template
        .replace("{NAME}", &data.app.name)
        .replace("{VERSION}", &data.app.version.to_string())
        .replace("{SHORT_SHA}", &short_sha)
        .replace("{DATE_ISO_8601}", &iso8601_for_filename(data.now))
}
