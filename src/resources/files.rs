//! Creative library

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Envelope;
use crate::client::{Client, ClientResult, ListOptions};
use crate::context::RequestContext;

/// Default sort of the file list
pub const DEFAULT_FILE_ORDER: &str = "a:id";

/// Kind of uploaded creative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Still image
    Image,
    /// Video
    Video,
    /// Video shown in a banner slot
    VideoBanner,
}

impl FileType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::VideoBanner => "video_banner",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "video" => Ok(FileType::Video),
            "video_banner" => Ok(FileType::VideoBanner),
            other => Err(format!(
                "unknown file type {other:?}, expected one of: image, video, video_banner"
            )),
        }
    }
}

/// Uploaded creative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// File ID
    pub id: i64,
    /// Creative kind
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Uploaded width in pixels
    pub width: i32,
    /// Uploaded height in pixels
    pub height: i32,
    /// Served width in pixels
    pub width_public: i32,
    /// Served height in pixels
    pub height_public: i32,
    /// Seconds, zero for images
    #[serde(default)]
    pub duration: f64,
    /// Adult content flag
    pub is_adult: i32,
    /// Hash of the upload
    pub file_hash_original: String,
    /// Hash of the served file
    pub file_hash_public: String,
    /// Hash of the optimised file
    pub file_hash_optimum: Option<String>,
    /// Extension of the served file
    pub file_extension: String,
    /// Extension of the optimised file
    pub file_extension_optimum: Option<String>,
    /// Uploaded name
    pub file_name: String,
    /// Upload size in bytes
    pub file_size_original: i64,
    /// Served size in bytes
    pub file_size_public: i64,
    /// Optimised size in bytes
    #[serde(default)]
    pub file_size_optimum: i64,
    /// Served file URL
    pub url: String,
    /// Optimised file URL
    pub url_optimum: Option<String>,
    /// Archived flag
    pub is_archived: Option<i32>,
    /// Status code
    pub status: i32,
}

/// Query of `GET library/file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileListOptions {
    /// Files of this kind
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Include archived files
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub show_archived: bool,
    /// Only archived files
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_archived: bool,
    /// Sort, defaults to [`DEFAULT_FILE_ORDER`]
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Paging
    #[serde(flatten)]
    pub list: ListOptions,
}

impl FileListOptions {
    /// Files of one type; the server requires the type
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            show_archived: false,
            is_archived: false,
            order_by: None,
            list: ListOptions::default(),
        }
    }
}

/// Library endpoints of a [`Client`]
pub struct FilesService<'a> {
    client: &'a Client,
}

impl<'a> FilesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List uploaded files of `options.file_type`
    pub async fn list(&self, ctx: &RequestContext, options: &FileListOptions) -> ClientResult<Vec<File>> {
        let mut options = options.clone();
        options
            .order_by
            .get_or_insert_with(|| DEFAULT_FILE_ORDER.to_string());

        let request = self
            .client
            .new_request(Method::GET, "library/file")?
            .query(Some(&options))
            .build()?;

        let envelope: Envelope<Vec<File>> = self.client.do_json(ctx, request).await?;
        Ok(envelope.into_result())
    }
}
