//! Category collection

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Envelope;
use crate::client::{Client, ClientResult, ListOptions};
use crate::context::RequestContext;

/// Default sort of the category list
pub const DEFAULT_CATEGORY_ORDER: &str = "a:id";

/// Content category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID
    pub id: Option<i64>,
    /// Short name
    pub name: Option<String>,
    /// Name including the parent
    pub long_name: Option<String>,
    /// Parent category ID
    pub parent: Option<i64>,
    /// Whether campaigns may target it
    pub selectable: Option<i32>,
    /// Enabled flag
    pub enabled: Option<i32>,
    /// Deleted flag
    pub deleted: Option<i32>,
}

/// Query of `GET collections/categories`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryListOptions {
    /// Sort, defaults to [`DEFAULT_CATEGORY_ORDER`]
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Paging
    #[serde(flatten)]
    pub list: ListOptions,
}

/// Category endpoints of a [`Client`]
pub struct CategoriesService<'a> {
    client: &'a Client,
}

impl<'a> CategoriesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List categories. The server answers 404 when there are none, which
    /// yields an empty list.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        options: &CategoryListOptions,
    ) -> ClientResult<Vec<Category>> {
        let mut options = options.clone();
        options
            .order_by
            .get_or_insert_with(|| DEFAULT_CATEGORY_ORDER.to_string());

        let request = self
            .client
            .new_request(Method::GET, "collections/categories")?
            .query(Some(&options))
            .build()?;

        match self.client.do_json::<Envelope<Vec<Category>>>(ctx, request).await {
            Ok(envelope) => Ok(envelope.into_result()),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                debug!("No categories found");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
