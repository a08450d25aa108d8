//! Cursor-following pagination over `Link` response headers.
//!
//! The LMS-style APIs advertise the next page through an RFC 5988 `Link`
//! header with a `rel="next"` relation. [`pages`] follows that chain lazily,
//! yielding one decoded body per page.

use async_stream::try_stream;
use futures::{pin_mut, Stream, StreamExt};
use reqwest::header::{HeaderMap, LINK};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::{RegistrarError, Result};
use crate::gateway::{RequestGateway, RequestOptions};

/// Extract the `rel="next"` target URL from a `Link` header value.
pub fn parse_next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let mut sections = part.split(';');
        let target = sections.next().map(str::trim).unwrap_or("");
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
        else {
            continue;
        };
        let is_next = sections.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if is_next {
            return Some(url.to_string());
        }
    }
    None
}

fn next_page_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LINK)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_next_link)
}

fn ensure_paginated(headers: &HeaderMap, url: &str) -> Result<()> {
    if headers.contains_key(LINK) {
        Ok(())
    } else {
        Err(RegistrarError::PaginationUnsupported {
            url: url.to_string(),
        })
    }
}

fn page_items(page: Value) -> Result<Vec<Value>> {
    match page {
        Value::Array(items) => Ok(items),
        other => Err(RegistrarError::Serialization(format!(
            "expected a JSON array page, got: {other}"
        ))),
    }
}

/// Lazily fetch successive pages, yielding each decoded JSON body.
///
/// The stream ends when a response no longer advertises a `next` relation.
/// Fails with [`RegistrarError::PaginationUnsupported`] if the first response
/// carries no `Link` header at all — an endpoint mismatch, not a transient
/// condition. The stream is not restartable.
pub fn pages(
    gateway: &RequestGateway,
    start_url: String,
    params: Vec<(String, String)>,
) -> impl Stream<Item = Result<Value>> + Send + '_ {
    try_stream! {
        let response = gateway
            .send(
                Method::GET,
                &start_url,
                RequestOptions {
                    params,
                    ..Default::default()
                },
            )
            .await?;

        ensure_paginated(response.headers(), &start_url)?;

        let mut next = next_page_url(response.headers());
        let page: Value = response.json().await?;
        yield page;

        while let Some(url) = next.take() {
            debug!(url = %url, "fetching next page");
            let response = gateway.send(Method::GET, &url, RequestOptions::default()).await?;
            next = next_page_url(response.headers());
            let page: Value = response.json().await?;
            yield page;
        }
    }
}

/// Like [`pages`], but yields the individual items of each array page.
pub fn flattened(
    gateway: &RequestGateway,
    start_url: String,
    params: Vec<(String, String)>,
) -> impl Stream<Item = Result<Value>> + Send + '_ {
    try_stream! {
        let page_stream = pages(gateway, start_url, params);
        pin_mut!(page_stream);
        while let Some(page) = page_stream.next().await {
            for item in page_items(page?)? {
                yield item;
            }
        }
    }
}

/// Eagerly collect every page into a Vec.
pub async fn collect_pages(
    gateway: &RequestGateway,
    start_url: String,
    params: Vec<(String, String)>,
) -> Result<Vec<Value>> {
    let page_stream = pages(gateway, start_url, params);
    pin_mut!(page_stream);
    let mut all = Vec::new();
    while let Some(page) = page_stream.next().await {
        all.push(page?);
    }
    Ok(all)
}
