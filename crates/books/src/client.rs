//! HTTP client for the book-metadata lookup vendor.

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Method;
use tracing::debug;

use registrar_core::config::BooksConfig;
use registrar_core::error::{RegistrarError, Result};
use registrar_core::gateway::{AuthScheme, RequestGateway, RequestOptions};

use crate::models::BookRecord;

/// Client for the book-metadata lookup service.
///
/// The vendor speaks XML over HTTP basic auth; lookup URLs are assembled from
/// raw config fragments appended after the ISBN.
pub struct BooksClient {
    gateway: RequestGateway,
    query: String,
    search_fields: String,
}

impl BooksClient {
    /// Create a client from the books configuration section.
    pub fn new(config: &BooksConfig) -> Self {
        Self {
            gateway: RequestGateway::new(
                &config.base_url,
                AuthScheme::Basic {
                    username: config.username.clone(),
                    password: config.password.clone(),
                },
            ),
            query: config.query.clone(),
            search_fields: config.search_fields.clone(),
        }
    }

    /// Look up a book by ISBN, returning the flattened metadata record.
    pub async fn lookup_isbn(&self, isbn: &str) -> Result<BookRecord> {
        let url = format!(
            "{}/{}{}{}",
            self.gateway.base_url(),
            isbn,
            self.query,
            self.search_fields
        );
        debug!(url = %url, "looking up ISBN");
        let response = self
            .gateway
            .send(Method::GET, &url, RequestOptions::default())
            .await?;
        let body = response.text().await?;
        parse_book_xml(&body)
    }
}

/// Flatten an XML document into tag → text pairs.
fn parse_book_xml(xml: &str) -> Result<BookRecord> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut record = BookRecord::default();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Text(t)) => {
                if let Some(tag) = current.take() {
                    let text = t
                        .unescape()
                        .map_err(|e| RegistrarError::Books(format!("invalid XML text: {e}")))?;
                    record.insert(&tag, text.trim());
                }
            }
            Ok(Event::End(_)) => {
                current = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(RegistrarError::Books(format!(
                    "failed to parse response XML: {e}"
                )))
            }
        }
    }
    Ok(record)
}
