//! REST client for the shop backend
//!
//! One scheme is supported: collection and item-scoped routes under
//! `/api/stock`, filtered listings under `/api/orders/{filter}` and raw image
//! uploads under `/admin/upload_image/{title}`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, Response, Url};
use tracing::debug;

use super::ApiError;
use crate::core::action::STOCK_PATH;
use crate::core::ItemRequest;
use crate::domain::{decode_stock, Order, OrderFilter, StockItem};

pub const ORDERS_PATH: &str = "/api/orders";
pub const UPLOAD_PATH: &str = "/admin/upload_image";
pub const LOGIN_PATH: &str = "/admin";
pub const IMAGES_PATH: &str = "/api/resources/images";
const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Largest upload body the backend accepts
pub const MAX_IMAGE_BYTES: u64 = 10_000_000;

/// Operations the dashboard needs from the backend
#[async_trait]
pub trait StockApi: Send + Sync {
    /// Open an admin session; the session cookie is kept by the client
    async fn login(&self, password: &str) -> Result<(), ApiError>;

    async fn fetch_stock(&self) -> Result<Vec<StockItem>, ApiError>;

    async fn submit_item(&self, request: &ItemRequest) -> Result<(), ApiError>;

    async fn fetch_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, ApiError>;

    async fn upload_image(&self, title: &str, bytes: Vec<u8>) -> Result<(), ApiError>;
}

/// `reqwest` implementation of [`StockApi`]
pub struct HttpBackend {
    http: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url).map_err(|err| ApiError::Url(format!("{base_url}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Url(base_url.to_string()));
        }
        // Redirects are inspected by `login`, never followed.
        let http = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::Url(format!("{path}: {err}")))
    }

    /// `path` followed by one percent-encoded segment
    fn segment_url(&self, path: &str, segment: &str) -> Result<Url, ApiError> {
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(path.to_string()))?
            .push(segment);
        Ok(url)
    }
}

#[async_trait]
impl StockApi for HttpBackend {
    async fn login(&self, password: &str) -> Result<(), ApiError> {
        let url = self.url(LOGIN_PATH)?;
        debug!(%url, "logging in");
        let response = self
            .http
            .post(url)
            .form(&[("password", password)])
            .send()
            .await?;

        let status = response.status();
        if status.is_redirection() {
            let target = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            return if target.contains(DASHBOARD_PATH) {
                Ok(())
            } else {
                Err(ApiError::Unauthorized)
            };
        }
        ensure_success(response).map(|_| ())
    }

    async fn fetch_stock(&self) -> Result<Vec<StockItem>, ApiError> {
        let url = self.url(STOCK_PATH)?;
        debug!(%url, "fetching stock");
        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let bytes = ensure_success(response)?.bytes().await?;
        Ok(decode_stock(&bytes)?)
    }

    async fn submit_item(&self, request: &ItemRequest) -> Result<(), ApiError> {
        let url = self.url(&request.route.path)?;
        debug!(method = %request.route.method, %url, action = request.action.as_str(), "submitting item");
        let response = self
            .http
            .request(request.route.method.clone(), url)
            .json(&request.body)
            .send()
            .await?;
        ensure_success(response).map(|_| ())
    }

    async fn fetch_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, ApiError> {
        let url = self.segment_url(ORDERS_PATH, filter.as_str())?;
        debug!(%url, "fetching orders");
        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let bytes = ensure_success(response)?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn upload_image(&self, title: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        check_image_size(bytes.len() as u64)?;
        let url = self.segment_url(UPLOAD_PATH, title)?;
        debug!(%url, size = bytes.len(), "uploading image");
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).map(|_| ())
    }
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(status))
    }
}

fn check_image_size(size: u64) -> Result<(), ApiError> {
    if size > MAX_IMAGE_BYTES {
        return Err(ApiError::ImageTooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Read an image file, refusing anything the backend would reject as too large
pub async fn read_image(path: &Path) -> Result<Vec<u8>, ApiError> {
    let metadata = tokio::fs::metadata(path).await?;
    check_image_size(metadata.len())?;
    Ok(tokio::fs::read(path).await?)
}

/// Path the backend serves an item's picture from
pub fn image_preview_path(item: &StockItem) -> String {
    format!("{IMAGES_PATH}/{}.png", item.image_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ItemAction, ItemBody};
    use crate::domain::ItemDraft;
    use serde_json::json;
    use wiremock::matchers::{body_bytes, body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn draft() -> ItemDraft {
        ItemDraft {
            title: "Cat".into(),
            kind: "Button".into(),
            description: "Round".into(),
            quantity: 5,
        }
    }

    #[tokio::test]
    async fn test_fetch_stock_reads_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stock"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "title": "Cat", "kind": "Button", "description": "Round", "quantity": 5}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let items = backend(&server).fetch_stock().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[tokio::test]
    async fn test_fetch_stock_reports_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stock"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = backend(&server).fetch_stock().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_add_puts_draft_to_collection() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/stock"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "title": "Cat", "kind": "Button", "description": "Round", "quantity": 5
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let request = ItemRequest::new(ItemAction::Add, None, ItemBody::Item(draft())).unwrap();
        backend(&server).submit_item(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_puts_to_item_route() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/stock/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let request = ItemRequest::new(ItemAction::Edit, Some(3), ItemBody::Item(draft())).unwrap();
        backend(&server).submit_item(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_sends_id_list() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/stock"))
            .and(body_json(json!([1, 2])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let request = ItemRequest::new(ItemAction::Delete, None, ItemBody::Ids(vec![1, 2])).unwrap();
        backend(&server).submit_item(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_mutation_carries_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = ItemRequest::new(ItemAction::Edit, Some(8), ItemBody::Item(draft())).unwrap();
        let err = backend(&server).submit_item(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[tokio::test]
    async fn test_fetch_orders_uses_filter_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders/Unfulfilled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 4, "name": "Ann", "street": "Main 1", "zipcode": 1234, "fulfilled": false}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let orders = backend(&server)
            .fetch_orders(OrderFilter::Unfulfilled)
            .await
            .unwrap();
        assert_eq!(orders[0].name, "Ann");
    }

    #[tokio::test]
    async fn test_upload_posts_raw_bytes_under_encoded_title() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/upload_image/Big%20Cat"))
            .and(header("content-type", "application/octet-stream"))
            .and(body_bytes(vec![1u8, 2, 3]))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server)
            .upload_image("Big Cat", vec![1, 2, 3])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_follows_backend_redirect_convention() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin"))
            .and(body_string("password=hunter2"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "/admin/dashboard"),
            )
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/admin"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/admin"))
            .mount(&server)
            .await;

        let api = backend(&server);
        api.login("hunter2").await.unwrap();
        assert!(matches!(
            api.login("wrong").await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_read_image_checks_size_limit() {
        let small = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(small.path(), [9u8, 8, 7]).unwrap();
        assert_eq!(read_image(small.path()).await.unwrap(), vec![9, 8, 7]);

        let large = tempfile::NamedTempFile::new().unwrap();
        large.as_file().set_len(MAX_IMAGE_BYTES + 1).unwrap();
        assert!(matches!(
            read_image(large.path()).await,
            Err(ApiError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_image_preview_path() {
        let item = StockItem {
            id: 1,
            title: "Big Cat".into(),
            kind: "BigPrint".into(),
            description: String::new(),
            quantity: 0,
        };
        assert_eq!(image_preview_path(&item), "/api/resources/images/BigCat.png");
    }
}
