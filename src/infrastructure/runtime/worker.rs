//! Async worker - runs in Tokio runtime and serves dashboard requests
//!
//! Commands are handled one at a time in arrival order, so a stock reload
//! queued after a mutation always observes that mutation. Image uploads are
//! the exception: they run on their own task and report independently.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::infrastructure::http::{read_image, StockApi};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Shutdown,
}

/// Run the async worker loop
pub async fn run_async_worker(
    api: Arc<dyn StockApi>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    info!("worker started");
    let mut poll_interval = interval(Duration::from_millis(25));

    loop {
        // Drain everything queued since the last tick
        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    if handle_command(&api, cmd, &evt_tx).await == Flow::Shutdown {
                        info!("worker shutting down");
                        return Ok(());
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        poll_interval.tick().await;
    }
}

pub(crate) async fn handle_command(
    api: &Arc<dyn StockApi>,
    cmd: RuntimeCommand,
    evt_tx: &Sender<RuntimeEvent>,
) -> Flow {
    let event = match cmd {
        RuntimeCommand::Shutdown => return Flow::Shutdown,

        RuntimeCommand::Login { password } => match api.login(&password).await {
            Ok(()) => {
                info!("admin session opened");
                RuntimeEvent::LoggedIn
            }
            Err(err) => {
                warn!("login failed: {err}");
                RuntimeEvent::LoginRejected {
                    message: err.to_string(),
                }
            }
        },

        RuntimeCommand::LoadStock => match api.fetch_stock().await {
            Ok(items) => {
                debug!(count = items.len(), "stock loaded");
                RuntimeEvent::StockLoaded { items }
            }
            Err(err) => {
                warn!("stock fetch failed: {err}");
                RuntimeEvent::Error {
                    message: format!("Cannot load stock: {err}"),
                }
            }
        },

        RuntimeCommand::SubmitItem(request) => {
            let action = request.action;
            match api.submit_item(&request).await {
                Ok(()) => {
                    info!(action = action.as_str(), path = %request.route.path, "item mutation applied");
                    RuntimeEvent::ItemSubmitted { action }
                }
                Err(err) => {
                    warn!(action = action.as_str(), "item mutation failed: {err}");
                    RuntimeEvent::Error {
                        message: format!("Failed to {} item(s): {err}", action.as_str()),
                    }
                }
            }
        }

        RuntimeCommand::LoadOrders { filter } => match api.fetch_orders(filter).await {
            Ok(orders) => {
                debug!(count = orders.len(), %filter, "orders loaded");
                RuntimeEvent::OrdersLoaded { filter, orders }
            }
            Err(err) => {
                warn!(%filter, "order fetch failed: {err}");
                RuntimeEvent::Error {
                    message: format!("Cannot fetch orders: {err}"),
                }
            }
        },

        RuntimeCommand::UploadImage { title, path } => {
            let api = Arc::clone(api);
            let evt_tx = evt_tx.clone();
            tokio::spawn(async move {
                let result = match read_image(&path).await {
                    Ok(bytes) => api.upload_image(&title, bytes).await,
                    Err(err) => Err(err),
                };
                let event = match result {
                    Ok(()) => {
                        info!(%title, "image uploaded");
                        RuntimeEvent::ImageUploaded { title }
                    }
                    Err(err) => {
                        warn!(%title, path = %path.display(), "image upload failed: {err}");
                        RuntimeEvent::ImageFailed {
                            title,
                            message: err.to_string(),
                        }
                    }
                };
                let _ = evt_tx.send(event);
            });
            return Flow::Continue;
        }
    };

    let _ = evt_tx.send(event);
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::core::{ItemAction, ItemBody, ItemRequest};
    use crate::domain::{ItemDraft, Order, OrderFilter, StockItem};
    use crate::infrastructure::http::ApiError;

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        stock: Vec<StockItem>,
        fail_submit: bool,
        fail_fetch: bool,
    }

    impl FakeApi {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StockApi for FakeApi {
        async fn login(&self, password: &str) -> Result<(), ApiError> {
            self.record("login");
            if password == "secret" {
                Ok(())
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn fetch_stock(&self) -> Result<Vec<StockItem>, ApiError> {
            self.record("GET /api/stock");
            if self.fail_fetch {
                return Err(ApiError::Status {
                    status: 503,
                    reason: "Service Unavailable".into(),
                });
            }
            Ok(self.stock.clone())
        }

        async fn submit_item(&self, request: &ItemRequest) -> Result<(), ApiError> {
            self.record(format!("{} {}", request.route.method, request.route.path));
            if self.fail_submit {
                return Err(ApiError::Status {
                    status: 500,
                    reason: "Internal Server Error".into(),
                });
            }
            Ok(())
        }

        async fn fetch_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, ApiError> {
            self.record(format!("GET /api/orders/{filter}"));
            if self.fail_fetch {
                let err = serde_json::from_str::<Vec<Order>>("<html>").unwrap_err();
                return Err(ApiError::Decode(err));
            }
            Ok(Vec::new())
        }

        async fn upload_image(&self, title: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
            self.record(format!("upload {title} {}", bytes.len()));
            Ok(())
        }
    }

    fn edit_request() -> ItemRequest {
        let draft = ItemDraft {
            title: "Cat".into(),
            kind: "Button".into(),
            description: "Round".into(),
            quantity: 1,
        };
        ItemRequest::new(ItemAction::Edit, Some(3), ItemBody::Item(draft)).unwrap()
    }

    async fn next_event(rx: &mpsc::Receiver<RuntimeEvent>) -> RuntimeEvent {
        for _ in 0..200 {
            if let Ok(event) = rx.try_recv() {
                return event;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no event received");
    }

    #[tokio::test]
    async fn test_submit_success_reports_action() {
        let fake = Arc::new(FakeApi::default());
        let api: Arc<dyn StockApi> = fake.clone();
        let (tx, rx) = mpsc::channel();

        let flow = handle_command(&api, RuntimeCommand::SubmitItem(edit_request()), &tx).await;

        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            rx.try_recv().unwrap(),
            RuntimeEvent::ItemSubmitted {
                action: ItemAction::Edit
            }
        );
        assert_eq!(fake.calls(), vec!["PUT /api/stock/3"]);
    }

    #[tokio::test]
    async fn test_submit_failure_surfaces_status_text() {
        let api: Arc<dyn StockApi> = Arc::new(FakeApi {
            fail_submit: true,
            ..FakeApi::default()
        });
        let (tx, rx) = mpsc::channel();

        handle_command(&api, RuntimeCommand::SubmitItem(edit_request()), &tx).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            RuntimeEvent::Error {
                message: "Failed to edit item(s): 500 Internal Server Error".into()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_loads_surface_as_errors() {
        let api: Arc<dyn StockApi> = Arc::new(FakeApi {
            fail_fetch: true,
            ..FakeApi::default()
        });
        let (tx, rx) = mpsc::channel();

        handle_command(&api, RuntimeCommand::LoadStock, &tx).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            RuntimeEvent::Error {
                message: "Cannot load stock: 503 Service Unavailable".into()
            }
        );

        let flow = handle_command(
            &api,
            RuntimeCommand::LoadOrders {
                filter: OrderFilter::Fulfilled,
            },
            &tx,
        )
        .await;
        assert_eq!(flow, Flow::Continue);
        let RuntimeEvent::Error { message } = rx.try_recv().unwrap() else {
            panic!("expected an error event");
        };
        assert!(message.starts_with("Cannot fetch orders: unexpected response body"));
    }

    #[tokio::test]
    async fn test_login_rejection_is_reported() {
        let api: Arc<dyn StockApi> = Arc::new(FakeApi::default());
        let (tx, rx) = mpsc::channel();

        handle_command(&api, RuntimeCommand::Login { password: "nope".into() }, &tx).await;
        assert!(matches!(
            rx.try_recv().unwrap(),
            RuntimeEvent::LoginRejected { .. }
        ));

        handle_command(&api, RuntimeCommand::Login { password: "secret".into() }, &tx).await;
        assert_eq!(rx.try_recv().unwrap(), RuntimeEvent::LoggedIn);
    }

    #[tokio::test]
    async fn test_image_failure_is_independent_of_mutation() {
        let api: Arc<dyn StockApi> = Arc::new(FakeApi::default());
        let (tx, rx) = mpsc::channel();
        let upload = RuntimeCommand::UploadImage {
            title: "Cat".into(),
            path: "/definitely/not/here.png".into(),
        };

        handle_command(&api, upload, &tx).await;
        handle_command(&api, RuntimeCommand::SubmitItem(edit_request()), &tx).await;

        let mut events = vec![next_event(&rx).await, next_event(&rx).await];
        events.sort_by_key(|event| matches!(event, RuntimeEvent::ImageFailed { .. }));
        assert_eq!(
            events[0],
            RuntimeEvent::ItemSubmitted {
                action: ItemAction::Edit
            }
        );
        assert!(matches!(&events[1], RuntimeEvent::ImageFailed { title, .. } if title == "Cat"));
    }

    #[tokio::test]
    async fn test_image_upload_reads_file() {
        let fake = Arc::new(FakeApi::default());
        let api: Arc<dyn StockApi> = fake.clone();
        let (tx, rx) = mpsc::channel();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [1u8, 2, 3, 4]).unwrap();

        let upload = RuntimeCommand::UploadImage {
            title: "Cat".into(),
            path: file.path().to_path_buf(),
        };
        handle_command(&api, upload, &tx).await;

        assert_eq!(
            next_event(&rx).await,
            RuntimeEvent::ImageUploaded {
                title: "Cat".into()
            }
        );
        assert_eq!(fake.calls(), vec!["upload Cat 4"]);
    }

    #[tokio::test]
    async fn test_worker_processes_commands_in_order() {
        let item = StockItem {
            id: 3,
            title: "Cat".into(),
            kind: "Button".into(),
            description: "Round".into(),
            quantity: 1,
        };
        let fake = Arc::new(FakeApi {
            stock: vec![item.clone()],
            ..FakeApi::default()
        });
        let api: Arc<dyn StockApi> = fake.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();

        cmd_tx
            .send(RuntimeCommand::SubmitItem(edit_request()))
            .unwrap();
        cmd_tx.send(RuntimeCommand::LoadStock).unwrap();
        cmd_tx.send(RuntimeCommand::Shutdown).unwrap();

        run_async_worker(api, cmd_rx, evt_tx).await.unwrap();

        let events: Vec<_> = evt_rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                RuntimeEvent::ItemSubmitted {
                    action: ItemAction::Edit
                },
                RuntimeEvent::StockLoaded { items: vec![item] },
            ]
        );
        assert_eq!(fake.calls(), vec!["PUT /api/stock/3", "GET /api/stock"]);
    }
}
