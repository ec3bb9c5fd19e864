use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::Instant,
};

use crate::{
    api::{ApiError, ApiResult, ProductApi},
    config::ClientConfig,
    core::{
        debounce::Debouncer,
        view::{ViewError, ViewState},
    },
    product::{HistoryLogEntry, Product, ProductFields},
    prompt::UserPrompt,
    types::{ProductField, ProductId},
};

use super::events::{Operation, ViewEvent};

/// Confirmation asked before every delete.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this product?";
/// Notice shown after a successful create.
pub const CREATE_SUCCESS: &str = "Product Added Successfully!";
/// Alert for a failed create when the server sent no message.
pub const CREATE_FAILED: &str = "Error adding product";
/// Alert for a failed delete.
pub const DELETE_FAILED: &str = "Failed to delete product";
/// Alert for a failed update.
pub const UPDATE_FAILED: &str = "Failed to update";

/// Why a handle call failed.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The local transition was rejected; nothing was sent.
    #[error(transparent)]
    View(#[from] ViewError),
    /// The controller loop is gone.
    #[error("controller task has stopped")]
    ChannelClosed,
}

/// Alert text for a draft the controller refused to send.
pub fn missing_field_alert(field: ProductField) -> String {
    format!("Please fill in the {field} field")
}

/// What to do once a refresh has been applied.
enum Followup {
    None,
    Reply(oneshot::Sender<Result<usize, ControllerError>>),
    Created(Product, oneshot::Sender<Result<Product, ControllerError>>),
    Committed(Product, oneshot::Sender<Result<Product, ControllerError>>),
}

enum Command {
    SetSearch {
        text: String,
        resp: oneshot::Sender<()>,
    },
    Refresh {
        resp: oneshot::Sender<Result<usize, ControllerError>>,
    },
    Create {
        draft: Option<ProductFields>,
        resp: oneshot::Sender<Result<Product, ControllerError>>,
    },
    Delete {
        id: ProductId,
        resp: oneshot::Sender<Result<bool, ControllerError>>,
    },
    BeginEdit {
        product: Product,
        resp: oneshot::Sender<Result<(), ControllerError>>,
    },
    UpdateEditField {
        field: ProductField,
        value: String,
        resp: oneshot::Sender<Result<(), ControllerError>>,
    },
    CommitEdit {
        resp: oneshot::Sender<Result<Product, ControllerError>>,
    },
    CancelEdit {
        resp: oneshot::Sender<bool>,
    },
    SetAddForm {
        open: Option<bool>,
        resp: oneshot::Sender<bool>,
    },
    UpdateDraftField {
        field: ProductField,
        value: String,
        resp: oneshot::Sender<Result<(), ControllerError>>,
    },
    ShowHistory {
        product: Product,
        resp: oneshot::Sender<Result<usize, ControllerError>>,
    },
    CloseHistory {
        resp: oneshot::Sender<()>,
    },
    ExportCsv {
        resp: oneshot::Sender<String>,
    },
    View {
        resp: oneshot::Sender<ViewState>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Results of spawned REST calls, fed back into the loop.
enum Completion {
    Refreshed {
        result: ApiResult<Vec<Product>>,
        followup: Followup,
    },
    Created {
        result: ApiResult<Product>,
        resp: oneshot::Sender<Result<Product, ControllerError>>,
    },
    Deleted {
        id: ProductId,
        result: ApiResult<()>,
        resp: oneshot::Sender<Result<bool, ControllerError>>,
    },
    Updated {
        id: ProductId,
        result: ApiResult<Product>,
        resp: oneshot::Sender<Result<Product, ControllerError>>,
    },
    HistoryLoaded {
        product_id: ProductId,
        result: ApiResult<Vec<HistoryLogEntry>>,
        resp: oneshot::Sender<Result<usize, ControllerError>>,
    },
}

/// Cloneable handle to the controller task.
pub struct ControllerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ViewEvent>,
}

impl Clone for ControllerHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

struct Controller {
    view: ViewState,
    api: Arc<dyn ProductApi>,
    prompt: Arc<dyn UserPrompt>,
    events_tx: broadcast::Sender<ViewEvent>,
    done_tx: mpsc::UnboundedSender<Completion>,
    export_url: String,
}

/// Starts the controller loop; the initial load fires after one quiet period.
pub fn spawn_controller(
    view: ViewState,
    api: Arc<dyn ProductApi>,
    prompt: Arc<dyn UserPrompt>,
    config: ClientConfig,
) -> ControllerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<ViewEvent>(config.event_capacity.max(1));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

    let mut ctl = Controller {
        view,
        api,
        prompt,
        events_tx: events_tx.clone(),
        done_tx,
        export_url: config.export_url(),
    };
    let mut debouncer = Debouncer::new(config.search_debounce());
    debouncer.schedule(Instant::now());

    tokio::spawn(async move {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    if ctl.handle_command(cmd, &mut debouncer) {
                        break;
                    }
                }
                Some(done) = done_rx.recv() => {
                    ctl.apply_completion(done);
                }
                _ = debouncer.wait(), if debouncer.is_pending() => {
                    if debouncer.take_due(Instant::now()).is_some() {
                        ctl.start_refresh(Followup::None);
                    }
                }
            }
        }
        tracing::debug!("controller loop stopped");
    });

    ControllerHandle { cmd_tx, events_tx }
}

impl ControllerHandle {
    /// New receiver for [`ViewEvent`]s emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events_tx.subscribe()
    }

    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .await
            .map_err(|_| ControllerError::ChannelClosed)?;
        rx.await.map_err(|_| ControllerError::ChannelClosed)
    }

    /// Updates the search text and restarts the debounce timer.
    pub async fn set_search(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        let text = text.into();
        self.call(|resp| Command::SetSearch { text, resp }).await
    }

    /// Fetches now, bypassing the debounce. Resolves with the new product count.
    ///
    /// A debounced fetch still pending is dropped, since this one already
    /// carries the current search text.
    pub async fn refresh(&self) -> Result<usize, ControllerError> {
        self.call(|resp| Command::Refresh { resp }).await?
    }

    /// Submits the current draft. Resolves once the follow-up refresh is applied.
    pub async fn create_product(&self) -> Result<Product, ControllerError> {
        self.call(|resp| Command::Create { draft: None, resp }).await?
    }

    /// Submits `draft` instead of the form's own draft.
    pub async fn create_product_from(&self, draft: ProductFields) -> Result<Product, ControllerError> {
        self.call(|resp| Command::Create {
            draft: Some(draft),
            resp,
        })
        .await?
    }

    /// Deletes after user confirmation. `Ok(false)` means the user declined.
    pub async fn delete_product(&self, id: impl Into<ProductId>) -> Result<bool, ControllerError> {
        let id = id.into();
        self.call(|resp| Command::Delete { id, resp }).await?
    }

    /// Puts `product` in edit mode, replacing any other edit.
    ///
    /// Fails with [`ViewError::UnknownProduct`] when the product is no longer
    /// in the collection.
    pub async fn begin_edit(&self, product: Product) -> Result<(), ControllerError> {
        self.call(|resp| Command::BeginEdit { product, resp }).await?
    }

    /// Merges one field into the edit buffer.
    pub async fn update_edit_field(
        &self,
        field: ProductField,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let value = value.into();
        self.call(|resp| Command::UpdateEditField { field, value, resp })
            .await?
    }

    /// Submits the edit buffer. Resolves once the follow-up refresh is applied.
    pub async fn commit_edit(&self) -> Result<Product, ControllerError> {
        self.call(|resp| Command::CommitEdit { resp }).await?
    }

    /// Discards the edit buffer. Returns whether an edit was in progress.
    pub async fn cancel_edit(&self) -> Result<bool, ControllerError> {
        self.call(|resp| Command::CancelEdit { resp }).await
    }

    /// Shows the add form.
    pub async fn open_add_form(&self) -> Result<bool, ControllerError> {
        self.call(|resp| Command::SetAddForm {
            open: Some(true),
            resp,
        })
        .await
    }

    /// Hides the add form; the draft is kept.
    pub async fn close_add_form(&self) -> Result<bool, ControllerError> {
        self.call(|resp| Command::SetAddForm {
            open: Some(false),
            resp,
        })
        .await
    }

    /// Flips the add form and returns its new visibility.
    pub async fn toggle_add_form(&self) -> Result<bool, ControllerError> {
        self.call(|resp| Command::SetAddForm { open: None, resp }).await
    }

    /// Merges one field into the add-form draft.
    pub async fn update_draft_field(
        &self,
        field: ProductField,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let value = value.into();
        self.call(|resp| Command::UpdateDraftField { field, value, resp })
            .await?
    }

    /// Selects `product` and loads its log. Resolves with the number of
    /// entries installed.
    ///
    /// When another product was selected before this log arrived, the log is
    /// discarded and the call resolves with `Ok(0)`.
    pub async fn show_history(&self, product: Product) -> Result<usize, ControllerError> {
        self.call(|resp| Command::ShowHistory { product, resp }).await?
    }

    /// Hides the history sidebar.
    pub async fn close_history(&self) -> Result<(), ControllerError> {
        self.call(|resp| Command::CloseHistory { resp }).await
    }

    /// Opens the CSV export and returns the URL handed to the prompt.
    pub async fn export_csv(&self) -> Result<String, ControllerError> {
        self.call(|resp| Command::ExportCsv { resp }).await
    }

    /// Snapshot of the current view state.
    pub async fn view(&self) -> Result<ViewState, ControllerError> {
        self.call(|resp| Command::View { resp }).await
    }

    /// Stops the controller loop. In-flight requests finish but are not applied.
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }
}

impl Controller {
    fn emit(&self, event: ViewEvent) {
        let _ = self.events_tx.send(event);
    }

    fn handle_command(&mut self, cmd: Command, debouncer: &mut Debouncer) -> bool {
        match cmd {
            Command::SetSearch { text, resp } => {
                self.view.set_search(text.clone());
                debouncer.schedule(Instant::now());
                tracing::debug!(search = %text, "search scheduled");
                self.emit(ViewEvent::SearchScheduled { text });
                let _ = resp.send(());
            }
            Command::Refresh { resp } => {
                if debouncer.cancel() {
                    tracing::debug!("pending search superseded by refresh");
                }
                self.start_refresh(Followup::Reply(resp));
            }
            Command::Create { draft, resp } => {
                let draft = match draft {
                    Some(d) => crate::core::view::validate_draft(&d).map(|()| d),
                    None => self.view.submittable_draft(),
                };
                match draft {
                    Ok(draft) => self.start_create(draft, resp),
                    Err(err) => {
                        let message = match &err {
                            ViewError::MissingField(field) => missing_field_alert(*field),
                            other => other.to_string(),
                        };
                        self.prompt.alert(&message);
                        let _ = resp.send(Err(err.into()));
                    }
                }
            }
            Command::Delete { id, resp } => {
                if !self.prompt.confirm(DELETE_CONFIRMATION) {
                    tracing::debug!(%id, "delete declined");
                    let _ = resp.send(Ok(false));
                } else {
                    self.start_delete(id, resp);
                }
            }
            Command::BeginEdit { product, resp } => {
                let res = self.view.begin_edit(&product).map_err(ControllerError::from);
                if res.is_ok() {
                    self.emit(ViewEvent::EditStarted { id: product.id });
                }
                let _ = resp.send(res);
            }
            Command::UpdateEditField { field, value, resp } => {
                let res = self
                    .view
                    .update_edit_field(field, &value)
                    .map_err(ControllerError::from);
                let _ = resp.send(res);
            }
            Command::CommitEdit { resp } => match self.view.pending_edit() {
                Ok(edit) => self.start_update(edit.id, edit.fields, resp),
                Err(err) => {
                    let _ = resp.send(Err(err.into()));
                }
            },
            Command::CancelEdit { resp } => {
                let was_editing = self.view.cancel_edit().is_some();
                if was_editing {
                    self.emit(ViewEvent::EditCancelled);
                }
                let _ = resp.send(was_editing);
            }
            Command::SetAddForm { open, resp } => {
                let open = match open {
                    Some(open) => {
                        self.view.set_add_form_open(open);
                        open
                    }
                    None => self.view.toggle_add_form(),
                };
                self.emit(ViewEvent::AddFormToggled { open });
                let _ = resp.send(open);
            }
            Command::UpdateDraftField { field, value, resp } => {
                let res = self
                    .view
                    .update_draft_field(field, &value)
                    .map_err(ControllerError::from);
                let _ = resp.send(res);
            }
            Command::ShowHistory { product, resp } => {
                let product_id = product.id.clone();
                self.view.select_product(product);
                self.start_history(product_id, resp);
            }
            Command::CloseHistory { resp } => {
                self.view.close_history();
                self.emit(ViewEvent::HistoryClosed);
                let _ = resp.send(());
            }
            Command::ExportCsv { resp } => {
                let url = self.export_url.clone();
                self.prompt.open_url(&url);
                self.emit(ViewEvent::ExportOpened { url: url.clone() });
                let _ = resp.send(url);
            }
            Command::View { resp } => {
                let _ = resp.send(self.view.clone());
            }
            Command::Shutdown { resp } => {
                let _ = resp.send(());
                return true;
            }
        }

        false
    }

    fn start_refresh(&self, followup: Followup) {
        let query = self.view.search_query().map(str::to_string);
        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_products(query.as_deref()).await;
            let _ = done_tx.send(Completion::Refreshed { result, followup });
        });
    }

    fn start_create(&self, draft: ProductFields, resp: oneshot::Sender<Result<Product, ControllerError>>) {
        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.create_product(&draft).await;
            let _ = done_tx.send(Completion::Created { result, resp });
        });
    }

    fn start_delete(&self, id: ProductId, resp: oneshot::Sender<Result<bool, ControllerError>>) {
        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.delete_product(&id).await;
            let _ = done_tx.send(Completion::Deleted { id, result, resp });
        });
    }

    fn start_update(
        &self,
        id: ProductId,
        fields: ProductFields,
        resp: oneshot::Sender<Result<Product, ControllerError>>,
    ) {
        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.update_product(&id, &fields).await;
            let _ = done_tx.send(Completion::Updated { id, result, resp });
        });
    }

    fn start_history(&self, product_id: ProductId, resp: oneshot::Sender<Result<usize, ControllerError>>) {
        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.product_history(&product_id).await;
            let _ = done_tx.send(Completion::HistoryLoaded {
                product_id,
                result,
                resp,
            });
        });
    }

    fn apply_completion(&mut self, done: Completion) {
        match done {
            Completion::Refreshed { result, followup } => {
                let res = match result {
                    Ok(products) => {
                        self.view.replace_products(products);
                        let count = self.view.products().len();
                        tracing::debug!(count, "products replaced");
                        self.emit(ViewEvent::ProductsReplaced { count });
                        Ok(count)
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "error fetching products");
                        self.emit(ViewEvent::RequestFailed {
                            operation: Operation::Refresh,
                        });
                        Err(ControllerError::from(err))
                    }
                };
                match followup {
                    Followup::None => {}
                    Followup::Reply(resp) => {
                        let _ = resp.send(res);
                    }
                    Followup::Created(product, resp) | Followup::Committed(product, resp) => {
                        let _ = resp.send(Ok(product));
                    }
                }
            }
            Completion::Created { result, resp } => match result {
                Ok(product) => {
                    self.view.finish_create();
                    self.emit(ViewEvent::AddFormToggled { open: false });
                    self.emit(ViewEvent::ProductCreated {
                        id: product.id.clone(),
                    });
                    self.start_refresh(Followup::Created(product, resp));
                    self.prompt.notice(CREATE_SUCCESS);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "create rejected");
                    self.prompt.alert(err.server_message().unwrap_or(CREATE_FAILED));
                    self.emit(ViewEvent::RequestFailed {
                        operation: Operation::Create,
                    });
                    let _ = resp.send(Err(err.into()));
                }
            },
            Completion::Deleted { id, result, resp } => match result {
                Ok(()) => {
                    self.view.remove_product(&id);
                    self.emit(ViewEvent::ProductRemoved { id });
                    let _ = resp.send(Ok(true));
                }
                Err(err) => {
                    tracing::warn!(%id, error = %err, "delete rejected");
                    self.prompt.alert(DELETE_FAILED);
                    self.emit(ViewEvent::RequestFailed {
                        operation: Operation::Delete,
                    });
                    let _ = resp.send(Err(err.into()));
                }
            },
            Completion::Updated { id, result, resp } => match result {
                Ok(product) => {
                    self.view.finish_edit(&id);
                    self.emit(ViewEvent::EditCommitted { id });
                    self.start_refresh(Followup::Committed(product, resp));
                }
                Err(err) => {
                    tracing::warn!(%id, error = %err, "update rejected");
                    self.prompt.alert(UPDATE_FAILED);
                    self.emit(ViewEvent::RequestFailed {
                        operation: Operation::Update,
                    });
                    let _ = resp.send(Err(err.into()));
                }
            },
            Completion::HistoryLoaded {
                product_id,
                result,
                resp,
            } => match result {
                Ok(entries) => {
                    let installed = if self.view.selected().is_some_and(|p| p.id == product_id) {
                        let count = entries.len();
                        self.view.open_history(entries);
                        self.emit(ViewEvent::HistoryOpened {
                            product_id,
                            entries: count,
                        });
                        count
                    } else {
                        tracing::debug!(%product_id, "dropping history for a superseded selection");
                        0
                    };
                    let _ = resp.send(Ok(installed));
                }
                Err(err) => {
                    tracing::error!(%product_id, error = %err, "error fetching history");
                    self.emit(ViewEvent::RequestFailed {
                        operation: Operation::History,
                    });
                    let _ = resp.send(Err(err.into()));
                }
            },
        }
    }
}
