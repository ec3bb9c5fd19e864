//! Shared fakes for controller tests: an in-memory backend and a recording prompt.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use stockroom::{
    api::{ApiError, ApiResult, ProductApi},
    product::{HistoryLogEntry, Product, ProductFields},
    prompt::UserPrompt,
    runtime::events::ViewEvent,
    types::StockStatus,
};
use tokio::sync::broadcast;

/// Stock below this is reported as out of stock by the fake backend.
pub const LOW_STOCK: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Search(String),
    Create(String),
    Update(String),
    Delete(String),
    History(String),
}

#[derive(Debug, Default)]
struct Backend {
    products: Vec<Product>,
    history: Vec<(String, HistoryLogEntry)>,
    next_id: u32,
}

/// Backend that derives status from stock the way a real server would.
#[derive(Debug, Default)]
pub struct FakeApi {
    backend: Mutex<Backend>,
    calls: Mutex<Vec<Call>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub reject_message: Mutex<Option<String>>,
    history_delay: Mutex<HashMap<String, Duration>>,
}

pub fn status_for(stock: u32) -> StockStatus {
    if stock < LOW_STOCK {
        StockStatus::OutOfStock
    } else {
        StockStatus::InStock
    }
}

pub fn product(id: &str, name: &str, stock: u32) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: "Farm".to_string(),
        category: "Grocery".to_string(),
        unit: "pc".to_string(),
        stock,
        status: status_for(stock),
    }
}

pub fn history_entry(id: &str, action: &str, old: Option<u32>, new: Option<u32>) -> HistoryLogEntry {
    HistoryLogEntry {
        id: id.to_string(),
        action_type: action.to_string(),
        description: format!("{action} {id}"),
        timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 9, 15, 0).unwrap(),
        old_stock: old,
        new_stock: new,
    }
}

impl FakeApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        {
            let mut backend = api.backend.lock().unwrap();
            backend.next_id = products.len() as u32 + 100;
            backend.products = products;
        }
        api
    }

    /// Milk (10, in stock) and Eggs (0, out of stock).
    pub fn milk_and_eggs() -> Self {
        Self::with_products(vec![product("milk", "Milk", 10), product("eggs", "Eggs", 0)])
    }

    pub fn add_history(&self, product_id: &str, entry: HistoryLogEntry) {
        self.backend
            .lock()
            .unwrap()
            .history
            .push((product_id.to_string(), entry));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn server_products(&self) -> Vec<Product> {
        self.backend.lock().unwrap().products.clone()
    }

    pub fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, on: bool, message: Option<&str>) {
        self.fail_writes.store(on, Ordering::SeqCst);
        *self.reject_message.lock().unwrap() = message.map(str::to_string);
    }

    /// Makes history fetches for `product_id` take `delay` before answering.
    pub fn set_history_delay(&self, product_id: &str, delay: Duration) {
        self.history_delay
            .lock()
            .unwrap()
            .insert(product_id.to_string(), delay);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn read_guard(&self) -> ApiResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ApiError::Other("connection refused".to_string()));
        }
        Ok(())
    }

    fn write_guard(&self) -> ApiResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Rejected {
                status: 400,
                message: self.reject_message.lock().unwrap().clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProductApi for FakeApi {
    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.record(Call::List);
        self.read_guard()?;
        Ok(self.server_products())
    }

    async fn search_products(&self, name: &str) -> ApiResult<Vec<Product>> {
        self.record(Call::Search(name.to_string()));
        self.read_guard()?;
        let needle = name.to_lowercase();
        Ok(self
            .server_products()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn create_product(&self, draft: &ProductFields) -> ApiResult<Product> {
        self.record(Call::Create(draft.name.clone()));
        self.write_guard()?;
        let mut backend = self.backend.lock().unwrap();
        backend.next_id += 1;
        let created = Product {
            id: format!("p{}", backend.next_id),
            name: draft.name.clone(),
            brand: draft.brand.clone(),
            category: draft.category.clone(),
            unit: draft.unit.clone(),
            stock: draft.stock,
            status: status_for(draft.stock),
        };
        backend.products.push(created.clone());
        Ok(created)
    }

    async fn update_product(&self, id: &str, fields: &ProductFields) -> ApiResult<Product> {
        self.record(Call::Update(id.to_string()));
        self.write_guard()?;
        let mut backend = self.backend.lock().unwrap();
        let Some(existing) = backend.products.iter_mut().find(|p| p.id == id) else {
            return Err(ApiError::Rejected {
                status: 404,
                message: Some("Product not found".to_string()),
            });
        };
        existing.name = fields.name.clone();
        existing.brand = fields.brand.clone();
        existing.category = fields.category.clone();
        existing.unit = fields.unit.clone();
        existing.stock = fields.stock;
        existing.status = status_for(fields.stock);
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: &str) -> ApiResult<()> {
        self.record(Call::Delete(id.to_string()));
        self.write_guard()?;
        self.backend.lock().unwrap().products.retain(|p| p.id != id);
        Ok(())
    }

    async fn product_history(&self, id: &str) -> ApiResult<Vec<HistoryLogEntry>> {
        self.record(Call::History(id.to_string()));
        let delay = self.history_delay.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read_guard()?;
        Ok(self
            .backend
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|(pid, _)| pid == id)
            .map(|(_, e)| e.clone())
            .collect())
    }
}

/// Prompt that answers confirmations with a fixed reply and records everything.
#[derive(Debug)]
pub struct RecordingPrompt {
    answer: AtomicBool,
    pub confirms: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl UserPrompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().unwrap().push(message.to_string());
        self.answer.load(Ordering::SeqCst)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn open_url(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

/// Waits for the first event matching `pred`, skipping others.
pub async fn wait_for(
    sub: &mut broadcast::Receiver<ViewEvent>,
    pred: impl Fn(&ViewEvent) -> bool,
) -> ViewEvent {
    loop {
        let evt = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("event timeout")
            .expect("recv");
        if pred(&evt) {
            return evt;
        }
    }
}

pub async fn wait_for_products(sub: &mut broadcast::Receiver<ViewEvent>) -> usize {
    match wait_for(sub, |e| matches!(e, ViewEvent::ProductsReplaced { .. })).await {
        ViewEvent::ProductsReplaced { count } => count,
        _ => unreachable!(),
    }
}
