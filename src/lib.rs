//! Client-side state and synchronization engine for an inventory manager.
//!
//! A single controller task owns the screen state (product list, search
//! text, edit buffer, add form, history sidebar) and keeps it consistent with
//! a REST backend. Callers drive it through a cloneable handle and observe it
//! through a broadcast event stream.
//!
//! # Examples
//!
//! Pure state transitions with [`core::view::ViewState`]:
//! ```
//! use stockroom::{
//!     core::view::ViewState,
//!     product::Product,
//!     types::{ProductField, StockStatus},
//! };
//!
//! let milk = Product {
//!     id: "1".to_string(),
//!     name: "Milk".to_string(),
//!     brand: "Farm".to_string(),
//!     category: "Dairy".to_string(),
//!     unit: "l".to_string(),
//!     stock: 10,
//!     status: StockStatus::InStock,
//! };
//! let mut view = ViewState::with_products(vec![milk.clone()]);
//! view.begin_edit(&milk).expect("milk is listed");
//! view.update_edit_field(ProductField::Stock, "3").expect("valid stock");
//! assert_eq!(view.editing().map(|e| e.fields.stock), Some(3));
//! ```
//!
//! Controller wired to a live backend:
//! ```no_run
//! use std::sync::Arc;
//!
//! use stockroom::{
//!     api::http::HttpProductApi,
//!     config::ClientConfig,
//!     core::view::ViewState,
//!     prompt::LogPrompt,
//!     runtime::handle::spawn_controller,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = ClientConfig::load_with_dotenv().expect("config");
//! let api = HttpProductApi::from_config(&config).expect("http client");
//! let handle = spawn_controller(ViewState::new(), Arc::new(api), Arc::new(LogPrompt), config);
//! handle.set_search("mi").await.expect("search");
//! let count = handle.refresh().await.expect("refresh");
//! println!("{count} products");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// REST backend abstraction and HTTP implementation.
pub mod api;
/// Layered client configuration.
pub mod config;
/// View state, product cache, and debounce timer.
pub mod core;
/// Product records, editable fields, and history entries.
pub mod product;
/// User-facing dialogs and navigation port.
pub mod prompt;
/// Single-writer controller task and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
