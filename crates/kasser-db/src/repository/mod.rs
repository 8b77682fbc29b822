//! # Repository Module
//!
//! Database repository implementations for Kasser POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().list(ctx.store_id, page)                          │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── get(&self, store_id, id)                                          │
//! │  └── list(&self, store_id, page)                                       │
//! │       │                                                                 │
//! │       │  SQL Query (always filtered by store_id)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Statements the checkout transaction needs are free functions taking   │
//! │  `&mut SqliteConnection`, so they run on whatever transaction the      │
//! │  caller holds.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`store::StoreRepository`] - Stores and staff accounts
//! - [`category::CategoryRepository`] - Product categories
//! - [`product::ProductRepository`] - Products and stock
//! - [`order::OrderRepository`] - Order reads and projections
//! - [`settings::SettingsRepository`] - Per-store settings and tax policy

pub mod category;
pub mod order;
pub mod product;
pub mod settings;
pub mod store;
