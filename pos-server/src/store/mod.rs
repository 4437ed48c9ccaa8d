//! redb-backed transactional store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order headers |
//! | `order_items` | `item_id` | `OrderItem` | Line items (staff and external) |
//! | `dining_tables` | `table_id` | `DiningTable` | Fixed table pool + occupancy |
//! | `external_orders` | `external_id` | `ExternalOrder` | Public-submission shadow records |
//! | `products` | `product_id` | `Product` | Catalog for name/price resolution |
//! | `counters` | name | `u64` | ID allocation |
//!
//! # Transactions
//!
//! redb admits a single write transaction at a time; every multi-row write
//! (order create, update-with-item-replace, external ingestion) runs inside
//! one `WriteTransaction` and is therefore serialized and atomic. A
//! transaction that is dropped without `commit()` aborts, so early returns
//! on business errors roll back automatically and never leave partial rows
//! behind.
//!
//! Rows are stored as JSON blobs; commits are durable when `commit()`
//! returns (copy-on-write with atomic pointer swap).

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{DiningTable, ExternalOrder, ExternalOrderStatus, Order, OrderItem, Product};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Order headers: key = order id
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Line items: key = item id, parent reference inside the value
const ORDER_ITEMS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("order_items");

/// Dining tables: key = table id
const DINING_TABLES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("dining_tables");

/// External orders: key = UUID string
const EXTERNAL_ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("external_orders");

/// Catalog products: key = product id string
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// ID counters: key = counter name
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_ID_KEY: &str = "order_id";
const ITEM_ID_KEY: &str = "item_id";
const TABLE_ID_KEY: &str = "table_id";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// POS store backed by redb
#[derive(Clone)]
pub struct PosStore {
    db: Arc<Database>,
}

impl PosStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEMS_TABLE)?;
            let _ = write_txn.open_table(DINING_TABLES_TABLE)?;
            let _ = write_txn.open_table(EXTERNAL_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== ID Allocation ==========

    fn next_id(&self, txn: &WriteTransaction, key: &str) -> StoreResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    /// Allocate the next order id (within the transaction, so a rolled-back
    /// create burns the id but never leaves a row)
    pub fn next_order_id(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        self.next_id(txn, ORDER_ID_KEY)
    }

    /// Allocate the next item id
    pub fn next_item_id(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        self.next_id(txn, ITEM_ID_KEY)
    }

    /// Allocate the next table id (seeding only)
    pub fn next_table_id(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        self.next_id(txn, TABLE_ID_KEY)
    }

    // ========== Orders ==========

    /// Insert or overwrite an order header
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;
        Ok(())
    }

    /// Get an order by id (read-only)
    pub fn get_order(&self, id: u64) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id (within transaction)
    pub fn get_order_txn(&self, txn: &WriteTransaction, id: u64) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All order headers (report scans)
    pub fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Find the non-terminal order holding a table, if any (within transaction)
    ///
    /// Runs inside the serialized write transaction, so check-and-occupy is
    /// atomic with respect to concurrent order mutations.
    pub fn find_live_order_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: u64,
    ) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.table_id == Some(table_id) && !order.status.is_terminal() {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    /// Find the non-terminal order holding a table, if any (read-only)
    pub fn find_live_order_for_table(&self, table_id: u64) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.table_id == Some(table_id) && !order.status.is_terminal() {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    // ========== Order Items ==========

    /// Insert or overwrite a line item
    pub fn put_item(&self, txn: &WriteTransaction, item: &OrderItem) -> StoreResult<()> {
        let mut table = txn.open_table(ORDER_ITEMS_TABLE)?;
        let value = serde_json::to_vec(item)?;
        table.insert(item.id, value.as_slice())?;
        Ok(())
    }

    /// All items belonging to an order (read-only)
    pub fn items_for_order(&self, order_id: u64) -> StoreResult<Vec<OrderItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let item: OrderItem = serde_json::from_slice(value.value())?;
            if item.order_id == Some(order_id) {
                items.push(item);
            }
        }
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    /// All items belonging to an order (within transaction)
    pub fn items_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StoreResult<Vec<OrderItem>> {
        let table = txn.open_table(ORDER_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let item: OrderItem = serde_json::from_slice(value.value())?;
            if item.order_id == Some(order_id) {
                items.push(item);
            }
        }
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    /// All items belonging to an external order (read-only)
    pub fn items_for_external(&self, external_id: &str) -> StoreResult<Vec<OrderItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let item: OrderItem = serde_json::from_slice(value.value())?;
            if item.external_order_id.as_deref() == Some(external_id) {
                items.push(item);
            }
        }
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    /// Delete every item row of an order; returns the removed count
    ///
    /// Used by the replace-not-patch update path: the old set goes away
    /// wholesale before the new list is inserted, in the same transaction.
    pub fn delete_items_for_order(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StoreResult<usize> {
        let mut table = txn.open_table(ORDER_ITEMS_TABLE)?;

        // Collect keys first, then remove (cannot mutate while iterating)
        let mut keys_to_remove: Vec<u64> = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let item: OrderItem = serde_json::from_slice(value.value())?;
            if item.order_id == Some(order_id) {
                keys_to_remove.push(key.value());
            }
        }
        for key in &keys_to_remove {
            table.remove(key)?;
        }
        Ok(keys_to_remove.len())
    }

    // ========== Dining Tables ==========

    /// Insert or overwrite a dining table row
    pub fn put_table(&self, txn: &WriteTransaction, dining: &DiningTable) -> StoreResult<()> {
        let mut table = txn.open_table(DINING_TABLES_TABLE)?;
        let value = serde_json::to_vec(dining)?;
        table.insert(dining.id, value.as_slice())?;
        Ok(())
    }

    /// Get a dining table by id (read-only)
    pub fn get_table(&self, id: u64) -> StoreResult<Option<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DINING_TABLES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a dining table by id (within transaction)
    pub fn get_table_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StoreResult<Option<DiningTable>> {
        let table = txn.open_table(DINING_TABLES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All dining tables, ordered by id
    pub fn list_tables(&self) -> StoreResult<Vec<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DINING_TABLES_TABLE)?;
        let mut tables = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            tables.push(serde_json::from_slice(value.value())?);
        }
        Ok(tables)
    }

    /// Seed the fixed table pool on first start: `count` numbered tables
    /// plus the virtual pickup entry. A non-empty pool is left untouched.
    pub fn seed_tables(&self, count: u32) -> StoreResult<()> {
        if !self.list_tables()?.is_empty() {
            return Ok(());
        }
        let txn = self.begin_write()?;
        for n in 1..=count {
            let id = self.next_table_id(&txn)?;
            self.put_table(&txn, &DiningTable::free(id, format!("Table {n}")))?;
        }
        let pickup_id = self.next_table_id(&txn)?;
        self.put_table(&txn, &DiningTable::free(pickup_id, "Pickup"))?;
        txn.commit()?;
        tracing::info!(count = count + 1, "seeded dining table pool");
        Ok(())
    }

    // ========== External Orders ==========

    /// Insert or overwrite an external order
    pub fn put_external(&self, txn: &WriteTransaction, external: &ExternalOrder) -> StoreResult<()> {
        let mut table = txn.open_table(EXTERNAL_ORDERS_TABLE)?;
        let value = serde_json::to_vec(external)?;
        table.insert(external.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an external order by id (read-only)
    pub fn get_external(&self, id: &str) -> StoreResult<Option<ExternalOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXTERNAL_ORDERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an external order by id (within transaction)
    pub fn get_external_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StoreResult<Option<ExternalOrder>> {
        let table = txn.open_table(EXTERNAL_ORDERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Pending external orders of one tenant (the polling fallback)
    pub fn list_external_pending(&self, admin_user_id: &str) -> StoreResult<Vec<ExternalOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXTERNAL_ORDERS_TABLE)?;
        let mut externals = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let external: ExternalOrder = serde_json::from_slice(value.value())?;
            if external.admin_user_id == admin_user_id
                && external.status == ExternalOrderStatus::Pending
            {
                externals.push(external);
            }
        }
        externals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(externals)
    }

    // ========== Products ==========

    /// Insert or overwrite a catalog product (own transaction)
    pub fn upsert_product(&self, product: &Product) -> StoreResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let value = serde_json::to_vec(product)?;
            table.insert(product.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a product by id (read-only)
    pub fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a product by id (within transaction)
    ///
    /// Order writes resolve product names inside the write transaction so
    /// a rename committed later cannot race the freeze.
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StoreResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All products of one tenant
    pub fn list_products_by_admin(&self, admin_user_id: &str) -> StoreResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            if product.admin_user_id == admin_user_id {
                products.push(product);
            }
        }
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }
}
