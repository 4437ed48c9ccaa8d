//! Server state
//!
//! Holds shared handles to the store and the core services. Everything is
//! passed in explicitly — no module-level singletons — so tests can build
//! a state around an in-memory store and a throwaway notifier.

use std::path::Path;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::external::{ExternalOrderPipeline, OrderNotifier};
use crate::orders::OrderManager;
use crate::reports::SalesReporter;
use crate::store::PosStore;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: PosStore,
    pub orders: OrderManager,
    pub pipeline: ExternalOrderPipeline,
    pub notifier: OrderNotifier,
    pub reporter: SalesReporter,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    /// Open the database under the configured work dir, seed the table
    /// pool and wire up the services
    pub fn initialize(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let store = PosStore::open(Path::new(&config.work_dir).join("pos.redb"))?;
        Ok(Self::with_store(config, store)?)
    }

    /// Build the state around an existing store (tests use an in-memory one)
    pub fn with_store(config: Config, store: PosStore) -> anyhow::Result<Self> {
        store.seed_tables(config.table_count)?;

        let notifier = OrderNotifier::new();
        let orders = OrderManager::new(store.clone());
        let pipeline =
            ExternalOrderPipeline::new(store.clone(), notifier.clone(), config.tax_policy());
        let reporter = SalesReporter::new(store.clone(), config.timezone);
        let jwt = Arc::new(JwtService::new(&config.jwt_secret));

        Ok(Self {
            config,
            store,
            orders,
            pipeline,
            notifier,
            reporter,
            jwt,
        })
    }
}
