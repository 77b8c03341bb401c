use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::{
    auth::{jwt::JwtKeys, password::PasswordHasher},
    chat::reply::ReplySelector,
    config::{AppConfig, StoreBackend},
    store::{memory::MemoryStore, postgres::PgStore, MessageStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub messages: Arc<dyn MessageStore>,
    pub keys: JwtKeys,
    pub hasher: PasswordHasher,
    pub replies: Arc<ReplySelector>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let (users, messages): (Arc<dyn UserStore>, Arc<dyn MessageStore>) = match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;
                let store = Arc::new(PgStore::connect(url, config.max_connections).await?);
                info!("using postgres store");
                (
                    store.clone() as Arc<dyn UserStore>,
                    store as Arc<dyn MessageStore>,
                )
            }
            StoreBackend::Memory => {
                let store = Arc::new(MemoryStore::new());
                info!("using in-memory store; data is lost on restart");
                (
                    store.clone() as Arc<dyn UserStore>,
                    store as Arc<dyn MessageStore>,
                )
            }
        };

        let replies = match config.reply_seed {
            Some(seed) => ReplySelector::seeded(seed),
            None => ReplySelector::from_entropy(),
        };

        Ok(Self {
            keys: JwtKeys::from_config(&config.jwt),
            config,
            users,
            messages,
            hasher: PasswordHasher::default(),
            replies: Arc::new(replies),
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
        hasher: PasswordHasher,
        replies: ReplySelector,
    ) -> Self {
        Self {
            keys: JwtKeys::from_config(&config.jwt),
            config,
            users,
            messages,
            hasher,
            replies: Arc::new(replies),
        }
    }

    /// Memory-backed state with cheap hashing and a seeded reply selector.
    pub fn fake() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(
            Arc::new(AppConfig::in_memory("test-secret")),
            store.clone() as Arc<dyn UserStore>,
            store as Arc<dyn MessageStore>,
            PasswordHasher::fast(),
            ReplySelector::seeded(7),
        )
    }
}
