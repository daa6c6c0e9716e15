use std::{sync::Arc, time::Duration};

use moka::sync::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use torque_domain::ConversationState;
use torque_service::TorqueService;
use torque_storage::neo4j::Neo4jStore;

/// A conversation has exactly one writer at a time.
pub type SharedConversation = Arc<Mutex<ConversationState>>;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TorqueService>,
	conversations: Cache<Uuid, SharedConversation>,
}
impl AppState {
	pub fn new(config: torque_config::Config) -> color_eyre::Result<Self> {
		let graph = Neo4jStore::new(&config.storage.graph)?;

		Ok(Self::from_service(TorqueService::new(config, graph)))
	}

	/// Sizes the conversation registry from `[service]` in the service's config.
	pub fn from_service(service: TorqueService) -> Self {
		let conversations = Cache::builder()
			.max_capacity(service.cfg.service.conversation_capacity)
			.time_to_idle(Duration::from_millis(service.cfg.service.conversation_idle_ms))
			.build();

		Self { service: Arc::new(service), conversations }
	}

	/// Returns the conversation for `id`, starting an empty one if it is unknown or expired.
	pub fn conversation(&self, id: Uuid) -> SharedConversation {
		self.conversations.get_with(id, SharedConversation::default)
	}

	/// Drops the conversation. Returns whether it was still live.
	pub fn reset(&self, id: Uuid) -> bool {
		let live = self.conversations.contains_key(&id);

		self.conversations.invalidate(&id);

		live
	}

	/// Live conversations after pending evictions are applied.
	pub fn conversation_count(&self) -> u64 {
		self.conversations.run_pending_tasks();

		self.conversations.entry_count()
	}
}
