use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::{broadcast, Notify};

use crate::config::AppConfig;
use crate::models::{AssistantEvent, ChatSession};
use crate::services::ai::CompletionService;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn CompletionService>,
    /// One conversation per session id; each owns its history and pending
    /// action exclusively.
    pub sessions: Mutex<HashMap<String, ChatSession>>,
    /// Stop signals for in-flight free-chat generations, keyed by session.
    pub active_chats: Mutex<HashMap<String, Arc<Notify>>>,
    pub events_tx: broadcast::Sender<AssistantEvent>,
}
