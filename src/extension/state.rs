//! 会话状态
//!
//! 宿主的客户端上下文按键保存任意会话状态，PGQ 扩展在其中注册自己的 `PgqState`。

use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::parse_data::ParserExtensionParseData;
use crate::core::{PgqError, PgqResult};
use crate::query::rewrite::CorrelationState;

/// PGQ 会话状态
#[derive(Debug, Default)]
pub struct PgqState {
    /// 当前语句的解析数据，由计划钩子安装
    pub parse_data: Option<Box<dyn ParserExtensionParseData>>,
    pub correlation: CorrelationState,
}

impl PgqState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 客户端上下文，持有按键注册的会话状态
#[derive(Debug, Default)]
pub struct ClientContext {
    session_id: i64,
    registered_state: Arc<RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>>,
}

impl ClientContext {
    pub fn new(session_id: i64) -> Self {
        Self {
            session_id,
            registered_state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn id(&self) -> i64 {
        self.session_id
    }

    /// 注册会话状态，同名键会被覆盖
    pub fn register_state<T: Any + Send + Sync>(&self, key: impl Into<String>, state: Arc<T>) {
        self.registered_state.write().insert(key.into(), state);
    }

    /// 按键取回会话状态，类型不符时返回 `None`
    pub fn get_state<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let state = self.registered_state.read().get(key).cloned()?;
        state.downcast::<T>().ok()
    }

    pub fn has_state(&self, key: &str) -> bool {
        self.registered_state.read().contains_key(key)
    }
}

/// 取回 PGQ 会话状态
pub fn get_pgq_state(context: &ClientContext, key: &str) -> PgqResult<Arc<Mutex<PgqState>>> {
    context
        .get_state::<Mutex<PgqState>>(key)
        .ok_or_else(|| PgqError::MissingSessionState(key.to_string()))
}

/// 在上下文中注册新的 PGQ 会话状态并返回它
pub fn register_pgq_state(context: &ClientContext, key: &str) -> Arc<Mutex<PgqState>> {
    let state = Arc::new(Mutex::new(PgqState::new()));
    context.register_state(key, state.clone());
    state
}
