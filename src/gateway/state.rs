use std::sync::Arc;

use crate::dispatcher::CommandDispatcher;

#[derive(Clone)]
pub struct HandlerState {
    pub dispatcher: Arc<CommandDispatcher>,
}

impl HandlerState {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
