use std::sync::Arc;

use card_core::{CardApp, Record};

/// Router state for the routes of one service.
pub struct CardAxumState<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    pub app: CardApp<R, P>,
    pub service: Arc<str>,
}

impl<R, P> Clone for CardAxumState<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            service: Arc::clone(&self.service),
        }
    }
}

impl<R, P> CardAxumState<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: CardApp<R, P>, service: &str) -> Self {
        Self {
            app,
            service: Arc::from(service),
        }
    }
}
