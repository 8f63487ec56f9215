use std::collections::HashMap;
use std::sync::Arc;

use crate::{CardService, Record};

/// Maps service names to `CardService` instances so any transport
/// (HTML pages, JSON routes, tests) can call them by name.
pub struct CardServiceRegistry<R, P = ()>
where
    R: Record,
    P: Send + 'static,
{
    services: HashMap<String, Arc<dyn CardService<R, P>>>,
}

impl<R, P> CardServiceRegistry<R, P>
where
    R: Record,
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    pub fn register<S>(&mut self, name: S, service: Arc<dyn CardService<R, P>>)
    where
        S: Into<String>,
    {
        self.services.insert(name.into(), service);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CardService<R, P>>> {
        self.services.get(name)
    }
}

impl<R, P> Default for CardServiceRegistry<R, P>
where
    R: Record,
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
