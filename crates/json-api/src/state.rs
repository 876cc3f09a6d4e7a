//! State

use std::{sync::Arc, time::Instant};

use testgenium_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// When the server came up, for reporting uptime.
    pub(crate) started: Instant,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext) -> Self {
        Self {
            app,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::new(app))
    }
}
