#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts every tracing event that reaches the subscriber it is layered on.
#[derive(Clone, Default)]
pub struct EventCounter {
    events: Arc<AtomicUsize>,
}

impl EventCounter {
    pub fn count(&self) -> usize {
        self.events.load(Ordering::SeqCst)
    }

    pub fn subscriber(&self) -> impl Subscriber + Send + Sync {
        tracing_subscriber::registry().with(self.clone())
    }
}

impl<S: Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
        self.events.fetch_add(1, Ordering::SeqCst);
    }
}
