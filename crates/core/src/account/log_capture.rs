//! Subscriber that records every emitted event, for asserting on logs.

use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::executor::block_on;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Clone)]
pub(crate) struct RecordedEvent {
    pub(crate) level: Level,
    pub(crate) target: String,
    pub(crate) fields: Vec<String>,
}

impl RecordedEvent {
    pub(crate) fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }
}

struct FieldNames(Vec<String>);

impl Visit for FieldNames {
    fn record_debug(&mut self, field: &Field, _value: &dyn Debug) {
        self.0.push(field.name().to_string());
    }
}

#[derive(Clone, Default)]
pub(crate) struct EventRecorder(Arc<Mutex<Vec<RecordedEvent>>>);

impl EventRecorder {
    /// Drives `future` to completion with this recorder as the only subscriber.
    pub(crate) fn run<F: Future>(&self, future: F) -> F::Output {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, || block_on(future))
    }

    pub(crate) fn events(&self) -> Vec<RecordedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, level: Level) -> usize {
        self.events().iter().filter(|e| e.level == level).count()
    }

    pub(crate) fn count_with_field(&self, level: Level, field: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.level == level && e.has_field(field))
            .count()
    }

    pub(crate) fn count_target(&self, target: &str) -> usize {
        self.events().iter().filter(|e| e.target == target).count()
    }
}

impl<S: Subscriber> Layer<S> for EventRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldNames(Vec::new());
        event.record(&mut fields);
        self.0.lock().unwrap().push(RecordedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: fields.0,
        });
    }
}
