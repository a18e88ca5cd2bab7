//! In-memory event capture for logging assertions in tests.
//!
//! `init_test_capture` installs a global subscriber that keeps every event
//! as a flat field map. Tests share the buffer, so lookups are scoped by op
//! name and, where tests run concurrently on the same op, by `path`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::core_types::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_PATH};

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    /// Every field, rendered to a string; includes the three above
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn from_fields(level: Level, fields: HashMap<String, String>) -> Self {
        Self {
            level,
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct FieldMap(HashMap<String, String>);

impl FieldMap {
    fn put(&mut self, field: &Field, value: impl ToString) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl Visit for FieldMap {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value);
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

/// Subscriber layer feeding a shared buffer
pub struct TestCaptureLayer {
    buffer: Buffer,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let buffer: Buffer = Arc::default();
        let handle = TestCapture {
            buffer: Arc::clone(&buffer),
        };
        (Self { buffer }, handle)
    }

    fn push(&self, event: CapturedEvent) {
        if let Ok(mut events) = self.buffer.lock() {
            events.push(event);
        }
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        event.record(&mut fields);
        self.push(CapturedEvent::from_fields(*event.metadata().level(), fields.0));
    }
}

/// Read side of the capture buffer
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events of one operation, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    /// Events of one operation whose `path` field equals `path`
    pub fn events_for_path(&self, op: &str, path: &str) -> Vec<CapturedEvent> {
        self.events_for_op(op)
            .into_iter()
            .filter(|e| e.field(FIELD_PATH) == Some(path))
            .collect()
    }

    /// # Panics
    ///
    /// Panics if no event matches `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={} not found in {} captured events",
            op,
            event,
            events.len()
        );
    }

    /// Number of events with any field value containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.count_events(|e| e.fields.values().any(|v| v.contains(needle)))
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.buffer.lock() {
            events.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber on first call and return the shared
/// handle.
///
/// # Example
///
/// ```
/// use vaultline_core::logging_facility::test_capture::init_test_capture;
/// use vaultline_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op", path = "secret/doc");
/// assert_eq!(capture.events_for_path("doc_capture_op", "secret/doc").len(), 1);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}
