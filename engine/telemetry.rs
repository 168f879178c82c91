use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_event_bus::{BusEvent, EventSink};
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use tokio::runtime::{Handle, Runtime};
use uuid::Uuid;

use crate::module::AdaptationStage;

/// Builder configuring telemetry for the adaptation engine.
pub struct AdaptTelemetryBuilder {
    component: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl AdaptTelemetryBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            log_path: None,
            min_level: LogLevel::Debug,
            event_sink: None,
        }
    }

    /// Sets the JSON log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Drops log records below the given level.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Assigns the event sink.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Finalizes the builder.
    pub fn build(self) -> Result<AdaptTelemetry> {
        AdaptTelemetry::new(self.component, self.log_path, self.min_level, self.event_sink)
    }
}

/// Telemetry handle combining an optional JSON logger and event sink.
/// Telemetry failures are swallowed by callers; they never fail a request.
#[derive(Clone)]
pub struct AdaptTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for AdaptTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptTelemetry")
            .field("component", &self.inner.component)
            .finish()
    }
}

struct TelemetryInner {
    component: String,
    logger: Option<JsonLogger>,
    sink: Option<SinkHandle>,
}

struct SinkHandle {
    runtime: Runtime,
    sink: Arc<dyn EventSink>,
}

impl SinkHandle {
    fn new(sink: Arc<dyn EventSink>) -> Result<Self> {
        Ok(Self {
            runtime: Runtime::new()?,
            sink,
        })
    }

    fn publish(&self, event: BusEvent) -> Result<()> {
        if let Ok(handle) = Handle::try_current() {
            let sink = Arc::clone(&self.sink);
            handle.spawn(async move {
                if let Err(err) = sink.publish(event).await {
                    eprintln!("telemetry event publish failed: {err:?}");
                }
            });
            Ok(())
        } else {
            self.runtime.block_on(self.sink.publish(event))
        }
    }
}

impl AdaptTelemetry {
    fn new(
        component: impl Into<String>,
        log_path: Option<PathBuf>,
        min_level: LogLevel,
        event_sink: Option<Arc<dyn EventSink>>,
    ) -> Result<Self> {
        let logger = match log_path {
            Some(path) => Some(JsonLogger::with_min_level(path, min_level)?),
            None => None,
        };
        let sink = match event_sink {
            Some(sink) => Some(SinkHandle::new(sink)?),
            None => None,
        };
        Ok(Self {
            inner: Arc::new(TelemetryInner {
                component: component.into(),
                logger,
                sink,
            }),
        })
    }

    /// Returns a builder for this telemetry handle.
    #[must_use]
    pub fn builder(component: impl Into<String>) -> AdaptTelemetryBuilder {
        AdaptTelemetryBuilder::new(component)
    }

    /// Logs a structured record.
    pub fn log(&self, level: LogLevel, message: &str, fields: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let record =
                LogRecord::new(&self.inner.component, level, message).with_fields(fields);
            logger.log(&record)?;
        }
        Ok(())
    }

    /// Logs one stage transition of an adaptation request.
    pub fn stage(&self, stage: AdaptationStage, fields: Value) -> Result<()> {
        self.log(
            LogLevel::Debug,
            &format!("adapt.stage.{}", stage.name()),
            fields,
        )
    }

    /// Publishes an event to the configured sink.
    pub fn event(&self, topic: &str, payload: Value) -> Result<()> {
        if let Some(handle) = &self.inner.sink {
            let event = BusEvent {
                id: format!("evt-{}", Uuid::new_v4()),
                source: self.inner.component.clone(),
                topic: topic.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                payload,
            };
            handle.publish(event)?;
        }
        Ok(())
    }
}
