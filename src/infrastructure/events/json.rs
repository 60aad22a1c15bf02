//! JSON Event Sink
//!
//! Outputs pipeline events as NDJSON for CI/automation consumption.

use crate::domain::ports::{PipelineEvent, PipelineEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl PipelineEventSink for JsonEventSink {
    fn on_event(&self, event: PipelineEvent) {
        let json = match event {
            PipelineEvent::Started {
                template,
                stages,
                context,
            } => serde_json::json!({
                "event": "start",
                "command": "run",
                "template": template,
                "stages": stages,
                "context": context,
            }),

            PipelineEvent::Preflighted { stage_count } => serde_json::json!({
                "event": "preflighted",
                "command": "run",
                "stage_count": stage_count,
            }),

            PipelineEvent::StageTransition { stage, status } => serde_json::json!({
                "event": "stage_status",
                "command": "run",
                "stage": stage,
                "status": status,
            }),

            PipelineEvent::StageSkipped { stage, reason } => serde_json::json!({
                "event": "stage_skipped",
                "command": "run",
                "stage": stage,
                "reason": reason,
            }),

            PipelineEvent::StageApplied { stage, identity } => serde_json::json!({
                "event": "stage_applied",
                "command": "run",
                "stage": stage,
                "identity": identity,
            }),

            PipelineEvent::StageFailed {
                stage,
                status,
                diagnostics,
            } => serde_json::json!({
                "event": "stage_failed",
                "command": "run",
                "stage": stage,
                "status": status,
                "diagnostics": diagnostics,
            }),

            PipelineEvent::Interrupted { next_stage } => serde_json::json!({
                "event": "interrupted",
                "command": "run",
                "next_stage": next_stage,
            }),

            PipelineEvent::Completed {
                applied,
                skipped,
                failed,
                pending,
            } => {
                let status = if failed > 0 {
                    "failed"
                } else if pending > 0 {
                    "incomplete"
                } else {
                    "success"
                };
                serde_json::json!({
                    "event": "complete",
                    "command": "run",
                    "status": status,
                    "applied": applied,
                    "skipped": skipped,
                    "failed": failed,
                    "pending": pending,
                })
            }
        };

        self.write_event(json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::StageStatus;
    use std::sync::{Arc, Mutex};

    struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(events: Vec<PipelineEvent>) -> Vec<serde_json::Value> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = JsonEventSink::with_writer(TestWriter {
            buffer: buffer.clone(),
        });
        for event in events {
            sink.on_event(event);
        }
        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_json_sink_writes_one_line_per_event() {
        let lines = capture(vec![
            PipelineEvent::Preflighted { stage_count: 2 },
            PipelineEvent::StageTransition {
                stage: "staging".to_string(),
                status: StageStatus::ValidationFailed,
            },
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "preflighted");
        assert_eq!(lines[1]["status"], "validation_failed");
    }

    #[test]
    fn test_json_sink_reports_skip_reason() {
        let lines = capture(vec![PipelineEvent::StageSkipped {
            stage: "production".to_string(),
            reason: "event 'pull_request' is not one of [push]".to_string(),
        }]);
        assert_eq!(lines[0]["stage"], "production");
        assert_eq!(lines[0]["reason"], "event 'pull_request' is not one of [push]");
    }

    #[test]
    fn test_json_sink_complete_status() {
        let lines = capture(vec![
            PipelineEvent::Completed {
                applied: 2,
                skipped: 0,
                failed: 0,
                pending: 0,
            },
            PipelineEvent::Completed {
                applied: 0,
                skipped: 0,
                failed: 1,
                pending: 1,
            },
        ]);
        assert_eq!(lines[0]["status"], "success");
        assert_eq!(lines[1]["status"], "failed");
    }
}
