//! Console Event Sink
//!
//! Human-readable pipeline progress, one line per notable event.

use std::io::{self, Write};
use std::sync::Mutex;

use is_terminal::IsTerminal;

use crate::domain::entities::StageStatus;
use crate::domain::ports::{PipelineEvent, PipelineEventSink};

struct Icons {
    check: &'static str,
    cross: &'static str,
    skip: &'static str,
    arrow: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            skip: "○",
            arrow: "→",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            skip: "[SKIP]",
            arrow: "->",
        }
    }
}

/// Event sink printing progress for operators
///
/// Unicode icons are used only when stdout is a terminal.
pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    icons: Icons,
    verbose: u8,
}

impl ConsoleEventSink {
    pub fn stdout(verbose: u8) -> Self {
        let unicode = io::stdout().is_terminal();
        Self::with_writer(io::stdout(), unicode, verbose)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, unicode: bool, verbose: u8) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            icons: if unicode {
                Icons::unicode()
            } else {
                Icons::ascii()
            },
            verbose,
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
            let _ = writer.flush();
        }
    }
}

impl PipelineEventSink for ConsoleEventSink {
    fn on_event(&self, event: PipelineEvent) {
        let icons = &self.icons;
        match event {
            PipelineEvent::Started {
                template,
                stages,
                context,
            } => self.line(format!(
                "Promoting {} through {} ({})",
                template,
                stages.join(" -> "),
                context
            )),
            PipelineEvent::Preflighted { stage_count } => {
                if self.verbose > 0 {
                    self.line(format!("Rendered {} stage(s)", stage_count));
                }
            }
            PipelineEvent::StageTransition { stage, status } => match status {
                StageStatus::Validated => {
                    self.line(format!("{} {}: validated", icons.check, stage))
                }
                StageStatus::Validating | StageStatus::Applying if self.verbose > 0 => {
                    self.line(format!("{} {}: {}", icons.arrow, stage, status))
                }
                _ => {}
            },
            PipelineEvent::StageSkipped { stage, reason } => {
                self.line(format!("{} {}: skipped ({})", icons.skip, stage, reason))
            }
            PipelineEvent::StageApplied { stage, identity } => {
                self.line(format!("{} {}: applied {}", icons.check, stage, identity))
            }
            PipelineEvent::StageFailed {
                stage,
                status,
                diagnostics,
            } => {
                self.line(format!("{} {}: {}", icons.cross, stage, status));
                for line in diagnostics {
                    self.line(format!("    {}", line));
                }
            }
            PipelineEvent::Interrupted { next_stage } => {
                self.line(format!("{} interrupted before '{}'", icons.cross, next_stage))
            }
            PipelineEvent::Completed {
                applied,
                skipped,
                failed,
                pending,
            } => self.line(format!(
                "\n{} applied, {} skipped, {} failed, {} pending",
                applied, skipped, failed, pending
            )),
        }
    }
}
