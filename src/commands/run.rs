use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use stagecraft::application::PipelineOptions;
use stagecraft::config::{resolve_run_context, EnvVars};
use stagecraft::domain::ports::{PipelineEventSink, TemplateRepository};
use stagecraft::domain::value_objects::TriggerEvent;
use stagecraft::infrastructure::{ConsoleEventSink, FsTemplateStore, JsonEventSink};
use stagecraft::presentation::factory::create_pipeline_driver;

pub struct RunArgs<'a> {
    pub config: &'a Path,
    pub branch: Option<String>,
    pub event: Option<TriggerEvent>,
    pub dry_run: bool,
}

pub fn cmd_run(args: RunArgs<'_>, vars: &EnvVars, json: bool, verbose: u8) -> Result<()> {
    let config = super::load_config(args.config, vars, json)?;
    let context = resolve_run_context(args.branch, args.event, vars, &mut io::stderr());
    let template = FsTemplateStore::new().load(&config.template_path())?;

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }

    let events: Arc<dyn PipelineEventSink> = if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::stdout(verbose))
    };

    let options = PipelineOptions::from_config(&config)
        .with_context(context)
        .with_dry_run(args.dry_run);
    let driver = create_pipeline_driver(&config, vars, events, interrupt);
    let report = driver.run(&template, &options)?;

    match report.error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
