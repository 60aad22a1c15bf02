//! Run context resolution
//!
//! Branch and event come from CLI flags, then `STAGECRAFT_BRANCH` /
//! `STAGECRAFT_EVENT`, then Travis CI's `TRAVIS_*` variables.

use std::io::Write;

use crate::domain::value_objects::{RunContext, TriggerEvent};

use super::env_validator::EnvVarValidator;
use super::loader::EnvVars;

const EVENT_NAMES: &[&str] = &["push", "pull_request", "cron", "api", "manual"];

/// Resolve the run context from flags and an environment snapshot.
///
/// Invalid event values are reported to `warnings` and ignored.
pub fn resolve_run_context<W: Write>(
    branch_flag: Option<String>,
    event_flag: Option<TriggerEvent>,
    vars: &EnvVars,
    warnings: &mut W,
) -> RunContext {
    let non_empty = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();

    let branch = branch_flag
        .or_else(|| non_empty("STAGECRAFT_BRANCH"))
        .or_else(|| non_empty("TRAVIS_BRANCH"));

    let event = event_flag.or_else(|| {
        let (var, raw) = non_empty("STAGECRAFT_EVENT")
            .map(|v| ("STAGECRAFT_EVENT", v))
            .or_else(|| non_empty("TRAVIS_EVENT_TYPE").map(|v| ("TRAVIS_EVENT_TYPE", v)))?;
        EnvVarValidator::new(var, EVENT_NAMES).parse_with_writer(
            &raw,
            |s| s.parse::<TriggerEvent>().ok().map(Some),
            None,
            warnings,
        )
    });

    let event = event.or_else(|| {
        non_empty("TRAVIS_PULL_REQUEST")
            .filter(|pr| pr != "false")
            .map(|_| TriggerEvent::PullRequest)
    });

    RunContext::new(branch, event)
}
