//! Trigger value objects - when a validated stage is allowed to apply

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CI event that started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    Push,
    PullRequest,
    Cron,
    Api,
    Manual,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::Push => "push",
            TriggerEvent::PullRequest => "pull_request",
            TriggerEvent::Cron => "cron",
            TriggerEvent::Api => "api",
            TriggerEvent::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "push" => Ok(TriggerEvent::Push),
            "pull_request" | "pr" => Ok(TriggerEvent::PullRequest),
            "cron" => Ok(TriggerEvent::Cron),
            "api" => Ok(TriggerEvent::Api),
            "manual" => Ok(TriggerEvent::Manual),
            other => Err(format!("unknown event '{}'", other)),
        }
    }
}

/// Branch and event of the current run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    pub branch: Option<String>,
    pub event: Option<TriggerEvent>,
}

impl RunContext {
    pub fn new(branch: Option<String>, event: Option<TriggerEvent>) -> Self {
        Self { branch, event }
    }
}

impl fmt::Display for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let branch = self.branch.as_deref().unwrap_or("<unknown>");
        match self.event {
            Some(event) => write!(f, "branch {} ({})", branch, event),
            None => write!(f, "branch {}", branch),
        }
    }
}

/// Condition under which a stage applies
///
/// Empty lists match anything. A branch list never matches an unknown branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub branches: Vec<String>,

    #[serde(default)]
    pub events: Vec<TriggerEvent>,
}

impl Trigger {
    /// A trigger that holds for every run
    pub fn always() -> Self {
        Self::default()
    }

    pub fn on_branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branches: branches.into_iter().map(Into::into).collect(),
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<TriggerEvent>) -> Self {
        self.events = events;
        self
    }

    /// Check that every branch pattern is a valid glob.
    pub fn validate(&self) -> Result<(), String> {
        for pattern in &self.branches {
            glob::Pattern::new(pattern)
                .map_err(|e| format!("invalid branch pattern '{}': {}", pattern, e.msg))?;
        }
        Ok(())
    }

    /// Whether the trigger holds for `ctx`
    pub fn matches(&self, ctx: &RunContext) -> bool {
        self.mismatch(ctx).is_none()
    }

    /// Explanation of why the trigger does not hold, if it doesn't
    pub fn mismatch(&self, ctx: &RunContext) -> Option<String> {
        if !self.branches.is_empty() {
            match ctx.branch.as_deref() {
                None => return Some("branch is unknown".to_string()),
                Some(branch) if !self.branches.iter().any(|p| branch_matches(p, branch)) => {
                    return Some(format!(
                        "branch '{}' is not one of [{}]",
                        branch,
                        self.branches.join(", ")
                    ));
                }
                Some(_) => {}
            }
        }

        if !self.events.is_empty() {
            match ctx.event {
                None => return Some("event is unknown".to_string()),
                Some(event) if !self.events.contains(&event) => {
                    let allowed: Vec<&str> = self.events.iter().map(|e| e.as_str()).collect();
                    return Some(format!(
                        "event '{}' is not one of [{}]",
                        event,
                        allowed.join(", ")
                    ));
                }
                Some(_) => {}
            }
        }

        None
    }
}

/// Match a branch against a glob pattern (`*` spans `/`, so `*` matches
/// `feature/x`). A pattern that is not a valid glob only matches itself.
fn branch_matches(pattern: &str, branch: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(glob) => glob.matches(branch),
        Err(_) => pattern == branch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(branch: Option<&str>, event: Option<TriggerEvent>) -> RunContext {
        RunContext::new(branch.map(String::from), event)
    }

    #[test]
    fn test_empty_trigger_always_matches() {
        assert!(Trigger::always().matches(&RunContext::default()));
        assert!(Trigger::always().matches(&ctx(Some("feature/x"), Some(TriggerEvent::Cron))));
    }

    #[test]
    fn test_branch_trigger_requires_known_matching_branch() {
        let trigger = Trigger::on_branches(["master"]);
        assert!(trigger.matches(&ctx(Some("master"), None)));
        assert!(!trigger.matches(&ctx(Some("develop"), None)));
        assert_eq!(
            trigger.mismatch(&RunContext::default()),
            Some("branch is unknown".to_string())
        );
    }

    #[test]
    fn test_event_trigger_excludes_pull_requests() {
        let trigger = Trigger::on_branches(["master"]).with_events(vec![TriggerEvent::Push]);
        assert!(trigger.matches(&ctx(Some("master"), Some(TriggerEvent::Push))));
        let reason = trigger
            .mismatch(&ctx(Some("master"), Some(TriggerEvent::PullRequest)))
            .unwrap();
        assert_eq!(reason, "event 'pull_request' is not one of [push]");
    }

    #[test]
    fn test_wildcard_branch_patterns() {
        assert!(branch_matches("release/*", "release/1.2"));
        assert!(branch_matches("*", "anything"));
        assert!(branch_matches("*-hotfix", "cdn-hotfix"));
        assert!(branch_matches("a*b*c", "axxbyyc"));
        assert!(!branch_matches("release/*", "feature/x"));
        assert!(!branch_matches("a*bc", "abc-not"));
        assert!(!branch_matches("ab*ba", "aba"));
        assert!(!branch_matches("master", "master2"));
        assert!(branch_matches("*", "feature/x"));
        assert!(branch_matches("release-1.?", "release-1.4"));
    }

    #[test]
    fn test_invalid_branch_pattern_is_reported() {
        let err = Trigger::on_branches(["release/[1-"]).validate().unwrap_err();
        assert!(err.starts_with("invalid branch pattern 'release/[1-'"), "{}", err);
        assert!(Trigger::on_branches(["release/*"]).validate().is_ok());
    }

    #[test]
    fn test_event_parsing_accepts_aliases() {
        assert_eq!("pull-request".parse::<TriggerEvent>(), Ok(TriggerEvent::PullRequest));
        assert_eq!("PUSH".parse::<TriggerEvent>(), Ok(TriggerEvent::Push));
        assert!("deploy".parse::<TriggerEvent>().is_err());
    }

    #[test]
    fn test_trigger_deserializes_from_toml() {
        let trigger: Trigger =
            toml::from_str("branches = [\"master\"]\nevents = [\"push\", \"pull_request\"]")
                .unwrap();
        assert_eq!(trigger.branches, vec!["master".to_string()]);
        assert_eq!(
            trigger.events,
            vec![TriggerEvent::Push, TriggerEvent::PullRequest]
        );
    }
}
