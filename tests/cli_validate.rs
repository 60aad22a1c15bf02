//! Integration tests for `stagecraft validate`

mod common;

use common::*;

fn project() -> TestEnv {
    TestEnv::new()
        .with_file("fastly.tf.json", FASTLY_TEMPLATE)
        .with_file("env/staging.tfvars", STAGING_TFVARS)
}

#[test]
fn validate_complete_value_set_succeeds() {
    let env = project();
    let result = env.run(&[
        "validate",
        "--template",
        "fastly.tf.json",
        "--values",
        "env/staging.tfvars",
    ]);

    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.starts_with("fastly.tf.json@staging is valid (sha256:"));
}

#[test]
fn validate_lists_every_missing_key() {
    let env = project().with_file("env/empty.tfvars", "# nothing yet\n");
    let result = env.run(&[
        "validate",
        "-t",
        "fastly.tf.json",
        "--values",
        "env/empty.tfvars",
    ]);

    assert!(!result.success);
    assert_eq!(result.exit_code, 1);
    assert!(
        result
            .stderr
            .contains("unresolved placeholders in fastly.tf.json@empty: fastly_domain, fastly_name"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn validate_warns_about_unused_keys() {
    let env = project().with_file(
        "env/extra.tfvars",
        "fastly_name = \"svc-x\"\nfastly_domain = \"x.example.com\"\nregion = \"eu\"\n",
    );
    let result = env.run(&[
        "validate",
        "-t",
        "fastly.tf.json",
        "--values",
        "env/extra.tfvars",
    ]);

    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stderr.contains("key 'region' in value set 'extra' is not used"));
}

#[test]
fn validate_misspelled_extension_exits_with_usage_code() {
    let env = project().with_file("env/staging.tfvar", STAGING_TFVARS);
    let result = env.run(&[
        "validate",
        "-t",
        "fastly.tf.json",
        "--values",
        "env/staging.tfvar",
    ]);

    assert_eq!(result.exit_code, 2);
    assert!(result.stderr.contains("did you mean '.tfvars'?"));
}

#[test]
fn validate_missing_template_reports_path() {
    let env = project();
    let result = env.run(&[
        "validate",
        "-t",
        "missing.tf.json",
        "--values",
        "env/staging.tfvars",
    ]);

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("file not found"));
    assert!(result.stderr.contains("missing.tf.json"));
}

#[test]
fn validate_json_reports_unused_keys() {
    let env = project();
    let result = env.run(&[
        "--json",
        "validate",
        "-t",
        "fastly.tf.json",
        "--values",
        "env/staging.tfvars",
    ]);

    assert!(result.success, "stderr: {}", result.stderr);
    let event: serde_json::Value =
        serde_json::from_str(result.stdout.trim()).expect("stdout should be one JSON event");
    assert_eq!(event["event"], "complete");
    assert_eq!(event["command"], "validate");
    assert_eq!(event["document"], "fastly.tf.json@staging");
    assert_eq!(event["unused_keys"], serde_json::json!([]));
}

#[cfg(unix)]
#[test]
fn validate_with_config_runs_external_dry_run() {
    let env = project()
        .with_file("stagecraft.toml", PIPELINE_CONFIG)
        .with_file("env/bad.tfvars", "fastly_name = \"oops\"\nfastly_domain = \"b.example.com\"\n");

    let ok = env.run(&[
        "validate",
        "-t",
        "fastly.tf.json",
        "--values",
        "env/staging.tfvars",
        "--config",
        "stagecraft.toml",
    ]);
    assert!(ok.success, "stderr: {}", ok.stderr);

    let rejected = env.run(&[
        "validate",
        "-t",
        "fastly.tf.json",
        "--values",
        "env/bad.tfvars",
        "--config",
        "stagecraft.toml",
    ]);
    assert_eq!(rejected.exit_code, 1);
    assert!(rejected.stderr.contains("validation failed for stage 'bad'"));
    assert!(!env.exists(".stagecraft/applied.txt"));
}
