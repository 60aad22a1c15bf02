//! Test fixtures - the Terraform/Fastly tutorial setup.

/// Terraform JSON template for a Fastly service
pub const FASTLY_TEMPLATE: &str = r#"{
  "resource": {
    "fastly_service_v1": {
      "app": {
        "name": "${fastly_name}",
        "domain": [{ "name": "${var.fastly_domain}" }],
        "force_destroy": true
      }
    }
  }
}
"#;

/// HCL template; native interpolations must survive rendering
pub const FASTLY_HCL_TEMPLATE: &str = r#"resource "fastly_service_v1" "app" {
  name = "${var.fastly_name}"
  domain {
    name = "${var.fastly_domain}"
  }
}

output "id" {
  value = "${fastly_service_v1.app.id}"
}
"#;

pub const STAGING_TFVARS: &str = r#"# staging
fastly_name = "svc-a"
fastly_domain = "a.example.com"
"#;

pub const PRODUCTION_TFVARS: &str = r#"# production
fastly_name = "svc-p"
fastly_domain = "p.example.com"
"#;

/// Pipeline whose validate step greps the rendered file for a `svc-` name
/// and whose apply step records the stage in `.stagecraft/applied.txt`.
pub const PIPELINE_CONFIG: &str = r#"template = "fastly.tf.json"

[tool]
validate = ["/bin/sh", "-c", "grep -q svc- ${file}"]
apply = ["/bin/sh", "-c", "echo ${stage} >> ../applied.txt"]

[[stage]]
name = "staging"
values = "env/staging.tfvars"
trigger = { branches = ["master"], events = ["push"] }

[[stage]]
name = "production"
values = "env/production.tfvars"
gate = "previous-applied"
trigger = { branches = ["master"], events = ["push"] }
"#;
