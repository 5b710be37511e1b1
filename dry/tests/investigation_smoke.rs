//! Investigation test for the smoke example deployment.
//!
//! Applies `demos/smoke` against the real sandbox subscription, checks the
//! outputs and destroys everything again. Excluded from regular runs because
//! it needs `terraform`, network access and an authenticated Azure session
//! (`dry select-sandbox` or the `ARM_*` variables).
//!
//! Run with:
//!
//! ```bash
//! cargo test -p dry --test investigation_smoke -- --ignored
//! ```

use std::path::PathBuf;

use dry::io::process::{SystemRunner, ToolCommand, ToolRunner};
use rand::{Rng, distributions::Alphanumeric};

/// Destroys whatever the test applied, even when an assertion fails.
struct DestroyOnDrop<'a> {
    runner: &'a SystemRunner,
    var: String,
}

impl Drop for DestroyOnDrop<'_> {
    fn drop(&mut self) {
        let destroy = terraform().args([
            "destroy",
            "-auto-approve",
            "-input=false",
            "-var",
            self.var.as_str(),
        ]);
        if let Err(err) = self.runner.stream(&destroy) {
            eprintln!("smoke teardown failed: {err:#}");
        }
    }
}

fn terraform() -> ToolCommand {
    ToolCommand::new("terraform")
}

fn unique_id() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(6)
        .collect()
}

#[test]
#[ignore = "needs terraform and an authenticated Azure sandbox"]
fn smoke_resource_group_is_named_after_unique_id() {
    let unique_id = unique_id();
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos/smoke");
    let runner = SystemRunner::new(dir);
    let var = format!("name={unique_id}");

    let _destroy = DestroyOnDrop {
        runner: &runner,
        var: var.clone(),
    };
    runner
        .stream(&terraform().args(["init", "-input=false"]))
        .expect("terraform init");
    runner
        .stream(&terraform().args([
            "apply",
            "-auto-approve",
            "-input=false",
            "-var",
            var.as_str(),
        ]))
        .expect("terraform apply");

    let output = runner
        .capture_checked(&terraform().args(["output", "-json"]))
        .expect("terraform output");
    let outputs: serde_json::Value = serde_json::from_str(&output.stdout).expect("outputs json");
    println!("Terraform outputs:\n{outputs:#}");

    let expected = format!("Verify-Docker-{unique_id}-RG");
    assert_eq!(outputs["name"]["value"].as_str(), Some(expected.as_str()));
}
