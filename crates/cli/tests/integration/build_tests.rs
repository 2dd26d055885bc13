//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_host_target_finishes() {
  let env = TestEnv::new();
  env.write_task(serde_json::json!({ "targets": ["linux-x64"] }));

  env
    .exeforge_cmd()
    .arg("build")
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("task 1 finished"))
    .stdout(predicate::str::contains("node18-linux-x64"));

  assert_eq!(env.scratch_entries(), 0);
}

#[test]
fn build_json_output() {
  let env = TestEnv::new();
  env.write_task(serde_json::json!({ "targets": ["node16-linux-x64"] }));

  env
    .exeforge_cmd()
    .arg("--json")
    .arg("build")
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("\"state\": \"finished\""))
    .stdout(predicate::str::contains("\"handler\": \"rcedit\""));
}

#[test]
fn build_flag_selects_resource_hacker() {
  let env = TestEnv::new();
  env.write_task(serde_json::json!({ "targets": ["linux-x64"] }));
  env.write_config(serde_json::json!({ "rhBin": env.path().join("ResourceHacker.exe") }));

  env
    .exeforge_cmd()
    .args(["--json", "--use-rh", "build"])
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .failure();
}

#[test]
fn build_invalid_target_fails() {
  let env = TestEnv::new();
  env.write_task(serde_json::json!({ "targets": ["bogus-token"] }));

  env
    .exeforge_cmd()
    .arg("build")
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid target: bogus-token"));

  assert_eq!(env.scratch_entries(), 0);
}

#[test]
fn build_missing_output_fails_before_packaging() {
  let env = TestEnv::new();
  env.write_task(serde_json::json!({
    "targets": ["linux-x64"],
    "pkg": { "src": "app" }
  }));

  env
    .exeforge_cmd()
    .arg("build")
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("no output path specified"));
}

#[cfg(unix)]
#[test]
fn build_runs_packaging_tool() {
  let env = TestEnv::new();
  let log = env.path().join("pkg.log");
  let pkg = env.write_script("pkg", &format!("echo \"$@\" > {}", log.display()));
  env.write_config(serde_json::json!({ "pkgBin": pkg }));
  env.write_task(serde_json::json!({
    "targets": ["linux-x64"],
    "pkg": { "src": "app", "out": "dist/app" }
  }));

  env
    .exeforge_cmd()
    .arg("build")
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .success();

  let args = std::fs::read_to_string(log).unwrap();
  assert_eq!(args.trim(), "--build app --target linux-x64 --output dist/app");
}

#[test]
fn keep_tmp_leaves_scratch_root() {
  let env = TestEnv::new();
  env.write_task(serde_json::json!({ "targets": ["linux-x64"] }));

  env
    .exeforge_cmd()
    .args(["--keep-tmp", "build"])
    .arg(&env.task_path)
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .success();

  assert_eq!(env.scratch_entries(), 1);
}
