//! Compare command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

/// Fake ResourceHacker: `extract` writes an icon and the script.
const FAKE_RH: &str = r#"save=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-save" ]; then save="$2"; fi
  shift
done
printf ICO > "$(dirname "$save")/ICON1_1.ico"
printf RC > "$save""#;

fn setup(icon: &str) -> TestEnv {
  let env = TestEnv::new();
  let rh = env.write_script("ResourceHacker.exe", FAKE_RH);
  env.write_config(serde_json::json!({ "rhBin": rh }));
  env.write_script("app.exe", "echo hello");

  let reference = env.path().join("reference");
  std::fs::create_dir_all(&reference).unwrap();
  std::fs::write(reference.join("stdout"), "hello\n").unwrap();
  std::fs::write(reference.join("stderr"), "").unwrap();
  std::fs::write(reference.join("icon.ico"), icon).unwrap();
  std::fs::write(reference.join("dialog.rc"), "RC").unwrap();
  env
}

#[test]
fn matching_exe_passes() {
  let env = setup("ICO");

  env
    .exeforge_cmd()
    .arg("compare")
    .arg(env.path().join("app.exe"))
    .arg(env.path().join("reference"))
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("All checks passed"));

  assert_eq!(env.scratch_entries(), 0);
}

#[test]
fn mismatching_icon_fails() {
  let env = setup("OTHER");

  env
    .exeforge_cmd()
    .args(["--json", "compare"])
    .arg(env.path().join("app.exe"))
    .arg(env.path().join("reference"))
    .arg("--no-run")
    .arg("--config")
    .arg(&env.config_path)
    .assert()
    .failure()
    .stdout(predicate::str::contains("\"icon\": false"))
    .stderr(predicate::str::contains("does not match"));
}
