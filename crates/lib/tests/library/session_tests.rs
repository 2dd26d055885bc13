//! Session and task flows through the public API.

use exeforge_lib::handler::Metadata;
use exeforge_lib::{Flags, FlagOverrides, Session, SessionError, TaskError, TaskOptions, TaskState};

use super::common::TestEnv;

fn win_task(name: &str) -> TaskOptions {
  TaskOptions {
    targets: vec!["node14-win-x64".to_string()],
    metadata: Some(Metadata {
      name: Some(name.to_string()),
      version: Some("1.0.0".to_string()),
      ..Default::default()
    }),
    ..Default::default()
  }
}

#[tokio::test]
async fn win_target_is_fetched_copied_and_patched() {
  let env = TestEnv::new();
  let mut options = env.session_options();
  options.flags = Flags {
    keep_tmp: true,
    ..Default::default()
  };
  let session = Session::init(options).await.unwrap();

  let task = session.exec(win_task("app")).await.unwrap();

  assert_eq!(task.state(), TaskState::Finished);
  let target = &task.targets()[0];
  assert_eq!(target.version.as_deref(), Some("v14.20.0"));
  let patched = target.tmp_path.as_ref().unwrap();
  assert_eq!(patched.file_name().unwrap(), "built-v14.20.0-win-x64");
  assert_eq!(std::fs::read(patched).unwrap(), b"MZ runtimeapp.exe");

  // the cached original stays untouched
  let cached = target.full_path.as_ref().unwrap();
  assert!(cached.starts_with(&session.paths().pkg_cache));
  assert_eq!(std::fs::read(cached).unwrap(), b"MZ runtime");
}

#[tokio::test]
async fn concurrent_tasks_produce_independent_outputs() {
  let env = TestEnv::new();
  let mut options = env.session_options();
  options.flags.keep_tmp = true;
  let session = Session::init(options).await.unwrap();

  let (a, b) = tokio::join!(session.exec(win_task("alpha")), session.exec(win_task("beta")));
  let (a, b) = (a.unwrap(), b.unwrap());

  let a_exe = a.targets()[0].tmp_path.clone().unwrap();
  let b_exe = b.targets()[0].tmp_path.clone().unwrap();
  assert_ne!(a_exe, b_exe);
  assert_eq!(std::fs::read(a_exe).unwrap(), b"MZ runtimealpha.exe");
  assert_eq!(std::fs::read(b_exe).unwrap(), b"MZ runtimebeta.exe");
  assert_eq!(env.fetcher.fetched.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn task_flags_override_session_defaults() {
  let env = TestEnv::new();
  let session = Session::init(env.session_options()).await.unwrap();

  let mut options = win_task("app");
  options.flags = FlagOverrides {
    keep_tmp: Some(true),
    ..Default::default()
  };
  let task = session.exec(options).await.unwrap();

  assert!(task.flags().keep_tmp);
  assert!(!session.flags().keep_tmp);
  assert!(task.paths().unwrap().tmp.exists());
}

#[tokio::test]
async fn failed_task_cleans_up_and_session_still_usable() {
  let env = TestEnv::new();
  let session = Session::init(env.session_options()).await.unwrap();

  let mut bad = win_task("app");
  bad.metadata.as_mut().unwrap().icon = Some(env.path().join("missing.ico").display().to_string());
  let result = session.exec(bad).await;

  assert!(matches!(
    result,
    Err(SessionError::Task(TaskError::Handler(exeforge_lib::HandlerError::MissingIcon(_))))
  ));
  // only the guard is left in the scratch root
  assert_eq!(std::fs::read_dir(&session.paths().tmp).unwrap().count(), 1);

  let task = session.exec(win_task("app")).await.unwrap();
  assert_eq!(task.state(), TaskState::Finished);
  session.cleanup().await.unwrap();
  assert!(!session.paths().tmp.exists());
}

#[tokio::test]
async fn exec_helper_returns_session_and_task() {
  let env = TestEnv::new();

  let (session, task) = exeforge_lib::exec(env.session_options(), win_task("app")).await.unwrap();

  assert_eq!(task.name(), "task 1");
  session.cleanup().await.unwrap();
}

#[cfg(unix)]
mod resource_hacker {
  use super::*;
  use exeforge_lib::handler::{HandlerArgs, RhArgs};

  /// Fake ResourceHacker: logs argv, writes the `-save` file on compile and
  /// appends `+res` to the file on addoverwrite.
  fn fake_rh(env: &TestEnv) -> (std::path::PathBuf, std::path::PathBuf) {
    let log = env.path().join("rh.log");
    let script = env.write_script(
      "ResourceHacker.exe",
      &format!(
        r#"echo "$@" >> {log}
open=""; save=""; action=""
while [ $# -gt 0 ]; do
  case "$1" in
    -open) open="$2" ;;
    -save) save="$2" ;;
    -action) action="$2" ;;
  esac
  shift
done
case "$action" in
  compile) printf RES > "$save" ;;
  addoverwrite) printf +res >> "$save" ;;
esac"#,
        log = log.display()
      ),
    );
    (script, log)
  }

  #[tokio::test]
  async fn resource_hacker_compiles_and_applies() {
    let env = TestEnv::new();
    let (rh, log) = fake_rh(&env);
    let icon = env.path().join("app.ico");
    std::fs::write(&icon, b"ICO").unwrap();

    let mut options = env.session_options();
    options.rh_bin = Some(rh);
    options.flags.use_rh = true;
    options.flags.keep_tmp = true;
    let session = Session::init(options).await.unwrap();

    let mut task_options = win_task("app");
    task_options.metadata.as_mut().unwrap().icon = Some(icon.display().to_string());
    let task = session.exec(task_options).await.unwrap();

    assert_eq!(task.handler_kind(), "rh");
    let patched = task.targets()[0].tmp_path.clone().unwrap();
    assert_eq!(std::fs::read(&patched).unwrap(), b"MZ runtime+res+res");

    let calls = std::fs::read_to_string(log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].contains("-action compile"));
    assert!(calls[1].contains("-action addoverwrite") && !calls[1].contains("-mask"));
    assert!(calls[2].ends_with("-mask ICONGROUP,1,"));
  }

  #[tokio::test]
  async fn explicit_rc_file_is_compiled() {
    let env = TestEnv::new();
    let (rh, log) = fake_rh(&env);
    let rc = env.path().join("custom.rc");
    std::fs::write(&rc, "1 VERSIONINFO").unwrap();

    let mut options = env.session_options();
    options.rh_bin = Some(rh);
    options.flags.use_rh = true;
    let session = Session::init(options).await.unwrap();

    let task = session
      .exec(TaskOptions {
        targets: vec!["node14-win-x64".to_string()],
        args: Some(HandlerArgs::Rh(RhArgs {
          rc_file: Some(rc.display().to_string()),
          ..Default::default()
        })),
        ..Default::default()
      })
      .await
      .unwrap();

    assert_eq!(task.state(), TaskState::Finished);
    assert!(env.path().join("custom.res").exists());
    let calls = std::fs::read_to_string(log).unwrap();
    assert!(calls.starts_with(&format!("-open {} -action compile", rc.display())));
  }
}
