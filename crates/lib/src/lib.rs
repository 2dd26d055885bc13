//! exeforge-lib: build per-target executables with patched PE resources.
//!
//! This crate provides the orchestration engine behind `exeforge`:
//! - `Session`: shared roots, configuration and the task factory
//! - `Task`: one finite build (fetch, edit, package, cleanup)
//! - `Handler`: resource editing through ResourceHacker or rcedit
//! - `target`: parsing of `node14-win-x64` style target specs
//! - `session::compare`: verification of a built binary against a fixture

pub mod consts;
pub mod fetch;
pub mod flags;
pub mod handler;
pub mod platform;
pub mod process;
pub mod session;
pub mod target;
pub mod task;
pub mod util;

pub use flags::{FlagOverrides, Flags};
pub use handler::{Handler, HandlerArgs, HandlerError, Metadata};
pub use session::{CompareReport, Session, SessionError, SessionOptions, SessionPaths, TaskIds, exec};
pub use target::{BaseTarget, Target, TargetError};
pub use task::{PkgArgs, Task, TaskError, TaskOptions, TaskState};
