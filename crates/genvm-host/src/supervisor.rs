//! Subprocess supervisor (§4.5, §5).
//!
//! Binds the listening socket, spawns the engine with wiring arguments,
//! races the dispatch loop against the child's lifetime, and stages
//! termination through natural exit → SIGTERM → SIGKILL with bounded wait
//! budgets. The temp directory and every socket are released on every exit
//! path, including setup failures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::UnixListener;
use tokio::process::{Child, Command};

use crate::domain::session::{CombinedError, ExecutionOutcome, ExecutionResult, Session};
use crate::errors::{HostError, SpawnError};
use crate::ports::outbound::StateProxy;

/// Grace window given to the child at each shutdown stage (§4.5, §5).
pub const DEFAULT_EXIT_TIMEOUT: Duration = Duration::from_millis(50);

/// Everything needed to launch the engine for one invocation.
pub struct EngineLaunch {
    pub engine_path: PathBuf,
    pub config: Option<String>,
    pub tail_args: Vec<String>,
}

/// Runs one full supervised invocation: temp dir, listener, spawn, race,
/// staged shutdown, and result assembly (§4.5 steps 1–11).
pub async fn run_supervised(
    mut session: Session,
    state: &dyn StateProxy,
    launch: EngineLaunch,
    exit_timeout: Duration,
) -> ExecutionResult {
    let tmpdir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => {
            return fail_without_spawning(session, SpawnError::Spawn(e));
        }
    };

    let sock_path = tmpdir.path().join("sock");
    let listener = match UnixListener::bind(&sock_path) {
        Ok(l) => l,
        Err(e) => {
            return fail_without_spawning(
                session,
                SpawnError::Bind {
                    path: sock_path.display().to_string(),
                    source: e,
                },
            );
        }
    };

    if let Some(config) = &launch.config {
        let conf_path = tmpdir.path().join("conf.json");
        if let Err(e) = tokio::fs::write(&conf_path, config).await {
            return fail_without_spawning(session, SpawnError::ConfigWrite(e));
        }
    }

    let argv = build_argv(&launch, &sock_path, &tmpdir.path().join("conf.json"));
    tracing::debug!(?argv, "spawning engine");

    let mut child = match Command::new(&launch.engine_path)
        .args(&argv[1..])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(c) => c,
        Err(e) => return fail_without_spawning(session, SpawnError::Spawn(e)),
    };

    let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr was piped");

    let result = race_and_collect(
        &mut session,
        state,
        listener,
        &mut child,
        &mut stdout_pipe,
        &mut stderr_pipe,
        exit_timeout,
    )
    .await;

    // Step 11: delete T unconditionally.
    drop(tmpdir);

    let (outcome_errors, stdout, stderr) = result;
    assemble(session, outcome_errors, stdout, stderr)
}

fn build_argv(launch: &EngineLaunch, sock_path: &Path, conf_path: &Path) -> Vec<String> {
    let mut argv = vec![
        launch.engine_path.display().to_string(),
        "--host".to_string(),
        format!("unix://{}", sock_path.display()),
        "--print=all".to_string(),
    ];
    if launch.config.is_some() {
        argv.push("--config".to_string());
        argv.push(conf_path.display().to_string());
    }
    argv.extend(launch.tail_args.iter().cloned());
    argv
}

/// Step 6–9: accept one client and run the dispatch loop concurrently with
/// draining the child's stdout/stderr; whichever finishes first decides the
/// shutdown path. Returns accumulated loop/child errors plus captured output.
async fn race_and_collect(
    session: &mut Session,
    state: &dyn StateProxy,
    listener: UnixListener,
    child: &mut Child,
    stdout_pipe: &mut (impl AsyncReadExt + Unpin),
    stderr_pipe: &mut (impl AsyncReadExt + Unpin),
    exit_timeout: Duration,
) -> (Vec<HostError>, String, String) {
    let mut errors = Vec::new();
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();

    let host_task = async {
        let (mut stream, _addr) = listener
            .accept()
            .await
            .map_err(crate::errors::ProtocolError::from)?;
        drop(listener); // step: close listener immediately after accept (invariant 5)
        crate::dispatch::run(session, state, &mut stream).await
    };

    let host_done;
    tokio::select! {
        host_result = host_task => {
            if let Err(e) = host_result {
                errors.push(e);
            }
            host_done = true;
        }
        _ = child.wait() => {
            tracing::warn!("genvm finished first");
            host_done = false;
            // The dispatch loop (the only writer of `final_result`) hasn't
            // returned yet, so it can't have seen CONSUME_RESULT.
            errors.push(HostError::ChildPrematureExit);
        }
    }

    // Drain pipes concurrently with staged shutdown: a child that keeps
    // stdout/stderr open past CONSUME_RESULT must still be escalated through
    // SIGTERM/SIGKILL within the bounded grace windows below, not block on
    // EOF first — the pipes only hit EOF once the child actually exits.
    let (_, _, exit_code_trusted) = tokio::join!(
        stdout_pipe.read_to_end(&mut stdout_buf),
        stderr_pipe.read_to_end(&mut stderr_buf),
        stage_shutdown(child, host_done, exit_timeout),
    );

    let status = child.wait().await;
    if exit_code_trusted {
        if let Ok(status) = status {
            if !status.success() {
                errors.push(HostError::ChildExit(status.code().unwrap_or(-1)));
            }
        }
    }

    (
        errors,
        String::from_utf8_lossy(&stdout_buf).into_owned(),
        String::from_utf8_lossy(&stderr_buf).into_owned(),
    )
}

/// Step 8: give the child `exit_timeout` to exit naturally; if not, send
/// SIGTERM and wait again; if still alive, SIGKILL. Only the natural-exit
/// path trusts the exit code.
async fn stage_shutdown(child: &mut Child, host_finished_first: bool, exit_timeout: Duration) -> bool {
    if !host_finished_first {
        // The child already exited (it's what ended the race) — its code is
        // from the natural-exit path.
        return true;
    }

    if tokio::time::timeout(exit_timeout, child.wait()).await.is_ok() {
        return true;
    }

    if let Some(pid) = child.id() {
        send_sigterm(pid);
    }

    if tokio::time::timeout(exit_timeout, child.wait()).await.is_ok() {
        return false;
    }

    let _ = child.start_kill();
    false
}

fn send_sigterm(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        tracing::debug!(pid, error = %e, "SIGTERM delivery failed (process likely already gone)");
    }
}

/// Step 2/3 failure path: no engine ever ran, so there is nothing to drain.
/// Per §4.6/§9, setup failure does not re-invoke the engine a second time —
/// it synthesizes an empty captured-output record directly.
fn fail_without_spawning(session: Session, cause: SpawnError) -> ExecutionResult {
    tracing::error!(error = %cause, "engine setup failed before any process was spawned");
    let outcome = ExecutionOutcome::Fail(CombinedError(vec![HostError::from(cause)]));
    session.into_result(outcome, String::new(), String::new())
}

/// §4.6 decision order: setup failure (handled separately) > final result >
/// composite of all accumulated loop/child errors.
fn assemble(
    mut session: Session,
    errors: Vec<HostError>,
    stdout: String,
    stderr: String,
) -> ExecutionResult {
    let final_result = session.final_result.take();
    let outcome = match final_result {
        Some(crate::domain::FinalResult::Return(bytes)) => ExecutionOutcome::Return(bytes),
        Some(crate::domain::FinalResult::Rollback(msg)) => ExecutionOutcome::Rollback(msg),
        None => ExecutionOutcome::Fail(CombinedError(errors)),
    };
    session.into_result(outcome, stdout, stderr)
}
