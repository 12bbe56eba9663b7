//! A minimal stand-in for the real `genvm` engine, used only by
//! `tests/supervisor.rs` to exercise the supervisor against a real child
//! process without depending on the actual engine binary.
//!
//! Understands `--host unix://<path>` (required) and `--mode <name>`
//! (defaults to `"return"`); every other argument is ignored, matching a
//! real engine accepting `--print=all`, `--config`, and `--message` without
//! this stub caring about their values.

use genvm_host::domain::{MethodCode, ResultCode};
use genvm_host::wire;
use tokio::net::UnixStream;

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let host = arg_value(&args, "--host").expect("--host is required");
    let sock_path = host.strip_prefix("unix://").expect("--host must be unix://");
    let mode = arg_value(&args, "--mode").unwrap_or_else(|| "return".to_string());

    if mode == "crash" {
        std::process::exit(7);
    }

    let mut stream = UnixStream::connect(sock_path)
        .await
        .expect("failed to connect to host socket");

    wire::send_all(&mut stream, &[MethodCode::AppendCalldata.to_byte()])
        .await
        .unwrap();
    let _calldata = wire::recv_bytes(&mut stream, "calldata").await.unwrap();

    let (code, payload): (ResultCode, &[u8]) = match mode.as_str() {
        "rollback" => (ResultCode::Rollback, b"stub rollback"),
        _ => (ResultCode::Return, b"stub return"),
    };
    wire::send_all(&mut stream, &[MethodCode::ConsumeResult.to_byte()])
        .await
        .unwrap();
    wire::send_all(&mut stream, &[code.to_byte()]).await.unwrap();
    wire::send_bytes(&mut stream, payload).await.unwrap();

    if mode == "hang" {
        // Ignore SIGTERM so the supervisor has to escalate to SIGKILL.
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        loop {
            term.recv().await;
        }
    }
}
