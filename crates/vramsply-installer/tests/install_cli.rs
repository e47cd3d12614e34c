//! End-to-end tests driving the `vramsply-install` binary against a local
//! release server.
#![cfg(unix)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use mockito::{Matcher, Mock, Server, ServerGuard};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use wait_timeout::ChildExt;

const BINARY: &str = "#!/bin/sh\necho \"vramsply 0.1.0\"\n";
const LINUX_X86: &str = "vramsply-x86_64-unknown-linux-gnu";

/// Isolated home, install directory and workspace root plus a release server.
struct TestContext {
    temp_dir: TempDir,
    server: ServerGuard,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
            server: Server::new(),
        }
    }

    fn install_dir(&self) -> PathBuf {
        self.temp_dir.path().join("home").join(".local").join("bin")
    }

    fn installed(&self) -> PathBuf {
        self.install_dir().join("vramsply")
    }

    fn workspace_root(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    fn workspace_is_clean(&self) -> bool {
        std::fs::read_dir(self.workspace_root())
            .map(|entries| entries.count() == 0)
            .unwrap_or(true)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vramsply-install"));
        cmd.env("HOME", self.temp_dir.path().join("home"))
            .env("PATH", "/usr/bin:/bin")
            .env("SHELL", "/bin/bash")
            .env("VRAMSPLY_INSTALL_DIR", self.install_dir())
            .env("VRAMSPLY_WORKSPACE_ROOT", self.workspace_root())
            .env(
                "VRAMSPLY_RELEASE_BASE_URL",
                format!("{}/download", self.server.url()),
            )
            .env("VRAMSPLY_LATEST_URL", format!("{}/latest", self.server.url()))
            .env_remove("VRAMSPLY_VERSION")
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run vramsply-install")
    }

    fn serve_release(&mut self, version: &str, manifest: &str) -> [Mock; 2] {
        let binary = self
            .server
            .mock("GET", format!("/download/{version}/{LINUX_X86}").as_str())
            .with_status(200)
            .with_body(BINARY)
            .create();
        let sums = self
            .server
            .mock("GET", format!("/download/{version}/SHA256SUMS.txt").as_str())
            .with_status(200)
            .with_body(manifest)
            .create();
        [binary, sums]
    }

    fn no_requests(&mut self) -> Mock {
        self.server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create()
    }
}

fn digest(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn manifest_for(digest: &str) -> String {
    format!(
        "{}  vramsply-aarch64-apple-darwin\n{digest}  {LINUX_X86}\n",
        "0".repeat(64)
    )
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Usage:"));
    assert!(out.contains("--version-tag"));
    assert!(out.contains("VRAMSPLY_INSTALL_DIR"));
}

#[test]
fn test_pinned_install_succeeds() {
    let mut ctx = TestContext::new();
    let latest = ctx.server.mock("GET", "/latest").expect(0).create();
    let _release = ctx.serve_release("v0.1.0", &manifest_for(&digest(BINARY)));

    let output = ctx.run(&[
        "--version-tag",
        "v0.1.0",
        "--os",
        "Linux",
        "--arch",
        "x86_64",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let installed = ctx.installed();
    assert_eq!(std::fs::read_to_string(&installed).unwrap(), BINARY);
    let mode = std::fs::metadata(&installed).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert!(stdout(&output).contains("vramsply 0.1.0"));
    assert!(ctx.workspace_is_clean());
    latest.assert();
}

#[test]
fn test_tampered_binary_is_rejected() {
    let mut ctx = TestContext::new();
    let good = digest(BINARY);
    let first = if good.starts_with('0') { "1" } else { "0" };
    let tampered = format!("{first}{}", &good[1..]);
    let _release = ctx.serve_release("v0.1.0", &manifest_for(&tampered));

    let output = ctx.run(&[
        "--version-tag",
        "v0.1.0",
        "--os",
        "Linux",
        "--arch",
        "x86_64",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("checksum mismatch"), "stderr: {err}");
    assert!(err.contains(&tampered));
    assert!(!ctx.installed().exists());
    assert!(ctx.workspace_is_clean());
}

#[test]
fn test_unsupported_arch_makes_no_requests() {
    let mut ctx = TestContext::new();
    let any = ctx.no_requests();

    let output = ctx.run(&["--os", "Linux", "--arch", "riscv64"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("riscv64"));
    assert!(!ctx.installed().exists());
    any.assert();
}

#[test]
fn test_latest_release_is_installed() {
    let mut ctx = TestContext::new();
    let latest = ctx
        .server
        .mock("GET", "/latest")
        .with_status(200)
        .with_body(r#"{"tag_name": "v0.2.0"}"#)
        .create();
    let _release = ctx.serve_release("v0.2.0", &manifest_for(&digest(BINARY)));

    let output = ctx.run(&["--os", "Linux", "--arch", "amd64", "--skip-smoke-test"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("v0.2.0"));
    assert!(ctx.installed().exists());
    latest.assert();
}

#[test]
fn test_dry_run_downloads_nothing() {
    let mut ctx = TestContext::new();
    let any = ctx.no_requests();

    let output = ctx.run(&[
        "--dry-run",
        "--version-tag",
        "v0.1.0",
        "--os",
        "Linux",
        "--arch",
        "x86_64",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(&format!("/download/v0.1.0/{LINUX_X86}")));
    assert!(out.contains("/download/v0.1.0/SHA256SUMS.txt"));
    assert!(!ctx.installed().exists());
    any.assert();
}

#[test]
fn test_missing_path_entry_prints_remediation() {
    let mut ctx = TestContext::new();
    let _release = ctx.serve_release("v0.1.0", &manifest_for(&digest(BINARY)));

    let output = ctx.run(&[
        "--quiet",
        "--version-tag",
        "v0.1.0",
        "--os",
        "Linux",
        "--arch",
        "x86_64",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let expected = format!("export PATH=\"{}:$PATH\"", ctx.install_dir().display());
    assert!(stderr(&output).contains(&expected));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_missing_release_fails_with_url() {
    let mut ctx = TestContext::new();
    let _missing = ctx
        .server
        .mock("GET", format!("/download/v9.9.9/{LINUX_X86}").as_str())
        .with_status(404)
        .create();

    let output = ctx.run(&[
        "--version-tag",
        "v9.9.9",
        "--os",
        "Linux",
        "--arch",
        "x86_64",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains(&format!("/download/v9.9.9/{LINUX_X86}")));
    assert!(ctx.workspace_is_clean());
}

/// Serve one response that promises a large body, sends a few bytes, then
/// hangs. Returns the base URL.
fn stalled_release_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut socket, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            socket.read(&mut buf).ok();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000000\r\n\r\n#!/bin/")
                .ok();
            socket.flush().ok();
            std::thread::sleep(Duration::from_secs(60));
        }
    });
    format!("http://{addr}/download")
}

/// Start a pinned install against a stalled server, send `signal` once the
/// workspace exists, and return the exit code.
fn interrupt_stalled_install(ctx: &TestContext, signal: &str) -> Option<i32> {
    let mut child = ctx
        .cmd()
        .env("VRAMSPLY_RELEASE_BASE_URL", stalled_release_server())
        .args(["--version-tag", "v0.1.0", "--os", "Linux", "--arch", "x86_64"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn vramsply-install");

    let deadline = Instant::now() + Duration::from_secs(10);
    while ctx.workspace_is_clean() {
        assert!(Instant::now() < deadline, "workspace never appeared");
        std::thread::sleep(Duration::from_millis(20));
    }
    // Let the download reach the stalled body.
    std::thread::sleep(Duration::from_millis(300));

    let sent = Command::new("kill")
        .args([format!("-{signal}"), child.id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(sent.success());

    match child.wait_timeout(Duration::from_secs(10)).unwrap() {
        Some(status) => status.code(),
        None => {
            child.kill().ok();
            panic!("installer ignored SIG{signal}");
        }
    }
}

#[test]
fn test_hangup_removes_workspace() {
    let ctx = TestContext::new();
    assert_eq!(interrupt_stalled_install(&ctx, "HUP"), Some(129));
    assert!(ctx.workspace_is_clean());
    assert!(!ctx.installed().exists());
}

#[test]
fn test_quit_removes_workspace() {
    let ctx = TestContext::new();
    assert_eq!(interrupt_stalled_install(&ctx, "QUIT"), Some(131));
    assert!(ctx.workspace_is_clean());
}

#[test]
fn test_terminate_exits_with_signal_status() {
    let ctx = TestContext::new();
    assert_eq!(interrupt_stalled_install(&ctx, "TERM"), Some(143));
    assert!(ctx.workspace_is_clean());
}

#[test]
fn test_interrupt_exits_130() {
    let ctx = TestContext::new();
    assert_eq!(interrupt_stalled_install(&ctx, "INT"), Some(130));
    assert!(ctx.workspace_is_clean());
}
