//! The install command: run the pipeline and report the outcome.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use vramsply_core::config::SMOKE_TEST_TIMEOUT;
use vramsply_core::outcome::{self, PathStatus, SmokeTest};
use vramsply_core::{
    GithubReleaseChannel, InstallError, InstallFlow, InstalledBinary, ReleasePlan, Reporter,
};

use crate::Cli;
use crate::ui::Output;
use crate::ui::theme::format_size;

/// Install (or, with `--dry-run`, plan) the release selected by `cli`.
///
/// Pipeline failures are reported here and turned into an exit code; only
/// setup problems surface as `Err`.
///
/// # Errors
///
/// Fails if the configuration or the HTTP client cannot be built.
pub async fn install(cli: &Cli) -> Result<ExitCode> {
    let config = cli.install_config()?;
    let output = Arc::new(Output::new(cli.quiet));
    let channel =
        GithubReleaseChannel::new(&config).context("failed to initialize the HTTP client")?;
    let flow = InstallFlow::new(config, channel, Arc::clone(&output));

    if cli.dry_run {
        return Ok(match flow.plan().await {
            Ok(plan) => {
                print_plan(&output, &plan);
                ExitCode::SUCCESS
            }
            Err(e) => report_failure(&output, &e),
        });
    }

    let mut signals =
        ShutdownSignals::register().context("failed to install signal handlers")?;
    let mut caught = None;
    let result = flow
        .run_until(async {
            caught = Some(signals.recv().await);
        })
        .await;

    match result {
        Ok(installed) => {
            report_success(&output, cli, &installed).await;
            Ok(ExitCode::SUCCESS)
        }
        Err(InstallError::Interrupted) => {
            let signal = caught.unwrap_or(Shutdown::Interrupt);
            output.error(&format!(
                "Installation interrupted by {}; temporary files were removed",
                signal.name()
            ));
            Ok(ExitCode::from(signal.exit_code()))
        }
        Err(e) => Ok(report_failure(&output, &e)),
    }
}

fn print_plan(output: &Output, plan: &ReleasePlan) {
    output.section("Dry run");
    output.info(&format!("Artifact: {}", plan.artifact));
    output.info(&format!("Binary:   {}", plan.binary_url));
    output.info(&format!("Checksums: {}", plan.manifest_url));
    output.info(&format!("Install:  {}", plan.install_path.display()));
    output.success("Nothing was downloaded or installed");
}

fn report_failure(output: &Output, err: &InstallError) -> ExitCode {
    tracing::debug!(error = ?err, "install failed");
    match err {
        InstallError::Interrupted => {
            output.error("Installation interrupted; temporary files were removed");
            ExitCode::from(Shutdown::Interrupt.exit_code())
        }
        _ => {
            output.error(&err.to_string());
            if err.is_transient() {
                output.warning("This may be a temporary network problem; rerunning may help");
            }
            ExitCode::FAILURE
        }
    }
}

async fn report_success(output: &Output, cli: &Cli, installed: &InstalledBinary) {
    output.success(&format!(
        "Installed {} {} ({}) to {}",
        cli.binary_name,
        installed.version,
        format_size(installed.size),
        installed.path.display()
    ));

    let install_dir = installed
        .path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));
    let shell = std::env::var("SHELL").ok();
    let path_var = std::env::var_os("PATH");
    match outcome::check_path(
        install_dir,
        &cli.binary_name,
        path_var.as_deref(),
        shell.as_deref(),
    ) {
        PathStatus::OnPath => {}
        PathStatus::Shadowed { by } => output.warning(&format!(
            "{} is shadowed by {}, which comes earlier on PATH",
            installed.path.display(),
            by.display()
        )),
        PathStatus::Missing { remediation } => output.warning(&format!(
            "{} is not on your PATH. Add it with: {remediation}",
            install_dir.display()
        )),
    }

    if cli.skip_smoke_test {
        return;
    }
    let binary = installed.path.clone();
    let result = tokio::task::spawn_blocking(move || outcome::smoke_test(&binary, SMOKE_TEST_TIMEOUT))
        .await
        .unwrap_or_else(|e| SmokeTest::Failed {
            reason: e.to_string(),
        });
    match result {
        SmokeTest::Passed { output: version } => {
            output.success(&format!("`{} --version`: {version}", cli.binary_name));
        }
        SmokeTest::Failed { reason } => {
            output.warning(&format!("Smoke test failed: {reason}"));
        }
    }
}

/// A termination request that ends the run early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// SIGINT (Ctrl-C).
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGHUP (the controlling terminal went away).
    Hangup,
    /// SIGQUIT.
    Quit,
}

impl Shutdown {
    /// Conventional signal number.
    pub fn number(self) -> u8 {
        match self {
            Self::Hangup => 1,
            Self::Interrupt => 2,
            Self::Quit => 3,
            Self::Terminate => 15,
        }
    }

    /// Process exit status for a run ended by this signal (128 + number).
    pub fn exit_code(self) -> u8 {
        128 + self.number()
    }

    fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Hangup => "SIGHUP",
            Self::Quit => "SIGQUIT",
        }
    }
}

/// Listeners for every signal that should end the run with cleanup.
///
/// All handlers are installed by [`register`](Self::register), so a signal
/// that arrives before the first poll is still caught rather than taking the
/// default action.
#[cfg(unix)]
struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    async fn recv(&mut self) -> Shutdown {
        tokio::select! {
            _ = self.interrupt.recv() => Shutdown::Interrupt,
            _ = self.terminate.recv() => Shutdown::Terminate,
            _ = self.hangup.recv() => Shutdown::Hangup,
            _ = self.quit.recv() => Shutdown::Quit,
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> Shutdown {
        self.ctrl_c.recv().await;
        Shutdown::Interrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_shell_convention() {
        assert_eq!(Shutdown::Interrupt.exit_code(), 130);
        assert_eq!(Shutdown::Terminate.exit_code(), 143);
        assert_eq!(Shutdown::Hangup.exit_code(), 129);
        assert_eq!(Shutdown::Quit.exit_code(), 131);
    }
}
