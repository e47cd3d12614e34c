//! Terminal narration for an installer run.
//!
//! Progress and informational lines go to stdout and are silenced by
//! `--quiet`; warnings and errors go to stderr and are always shown. Colors
//! and the in-place progress line are only used when the stream is a terminal.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use vramsply_core::Reporter;

use super::theme::{Theme, format_size};

/// Reporter that writes to the terminal.
#[derive(Debug)]
pub struct Output {
    theme: Theme,
    quiet: bool,
    stdout_tty: bool,
    stderr_tty: bool,
    progress_active: AtomicBool,
}

impl Output {
    /// Create an output handle; `quiet` keeps only warnings and errors.
    pub fn new(quiet: bool) -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self {
            theme: Theme::default(),
            quiet,
            stdout_tty: std::io::stdout().is_terminal() && !no_color,
            stderr_tty: std::io::stderr().is_terminal() && !no_color,
            progress_active: AtomicBool::new(false),
        }
    }

    fn paint(text: &str, color: Color, enabled: bool) -> String {
        if enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn end_progress(&self) {
        if self.progress_active.swap(false, Ordering::SeqCst) {
            let mut out = std::io::stdout().lock();
            let _ = out.queue(MoveToColumn(0));
            let _ = out.queue(Clear(ClearType::CurrentLine));
            let _ = out.flush();
        }
    }

    fn stdout_line(&self, icon: &str, color: Color, msg: &str) {
        if self.quiet {
            return;
        }
        self.end_progress();
        let icon = Self::paint(icon, color, self.stdout_tty);
        println!("{icon} {msg}");
    }

    fn stderr_line(&self, icon: &str, color: Color, msg: &str) {
        self.end_progress();
        let icon = Self::paint(icon, color, self.stderr_tty);
        let msg = Self::paint(msg, color, self.stderr_tty);
        eprintln!("{icon} {msg}");
    }
}

fn progress_detail(current: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => format!(
            "{} / {} ({}%)",
            format_size(current),
            format_size(total),
            current.saturating_mul(100) / total
        ),
        _ => format_size(current),
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        self.end_progress();
        println!();
        println!("{}", Self::paint(title, self.theme.colors.header, self.stdout_tty));
    }

    fn downloading(&self, file: &str, current: u64, total: Option<u64>) {
        if self.quiet || !self.stdout_tty {
            return;
        }
        let mut out = std::io::stdout().lock();
        let _ = out.queue(MoveToColumn(0));
        let _ = out.queue(Clear(ClearType::CurrentLine));
        let _ = write!(
            out,
            "{} {} {}",
            self.theme.icons.active.with(self.theme.colors.active),
            file,
            progress_detail(current, total).with(self.theme.colors.secondary)
        );
        let _ = out.flush();
        self.progress_active.store(true, Ordering::SeqCst);
    }

    fn downloaded(&self, file: &str, bytes: u64) {
        let detail = Self::paint(
            &format!("({})", format_size(bytes)),
            self.theme.colors.secondary,
            self.stdout_tty,
        );
        self.stdout_line(
            self.theme.icons.success,
            self.theme.colors.success,
            &format!("Downloaded {file} {detail}"),
        );
    }

    fn info(&self, msg: &str) {
        self.stdout_line(self.theme.icons.info, self.theme.colors.secondary, msg);
    }

    fn success(&self, msg: &str) {
        self.stdout_line(self.theme.icons.success, self.theme.colors.success, msg);
    }

    fn warning(&self, msg: &str) {
        self.stderr_line(self.theme.icons.warning, self.theme.colors.warning, msg);
    }

    fn error(&self, msg: &str) {
        self.stderr_line(self.theme.icons.error, self.theme.colors.error, msg);
    }
}
