//! Terminal rendering of flow notices and navigation.

use std::io::{self, Stderr, Stdout, Write};

use anyhow::{Context, Result};
use focus_core::auth::{Notice, Presenter, Route};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::{debug, warn};

/// Failures go to `err`; success notices and navigation go to `out`.
pub struct TerminalPresenter<R, O, E> {
    input: R,
    out: O,
    err: E,
}

impl TerminalPresenter<BufReader<Stdin>, Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout(), io::stderr())
    }
}

impl<R, O, E> TerminalPresenter<R, O, E> {
    pub fn new(input: R, out: O, err: E) -> Self {
        Self { input, out, err }
    }
}

impl<R, O, E> Presenter for TerminalPresenter<R, O, E>
where
    R: AsyncBufRead + Unpin,
    O: Write,
    E: Write,
{
    fn show_busy(&mut self, label: &str) {
        if let Err(err) = writeln!(self.err, "{label}") {
            debug!(error = %err, "failed to write busy label");
        }
    }

    fn show_notice(&mut self, notice: &Notice) {
        if let Err(err) = writeln!(self.err, "{}: {}", notice.title, notice.message) {
            warn!(error = %err, title = %notice.title, "failed to write notice");
        }
    }

    async fn acknowledge(&mut self, notice: &Notice) -> Result<()> {
        writeln!(self.out, "{}: {}", notice.title, notice.message)?;
        write!(self.out, "Press Enter to continue...")?;
        self.out.flush()?;

        // EOF counts as dismissal.
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .context("Failed to read acknowledgement")?;
        if read == 0 {
            debug!("stdin closed, treating as dismissal");
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn navigate(&mut self, route: Route) {
        if let Err(err) = writeln!(self.out, "Navigating to {route}") {
            debug!(error = %err, %route, "failed to write navigation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presenter(input: &[u8]) -> TerminalPresenter<&[u8], Vec<u8>, Vec<u8>> {
        TerminalPresenter::new(input, Vec::new(), Vec::new())
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_failures_go_to_stderr() {
        let mut p = presenter(b"");
        p.show_busy("Signing In...");
        p.show_notice(&Notice::new("Sign In Failed", "Invalid credentials"));

        assert_eq!(
            text(&p.err),
            "Signing In...\nSign In Failed: Invalid credentials\n"
        );
        assert!(p.out.is_empty());
    }

    /// Sink that rejects every write.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_closed_streams_do_not_panic() {
        let mut p = TerminalPresenter::new(&b""[..], Closed, Closed);
        p.show_busy("Signing In...");
        p.show_notice(&Notice::new("Sign In Failed", "Invalid credentials"));
        p.navigate(Route::FocusScreen);
    }

    #[tokio::test]
    async fn test_acknowledge_reports_closed_stdout() {
        let mut p = TerminalPresenter::new(&b"\n"[..], Closed, Vec::new());
        assert!(p.acknowledge(&Notice::new("Success", "done")).await.is_err());
    }

    #[test]
    fn test_navigation_goes_to_stdout() {
        let mut p = presenter(b"");
        p.navigate(Route::FocusScreen);
        assert_eq!(text(&p.out), "Navigating to /focusScreen\n");
    }

    #[tokio::test]
    async fn test_acknowledge_waits_for_enter() {
        let mut p = presenter(b"\nleftover");
        p.acknowledge(&Notice::new("Success", "Account created successfully!"))
            .await
            .unwrap();

        let out = text(&p.out);
        assert!(out.starts_with("Success: Account created successfully!\n"));
        assert!(out.contains("Press Enter to continue..."));
        assert!(p.err.is_empty());
    }

    #[tokio::test]
    async fn test_acknowledge_accepts_closed_input() {
        let mut p = presenter(b"");
        assert!(
            p.acknowledge(&Notice::new("Success", "done"))
                .await
                .is_ok()
        );
    }
}
