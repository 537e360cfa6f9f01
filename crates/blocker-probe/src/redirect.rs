use std::io::Write;

use blocker_core::capabilities::Redirector;
use blocker_core::error::Result;
use tracing::info;

/// Fallback redirector for hosts that cannot raise windows.
///
/// Rings the terminal bell; the status view shows the redirect banner.
pub struct TerminalRedirector<W: Write + Send = std::io::Stdout> {
    out: W,
    redirects: u64,
}

impl TerminalRedirector {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl Default for TerminalRedirector {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> TerminalRedirector<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out, redirects: 0 }
    }

    pub fn redirects(&self) -> u64 {
        self.redirects
    }
}

impl<W: Write + Send> Redirector for TerminalRedirector<W> {
    fn redirect(&mut self) -> Result<()> {
        self.redirects += 1;
        info!(count = self.redirects, "redirecting in terminal");
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_redirect_rings_bell() {
        let mut redirector = TerminalRedirector::with_writer(Vec::new());
        redirector.redirect().unwrap();
        redirector.redirect().unwrap();
        assert_eq!(redirector.redirects(), 2);
        assert_eq!(redirector.out, b"\x07\x07");
    }
}
