//! Terminal ownership: raw mode acquisition and end-of-session restore.
//!
//! The editor paints over the main screen rather than the alternate buffer,
//! so leaving a session means clearing the screen, homing the cursor and
//! handing the cooked mode back. `TerminalGuard` does that on drop so every
//! exit path (clean quit, error return, panic unwind) restores the terminal.

use std::io::stdout;

use anyhow::Result;
use crossterm::cursor::{MoveTo, Show};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, disable_raw_mode, enable_raw_mode};
use tracing::debug;

/// RAII guard over the terminal's raw mode. Acquire once per session.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn acquire() -> Result<Self> {
        enable_raw_mode()?;
        debug!(target: "runtime", "raw_mode_enabled");
        Ok(Self { active: true })
    }

    /// Clear the screen and restore the original terminal attributes.
    /// Idempotent; also invoked from drop.
    pub fn release(&mut self) -> Result<()> {
        if self.active {
            execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0), Show)?;
            disable_raw_mode()?;
            self.active = false;
            debug!(target: "runtime", "raw_mode_disabled");
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Current terminal size as (columns, rows).
pub fn size() -> Result<(u16, u16)> {
    Ok(terminal::size()?)
}
