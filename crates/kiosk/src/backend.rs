//! Terminal control through crossterm.

use std::{
    io::{self, Stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand, cursor as ccursor, event as cevent,
    terminal::{self, ClearType},
};

use crate::{
    error::{Result, translate_result},
    geom::Expanse,
};

/// Put the terminal into kiosk mode: raw input, hidden cursor, no line wrap,
/// cleared screen.
fn enter(fp: &mut Stdout) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    fp.execute(ccursor::Hide)?;
    fp.execute(terminal::DisableLineWrap)?;
    fp.execute(terminal::Clear(ClearType::All))?;
    fp.execute(ccursor::MoveTo(0, 0))?;
    Ok(())
}

/// Undo [`enter`].
fn exit(fp: &mut Stdout) -> io::Result<()> {
    fp.execute(terminal::EnableLineWrap)?;
    fp.execute(terminal::Clear(ClearType::All))?;
    fp.execute(ccursor::MoveTo(0, 0))?;
    fp.execute(ccursor::Show)?;
    terminal::disable_raw_mode()?;
    Ok(())
}

/// Best-effort terminal restore for use from a panic hook, where no session
/// value is reachable.
pub fn restore_terminal() {
    drop(exit(&mut io::stdout()));
}

/// Leave kiosk mode ahead of a child process that inherits the terminal.
/// Does nothing unless raw mode is on.
pub fn release_terminal() {
    if terminal::is_raw_mode_enabled().unwrap_or(false) {
        restore_terminal();
    }
}

/// A scoped terminal session. Creating one puts the terminal into kiosk mode;
/// dropping it restores the terminal on every exit path.
///
/// A session can be suspended while a collaborator that draws on the
/// terminal itself is running, and resumed afterwards.
#[derive(Debug)]
pub struct TerminalSession {
    /// Output handle.
    fp: Stdout,
    /// Is kiosk mode in effect?
    active: bool,
}

impl TerminalSession {
    /// Enter kiosk mode.
    pub fn start() -> Result<Self> {
        let mut fp = io::stdout();
        translate_result(enter(&mut fp))?;
        Ok(Self { fp, active: true })
    }

    /// Is kiosk mode in effect?
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Hand the terminal back, as if the session had ended. A terminal
    /// already released by [`release_terminal`] is left alone.
    pub fn suspend(&mut self) -> Result<()> {
        if self.active {
            if translate_result(terminal::is_raw_mode_enabled())? {
                translate_result(exit(&mut self.fp))?;
            }
            self.active = false;
        }
        Ok(())
    }

    /// Re-enter kiosk mode after a suspend.
    pub fn resume(&mut self) -> Result<()> {
        if !self.active {
            translate_result(enter(&mut self.fp))?;
            self.active = true;
        }
        Ok(())
    }

    /// Current terminal size.
    pub fn size(&self) -> Result<Expanse> {
        let (w, h) = translate_result(terminal::size())?;
        Ok(Expanse::new(w.into(), h.into()))
    }

    /// The output stream frames are written to.
    pub fn writer(&mut self) -> &mut Stdout {
        &mut self.fp
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.active {
            drop(exit(&mut self.fp));
            self.active = false;
        }
    }
}

/// Keyboard and terminal events relevant to the kiosk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalInput {
    /// The quit key or Ctrl+C was pressed.
    Quit,
    /// The terminal changed size.
    Resized(Expanse),
}

/// Drain pending terminal events without blocking, returning the most
/// significant one. Quit wins over resize.
pub fn poll_input(quit_key: char) -> Result<Option<TerminalInput>> {
    let mut ret = None;
    while translate_result(cevent::poll(Duration::ZERO))? {
        match translate_result(cevent::read())? {
            cevent::Event::Key(k) if k.kind != cevent::KeyEventKind::Release => {
                let ctrl_c = k.code == cevent::KeyCode::Char('c')
                    && k.modifiers.contains(cevent::KeyModifiers::CONTROL);
                if ctrl_c || k.code == cevent::KeyCode::Char(quit_key) {
                    return Ok(Some(TerminalInput::Quit));
                }
            }
            cevent::Event::Resize(w, h) => {
                ret = Some(TerminalInput::Resized(Expanse::new(w.into(), h.into())));
            }
            _ => {}
        }
    }
    Ok(ret)
}
