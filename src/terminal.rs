// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Raw-mode terminal with mouse capture. Draws `Frame` surfaces, repainting
/// either everything (backdrop step, resize) or only the dirty cells.
pub struct Terminal {
    stdout: Stdout,
    last_size: Option<(u16, u16)>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(event::EnableMouseCapture)?;
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last_size: None,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn queue_attrs(
        &mut self,
        cell: &Cell,
        cur_fg: &mut Option<Option<Color>>,
        cur_bold: &mut Option<bool>,
        cur_dim: &mut Option<bool>,
    ) -> Result<()> {
        if *cur_fg != Some(cell.fg) {
            match cell.fg {
                Some(fg) => self.stdout.queue(SetForegroundColor(fg))?,
                None => self.stdout.queue(SetForegroundColor(Color::Reset))?,
            };
            *cur_fg = Some(cell.fg);
        }
        // NormalIntensity clears bold and dim together, so intensity is
        // always reset and reapplied as a pair.
        if *cur_bold != Some(cell.bold) || *cur_dim != Some(cell.dim) {
            self.stdout.queue(SetAttribute(Attribute::NormalIntensity))?;
            if cell.bold {
                self.stdout.queue(SetAttribute(Attribute::Bold))?;
            }
            if cell.dim {
                self.stdout.queue(SetAttribute(Attribute::Dim))?;
            }
            *cur_bold = Some(cell.bold);
            *cur_dim = Some(cell.dim);
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size_changed = self.last_size != Some((frame.width, frame.height));
        if size_changed {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last_size = Some((frame.width, frame.height));
        }

        match frame.bg() {
            Some(bg) => self.stdout.queue(SetBackgroundColor(bg))?,
            None => self.stdout.queue(SetBackgroundColor(Color::Reset))?,
        };

        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_bold: Option<bool> = None;
        let mut cur_dim: Option<bool> = None;

        let total = frame.width as usize * frame.height as usize;
        let full = size_changed || frame.is_dirty_all() || frame.dirty_indices().len() >= total / 3;

        if full {
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    self.queue_attrs(&cell, &mut cur_fg, &mut cur_bold, &mut cur_dim)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            let mut dirty: Vec<usize> = frame.dirty_indices().to_vec();
            dirty.sort_unstable();

            let width = frame.width as usize;
            let mut cursor_next: Option<usize> = None;
            for idx in dirty {
                let x = (idx % width) as u16;
                let y = (idx / width) as u16;
                if cursor_next != Some(idx) || x == 0 {
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }
                let cell = frame.cell_at_index(idx);
                self.queue_attrs(&cell, &mut cur_fg, &mut cur_bold, &mut cur_dim)?;
                self.stdout.queue(Print(cell.ch))?;
                cursor_next = Some(idx + 1);
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
