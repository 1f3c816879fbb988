use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing. Raw mode also keeps the keys
    /// typed for navigation from echoing into the shell.
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        let buffer = vec![vec![Cell::default(); width as usize]; height as usize];

        Ok(Self {
            width,
            height,
            buffer,
            alternate_screen,
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Pick up a new terminal size, discarding the buffer contents.
    pub fn sync_size(&mut self) -> io::Result<()> {
        let (width, height) = size()?;
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
            self.clear_screen()?;
        }
        Ok(())
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.ch = ch;
            cell.fg = fg;
            cell.bold = bold;
        }
    }

    /// Paint the background of a cell, keeping its character
    pub fn set_bg(&mut self, x: i32, y: i32, bg: Color) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.bg = Some(bg);
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(&mut self.buffer[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Render the entire buffer to screen
    pub fn render(&self) -> io::Result<()> {
        let mut stdout = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(stdout, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Bold))?;
                }
                if let Some(bg) = cell.bg {
                    queue!(stdout, SetBackgroundColor(bg))?;
                }
                if let Some(color) = cell.fg {
                    queue!(stdout, SetForegroundColor(color))?;
                }
                queue!(stdout, Print(cell.ch))?;
                if cell.fg.is_some() || cell.bg.is_some() {
                    queue!(stdout, ResetColor)?;
                }
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        stdout.flush()?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
