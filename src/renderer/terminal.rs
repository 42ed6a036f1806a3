//! Terminal canvas via crossterm
//!
//! The arena is scaled onto the terminal's character grid. Drawing goes into
//! an in-memory `CellGrid`; `present` writes the whole grid in one flush.

use std::io::{self, Stdout, Write};
use std::ops::Range;

use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use glam::Vec2;

use super::{Canvas, Font, Rgb};
use crate::sim::Rect;

const BALL_GLYPH: char = '●';

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

/// Mapping from arena coordinates to terminal cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub cols: u16,
    pub rows: u16,
    scale_x: f32,
    scale_y: f32,
}

impl RenderContext {
    pub fn new(cols: u16, rows: u16, arena_width: f32, arena_height: f32) -> Self {
        Self {
            cols,
            rows,
            scale_x: f32::from(cols) / arena_width,
            scale_y: f32::from(rows) / arena_height,
        }
    }

    /// Cell containing `p`, if it is on screen
    pub fn cell_of(&self, p: Vec2) -> Option<(u16, u16)> {
        let col = (p.x * self.scale_x).floor();
        let row = (p.y * self.scale_y).floor();
        if col < 0.0 || row < 0.0 || col >= f32::from(self.cols) || row >= f32::from(self.rows) {
            return None;
        }
        Some((col as u16, row as u16))
    }

    /// Arena position of a cell's center
    pub fn cell_center(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (f32::from(col) + 0.5) / self.scale_x,
            (f32::from(row) + 0.5) / self.scale_y,
        )
    }

    pub fn cols_spanned(&self, left: f32, right: f32) -> Range<u16> {
        span(left * self.scale_x, right * self.scale_x, self.cols)
    }

    pub fn rows_spanned(&self, top: f32, bottom: f32) -> Range<u16> {
        span(top * self.scale_y, bottom * self.scale_y, self.rows)
    }
}

/// Cells covered by `[lo, hi)`; anything on screen covers at least one cell
fn span(lo: f32, hi: f32, max: u16) -> Range<u16> {
    let max_f = f32::from(max);
    if hi <= 0.0 || lo >= max_f {
        return 0..0;
    }
    let start = lo.floor().max(0.0) as u16;
    let end = (hi.ceil().min(max_f) as u16).max(start + 1).min(max);
    start..end
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
}

impl Cell {
    fn blank(bg: Rgb) -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg,
            bold: false,
        }
    }
}

/// Off-screen character buffer
#[derive(Debug, Clone)]
pub struct CellGrid {
    context: RenderContext,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(context: RenderContext) -> Self {
        let len = usize::from(context.cols) * usize::from(context.rows);
        Self {
            context,
            cells: vec![Cell::blank(Rgb::BLACK); len],
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        if col >= self.context.cols || row >= self.context.rows {
            return None;
        }
        self.cells.get(self.index(col, row))
    }

    fn index(&self, col: u16, row: u16) -> usize {
        usize::from(row) * usize::from(self.context.cols) + usize::from(col)
    }

    fn cell_mut(&mut self, col: u16, row: u16) -> Option<&mut Cell> {
        if col >= self.context.cols || row >= self.context.rows {
            return None;
        }
        let i = self.index(col, row);
        self.cells.get_mut(i)
    }

    pub fn clear(&mut self, color: Rgb) {
        self.cells.fill(Cell::blank(color));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let cols = self.context.cols_spanned(rect.left(), rect.right());
        let rows = self.context.rows_spanned(rect.top(), rect.bottom());
        for row in rows {
            for col in cols.clone() {
                if let Some(cell) = self.cell_mut(col, row) {
                    *cell = Cell::blank(color);
                }
            }
        }
    }

    /// Mark every cell whose center lies in the circle, or at least the
    /// cell holding its center
    pub fn plot_circle(&mut self, center: Vec2, radius: f32, color: Rgb) {
        let ctx = self.context;
        let mut plotted = false;
        for row in ctx.rows_spanned(center.y - radius, center.y + radius) {
            for col in ctx.cols_spanned(center.x - radius, center.x + radius) {
                if ctx.cell_center(col, row).distance(center) <= radius {
                    self.put_glyph(col, row, color);
                    plotted = true;
                }
            }
        }
        if plotted {
            return;
        }
        if let Some((col, row)) = ctx.cell_of(center) {
            self.put_glyph(col, row, color);
        }
    }

    fn put_glyph(&mut self, col: u16, row: u16, color: Rgb) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.ch = BALL_GLYPH;
            cell.fg = color;
        }
    }

    /// Write `text` centered on `pos`, keeping the background underneath
    pub fn put_text(&mut self, text: &str, pos: Vec2, bold: bool, color: Rgb) {
        let Some((center_col, row)) = self.context.cell_of(pos) else {
            return;
        };
        let len = text.chars().count() as i32;
        let start = i32::from(center_col) - len / 2;
        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i32;
            let Ok(col) = u16::try_from(col) else {
                continue;
            };
            if let Some(cell) = self.cell_mut(col, row) {
                cell.ch = ch;
                cell.fg = color;
                cell.bold = bold;
            }
        }
    }
}

/// Crossterm canvas on the alternate screen
pub struct TerminalCanvas {
    grid: CellGrid,
    arena: Vec2,
    stdout: Stdout,
}

impl TerminalCanvas {
    pub fn new(arena_width: f32, arena_height: f32) -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;

        let (cols, rows) = terminal::size()?;
        log::debug!("Terminal canvas {cols}x{rows}");
        Ok(Self {
            grid: CellGrid::new(RenderContext::new(cols, rows, arena_width, arena_height)),
            arena: Vec2::new(arena_width, arena_height),
            stdout,
        })
    }

    /// Rebuild the grid if the terminal was resized
    fn sync_size(&mut self) {
        let Ok((cols, rows)) = terminal::size() else {
            return;
        };
        let ctx = self.grid.context();
        if ctx.cols != cols || ctx.rows != rows {
            self.grid = CellGrid::new(RenderContext::new(cols, rows, self.arena.x, self.arena.y));
        }
    }

    fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.stdout,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )
    }
}

impl Canvas for TerminalCanvas {
    fn clear(&mut self, color: Rgb) {
        self.sync_size();
        self.grid.clear(color);
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgb) {
        self.grid.fill_rect(rect, color);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgb) {
        self.grid.plot_circle(center, radius, color);
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, font: Font, color: Rgb) {
        self.grid.put_text(text, pos, font == Font::Banner, color);
    }

    fn present(&mut self) -> io::Result<()> {
        let ctx = *self.grid.context();
        let mut out = self.stdout.lock();
        let mut style = None;

        for row in 0..ctx.rows {
            queue!(out, cursor::MoveTo(0, row))?;
            for col in 0..ctx.cols {
                let Some(cell) = self.grid.cell(col, row) else {
                    continue;
                };
                let cell_style = (cell.fg, cell.bg, cell.bold);
                if style != Some(cell_style) {
                    let weight = if cell.bold {
                        Attribute::Bold
                    } else {
                        Attribute::Reset
                    };
                    queue!(
                        out,
                        SetAttribute(weight),
                        SetForegroundColor(to_color(cell.fg)),
                        SetBackgroundColor(to_color(cell.bg))
                    )?;
                    style = Some(cell_style);
                }
                queue!(out, Print(cell.ch))?;
            }
        }

        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        out.flush()
    }
}

impl Drop for TerminalCanvas {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
