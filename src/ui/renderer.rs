/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// World → terminal: one terminal cell covers `PX_PER_COL × PX_PER_ROW`
/// world pixels. World y grows upward, terminal rows grow downward, so the
/// bottom map row shows `view_bottom`.
///
/// Screen layout (top to bottom):
///   title bar · map view · message bar · help line

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::animation::Texture;
use crate::domain::entity::Facing;
use crate::domain::physics::Rect;
use crate::domain::tile::FlakeTier;
use crate::sim::world::{Phase, Rgb, WorldState};

/// World pixels per terminal column.
pub const PX_PER_COL: f32 = 16.0;
/// World pixels per terminal row (cells are about twice as tall as wide).
pub const PX_PER_ROW: f32 = 32.0;

const TITLE_ROW: usize = 0;
const MAP_ROW: usize = 1;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Draw a glyph but keep whatever background is already there.
    fn overlay(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        let bg = self.get(x, y).bg;
        self.set(x, y, Cell::new(ch, fg, bg));
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Viewport mapping ──

/// The part of the terminal that shows the world.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct MapView {
    view_left: i32,
    view_bottom: i32,
    cols: usize,
    rows: usize,
}

impl MapView {
    /// Terminal cells (relative to the map origin) covered by a world rect,
    /// clipped to the view. Rows count downward from the top of the view.
    fn cells_of(&self, r: &Rect) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        let c0 = ((r.left - self.view_left as f32) / PX_PER_COL).floor();
        let c1 = ((r.right - self.view_left as f32) / PX_PER_COL).ceil();
        let b0 = ((r.bottom - self.view_bottom as f32) / PX_PER_ROW).floor();
        let b1 = ((r.top - self.view_bottom as f32) / PX_PER_ROW).ceil();

        let cols = clip(c0, c1, self.cols)?;
        let up = clip(b0, b1, self.rows)?;
        // Flip: "up" index 0 is the bottom terminal row of the view.
        let rows = (self.rows - up.end)..(self.rows - up.start);
        Some((cols, rows))
    }
}

fn clip(lo: f32, hi: f32, len: usize) -> Option<std::ops::Range<usize>> {
    let lo = lo.max(0.0);
    let hi = hi.min(len as f32);
    if hi <= lo {
        return None;
    }
    Some(lo as usize..hi as usize)
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

// ── Glyphs ──

const WALL_FG: Color = Color::Rgb { r: 235, g: 245, b: 255 };
const WALL_BG: Color = Color::Rgb { r: 150, g: 170, b: 200 };
const BACKGROUND_FG: Color = Color::Rgb { r: 90, g: 120, b: 90 };
const DECOR_FG: Color = Color::Rgb { r: 40, g: 110, b: 60 };
const PODIUM_FG: Color = Color::Rgb { r: 255, g: 200, b: 40 };
const PLAYER_FG: Color = Color::Rgb { r: 200, g: 30, b: 40 };
const ENEMY_FG: Color = Color::Rgb { r: 60, g: 40, b: 40 };
const TEXT_FG: Color = Color::Rgb { r: 20, g: 20, b: 30 };

fn flake_glyph(tier: FlakeTier) -> (char, Color) {
    match tier {
        FlakeTier::One => ('*', Color::Rgb { r: 255, g: 255, b: 255 }),
        FlakeTier::Two => ('✻', Color::Rgb { r: 120, g: 200, b: 255 }),
        FlakeTier::Three => ('❄', Color::Rgb { r: 40, g: 90, b: 255 }),
    }
}

/// Skater glyph for the current texture. Walking alternates two poses.
fn player_glyph(texture: Texture) -> char {
    match texture {
        Texture::Idle(Facing::Right) => '▶',
        Texture::Idle(Facing::Left) => '◀',
        Texture::Walk { frame, facing: Facing::Right } => if frame % 2 == 0 { '▶' } else { '▷' },
        Texture::Walk { frame, facing: Facing::Left } => if frame % 2 == 0 { '◀' } else { '◁' },
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode + alternate screen. Returns whether key release
    /// events will be reported.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        let view = self.map_view(world);
        self.compose_title(world);
        self.compose_map(world, &view);
        self.compose_score(world, &view);
        self.compose_footer(world, &view);
        if world.phase == Phase::Paused {
            self.compose_pause_overlay(&view);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Camera window sized to the configured screen, capped by the terminal.
    fn map_view(&self, w: &WorldState) -> MapView {
        let want_cols = (w.screen.width / PX_PER_COL) as usize;
        let want_rows = (w.screen.height / PX_PER_ROW) as usize;
        let reserved = MAP_ROW + 2; // title + message + help
        MapView {
            view_left: w.camera.view_left,
            view_bottom: w.camera.view_bottom,
            cols: want_cols.min(self.term_w),
            rows: want_rows.min(self.term_h.saturating_sub(reserved)).max(1),
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_title(&mut self, w: &WorldState) {
        let bar = Color::Rgb { r: 20, g: 20, b: 60 };
        self.front.fill_row(TITLE_ROW, bar);
        let title = format!(" ⛸  {}  (level {})", w.level_name, w.level);
        self.front.put_str(0, TITLE_ROW, &title, Color::White, bar);
    }

    /// Layers in draw order: platforms, background, decor, flakes,
    /// podium, player, enemies.
    fn compose_map(&mut self, w: &WorldState, view: &MapView) {
        let sky = rgb(w.background_color);
        for row in 0..view.rows {
            for col in 0..view.cols {
                self.front.set(col, MAP_ROW + row, Cell::new(' ', Color::White, sky));
            }
        }

        for r in w.walls.rects() {
            self.fill_rect(view, &r, |_| Cell::new('▄', WALL_FG, WALL_BG));
        }
        for r in w.background.rects() {
            self.draw_rect(view, &r, '▒', BACKGROUND_FG);
        }
        for r in w.decor.rects() {
            self.draw_rect(view, &r, '♣', DECOR_FG);
        }
        for tier in FlakeTier::ALL {
            let (ch, fg) = flake_glyph(tier);
            for f in w.flakes_of(tier) {
                self.draw_centre(view, &f.body.rect(), ch, fg);
            }
        }
        for p in &w.podiums {
            self.draw_rect(view, &p.body.rect(), '▀', PODIUM_FG);
        }
        let player = w.player.body.rect();
        self.draw_rect(view, &player, player_glyph(w.player.anim.texture), PLAYER_FG);
        for e in &w.enemies {
            self.draw_rect(view, &e.body.rect(), '☗', ENEMY_FG);
        }
    }

    fn fill_rect(&mut self, view: &MapView, r: &Rect, cell: impl Fn(Cell) -> Cell) {
        let Some((cols, rows)) = view.cells_of(r) else { return };
        for row in rows {
            for col in cols.clone() {
                let prev = self.front.get(col, MAP_ROW + row);
                self.front.set(col, MAP_ROW + row, cell(prev));
            }
        }
    }

    fn draw_rect(&mut self, view: &MapView, r: &Rect, ch: char, fg: Color) {
        self.fill_rect(view, r, |prev| Cell::new(ch, fg, prev.bg));
    }

    /// Small sprites: one glyph at the centre cell.
    fn draw_centre(&mut self, view: &MapView, r: &Rect, ch: char, fg: Color) {
        let cx = (r.left + r.right) / 2.0;
        let cy = (r.bottom + r.top) / 2.0;
        let dot = Rect { left: cx - 1.0, right: cx + 1.0, bottom: cy - 1.0, top: cy + 1.0 };
        if let Some((cols, rows)) = view.cells_of(&dot) {
            self.front.overlay(cols.start, MAP_ROW + rows.start, ch, fg);
        }
    }

    /// `Score: N` in the bottom-left corner of the view.
    fn compose_score(&mut self, w: &WorldState, view: &MapView) {
        let row = MAP_ROW + view.rows - 1;
        let text = format!("Score: {}", w.score);
        for (i, ch) in text.chars().enumerate() {
            if i + 1 >= view.cols { break; }
            self.front.overlay(i + 1, row, ch, TEXT_FG);
        }
    }

    fn compose_footer(&mut self, w: &WorldState, view: &MapView) {
        let msg_row = MAP_ROW + view.rows;
        if !w.message.is_empty() {
            let bar = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bar);
            self.front.put_str(0, msg_row, &format!(" ❄ {} ", w.message), Color::Black, bar);
        }
        let help = " ←/A →/D: Skate  ↑/W/Space: Jump  P/F1: Pause  Esc: Quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, BASE_BG);
    }

    fn compose_pause_overlay(&mut self, view: &MapView) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let box_w = 28_usize.min(view.cols);
        let box_h = 5_usize.min(view.rows);
        let box_x = view.cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + view.rows.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, dim));
            }
        }
        self.front.put_str(box_x + 10, box_y + 1, "PAUSED", hdr, dim);
        self.front.put_str(box_x + 3, box_y + 3, "P / F1 / Start: resume", Color::Grey, dim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        MapView { view_left: 0, view_bottom: 0, cols: 62, rows: 20 }
    }

    #[test]
    fn tile_maps_to_bottom_rows() {
        // Ground tile at world (0..64, 0..64)
        let r = Rect { left: 0.0, right: 64.0, bottom: 0.0, top: 64.0 };
        let (cols, rows) = view().cells_of(&r).unwrap();
        assert_eq!(cols, 0..4);
        assert_eq!(rows, 18..20);
    }

    #[test]
    fn scrolled_view_shifts_cells() {
        let v = MapView { view_left: 160, view_bottom: -32, ..view() };
        let r = Rect { left: 160.0, right: 224.0, bottom: 0.0, top: 64.0 };
        let (cols, rows) = v.cells_of(&r).unwrap();
        assert_eq!(cols, 0..4);
        assert_eq!(rows, 17..19);
    }

    #[test]
    fn offscreen_rect_is_clipped_away() {
        let r = Rect { left: -200.0, right: -100.0, bottom: 0.0, top: 64.0 };
        assert!(view().cells_of(&r).is_none());
        let r = Rect { left: 0.0, right: 64.0, bottom: 700.0, top: 764.0 };
        assert!(view().cells_of(&r).is_none());
    }

    #[test]
    fn partially_visible_rect_is_clipped() {
        let r = Rect { left: -32.0, right: 32.0, bottom: 620.0, top: 684.0 };
        let (cols, rows) = view().cells_of(&r).unwrap();
        assert_eq!(cols, 0..2);
        assert_eq!(rows, 0..1);
    }

    #[test]
    fn walking_alternates_poses() {
        let a = player_glyph(Texture::Walk { frame: 0, facing: Facing::Left });
        let b = player_glyph(Texture::Walk { frame: 1, facing: Facing::Left });
        assert_ne!(a, b);
        assert_eq!(player_glyph(Texture::Idle(Facing::Right)), '▶');
    }
}
