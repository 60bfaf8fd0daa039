use goalboard_scene::{Bounds, Direction, Drawable, SpriteAsset, Vec2, STAGE_SIZE};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Maps the square stage onto a terminal rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageView {
    pub area: Rect,
}

impl StageView {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    /// Cells covered by `bounds`, clipped to the view. Never narrower than one cell.
    pub fn cells(&self, bounds: Bounds) -> Rect {
        let sx = f32::from(self.area.width) / STAGE_SIZE;
        let sy = f32::from(self.area.height) / STAGE_SIZE;
        let (min, max) = (bounds.min(), bounds.max());

        let x0 = (min.x * sx).floor().clamp(0.0, f32::from(self.area.width)) as u16;
        let y0 = (min.y * sy).floor().clamp(0.0, f32::from(self.area.height)) as u16;
        let x1 = (max.x * sx).ceil().clamp(0.0, f32::from(self.area.width)) as u16;
        let y1 = (max.y * sy).ceil().clamp(0.0, f32::from(self.area.height)) as u16;

        let rect = Rect::new(
            self.area.x + x0,
            self.area.y + y0,
            x1.saturating_sub(x0).max(1),
            y1.saturating_sub(y0).max(1),
        );
        rect.intersection(self.area)
    }

    /// Stage point under a terminal cell, or `None` outside the view.
    pub fn to_stage(&self, column: u16, row: u16) -> Option<Vec2> {
        let inside = column >= self.area.x
            && column < self.area.right()
            && row >= self.area.y
            && row < self.area.bottom();
        if !inside || self.area.is_empty() {
            return None;
        }
        let x = (f32::from(column - self.area.x) + 0.5) * STAGE_SIZE / f32::from(self.area.width);
        let y = (f32::from(row - self.area.y) + 0.5) * STAGE_SIZE / f32::from(self.area.height);
        Some(Vec2::new(x, y))
    }

    pub fn draw(&self, drawables: &[Drawable], buf: &mut Buffer) {
        let mut panel_inner = self.area;
        for drawable in drawables {
            match drawable {
                Drawable::Image { asset, bounds } => self.draw_image(*asset, *bounds, buf),
                Drawable::Backdrop { bounds, .. } => {
                    buf.set_style(
                        self.cells(*bounds),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::DIM),
                    );
                }
                Drawable::Panel { bounds, .. } => {
                    let rect = self.cells(*bounds);
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .title(" whiteboard ")
                        .style(Style::default().fg(Color::Black).bg(Color::White));
                    panel_inner = block.inner(rect);
                    Clear.render(rect, buf);
                    block.render(rect, buf);
                }
                Drawable::Text {
                    origin,
                    wrap_width,
                    body,
                } => {
                    let bounds = Bounds::from_origin(*origin, Vec2::new(*wrap_width, STAGE_SIZE));
                    let rect = self.cells(bounds).intersection(panel_inner);
                    Paragraph::new(body.as_str())
                        .style(Style::default().fg(Color::Black).bg(Color::White))
                        .wrap(Wrap { trim: false })
                        .render(rect, buf);
                }
            }
        }
    }

    fn draw_image(&self, asset: SpriteAsset, bounds: Bounds, buf: &mut Buffer) {
        let (symbol, style) = match asset {
            SpriteAsset::Background => return,
            SpriteAsset::Whiteboard => ("▒", Style::default().fg(Color::White)),
            SpriteAsset::Actor(direction) => (
                arrow(direction),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        let rect = self.cells(bounds);
        for y in rect.top()..rect.bottom() {
            for x in rect.left()..rect.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(symbol).set_style(style);
                }
            }
        }
    }
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "^",
        Direction::Down => "v",
        Direction::Left => "<",
        Direction::Right => ">",
    }
}
