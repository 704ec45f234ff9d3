use ratatui::layout::{Constraint, Layout, Rect};

/// A body framed by a one-line header and a one-line footer. The screen uses
/// it for tabs / grid area / status line, and each grid tab uses it again for
/// filter bar / table / pager.
pub struct Bands {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

impl Bands {
    pub fn new(area: Rect) -> Self {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);
        Self {
            header,
            body,
            footer,
        }
    }
}

/// A `width` x `height` rect centred in `area`, shrunk so at least `margin`
/// cells stay free on each axis.
pub fn centered(area: Rect, width: u16, height: u16, margin: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(margin));
    let height = height.min(area.height.saturating_sub(margin));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
