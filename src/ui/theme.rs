use ratatui::style::{Color, Modifier, Style};

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;
const TEXT: Color = Color::White;
const STRIPE: Color = Color::Rgb(25, 25, 30);
const CHECKED: Color = Color::LightGreen;

/// Styles for the admin console, keyed by what is being drawn and its state.
pub struct Theme;

impl Theme {
    pub fn tab(active: bool) -> Style {
        if active {
            Style::new().fg(TEXT).bg(MUTED).add_modifier(Modifier::BOLD)
        } else {
            Style::new().fg(Color::Gray)
        }
    }

    pub fn tab_bar() -> Style {
        Style::new().bg(Color::Black)
    }

    pub fn border(focused: bool) -> Style {
        Style::new().fg(if focused { ACCENT } else { MUTED })
    }

    /// Column header; the header under the column cursor is reversed.
    pub fn header(under_cursor: bool) -> Style {
        let base = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
        if under_cursor {
            base.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED)
        } else {
            base
        }
    }

    /// Data row `index` on the page. Checked rows override the stripe.
    pub fn row(index: usize, checked: bool) -> Style {
        match (checked, index % 2) {
            (true, _) => Style::new().fg(CHECKED),
            (false, 0) => Style::new().fg(TEXT),
            (false, _) => Style::new().fg(TEXT).bg(STRIPE),
        }
    }

    pub fn cursor() -> Style {
        Style::new().fg(Color::Black).bg(Color::LightCyan)
    }

    pub fn placeholder() -> Style {
        Style::new().fg(MUTED)
    }

    /// Count of selected rows; highlighted once anything is checked.
    pub fn selection_count(selected: usize) -> Style {
        if selected > 0 {
            Style::new().fg(CHECKED)
        } else {
            Theme::hint()
        }
    }

    /// Filter text and indicators, yellow while they are in effect.
    pub fn filter(active: bool) -> Style {
        Style::new().fg(if active { Color::Yellow } else { MUTED })
    }

    pub fn label() -> Style {
        Style::new().fg(ACCENT).add_modifier(Modifier::BOLD)
    }

    pub fn value() -> Style {
        Style::new().fg(TEXT)
    }

    pub fn title() -> Style {
        Style::new().fg(TEXT).add_modifier(Modifier::BOLD)
    }

    pub fn hint() -> Style {
        Style::new().fg(Color::Gray)
    }

    pub fn status_bar() -> Style {
        Style::new().fg(TEXT).bg(MUTED)
    }

    pub fn status_loading() -> Style {
        Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn status_error() -> Style {
        Style::new().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn status_notice() -> Style {
        Style::new().fg(CHECKED).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_stripe_until_checked() {
        assert_ne!(Theme::row(0, false), Theme::row(1, false));
        assert_eq!(Theme::row(0, true), Theme::row(1, true));
        assert_eq!(Theme::row(2, false), Theme::row(0, false));
    }

    #[test]
    fn cursor_header_stands_out() {
        assert_ne!(Theme::header(true), Theme::header(false));
        assert_ne!(Theme::cursor(), Theme::row(0, false));
        assert_eq!(Theme::selection_count(0), Theme::hint());
    }
}
