use ratatui::style::{Color, Modifier, Style};
use std::env;

/// Detect if the terminal supports true color (24-bit RGB)
pub fn supports_true_color() -> bool {
    ["COLORTERM", "TERM"].iter().any(|var| {
        env::var(var)
            .map(|value| {
                let value = value.to_lowercase();
                value.contains("truecolor") || value.contains("24bit")
            })
            .unwrap_or(false)
    })
}

#[derive(Clone, Debug)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub heading: Color,
    pub accent: Color,
    pub selection: Color,
    pub border: Color,
}

impl Palette {
    /// Oceanic Next, falling back to the 256-color cube.
    pub fn detect() -> Self {
        if supports_true_color() {
            Self {
                background: Color::Reset,
                text: Color::from_u32(0xC0C5CE),
                muted: Color::from_u32(0x65737E),
                heading: Color::from_u32(0xFAC863),
                accent: Color::from_u32(0x6699CC),
                selection: Color::from_u32(0x4F5B66),
                border: Color::from_u32(0xA7ADBA),
            }
        } else {
            Self {
                background: Color::Reset,
                text: Color::Indexed(251),
                muted: Color::Indexed(243),
                heading: Color::Indexed(221),
                accent: Color::Indexed(68),
                selection: Color::Indexed(239),
                border: Color::Indexed(248),
            }
        }
    }

    pub fn heading_style(&self, level: u8) -> Style {
        let style = Style::default().fg(self.heading).add_modifier(Modifier::BOLD);
        if level == 1 {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn header_style(&self) -> Style {
        Style::default().fg(Color::Black).bg(self.accent)
    }

    pub fn active_link_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    pub fn focused_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}
