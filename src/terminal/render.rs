use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};

use super::document::Row;
use super::page::{HitAreas, TerminalPage};
use super::theme::Palette;
use crate::host::Element;

const PANEL_MAX_WIDTH: u16 = 36;
const TOGGLE_WIDTH: u16 = 16;
const CLOSE_GLYPH: &str = "[x]";

/// Draw the page and the floating TOC, recording where the widget landed.
pub fn draw(frame: &mut Frame, page: &mut TerminalPage, palette: &Palette) {
    let area = frame.area();
    draw_content(frame, page, palette, area);
    draw_header(frame, page, palette, area);

    let areas = if page.view().is_hidden() {
        HitAreas::default()
    } else {
        draw_widget(frame, page, palette, area)
    };
    page.set_hit_areas(areas);
}

fn draw_content(frame: &mut Frame, page: &TerminalPage, palette: &Palette, area: Rect) {
    let top = page.top_row();
    let lines: Vec<Line> = page
        .layout()
        .rows
        .iter()
        .skip(top)
        .take(area.height as usize)
        .map(|row| match row {
            Row::Heading { level, text } => Line::from(Span::styled(
                format!("{} {}", "#".repeat(*level as usize), text),
                palette.heading_style(*level),
            )),
            Row::Text(text) => Line::from(Span::styled(text.clone(), palette.text_style())),
            Row::Blank => Line::default(),
        })
        .collect();

    let content = Rect::new(area.x + 2, area.y, area.width.saturating_sub(2), area.height);
    frame.render_widget(Paragraph::new(lines), content);
}

fn draw_header(frame: &mut Frame, page: &TerminalPage, palette: &Palette, area: Rect) {
    let header = Rect::new(area.x, area.y, area.width, 1.min(area.height));
    let fragment = page
        .fragment()
        .map(|f| format!("  #{f}"))
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::raw(" "),
        Span::raw(page.document().title.clone()),
        Span::raw(fragment),
    ]);
    frame.render_widget(Paragraph::new(line).style(palette.header_style()), header);
}

fn toggle_text(page: &TerminalPage) -> String {
    let view = page.view();
    let glyph = if view.expanded { "×" } else { "≡" };
    format!("{glyph} Contents {:>3.0}%", view.progress)
}

fn draw_widget(
    frame: &mut Frame,
    page: &TerminalPage,
    palette: &Palette,
    area: Rect,
) -> HitAreas {
    let view = page.view();
    let mut areas = HitAreas::default();
    if area.width < TOGGLE_WIDTH + 2 || area.height < 5 {
        return areas;
    }

    let toggle = Rect::new(
        area.right().saturating_sub(TOGGLE_WIDTH + 1),
        area.bottom().saturating_sub(3),
        TOGGLE_WIDTH,
        3,
    );
    let toggle_style = if view.focused == Some(Element::Toggle) {
        palette.focused_style()
    } else {
        Style::default().fg(palette.border)
    };
    frame.render_widget(Clear, toggle);
    frame.render_widget(
        Paragraph::new(toggle_text(page)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(toggle_style),
        ),
        toggle,
    );
    areas.toggle = Some(toggle);
    areas.container = Some(toggle);

    if !view.expanded {
        return areas;
    }

    let titles: Vec<&str> = page
        .layout()
        .landmarks
        .iter()
        .map(|span| span.title.as_str())
        .collect();
    let width = PANEL_MAX_WIDTH.min(area.width.saturating_sub(2));
    let wanted = titles.len() as u16 + 3; // borders and progress row
    let height = wanted.min(toggle.y.saturating_sub(area.y + 1));
    if height < 4 {
        return areas;
    }
    let panel = Rect::new(
        area.right().saturating_sub(width + 1),
        toggle.y - height,
        width,
        height,
    );

    frame.render_widget(Clear, panel);
    let close_style = if view.focused == Some(Element::Close) {
        palette.focused_style()
    } else {
        Style::default().fg(palette.muted)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" Contents ")
        .title(Line::from(Span::styled(CLOSE_GLYPH, close_style)).right_aligned());
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let close_width = CLOSE_GLYPH.chars().count() as u16;
    areas.close = Some(Rect::new(
        panel.right().saturating_sub(close_width + 1),
        panel.y,
        close_width,
        1,
    ));

    let list_rows = inner.height.saturating_sub(1);
    for (index, title) in titles.iter().enumerate().take(list_rows as usize) {
        let row = Rect::new(inner.x, inner.y + index as u16, inner.width, 1);
        let number = if index < 9 {
            format!("{} ", index + 1)
        } else {
            "  ".to_string()
        };
        let style = if view.active_links.contains(&index) {
            palette.active_link_style()
        } else {
            palette.text_style()
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(number, Style::default().fg(palette.muted)),
                Span::styled(title.to_string(), style),
            ])),
            row,
        );
        areas.links.push((index, row));
    }

    let gauge_row = Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(palette.accent))
            .ratio((view.progress / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.0}% read", view.progress)),
        gauge_row,
    );

    areas.container = Some(panel.union(toggle));
    areas
}
