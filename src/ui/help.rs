//! Help overlay: scrollable keybinding table.
//!
//! Lists the live bindings, config overrides included, grouped by the view
//! they apply to.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

/// Context display order and labels for the help screen.
const CONTEXT_ORDER: [(Context, &str); 7] = [
    (Context::Global, "General"),
    (Context::MovieList, "Movie List"),
    (Context::Filters, "Filter Panel"),
    (Context::Detail, "Movie Detail"),
    (Context::Picker, "Genres / Years"),
    (Context::SavedList, "Favorites / Watchlist"),
    (Context::Search, "Search"),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let overlay = centered_rect(80, 80, area);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let bindings = app.keybindings.all_bindings();

    let mut rows: Vec<Row> = Vec::new();

    for (ctx, label) in &CONTEXT_ORDER {
        let ctx_bindings: Vec<_> = bindings.iter().filter(|(c, _, _, _)| c == ctx).collect();
        if ctx_bindings.is_empty() {
            continue;
        }

        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(app.style("detail_title")),
        );

        for (_, key_str, _, description) in ctx_bindings {
            rows.push(Row::new(vec![
                format!("  {}", key_str),
                description.to_string(),
            ]));
        }

        rows.push(Row::new(vec!["".to_string(), String::new()]));
    }

    rows.pop();

    let total_rows = rows.len();

    // Borders plus the header row
    let visible_height = overlay.height.saturating_sub(3) as usize;
    let max_scroll = total_rows.saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(
            " Help ({}/{}) ",
            scroll.saturating_add(1),
            max_scroll.saturating_add(1)
        )
    } else {
        " Help (? to close) ".to_string()
    };

    let widths = [Constraint::Length(14), Constraint::Min(20)];

    let table = Table::new(visible_rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(app.style("detail_body"));

    f.render_widget(table, overlay);

    if max_scroll > 0 && scroll < max_scroll {
        let hint = Line::from(vec![Span::styled(
            " j/k to scroll, ? or Esc to close ",
            app.style("detail_metadata"),
        )]);
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(Paragraph::new(hint), hint_area);
    }
}

/// A rectangle of the given percentage of `area`, centered in it.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, pct: u16| (u32::from(len) * u32::from(pct.min(100)) / 100) as u16;
    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
