use crate::api::SortOrder;
use crate::app::{App, FilterRow};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the filter panel: one row each for year, genre and sort order.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let filters = &app.state().movies.filters;
    let lines: Vec<Line> = FilterRow::ALL
        .iter()
        .map(|row| {
            let (value, active) = match row {
                FilterRow::Year => match filters.year {
                    Some(year) => (year.to_string(), true),
                    None => ("Any".to_string(), false),
                },
                FilterRow::Genre => match &filters.genre {
                    Some(genre) => (genre.clone(), true),
                    None => ("Any".to_string(), false),
                },
                FilterRow::Sort => (
                    filters.sort.as_str().to_string(),
                    filters.sort != SortOrder::default(),
                ),
            };

            let focused = app.filters_focused && app.filter_row == *row;
            let cursor = if focused { "> " } else { "  " };
            let value_style = if active {
                app.style("filter_active")
            } else {
                app.style("filter_value")
            };
            let value_style = if focused {
                value_style.patch(app.style("movie_selected"))
            } else {
                value_style
            };

            Line::from(vec![
                Span::raw(cursor),
                Span::styled(format!("{:<7}", row.label()), app.style("filter_label")),
                Span::styled(format!("< {} >", value), value_style),
            ])
        })
        .collect();

    let border_style = if app.filters_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Filters "),
    );
    f.render_widget(paragraph, area);
}
