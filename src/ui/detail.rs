use crate::api::{Movie, RatingEntry};
use crate::app::{App, RatingsState, MAX_SCROLL};
use crate::format::{
    budget_label, language_label, long_date, rating_label, runtime_label, RatingTier,
    NOT_AVAILABLE,
};
use crate::store::FetchSlot;
use crate::theme::rating_role;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the movie detail view
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(" Movie ");

    let movie = app.state().movies.current_movie.clone();
    let Some(movie) = movie.filter(|_| !app.state().movies.is_loading(FetchSlot::CurrentMovie))
    else {
        let msg = if app.state().movies.is_loading(FetchSlot::CurrentMovie) {
            "Loading movie..."
        } else {
            "Movie not available"
        };
        let paragraph = Paragraph::new(Span::styled(msg, app.style("detail_metadata"))).block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let lines = detail_lines(app, &movie);

    // Clamp before drawing so a resize never shows an out-of-range offset
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let visible = area.height.saturating_sub(2) as usize;
    let content: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    app.clamp_scroll(content, visible);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll.min(MAX_SCROLL) as u16, 0));
    f.render_widget(paragraph, area);
}

fn field<'a>(app: &App, label: &'static str, value: String, style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<11}", label), app.style("detail_label")),
        Span::styled(value, style),
    ])
}

fn detail_lines(app: &App, movie: &Movie) -> Vec<Line<'static>> {
    let body = app.style("detail_body");
    let lists = &app.state().lists;
    let tier = RatingTier::of(movie.average_rating);

    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&movie.title).into_owned(),
            app.style("detail_title"),
        )),
        Line::from(Span::styled(
            format!(
                "{} · {} · {}",
                long_date(&movie.release_date),
                runtime_label(movie.runtime.as_ref()),
                language_label(movie.original_language.as_deref())
            ),
            app.style("detail_metadata"),
        )),
        Line::from(""),
        field(
            app,
            "Rating",
            rating_label(movie.average_rating),
            app.style(rating_role(tier)),
        ),
        field(app, "Genres", join_or_na(movie.genres.iter().map(|g| g.name.as_str())), body),
        field(
            app,
            "Budget",
            budget_label(movie.budget.as_deref())
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            body,
        ),
        field(
            app,
            "Companies",
            join_or_na(movie.production_companies.iter().map(|c| c.name.as_str())),
            body,
        ),
        field(app, "IMDb ID", movie.imdb_id.clone(), app.style("detail_metadata")),
    ];

    let mut marks = Vec::new();
    if lists.is_favorite(&movie.imdb_id) {
        marks.push(Span::styled("♥ Favorite  ", app.style("movie_favorite")));
    }
    if lists.in_watchlist(&movie.imdb_id) {
        marks.push(Span::styled("+ On watchlist", app.style("movie_watchlist")));
    }
    if !marks.is_empty() {
        lines.push(Line::from(marks));
    }

    lines.push(Line::from(""));
    let description = movie
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    match description {
        Some(text) => lines.extend(
            strip_control_chars(text)
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), body))),
        ),
        None => lines.push(Line::from(Span::styled(
            "No description available.",
            app.style("detail_metadata"),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Ratings", app.style("detail_label"))));
    lines.extend(ratings_lines(app, movie));
    lines
}

fn join_or_na<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined = names
        .map(|n| strip_control_chars(n).into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}

fn rating_entry_line(app: &App, entry: &RatingEntry) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {}: ", strip_control_chars(&entry.source)),
            app.style("detail_metadata"),
        ),
        Span::styled(entry.rating.to_string(), app.style("detail_body")),
    ])
}

/// External ratings: the freshly loaded set when there is one for this
/// movie, otherwise whatever came embedded in the movie record.
fn ratings_lines(app: &App, movie: &Movie) -> Vec<Line<'static>> {
    let hint = app
        .keybindings
        .key_hint(crate::keybindings::Action::LoadRatings, crate::keybindings::Context::Detail)
        .unwrap_or_else(|| "R".to_string());
    let meta = app.style("detail_metadata");

    match &app.ratings {
        RatingsState::Loaded { imdb_id, ratings } if *imdb_id == movie.imdb_id => {
            if ratings.is_empty() {
                vec![Line::from(Span::styled("  No external ratings", meta))]
            } else {
                ratings.iter().map(|r| rating_entry_line(app, r)).collect()
            }
        }
        RatingsState::Loading { imdb_id } if *imdb_id == movie.imdb_id => {
            vec![Line::from(Span::styled("  Loading ratings...", meta))]
        }
        RatingsState::Failed { imdb_id, error } if *imdb_id == movie.imdb_id => vec![
            Line::from(Span::styled(
                format!("  Failed to load ratings: {}", error),
                app.style("error"),
            )),
            Line::from(Span::styled(format!("  Press {} to retry", hint), meta)),
        ],
        _ => {
            let mut lines: Vec<Line<'static>> = movie
                .ratings
                .iter()
                .map(|r| rating_entry_line(app, r))
                .collect();
            lines.push(Line::from(Span::styled(
                format!("  Press {} to load external ratings", hint),
                meta,
            )));
            lines
        }
    }
}
