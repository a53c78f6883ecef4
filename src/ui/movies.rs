use crate::app::App;
use crate::api::Movie;
use crate::format::{budget_label, genre_chips, rating_short, release_year, runtime_label, RatingTier};
use crate::store::{FetchSlot, ViewMode};
use crate::theme::rating_role;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Columns reserved for markers, year, rating and padding on each row.
const ROW_CHROME: usize = 22;

/// Render the movie list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let state = app.state();
    let movies = &state.movies;
    let title_width = (area.width as usize).saturating_sub(ROW_CHROME);

    let items: Vec<ListItem> = if movies.movies.is_empty() {
        let msg = if movies.is_loading(FetchSlot::MovieList) {
            "Loading movies..."
        } else {
            "No movies found"
        };
        vec![ListItem::new(Span::styled(msg, app.style("detail_metadata")))]
    } else {
        movies
            .movies
            .iter()
            .map(|movie| movie_item(app, movie, title_width))
            .collect()
    };

    let pagination = &movies.pagination;
    let title = format!(" {} ", app.list_source.describe());
    let footer = format!(
        " page {} of {} ",
        pagination.page,
        pagination.total_pages()
    );

    let border_style = if app.filters_focused {
        app.style("panel_border")
    } else {
        app.style("panel_border_focused")
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_bottom(Line::from(Span::styled(footer, app.style("detail_metadata"))));
    if !movies.filters.is_empty() {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {} ", movies.filters.summary()),
                app.style("filter_active"),
            ))
            .right_aligned(),
        );
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(app.style("movie_selected"));

    let selected = (!movies.movies.is_empty()).then_some(app.selected_movie);
    let mut list_state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut list_state);
}

fn movie_item<'a>(app: &App, movie: &'a Movie, title_width: usize) -> ListItem<'a> {
    let lists = &app.state().lists;

    let fav = if lists.is_favorite(&movie.imdb_id) {
        Span::styled("♥", app.style("movie_favorite"))
    } else {
        Span::raw(" ")
    };
    let watch = if lists.in_watchlist(&movie.imdb_id) {
        Span::styled("+", app.style("movie_watchlist"))
    } else {
        Span::raw(" ")
    };

    let title = strip_control_chars(&movie.title);
    let title = truncate_to_width(&title, title_width).into_owned();
    let year = release_year(&movie.release_date).unwrap_or("----");
    let tier = RatingTier::of(movie.average_rating);

    let mut first = vec![
        fav,
        watch,
        Span::raw(" "),
        Span::styled(title, app.style("movie_normal")),
        Span::styled(format!("  ({})", year), app.style("movie_year")),
        Span::styled(
            format!("  {}", rating_short(movie.average_rating)),
            app.style(rating_role(tier)),
        ),
    ];
    let chips = genre_chips(&movie.genres);
    if !chips.is_empty() {
        first.push(Span::styled(format!("  {}", chips), app.style("movie_genres")));
    }

    let mut lines = vec![Line::from(first)];
    if app.view_mode() == ViewMode::Detailed {
        let mut second = format!("     {}", runtime_label(movie.runtime.as_ref()));
        if let Some(budget) = budget_label(movie.budget.as_deref()) {
            second.push_str(&format!(" · {}", budget));
        }
        lines.push(Line::from(Span::styled(second, app.style("detail_metadata"))));
    }

    ListItem::new(lines)
}
