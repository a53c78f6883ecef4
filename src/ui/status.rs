use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if app.search_mode {
        Cow::Owned(format!(
            "Search: {}_   (Enter search, Esc cancel)",
            app.search_input
        ))
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        Cow::Borrowed(match app.view {
            View::Movies if app.filters_focused => {
                "[j/k]row [h/l]change [c]lear [F/Esc]close [q]uit"
            }
            View::Movies => {
                "[Enter]open [f]av [w]atch [/]search [F]ilters [n/p]page [g]enres [y]ears [?]help"
            }
            View::Detail => "[b]ack [j/k]scroll [f]av [w]atch [R]atings [r]efresh [?]help",
            View::Genres | View::Years => "[Enter]browse [r]efresh [Esc]back [?]help",
            View::Favorites | View::Watchlist => {
                "[Enter]open [f]av [w]atch [D]clear list [Esc]back [?]help"
            }
        })
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
