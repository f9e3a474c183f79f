use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::{DashboardError, Severity};

/// A blocking message shown over the current screen until a key is pressed.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn from_error(err: &DashboardError) -> Self {
        match err.severity() {
            Severity::Warning => Notice::Warning(err.to_string()),
            Severity::Error => Notice::Error(err.to_string()),
        }
    }

    /// Outcome of a mined transaction. A failed list reload downgrades it to a
    /// warning but never hides that the transaction went through.
    pub fn confirmed(message: String, refresh_error: Option<&DashboardError>) -> Self {
        match refresh_error {
            Some(err) => Notice::Warning(format!("{} Lists not refreshed: {}", message, err)),
            None => Notice::Success(message),
        }
    }

    fn title_and_color(&self) -> (&'static str, Color) {
        match self {
            Notice::Success(_) => ("Success", Color::Green),
            Notice::Warning(_) => ("Warning", Color::Yellow),
            Notice::Error(_) => ("Error", Color::Red),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, notice: &Notice) {
    let (title, color) = notice.title_and_color();
    let popup_area = centered_rect(60, 25, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(notice.message()),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title(title).borders(Borders::ALL))
    .style(Style::default().fg(color).bg(Color::Black))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// Shown while a contract call is in flight; input is not read meanwhile.
pub fn render_pending<B: Backend>(frame: &mut Frame<B>, message: &str) {
    let popup_area = centered_rect(50, 20, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(message),
        Spans::from(""),
        Spans::from("Waiting for confirmation..."),
    ])
    .block(Block::default().title("Pending").borders(Borders::ALL))
    .style(Style::default().fg(Color::Cyan).bg(Color::Black))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::{backend::TestBackend, Terminal};

    #[test]
    fn errors_map_to_notice_kind() {
        assert!(matches!(
            Notice::from_error(&DashboardError::AuthorizationDeclined),
            Notice::Warning(_)
        ));
        assert!(matches!(
            Notice::from_error(&DashboardError::remote("execution reverted")),
            Notice::Error(_)
        ));
    }

    #[test]
    fn mined_transaction_with_failed_reload_still_says_sent() {
        let err = DashboardError::remote("connection refused");

        let notice = Notice::confirmed("Time logged!".to_string(), Some(&err));
        assert!(matches!(notice, Notice::Warning(_)));
        assert!(notice.message().starts_with("Time logged!"));
        assert!(notice.message().contains("connection refused"));

        assert_eq!(
            Notice::confirmed("Time logged!".to_string(), None),
            Notice::Success("Time logged!".to_string())
        );
    }

    #[test]
    fn notice_is_drawn_with_its_message() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let notice = Notice::Success("Project created!".to_string());

        terminal.draw(|f| render_notice(f, &notice)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol.as_str()).collect();
        assert!(text.contains("Project created!"));
        assert!(text.contains("Success"));
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 20, outer);

        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 10);
        assert_eq!(inner.x, 25);
    }
}
