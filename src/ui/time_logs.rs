use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ethers::types::{Address, U256};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::TimeLog;

// Represents the state of the time log table screen
pub struct TimeLogsState {
    account: Address,
    time_logs: Vec<TimeLog>,
    table_state: TableState,
}

impl TimeLogsState {
    pub fn new(account: Address, time_logs: Vec<TimeLog>) -> Self {
        let mut table_state = TableState::default();
        if !time_logs.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            account,
            time_logs,
            table_state,
        }
    }

    pub fn next(&mut self) {
        if self.time_logs.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.time_logs.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.time_logs.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.time_logs.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_log(&self) -> Option<&TimeLog> {
        self.table_state.selected().and_then(|i| self.time_logs.get(i))
    }
}

pub enum TimeLogAction {
    Back,
    Refresh,
    LogTime(Option<U256>),            // Contains the selected log's project id
    PayFreelancer(Option<(Address, U256)>), // Contains freelancer and log index of the selection
}

fn timestamp_cell(log: &TimeLog) -> String {
    match log.logged_at() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => log.timestamp.to_string(),
    }
}

pub fn render_time_logs<B: Backend>(frame: &mut Frame<B>, state: &mut TimeLogsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let header_cells = ["#", "Project ID", "Hours", "Minutes", "Description", "Timestamp", "Paid"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells)
        .style(Style::default())
        .height(1)
        .bottom_margin(1);

    let rows = state.time_logs.iter().map(|log| {
        let paid = if log.paid {
            Cell::from("Yes").style(Style::default().fg(Color::Green))
        } else {
            Cell::from("No").style(Style::default().fg(Color::Red))
        };

        let cells = vec![
            Cell::from(log.index.to_string()),
            Cell::from(log.project_id.to_string()),
            Cell::from(log.hours.to_string()),
            Cell::from(log.minutes.to_string()),
            Cell::from(log.description.as_str()),
            Cell::from(timestamp_cell(log)),
            paid,
        ];

        Row::new(cells).height(1)
    });

    let title = if state.time_logs.is_empty() {
        "Your Time Logs (no time logs found)".to_string()
    } else {
        format!("Your Time Logs ({:?})", state.account)
    };
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(4),
            Constraint::Percentage(10),
            Constraint::Percentage(8),
            Constraint::Percentage(8),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(6),
        ]);

    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let buttons_text = if state.selected_log().is_some() {
        "<L> Log Time | <P> Pay Selected | <R> Refresh | <Esc> Back"
    } else {
        "<L> Log Time | <P> Pay | <R> Refresh | <Esc> Back"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[1]);
}

pub fn handle_input(state: &mut TimeLogsState) -> Result<Option<TimeLogAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(TimeLogAction::Back)),
            KeyCode::Char('r') => return Ok(Some(TimeLogAction::Refresh)),
            KeyCode::Char('l') => {
                return Ok(Some(TimeLogAction::LogTime(state.selected_log().map(|l| l.project_id))));
            }
            KeyCode::Char('p') => {
                let selected = state.selected_log().map(|l| (l.freelancer, l.index));
                return Ok(Some(TimeLogAction::PayFreelancer(selected)));
            }
            KeyCode::Down => state.next(),
            KeyCode::Up => state.previous(),
            _ => {}
        }
    }
    Ok(None)
}
