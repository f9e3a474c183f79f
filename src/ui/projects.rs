use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ethers::types::{Address, U256};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{format_ether, Project};

// Represents the state of the owned-projects screen
pub struct ProjectsState {
    account: Address,
    network_correct: bool,
    projects: Vec<Project>,
    list_state: ListState,
}

impl ProjectsState {
    pub fn new(account: Address, network_correct: bool, projects: Vec<Project>) -> Self {
        let mut list_state = ListState::default();
        if !projects.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            account,
            network_correct,
            projects,
            list_state,
        }
    }

    pub fn next(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.projects.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.projects.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state.selected().and_then(|i| self.projects.get(i))
    }

    pub fn selected_project_id(&self) -> Option<U256> {
        self.selected_project().map(|p| p.id)
    }
}

pub enum ProjectAction {
    Exit,
    Refresh,
    ViewTimeLogs,
    NewProject,
    AddFreelancer(Option<U256>), // Contains the selected project id
    LogTime(Option<U256>),       // Contains the selected project id
    PayFreelancer,
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let mut header = vec![Span::raw(format!("Connected as: {:?}", state.account))];
    if !state.network_correct {
        header.push(Span::styled(
            "  Wrong network! Connect to Core Testnet2.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Spans::from(header))
        .block(Block::default().title("Tokenized Time Tracking").borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = if state.projects.is_empty() {
        vec![ListItem::new("No projects created yet.")]
    } else {
        state
            .projects
            .iter()
            .map(|project| {
                ListItem::new(Spans::from(vec![
                    Span::styled(format!("#{} ", project.id), Style::default().fg(Color::Yellow)),
                    Span::raw(&project.name),
                    Span::raw(format!("  ({} ETH/hour)", format_ether(project.hourly_rate))),
                ]))
            })
            .collect()
    };

    let projects_list = List::new(items)
        .block(Block::default().title("Your Created Projects").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(projects_list, chunks[1], &mut state.list_state);

    let buttons = Paragraph::new(
        "<N> New Project | <F> Add Freelancer | <L> Log Time | <P> Pay | <T> Time Logs | <R> Refresh | <Q> Quit",
    )
    .block(Block::default().borders(Borders::TOP))
    .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[2]);
}

pub fn handle_input(state: &mut ProjectsState) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(ProjectAction::Exit)),
            KeyCode::Char('n') => return Ok(Some(ProjectAction::NewProject)),
            KeyCode::Char('f') => return Ok(Some(ProjectAction::AddFreelancer(state.selected_project_id()))),
            KeyCode::Char('l') => return Ok(Some(ProjectAction::LogTime(state.selected_project_id()))),
            KeyCode::Char('p') => return Ok(Some(ProjectAction::PayFreelancer)),
            KeyCode::Char('t') | KeyCode::Enter => return Ok(Some(ProjectAction::ViewTimeLogs)),
            KeyCode::Char('r') => return Ok(Some(ProjectAction::Refresh)),
            KeyCode::Down => state.next(),
            KeyCode::Up => state.previous(),
            _ => {}
        }
    }
    Ok(None)
}
