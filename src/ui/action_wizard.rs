use std::str::FromStr;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ethers::{
    types::{Address, U256},
    utils::parse_ether,
};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::error::DashboardError;
use crate::models::{FreelancerAssignment, NewTimeLog};
use crate::ui::components::text_input::{InputKind, TextInputState};

/// The four transactions the dashboard can send.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum WizardKind {
    CreateProject,
    AddFreelancer,
    LogTime,
    PayFreelancer,
}

impl WizardKind {
    pub fn title(&self) -> &'static str {
        match self {
            WizardKind::CreateProject => "Create Project",
            WizardKind::AddFreelancer => "Add Freelancer",
            WizardKind::LogTime => "Log Time",
            WizardKind::PayFreelancer => "Pay Freelancer",
        }
    }
}

/// A validated transaction request, ready to hand to the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionRequest {
    CreateProject { name: String, hourly_rate: U256 },
    AddFreelancer(FreelancerAssignment),
    LogTime(NewTimeLog),
    PayFreelancer { freelancer: Address, log_index: U256 },
}

impl ActionRequest {
    /// Text for the pending popup.
    pub fn describe(&self) -> String {
        match self {
            ActionRequest::CreateProject { name, .. } => format!("Creating project \"{}\"", name),
            ActionRequest::AddFreelancer(a) => {
                format!("Adding {:?} to project {}", a.freelancer, a.project_id)
            }
            ActionRequest::LogTime(entry) => format!(
                "Logging {}h {}m on project {}",
                entry.hours, entry.minutes, entry.project_id
            ),
            ActionRequest::PayFreelancer { freelancer, log_index } => {
                format!("Paying {:?} for log #{}", freelancer, log_index)
            }
        }
    }
}

pub enum WizardAction {
    Cancel,
    Submit(ActionRequest),
}

pub struct ActionWizardState {
    kind: WizardKind,
    fields: Vec<TextInputState>,
    current_field: usize,
    editing: bool,
    show_error: Option<String>,
}

impl ActionWizardState {
    pub fn new(kind: WizardKind) -> Self {
        let fields = match kind {
            WizardKind::CreateProject => vec![
                TextInputState::new("Project Name", InputKind::Text),
                TextInputState::new("Hourly Rate (ETH)", InputKind::Decimal),
            ],
            WizardKind::AddFreelancer => vec![
                TextInputState::new("Project ID", InputKind::Integer),
                TextInputState::new("Freelancer Address", InputKind::Address),
            ],
            WizardKind::LogTime => vec![
                TextInputState::new("Project ID", InputKind::Integer),
                TextInputState::new("Hours", InputKind::Integer).with_value("2"),
                TextInputState::new("Minutes", InputKind::Integer).with_value("30"),
                TextInputState::new("Description", InputKind::Text).with_value("Worked on UI improvements"),
            ],
            WizardKind::PayFreelancer => vec![
                TextInputState::new("Freelancer Address", InputKind::Address),
                TextInputState::new("Log Index", InputKind::Integer),
            ],
        };

        Self {
            kind,
            fields,
            current_field: 0,
            editing: false,
            show_error: None,
        }
    }

    /// Pre-fill a field by label, used when opening from a selected row.
    pub fn prefill(mut self, label: &str, value: impl Into<String>) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.label == label) {
            field.value = value.into();
        }
        self
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.fields.len();
    }

    pub fn previous_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.fields.len() - 1
        } else {
            self.current_field - 1
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        self.fields[self.current_field].handle_input(key);
    }

    fn required(&self, label: &'static str) -> Result<&str, DashboardError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.label == label)
            .ok_or(DashboardError::MissingField(label))?;
        if field.is_blank() {
            return Err(DashboardError::MissingField(label));
        }
        Ok(field.value.trim())
    }

    fn integer(&self, label: &'static str) -> Result<U256, DashboardError> {
        let raw = self.required(label)?;
        U256::from_dec_str(raw).map_err(|_| DashboardError::InvalidInput(format!("{} must be a whole number", label)))
    }

    fn address(&self, label: &'static str) -> Result<Address, DashboardError> {
        let raw = self.required(label)?;
        Address::from_str(raw).map_err(|_| DashboardError::InvalidInput(format!("{} is not a valid address", label)))
    }

    /// Check required fields and parse them into a request.
    pub fn validate(&self) -> Result<ActionRequest, DashboardError> {
        match self.kind {
            WizardKind::CreateProject => {
                let name = self.required("Project Name")?.to_string();
                let rate = self.required("Hourly Rate (ETH)")?;
                let hourly_rate = parse_ether(rate)
                    .map_err(|_| DashboardError::InvalidInput(format!("{} is not an ETH amount", rate)))?;
                Ok(ActionRequest::CreateProject { name, hourly_rate })
            }
            WizardKind::AddFreelancer => Ok(ActionRequest::AddFreelancer(FreelancerAssignment {
                project_id: self.integer("Project ID")?,
                freelancer: self.address("Freelancer Address")?,
            })),
            WizardKind::LogTime => Ok(ActionRequest::LogTime(NewTimeLog {
                project_id: self.integer("Project ID")?,
                hours: self.integer("Hours")?,
                minutes: self.integer("Minutes")?,
                description: self.required("Description")?.to_string(),
            })),
            WizardKind::PayFreelancer => Ok(ActionRequest::PayFreelancer {
                freelancer: self.address("Freelancer Address")?,
                log_index: self.integer("Log Index")?,
            }),
        }
    }
}

pub fn render_action_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ActionWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(state.kind.title())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let error = Paragraph::new(state.show_error.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(error, chunks[2]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Send transaction | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ActionWizardState, area: Rect) {
    let items: Vec<ListItem> = state
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = if selected && state.editing {
                Span::styled(
                    field.get_display_string(true),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(field.get_display_string(false))
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label), label_style),
                value,
            ]))
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Transaction Details"));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ActionWizardState) -> Result<Option<WizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }

    Ok(None)
}

fn handle_key(state: &mut ActionWizardState, code: KeyCode) -> Option<WizardAction> {
    state.show_error = None;
    match code {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(WizardAction::Cancel);
            }
        }
        KeyCode::Enter => {
            state.toggle_editing();
        }
        KeyCode::Up if !state.editing => {
            state.previous_field();
        }
        KeyCode::Down | KeyCode::Tab if !state.editing => {
            state.next_field();
        }
        KeyCode::Char('s') | KeyCode::Char('S') if !state.editing => match state.validate() {
            Ok(request) => return Some(WizardAction::Submit(request)),
            Err(err) => state.show_error = Some(err.to_string()),
        },
        _ if state.editing => {
            state.edit_current_field(code);
        }
        _ => {}
    }

    None
}
