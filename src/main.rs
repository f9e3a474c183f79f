mod cli;
mod config;
mod contract;
mod dashboard;
mod error;
mod models;
mod session;
mod ui;
mod wallet;

#[cfg(test)]
mod testing;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::contract::ChainContract;
use crate::dashboard::Dashboard;
use crate::error::Severity;
use crate::models::format_ether;
use crate::session::NetworkTarget;
use crate::ui::{
    action_wizard::{ActionRequest, ActionWizardState, WizardAction, WizardKind, render_action_wizard, handle_input as handle_wizard_input},
    components::popup::{Notice, render_notice, render_pending},
    connect::{ConnectState, ConnectAction, render_connect, handle_input as handle_connect_input},
    projects::{ProjectsState, ProjectAction, render_projects, handle_input as handle_projects_input},
    time_logs::{TimeLogsState, TimeLogAction, render_time_logs, handle_input as handle_time_logs_input},
};
use crate::wallet::LocalKeyWallet;

// Represents the current screen in the app
#[derive(Clone, Copy, PartialEq)]
enum AppScreen {
    Connect,
    Projects,
    TimeLogs,
    Wizard,
}

// Contract work queued by an input handler, run after the pending popup is drawn
enum Job {
    Connect,
    Refresh,
    Submit(ActionRequest),
}

impl Job {
    fn describe(&self) -> String {
        match self {
            Job::Connect => "Connecting wallet".to_string(),
            Job::Refresh => "Loading projects and time logs".to_string(),
            Job::Submit(request) => request.describe(),
        }
    }
}

// Main application state
struct AppState {
    wallet: LocalKeyWallet,
    dashboard: Dashboard<ChainContract>,
    screen: AppScreen,
    wizard_return: AppScreen,
    connect_state: Option<ConnectState>,
    projects_state: Option<ProjectsState>,
    time_logs_state: Option<TimeLogsState>,
    wizard_state: Option<ActionWizardState>,
    pending: Option<Job>,
    notice: Option<Notice>,
}

impl AppState {
    fn new(wallet: LocalKeyWallet, dashboard: Dashboard<ChainContract>) -> Self {
        let target = *dashboard.target();
        let connect_state = ConnectState::new(wallet.account(), target.chain_id, target.contract);

        Self {
            wallet,
            dashboard,
            screen: AppScreen::Connect,
            wizard_return: AppScreen::Projects,
            connect_state: Some(connect_state),
            projects_state: None,
            time_logs_state: None,
            wizard_state: None,
            pending: None,
            notice: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init()?;

    match cli.command {
        Some(Commands::Deploy { artifact }) => {
            init_tracing(&config, false)?;
            let artifact = artifact.unwrap_or_else(|| config.artifact_path.clone());
            contract::deploy::deploy(&config, &artifact).await?;
            Ok(())
        }
        Some(Commands::Dashboard) | None => {
            init_tracing(&config, true)?;
            run_dashboard(config).await
        }
    }
}

/// Install the subscriber. The dashboard owns the terminal, so it logs to a file.
fn init_tracing(config: &Config, to_file: bool) -> Result<()> {
    let env_filter = EnvFilter::from_default_env().add_directive(config.log_level.parse()?);

    if to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

async fn run_dashboard(config: Config) -> Result<()> {
    let target = NetworkTarget {
        chain_id: config.chain_id,
        contract: config.contract_address()?,
    };
    let wallet = LocalKeyWallet::from_config(&config)?;
    info!(chain_id = target.chain_id, contract = ?target.contract, wallet_present = wallet.account().is_some(), "starting dashboard");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(wallet, Dashboard::new(target));

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(%err, "dashboard exited with an error");
        println!("Error: {}", err);
    }

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Connect => {
                    if let Some(state) = &mut app_state.connect_state {
                        render_connect(f, state);
                    }
                }
                AppScreen::Projects => {
                    if let Some(state) = &mut app_state.projects_state {
                        render_projects(f, state);
                    }
                }
                AppScreen::TimeLogs => {
                    if let Some(state) = &mut app_state.time_logs_state {
                        render_time_logs(f, state);
                    }
                }
                AppScreen::Wizard => {
                    if let Some(state) = &mut app_state.wizard_state {
                        render_action_wizard(f, state);
                    }
                }
            }

            if let Some(job) = &app_state.pending {
                render_pending(f, &job.describe());
            } else if let Some(notice) = &app_state.notice {
                render_notice(f, notice);
            }
        })?;

        // The pending popup is on screen; no input is read until the job finishes.
        if let Some(job) = app_state.pending.take() {
            run_job(app_state, job).await;
            continue;
        }

        if app_state.notice.is_some() {
            if let Event::Key(_) = event::read()? {
                app_state.notice = None;
            }
            continue;
        }

        let should_quit = match app_state.screen {
            AppScreen::Connect => handle_connect_screen(app_state)?,
            AppScreen::Projects => handle_projects_screen(app_state)?,
            AppScreen::TimeLogs => handle_time_logs_screen(app_state)?,
            AppScreen::Wizard => handle_wizard_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn show_projects(app_state: &mut AppState) {
    if let Some(account) = app_state.dashboard.account() {
        app_state.projects_state = Some(ProjectsState::new(
            account,
            app_state.dashboard.network_correct(),
            app_state.dashboard.projects().to_vec(),
        ));
        app_state.screen = AppScreen::Projects;
    }
}

fn show_time_logs(app_state: &mut AppState) {
    if let Some(account) = app_state.dashboard.account() {
        app_state.time_logs_state = Some(TimeLogsState::new(account, app_state.dashboard.time_logs().to_vec()));
        app_state.screen = AppScreen::TimeLogs;
    }
}

// Rebuild whichever list screen is showing so it picks up refreshed data
fn reload_screen(app_state: &mut AppState, screen: AppScreen) {
    match screen {
        AppScreen::TimeLogs => show_time_logs(app_state),
        _ => show_projects(app_state),
    }
}

fn open_wizard(app_state: &mut AppState, wizard: ActionWizardState) {
    app_state.wizard_return = app_state.screen;
    app_state.wizard_state = Some(wizard);
    app_state.screen = AppScreen::Wizard;
}

fn report(app_state: &mut AppState, err: error::DashboardError) {
    match err.severity() {
        Severity::Error => error!(%err, "contract action failed"),
        Severity::Warning => warn!(%err, "action not completed"),
    }
    app_state.notice = Some(Notice::from_error(&err));
}

async fn run_job(app_state: &mut AppState, job: Job) {
    match job {
        Job::Connect => {
            let result = app_state.dashboard.connect(&mut app_state.wallet).await;
            if let Some(state) = &mut app_state.connect_state {
                state.set_network_correct(app_state.dashboard.network_correct());
            }
            // A refresh failure after a successful handshake still leaves us connected.
            if app_state.dashboard.is_connected() {
                show_projects(app_state);
            }
            if let Err(err) = result {
                report(app_state, err);
            }
        }
        Job::Refresh => {
            if let Err(err) = app_state.dashboard.refresh().await {
                report(app_state, err);
            }
            let screen = app_state.screen;
            reload_screen(app_state, screen);
        }
        Job::Submit(request) => {
            let outcome = match request {
                ActionRequest::CreateProject { name, hourly_rate } => app_state
                    .dashboard
                    .create_project(&name, hourly_rate)
                    .await
                    .map(|done| (format!("Project created! (tx {:?})", done.value), done.refresh_error)),
                ActionRequest::AddFreelancer(assignment) => app_state
                    .dashboard
                    .add_freelancer(&assignment)
                    .await
                    .map(|tx| (format!("Freelancer added! (tx {:?})", tx), None)),
                ActionRequest::LogTime(entry) => app_state
                    .dashboard
                    .log_time(&entry)
                    .await
                    .map(|done| (format!("Time logged! (tx {:?})", done.value), done.refresh_error)),
                ActionRequest::PayFreelancer { freelancer, log_index } => app_state
                    .dashboard
                    .pay_freelancer(freelancer, log_index)
                    .await
                    .map(|done| {
                        let message = format!(
                            "Payment sent! {} ETH (tx {:?})",
                            format_ether(done.value.amount),
                            done.value.tx_hash
                        );
                        (message, done.refresh_error)
                    }),
            };

            match outcome {
                // Mined: the form closes even if the lists could not be reloaded
                Ok((message, refresh_error)) => {
                    app_state.notice = Some(Notice::confirmed(message, refresh_error.as_ref()));
                    app_state.wizard_state = None;
                    let screen = app_state.wizard_return;
                    reload_screen(app_state, screen);
                }
                // Nothing was mined; keep the form and its input
                Err(err) => report(app_state, err),
            }
        }
    }
}

fn handle_connect_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.connect_state {
        match handle_connect_input(state)? {
            Some(ConnectAction::Exit) => return Ok(true),
            Some(ConnectAction::Connect { approved }) => {
                if approved {
                    app_state.wallet.authorize();
                } else {
                    app_state.wallet.revoke();
                }
                app_state.pending = Some(Job::Connect);
            }
            None => {}
        }
    }

    Ok(false)
}

fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.projects_state {
        match handle_projects_input(state)? {
            Some(ProjectAction::Exit) => return Ok(true),
            Some(ProjectAction::Refresh) => {
                app_state.pending = Some(Job::Refresh);
            }
            Some(ProjectAction::ViewTimeLogs) => {
                show_time_logs(app_state);
            }
            Some(ProjectAction::NewProject) => {
                open_wizard(app_state, ActionWizardState::new(WizardKind::CreateProject));
            }
            Some(ProjectAction::AddFreelancer(project_id)) => {
                let wizard = ActionWizardState::new(WizardKind::AddFreelancer)
                    .prefill("Project ID", project_id.map(|id| id.to_string()).unwrap_or_default());
                open_wizard(app_state, wizard);
            }
            Some(ProjectAction::LogTime(project_id)) => {
                let wizard = ActionWizardState::new(WizardKind::LogTime)
                    .prefill("Project ID", project_id.map(|id| id.to_string()).unwrap_or_default());
                open_wizard(app_state, wizard);
            }
            Some(ProjectAction::PayFreelancer) => {
                open_wizard(app_state, ActionWizardState::new(WizardKind::PayFreelancer));
            }
            None => {}
        }
    }

    Ok(false)
}

fn handle_time_logs_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.time_logs_state {
        match handle_time_logs_input(state)? {
            Some(TimeLogAction::Back) => {
                show_projects(app_state);
            }
            Some(TimeLogAction::Refresh) => {
                app_state.pending = Some(Job::Refresh);
            }
            Some(TimeLogAction::LogTime(project_id)) => {
                let wizard = ActionWizardState::new(WizardKind::LogTime)
                    .prefill("Project ID", project_id.map(|id| id.to_string()).unwrap_or_default());
                open_wizard(app_state, wizard);
            }
            Some(TimeLogAction::PayFreelancer(selected)) => {
                let mut wizard = ActionWizardState::new(WizardKind::PayFreelancer);
                if let Some((freelancer, log_index)) = selected {
                    wizard = wizard
                        .prefill("Freelancer Address", format!("{:?}", freelancer))
                        .prefill("Log Index", log_index.to_string());
                }
                open_wizard(app_state, wizard);
            }
            None => {}
        }
    }

    Ok(false)
}

fn handle_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.wizard_state {
        match handle_wizard_input(state)? {
            Some(WizardAction::Cancel) => {
                app_state.wizard_state = None;
                let screen = app_state.wizard_return;
                reload_screen(app_state, screen);
            }
            Some(WizardAction::Submit(request)) => {
                info!(kind = ?state.kind(), "submitting transaction");
                app_state.pending = Some(Job::Submit(request));
            }
            None => {}
        }
    }

    Ok(false)
}
