use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ethers::types::Address;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::chain_id_hex;
use crate::ui::components::popup::centered_rect;

// Represents the state of the wallet connection screen
pub struct ConnectState {
    wallet_account: Option<Address>,
    chain_id: u64,
    contract: Address,
    network_correct: bool,
    show_authorize_prompt: bool,
}

pub enum ConnectAction {
    Exit,
    /// Connect, with the user's answer to the account access prompt
    Connect { approved: bool },
}

impl ConnectState {
    pub fn new(wallet_account: Option<Address>, chain_id: u64, contract: Address) -> Self {
        Self {
            wallet_account,
            chain_id,
            contract,
            network_correct: true,
            show_authorize_prompt: false,
        }
    }

    pub fn set_network_correct(&mut self, correct: bool) {
        self.network_correct = correct;
    }
}

pub fn render_connect<B: Backend>(frame: &mut Frame<B>, state: &mut ConnectState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let title = Paragraph::new("Tokenized Time Tracking")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let wallet_line = match state.wallet_account {
        Some(account) => format!("Wallet account: {:?}", account),
        None => "No wallet detected".to_string(),
    };
    let mut lines = vec![
        Spans::from(""),
        Spans::from(wallet_line),
        Spans::from(format!("Network: chain {} ({})", state.chain_id, chain_id_hex(state.chain_id))),
        Spans::from(format!("Contract: {:?}", state.contract)),
        Spans::from(""),
    ];
    if !state.network_correct {
        lines.push(Spans::from(Span::styled(
            "Wrong network! Connect to Core Testnet2.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let body = Paragraph::new(lines).block(Block::default().title("Wallet").borders(Borders::ALL));
    frame.render_widget(body, chunks[1]);

    let buttons = Paragraph::new("<C> Connect Wallet | <Q> Quit")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_authorize_prompt {
        if let Some(account) = state.wallet_account {
            render_authorize_prompt(frame, account);
        }
    }
}

fn render_authorize_prompt<B: Backend>(frame: &mut Frame<B>, account: Address) {
    let popup_area = centered_rect(70, 30, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Allow the dashboard to use this account?"),
        Spans::from(""),
        Spans::from(format!("{:?}", account)),
        Spans::from(""),
        Spans::from("<Y> Allow  <N> Reject"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().title("Connection Request").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn handle_input(state: &mut ConnectState) -> Result<Option<ConnectAction>> {
    if let Event::Key(key) = event::read()? {
        if state.show_authorize_prompt {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    state.show_authorize_prompt = false;
                    return Ok(Some(ConnectAction::Connect { approved: true }));
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    state.show_authorize_prompt = false;
                    return Ok(Some(ConnectAction::Connect { approved: false }));
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(ConnectAction::Exit)),
            KeyCode::Char('c') | KeyCode::Enter => {
                // Without a wallet there is nothing to authorize; the connect attempt reports it.
                if state.wallet_account.is_some() {
                    state.show_authorize_prompt = true;
                } else {
                    return Ok(Some(ConnectAction::Connect { approved: false }));
                }
            }
            _ => {}
        }
    }
    Ok(None)
}
