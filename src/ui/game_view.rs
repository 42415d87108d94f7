use std::collections::HashSet;

use crate::game::{GameController, GameStatus, Piece};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything the game screen shows.
pub struct View<'a> {
    pub game: &'a GameController,
    pub selected_column: usize,
    pub markers: &'a HashSet<(usize, usize)>,
    pub message: Option<&'a str>,
    pub thinking: bool,
}

fn piece_color(piece: Piece) -> Color {
    match piece {
        Piece::Red => Color::Red,
        Piece::Yellow => Color::Yellow,
        Piece::Empty => Color::DarkGray,
    }
}

pub fn render(frame: &mut Frame, view: &View<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(15),   // Board
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, view, chunks[0]);
    render_board(frame, view, chunks[1]);
    render_message(frame, view.message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let player = view.game.current_player();

    let status = match view.game.status() {
        GameStatus::InProgress if view.thinking => format!("{} is thinking ...", player.name()),
        GameStatus::InProgress => format!("To move: {}", player.name()),
        GameStatus::FirstWins | GameStatus::SecondWins | GameStatus::Draw => {
            "Game Over".to_string()
        }
    };

    let header = Paragraph::new(status)
        .style(
            Style::default()
                .fg(piece_color(player.piece()))
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Connect Four"));

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let board = view.game.board();
    let cols = board.cols();
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")];
    for col in 0..cols {
        let label = format!("{:^3}", col + 1);
        if col == view.selected_column {
            col_line.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(label));
        }
    }
    col_line.push(Span::raw("  "));
    lines.push(Line::from(col_line));

    let rule = "═".repeat(cols * 3 + 1);
    lines.push(Line::from(format!("  ╔{rule}╗")));

    // Row 0 is the bottom, so draw from the top row down
    for row in (0..board.rows()).rev() {
        let mut row_spans = vec![Span::raw("  ║")];

        for col in 0..cols {
            let piece = board.piece_at(col, row);
            let symbol = match piece {
                Piece::Empty => " . ",
                _ if view.markers.contains(&(col, row)) => " ◆ ",
                _ => " ● ",
            };
            let mut style = Style::default().fg(piece_color(piece));
            if view.markers.contains(&(col, row)) {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            row_spans.push(Span::styled(symbol, style));
        }

        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from(format!("  ╚{rule}╝")));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: Rect) {
    let msg_widget = Paragraph::new(message.unwrap_or(""))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new(
        "←/→: Move  |  Enter: Drop  |  H: Hint  |  U: Undo  |  N: New game  |  Q: Quit",
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}
