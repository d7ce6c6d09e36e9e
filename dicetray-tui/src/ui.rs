use dicetray::prelude::{DieId, Severity};
use ratatui::{layout::Flex, prelude::*, widgets::*};

use crate::{
    app::{App, DieCell, toasts::MAX_TOASTS},
    keys,
};

const DIE_WIDTH: u16 = 9;
const DIE_HEIGHT: u16 = 5;

/// Foreground colour, or nothing on terminals without colour.
fn fg(app: &App, color: Color) -> Style {
    if app.color {
        Style::default().fg(color)
    } else {
        Style::default()
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                      // title
            Constraint::Min(DIE_HEIGHT),                // dice
            Constraint::Length(4),                      // stats
            Constraint::Length(MAX_TOASTS as u16 + 2), // notices
            Constraint::Length(1),                      // keys
        ])
        .split(f.size());

    draw_title(f, rows[0], app);
    draw_dice(f, rows[1], app);
    draw_stats(f, rows[2], app);
    draw_notices(f, rows[3], app);
    draw_keys(f, rows[4], app);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let board = app.controller.surface();
    let mut spans = vec![
        Span::styled(" Dice Tray ", fg(app, Color::Cyan).bold()),
        Span::raw(" "),
        Span::raw(board.status.as_str()),
    ];
    if board.is_rolling() {
        spans.push(Span::styled("  rolling…", fg(app, Color::Magenta)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(fg(app, Color::Cyan));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_dice(f: &mut Frame, area: Rect, app: &App) {
    let board = app.controller.surface();
    let grid = board.grid;
    if grid.rows == 0 || grid.columns == 0 {
        return;
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(DIE_HEIGHT); grid.rows])
        .flex(Flex::Center)
        .split(area);

    for (index, cell) in board.cells.iter().enumerate() {
        let Some((row, column)) = grid.position(index) else {
            continue;
        };
        let Some(row_area) = row_areas.get(row) else {
            continue;
        };
        // the last row may be short; centre it on its own
        let in_row = board
            .cells
            .len()
            .saturating_sub(row * grid.columns)
            .min(grid.columns);
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(DIE_WIDTH); in_row])
            .flex(Flex::Center)
            .spacing(1)
            .split(*row_area);
        if let Some(cell_area) = cells.get(column) {
            draw_die(f, *cell_area, app, DieId(index), cell);
        }
    }
}

fn draw_die(f: &mut Frame, area: Rect, app: &App, die: DieId, cell: &DieCell) {
    let state = cell.state;
    let mut border = Style::default();
    let mut border_type = BorderType::Plain;
    if state.locked {
        border = fg(app, Color::Red);
    }
    if state.rolling && !state.locked {
        border = fg(app, Color::Magenta);
    }
    if state.selected {
        border = fg(app, Color::Yellow).bold();
        border_type = BorderType::Thick;
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border)
        .title(format!("{die}"));
    if state.locked {
        block = block.title_bottom(Line::from("lock").alignment(Alignment::Right));
    }

    let face = Paragraph::new(vec![
        Line::raw(""),
        Line::styled(cell.symbol, Style::default().bold()),
    ])
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(face, area);
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let board = app.controller.surface();
    let lines = vec![
        Line::from(vec![
            Span::styled("Sum: ", fg(app, Color::DarkGray)),
            Span::styled(board.sum.to_string(), fg(app, Color::Green).bold()),
            Span::styled("   Rolls: ", fg(app, Color::DarkGray)),
            Span::raw(board.roll_count.to_string()),
        ]),
        Line::from(board.frequencies.as_str()),
    ];
    let block = Block::default().borders(Borders::ALL).title(" Stats ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_notices(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .controller
        .notices()
        .iter()
        .map(|notice| {
            let style = match notice.severity {
                Severity::Information => Style::default(),
                Severity::Warning => fg(app, Color::Yellow),
                Severity::Error => fg(app, Color::Red).bold(),
            };
            Line::styled(notice.message.as_str(), style)
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title(" Messages ");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::with_capacity(keys::HELP.len() * 2);
    for (key, action) in keys::HELP {
        spans.push(Span::styled(format!(" {key} "), fg(app, Color::Cyan).bold()));
        spans.push(Span::styled(format!("{action} "), fg(app, Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use dicetray::prelude::*;
    use ratatui::backend::TestBackend;

    use super::*;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draw_board() {
        let capabilities = TerminalCapabilities {
            width: 80,
            height: 24,
            emoji_support: false,
            color_support: false,
        };
        let app = App::new(Roller::from_seed(42), &capabilities, FaceSymbols::Unicode, 3);
        let screen = render(&app);
        assert!(screen.contains("3 dice | Sum: 3 | Roll #0"));
        assert!(screen.contains("#1"));
        assert!(screen.contains("#3"));
        assert!(!screen.contains("#4"));
        // no emoji support, so digits
        assert!(screen.contains("3x1"));
        assert!(screen.contains("showing digits"));
    }
}
