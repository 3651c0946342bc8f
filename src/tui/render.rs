use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::state::{AuxMode, ConsoleState, Panel};

pub fn draw(frame: &mut Frame<'_>, state: &ConsoleState) {
    let constraints: Vec<Constraint> = state
        .stack
        .order
        .iter()
        .map(|panel| match panel {
            Panel::Command => Constraint::Length(3),
            Panel::Output | Panel::Aux => Constraint::Min(5),
        })
        .collect();
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    for (panel, area) in state.stack.order.iter().zip(areas.iter()) {
        match panel {
            Panel::Output => {
                frame.render_widget(
                    Paragraph::new(state.general_lines.join("\n"))
                        .block(titled_block("Output", state.focus == Panel::Output))
                        .wrap(Wrap { trim: false })
                        .scroll((state.general_scroll as u16, 0)),
                    *area,
                );
            }
            Panel::Aux => {
                let title = match state.stack.aux_mode {
                    AuxMode::Errors => "Errors",
                    AuxMode::History => "History",
                };
                frame.render_widget(
                    Paragraph::new(state.aux_lines.join("\n"))
                        .block(titled_block(title, state.focus == Panel::Aux))
                        .wrap(Wrap { trim: false })
                        .scroll((state.aux_scroll as u16, 0)),
                    *area,
                );
            }
            Panel::Command => {
                let line = format!("{} {}", state.prompt, state.input);
                frame.render_widget(
                    Paragraph::new(line)
                        .block(titled_block("", state.focus == Panel::Command)),
                    *area,
                );
                if state.focus == Panel::Command {
                    let prompt_width = state.prompt.chars().count() + 1;
                    let x = area
                        .x
                        .saturating_add(1)
                        .saturating_add((prompt_width + state.cursor) as u16);
                    let y = area.y.saturating_add(1);
                    frame.set_cursor_position((x.min(area.right().saturating_sub(1)), y));
                }
            }
        }
    }
}

fn titled_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}
