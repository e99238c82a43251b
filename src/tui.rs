use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style, Modifier},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, BarChart, Table, Row, Cell},
    Terminal,
};
use crate::events::EventKind;
use crate::state::{event_label, AppState};
use eyre::Result;

pub fn run_tui(state: Arc<AppState>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

/// Tab cycles ALL -> LogAddCollateral -> LogRemoveCollateral.
fn filters() -> Vec<&'static str> {
    let mut filters = vec!["ALL"];
    filters.extend(EventKind::ALL.iter().map(|k| k.label()));
    filters
}

/// Caps `text` at `max` chars, ending in "..." when cut.
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: Arc<AppState>,
) -> std::io::Result<()> {
    let start_time = Instant::now();
    let filters = filters();
    let mut current_filter_index = 0; // 0 = All

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints(
                    [
                        Constraint::Length(3),  // Header
                        Constraint::Length(10), // Counts
                        Constraint::Min(10),    // Table
                    ]
                    .as_ref(),
                )
                .split(f.size());

            let selected_filter = filters[current_filter_index % filters.len()];

            // --- Header ---
            let block = state.last_block.load(Ordering::Relaxed);
            let uptime = start_time.elapsed().as_secs();

            let header_layout = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(20), Constraint::Percentage(40)])
                .split(chunks[0]);

            let block_widget = Paragraph::new(format!("BLOCK: #{}", block))
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL));

            let uptime_widget = Paragraph::new(format!("UPTIME: {}s", uptime))
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL));

            let filter_text = format!("FILTER: [{}] (Tab)", selected_filter);
            let status_widget = Paragraph::new(filter_text)
                .style(Style::default().fg(if selected_filter == "ALL" { Color::Green } else { Color::Yellow }).add_modifier(Modifier::BOLD))
                .block(Block::default().title(" Status ").borders(Borders::ALL));

            f.render_widget(block_widget, header_layout[0]);
            f.render_widget(uptime_widget, header_layout[1]);
            f.render_widget(status_widget, header_layout[2]);

            // --- Middle Section (Per-Cauldron Chart & Totals) ---
            let mid_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
                .split(chunks[1]);

            let mut per_cauldron: Vec<(String, u64)> = state
                .cauldron_counts
                .lock()
                .map(|counts| counts.iter().map(|(k, v)| (k.clone(), *v)).collect())
                .unwrap_or_default();
            per_cauldron.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            per_cauldron.truncate(6);
            let data: Vec<(&str, u64)> = per_cauldron.iter().map(|(k, v)| (k.as_str(), *v)).collect();

            let bar_chart = BarChart::default()
                .block(Block::default().title(" Alerts per Cauldron ").borders(Borders::ALL))
                .data(data.as_slice())
                .bar_width(8)
                .bar_style(Style::default().fg(Color::Yellow))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

            f.render_widget(bar_chart, mid_chunks[0]);

            let (added, removed) = state
                .kind_counts
                .lock()
                .map(|counts| {
                    (
                        counts.get(EventKind::CollateralAdded.label()).copied().unwrap_or(0),
                        counts.get(EventKind::CollateralRemoved.label()).copied().unwrap_or(0),
                    )
                })
                .unwrap_or((0, 0));

            let block_age = state
                .last_block_time
                .lock()
                .map(|t| t.elapsed().as_secs())
                .unwrap_or(0);
            let health_style = if block_age < 15 { Style::default().fg(Color::Green) } else { Style::default().fg(Color::Red) };

            let totals_text = vec![
                Line::from(vec![
                    Span::raw("Last Block: "),
                    Span::styled(format!("{}s ago", block_age), health_style.add_modifier(Modifier::BOLD)),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::raw("Deposits: "),
                    Span::styled(added.to_string(), Style::default().fg(Color::Green)),
                ]),
                Line::from(vec![
                    Span::raw("Withdrawals: "),
                    Span::styled(removed.to_string(), Style::default().fg(Color::LightRed)),
                ]),
            ];

            let totals = Paragraph::new(totals_text)
                .block(Block::default().title(" Collateral Flow ").borders(Borders::ALL));
            f.render_widget(totals, mid_chunks[1]);

            // --- Footer (Recent Alerts Table) ---
            let headers = Row::new(vec!["CAULDRON", "ID", "TIME AGO", "DESCRIPTION"])
                .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))
                .bottom_margin(1);

            let rows: Vec<Row> = match state.alert_history.lock() {
                Ok(history) => history
                    .iter()
                    .rev()
                    .filter(|r| selected_filter == "ALL" || event_label(&r.alert) == selected_filter)
                    .take(15)
                    .map(|r| {
                        let color = if r.alert.alert_id == "ABRA-2" { Color::LightRed } else { Color::Green };

                        let description = shorten(&r.alert.description, 60);

                        Row::new(vec![
                            Cell::from(r.cauldron.clone()).style(Style::default().fg(Color::Cyan)),
                            Cell::from(r.alert.alert_id.clone()).style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
                            Cell::from(format!("{}s", r.seen_at.elapsed().as_secs())).style(Style::default().fg(Color::DarkGray)),
                            Cell::from(description),
                        ])
                    })
                    .collect(),
                Err(_) => Vec::new(),
            };

            let table = Table::new(rows, [
                Constraint::Length(14), // Cauldron
                Constraint::Length(8),  // Id
                Constraint::Length(10), // Time
                Constraint::Fill(1),    // Description
            ])
            .header(headers)
            .block(Block::default().title(" Recent Alerts ").borders(Borders::ALL))
            .column_spacing(2);

            f.render_widget(table, chunks[2]);
        })?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Tab => {
                        current_filter_index = (current_filter_index + 1) % filters.len();
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_cycle_matches_event_labels() {
        assert_eq!(filters(), ["ALL", "LogAddCollateral", "LogRemoveCollateral"]);
    }

    #[test]
    fn shorten_respects_char_boundaries() {
        use crate::events::MonitoredEvent;
        use crate::findings::synthesize;
        use alloy::primitives::{Address, U256};

        let alert = synthesize(
            "yvWETH-WBTC-Curve-Tricrypto-v2-x\u{2013}pool",
            &MonitoredEvent {
                kind: EventKind::CollateralAdded,
                from: Address::ZERO,
                to: Address::ZERO,
                share: U256::from(10).pow(U256::from(30)),
                contract: Address::ZERO,
            },
        );
        assert!(alert.description.len() > 60);

        let short = shorten(&alert.description, 60);
        assert_eq!(short.chars().count(), 60);
        assert!(short.ends_with("..."));
        assert!(short.contains('\u{2013}'));

        assert_eq!(shorten("1.00 shares FTM added", 60), "1.00 shares FTM added");
        assert_eq!(shorten("\u{2013}\u{2013}\u{2013}\u{2013}\u{2013}", 4), "\u{2013}...");
    }
}
