use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};

use botblitz_viewer::config::ViewerConfig;
use botblitz_viewer::dataset::{SqliteDataset, current_period};
use botblitz_viewer::dispatch::dispatch;
use botblitz_viewer::export;
use botblitz_viewer::loader::{LoaderEvent, spawn_loader};
use botblitz_viewer::matchup_bundles::{MatchupBundle, RosterSlotEntry};
use botblitz_viewer::normalize::Record;
use botblitz_viewer::pipeline::{ViewBody, ViewOutcome};
use botblitz_viewer::sort_filter::SortState;
use botblitz_viewer::state::{AppState, DatasetStatus};
use botblitz_viewer::view::{View, list_views};

const MAX_CELL_WIDTH: usize = 28;

struct App {
    state: AppState,
    config: ViewerConfig,
    dataset: Option<SqliteDataset>,
    should_quit: bool,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(),
            config,
            dataset: None,
            should_quit: false,
        }
    }

    fn on_loader_event(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::Log(msg) => self.state.push_log(msg),
            LoaderEvent::Ready(dataset) => {
                let week = current_period(&dataset);
                self.dataset = Some(dataset);
                self.state.dataset_ready(week);
            }
            LoaderEvent::Failed(msg) => self.state.dataset_failed(msg),
        }
    }

    fn maybe_dispatch(&mut self) {
        if !self.state.needs_dispatch {
            return;
        }
        let Some(dataset) = &self.dataset else {
            return;
        };
        match self.state.selection() {
            Some(selection) => {
                let dispatched = dispatch(selection.view, selection.period, dataset);
                self.state.apply_dispatch(dispatched);
            }
            None => self.state.clear_view(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.filter_editing {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.end_filter(),
                KeyCode::Backspace => self.state.filter_pop(),
                KeyCode::Char(ch) => self.state.filter_push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_view(View::CurrentPeriod),
            KeyCode::Char('2') => self.state.set_view(View::PriorPeriod),
            KeyCode::Char('3') => self.state.set_view(View::MatchupDetails),
            KeyCode::Char('4') => self.state.set_view(View::Leaderboard),
            KeyCode::Char('5') => self.state.set_view(View::Rosters),
            KeyCode::Tab => self.state.next_view(),
            KeyCode::Char('[') => self.state.period_down(),
            KeyCode::Char(']') => self.state.period_up(),
            KeyCode::Left | KeyCode::Char('h') => self.state.select_column_prev(),
            KeyCode::Right | KeyCode::Char('l') => self.state.select_column_next(),
            KeyCode::Char('s') => self.state.toggle_sort_on_selected(),
            KeyCode::Char('/') => self.state.begin_filter(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('r') => self.state.needs_dispatch = true,
            KeyCode::Char('e') => self.export_current(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn export_current(&mut self) {
        let Some(selection) = self.state.selection() else {
            self.state.push_log("[INFO] Nothing to export");
            return;
        };
        let Some(outcome) = self.state.outcome.as_ref() else {
            self.state.push_log("[INFO] Nothing to export");
            return;
        };
        let path = export::default_export_path(&self.config.export_dir, &selection);
        let result = export::export_outcome(&path, outcome);
        match result {
            Ok(report) => {
                self.state.push_log(format!(
                    "[INFO] Wrote {} rows in {} sheet(s)",
                    report.rows, report.sheets
                ));
                self.state
                    .export_finished(Ok(report.path.display().to_string()));
            }
            Err(err) => self.state.export_finished(Err(format!("{err:#}"))),
        }
    }
}

fn init_tracing(config: &ViewerConfig) {
    let Some(filter) = config.log_filter.as_deref() else {
        return;
    };
    let Some(dir) = config.cache_dir.as_ref() else {
        return;
    };
    if std::fs::create_dir_all(dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("botblitz_viewer.log"))
    else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = ViewerConfig::from_env();
    init_tracing(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    spawn_loader(config.source.clone(), tx);

    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<LoaderEvent>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(event) = rx.try_recv() {
            app.on_loader_event(event);
        }

        app.maybe_dispatch();

        terminal.draw(|f| ui(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, chunks[0], state);
    render_body(frame, chunks[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2)])
        .split(area);

    frame.render_widget(Paragraph::new(header_text(state)), rows[0]);

    let titles: Vec<String> = list_views()
        .into_iter()
        .enumerate()
        .map(|(idx, (_, label))| format!("{} {label}", idx + 1))
        .collect();
    let selected = View::ALL
        .iter()
        .position(|view| *view == state.view)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, rows[1]);
}

fn header_text(state: &AppState) -> String {
    let week = match (state.period, state.current_period) {
        (Some(period), Some(current)) => format!("Week {period}/{current}"),
        _ => "Week -".to_string(),
    };
    let mut line = format!(
        "BOTBLITZ 2025 | {} | {week} | Sort: {}",
        state.view.label(),
        sort_label(&state.sort)
    );
    if state.view == View::Rosters {
        let cursor = if state.filter_editing { "_" } else { "" };
        line.push_str(&format!(" | Filter: {}{cursor}", state.filter));
    }
    line
}

fn sort_label(sort: &SortState) -> String {
    match &sort.column {
        Some(column) => format!("{column} {}", sort.direction.arrow()),
        None => "none".to_string(),
    }
}

fn footer_text(state: &AppState) -> String {
    if state.filter_editing {
        return "Type to filter | Backspace Delete | Enter/Esc Done".to_string();
    }
    let keys = match state.view {
        View::Rosters => {
            "1-5/Tab View | ←/→ Column | s Sort | / Filter | j/k Scroll | e Export | ? Help | q Quit"
        }
        View::MatchupDetails => {
            "1-5/Tab View | [/] Week | j/k Scroll | e Export | r Reload | ? Help | q Quit"
        }
        _ => "1-5/Tab View | [/] Week | ←/→ Column | s Sort | j/k Scroll | e Export | ? Help | q Quit",
    };
    match state.export_status() {
        Some(status) => format!("{keys} | {status}"),
        None => keys.to_string(),
    }
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(state.view.label())
        .borders(Borders::ALL);

    let lines = match &state.dataset {
        DatasetStatus::Loading => vec![Line::from("Loading database...")],
        DatasetStatus::Failed(msg) => vec![Line::from(Span::styled(
            format!("Failed to load database: {msg}"),
            Style::default().fg(Color::Red),
        ))],
        DatasetStatus::Ready => match &state.outcome {
            Some(outcome) => outcome_lines(outcome, state),
            None if state.view.is_period_scoped() && state.period.is_none() => {
                vec![Line::from("No current week known")]
            }
            None => vec![Line::from("Loading view...")],
        },
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((state.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn outcome_lines(outcome: &ViewOutcome, state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(failure) = &outcome.failure {
        lines.push(Line::from(Span::styled(
            failure.to_string(),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }

    match &outcome.body {
        ViewBody::Table(records) => {
            if records.is_empty() && outcome.failure.is_none() {
                lines.push(Line::from(Span::styled(
                    "No data",
                    Style::default().fg(Color::DarkGray),
                )));
            } else {
                lines.extend(table_lines(&outcome.columns, records, state));
            }
        }
        ViewBody::Rosters(groups) => {
            for group in groups.iter() {
                lines.push(Line::from(Span::styled(
                    format!("{} ({})", group.team, group.records.len()),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.extend(table_lines(&outcome.columns, &group.records, state));
                lines.push(Line::from(""));
            }
        }
        ViewBody::Matchups(bundles) => {
            if bundles.is_empty() && outcome.failure.is_none() {
                lines.push(Line::from(Span::styled(
                    "No lineups for this week",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for bundle in bundles {
                lines.extend(matchup_lines(bundle));
                lines.push(Line::from(""));
            }
        }
    }
    lines
}

fn column_widths(columns: &[String], records: &[Record]) -> Vec<usize> {
    columns
        .iter()
        .map(|column| {
            let widest = records
                .iter()
                .map(|record| record.text(column).chars().count())
                .max()
                .unwrap_or(0);
            (widest.max(column.chars().count()) + 2).min(MAX_CELL_WIDTH)
        })
        .collect()
}

fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{clipped:<width$}")
}

fn table_lines(columns: &[String], records: &[Record], state: &AppState) -> Vec<Line<'static>> {
    let widths = column_widths(columns, records);
    let mut lines = Vec::with_capacity(records.len() + 1);

    let header: Vec<Span<'static>> = columns
        .iter()
        .zip(&widths)
        .enumerate()
        .map(|(idx, (column, width))| {
            let label = format!("{column}{}", state.sort.indicator(column));
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if idx == state.selected_column {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(fit(&label, *width), style)
        })
        .collect();
    lines.push(Line::from(header));

    for record in records {
        let cells: Vec<Span<'static>> = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| Span::raw(fit(&record.text(column), *width)))
            .collect();
        lines.push(Line::from(cells));
    }
    lines
}

fn matchup_lines(bundle: &MatchupBundle) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{} {:.2}  vs  {} {:.2}   starters {:.1} / {:.1}",
            bundle.home_bot_name,
            bundle.home_score,
            bundle.visitor_bot_name,
            bundle.visitor_score,
            MatchupBundle::starter_points(&bundle.home_players),
            MatchupBundle::starter_points(&bundle.visitor_players)
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let heading = format!(
        "{:<56}{}",
        slot_heading(&bundle.home_bot_name),
        slot_heading(&bundle.visitor_bot_name)
    );
    lines.push(Line::from(Span::styled(
        heading,
        Style::default().fg(Color::DarkGray),
    )));

    let rows = bundle.home_players.len().max(bundle.visitor_players.len());
    for idx in 0..rows {
        let left = bundle
            .home_players
            .get(idx)
            .map(format_slot)
            .unwrap_or_default();
        let right = bundle
            .visitor_players
            .get(idx)
            .map(format_slot)
            .unwrap_or_default();
        lines.push(Line::from(format!("{left:<56}{right}")));
    }
    lines
}

fn slot_heading(team: &str) -> String {
    format!("{:<10}{:<24}{:<5}{:>7}{:>7}", "SLOT", fit(team, 24), "POS", "PROJ", "PTS")
}

fn format_slot(entry: &RosterSlotEntry) -> String {
    format!(
        "{:<10}{:<24}{:<5}{:>7.1}{:>7.1}",
        fit(&entry.slot, 10),
        fit(&entry.name, 24),
        fit(&entry.position, 5),
        entry.projected_points,
        entry.points
    )
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Botblitz Viewer - Help",
        "",
        "Views:",
        "  1-5 / Tab    Switch view",
        "  [ / ]        Previous / next week",
        "  r            Reload view",
        "",
        "Tables:",
        "  ←/→ or h/l   Choose column",
        "  s            Sort (again to flip)",
        "  /            Filter rosters",
        "  j/k or ↑/↓   Scroll",
        "",
        "  e            Export view to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
