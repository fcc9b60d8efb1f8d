use crate::card::canvas::parse_hex;
use crate::card::LogoStatus;
use crate::catalog::Catalog;
use crate::config::load_config;
use crate::error::AppError;
use crate::format::{break_even_message, plain_number, rupees};
use crate::models::{BreakEven, CostResult, VehicleCategory, VehicleProfile, KM_CHIPS};
use crate::session::Session;
use crate::share::{share_file_name, Delivery, ExportReport, ExportRequest, Exporter, FallbackReason};
use crate::ui::app::{
    AppState, ConfirmAction, ExportLogEntry, ExportStatus, Field, LogLevel, Screen,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap};
use ratatui::Terminal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use tokio::task::JoinHandle;

const COLOR_ACCENT: Color = Color::Cyan;
const COLOR_INFO: Color = Color::Green;
const COLOR_MUTED: Color = Color::DarkGray;
const COLOR_HEADER: Color = Color::White;

const CATEGORY_ORDER: [VehicleCategory; 2] = [VehicleCategory::TwoWheeler, VehicleCategory::Car];

/// Months shown as a full break-even gauge.
const GAUGE_MONTHS: u64 = 60;

struct ExportJob {
    file_name: String,
    started_at: Instant,
    handle: JoinHandle<Result<ExportReport, AppError>>,
}

pub async fn run_tui() -> Result<(), AppError> {
    let cfg = load_config()?;
    let catalog = Catalog::from_config(&cfg)?;
    let mut session = Session::new(catalog, &cfg.default_city)?;
    session.set_logo(cfg.logo_path.clone());
    let exporter = Arc::new(Exporter::from_config(&cfg, None, true)?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let loop_result = run_loop(&mut terminal, AppState::new(session), &exporter).await;

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    loop_result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut state: AppState,
    exporter: &Arc<Exporter>,
) -> Result<(), AppError> {
    let mut export_job: Option<ExportJob> = None;
    let poll_rate = StdDuration::from_millis(200);

    while state.running {
        if export_job
            .as_ref()
            .is_some_and(|job| job.handle.is_finished())
        {
            process_export_job(&mut state, &mut export_job).await;
        }

        terminal.draw(|f| render(f, &state))?;

        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(key.code, key.modifiers, &mut state, exporter, &mut export_job);
            }
        }
    }

    if let Some(job) = export_job.take() {
        tracing::info!("waiting for export of {} before exit", job.file_name);
        let _ = job.handle.await;
    }

    Ok(())
}

fn handle_key(
    code: KeyCode,
    modifiers: KeyModifiers,
    state: &mut AppState,
    exporter: &Arc<Exporter>,
    export_job: &mut Option<ExportJob>,
) {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        ask_quit(state);
        return;
    }

    match state.screen.clone() {
        Screen::Confirm(ConfirmAction::Quit) => match code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                state.confirm_selected = 1 - state.confirm_selected.min(1);
            }
            KeyCode::Esc => state.screen = state.previous_screen.clone(),
            KeyCode::Enter => {
                if state.confirm_selected == 1 {
                    state.running = false;
                } else {
                    state.screen = state.previous_screen.clone();
                }
            }
            _ => {}
        },
        Screen::ErrorDialog | Screen::InfoDialog => {
            if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                state.screen = state.previous_screen.clone();
            }
        }
        Screen::Picker => handle_picker_key(code, state),
        Screen::Calculator => handle_calculator_key(code, state, exporter, export_job),
    }
}

fn ask_quit(state: &mut AppState) {
    open_dialog(state, Screen::Confirm(ConfirmAction::Quit));
    state.confirm_selected = 0;
}

fn toggle_compact(state: &mut AppState) {
    state.compact_mode = !state.compact_mode;
    state.status = if state.compact_mode {
        "compact mode enabled".into()
    } else {
        "compact mode disabled".into()
    };
}

/// Vehicles in the order the picker lists them: grouped by category.
fn picker_entries(catalog: &Catalog) -> Vec<&VehicleProfile> {
    CATEGORY_ORDER
        .iter()
        .flat_map(|category| catalog.vehicles_in(*category))
        .collect()
}

fn handle_picker_key(code: KeyCode, state: &mut AppState) {
    let count = picker_entries(state.session.catalog()).len();
    match code {
        KeyCode::Up => {
            if state.picker_selected > 0 {
                state.picker_selected -= 1;
            }
        }
        KeyCode::Down => {
            if state.picker_selected + 1 < count {
                state.picker_selected += 1;
            }
        }
        KeyCode::Enter => open_calculator(state),
        KeyCode::Char('z') => toggle_compact(state),
        KeyCode::Char('q') | KeyCode::Esc => ask_quit(state),
        _ => {}
    }
}

fn open_calculator(state: &mut AppState) {
    let Some(id) = picker_entries(state.session.catalog())
        .get(state.picker_selected)
        .map(|v| v.id.clone())
    else {
        return;
    };
    if let Err(e) = state.session.select_vehicle(&id) {
        show_error(state, e.to_string());
        return;
    }
    state.chip_selected = state
        .session
        .usage()
        .selected_chip()
        .and_then(|km| KM_CHIPS.iter().position(|c| *c == km))
        .unwrap_or(0);
    state.field = Field::Distance;
    state.screen = Screen::Calculator;
    if let Some(vehicle) = state.session.vehicle() {
        state.status = format!("{} selected", vehicle.display_name());
    }
}

fn handle_calculator_key(
    code: KeyCode,
    state: &mut AppState,
    exporter: &Arc<Exporter>,
    export_job: &mut Option<ExportJob>,
) {
    match code {
        KeyCode::Tab | KeyCode::Down => {
            state.field = state.field.next();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.field = state.field.prev();
            return;
        }
        KeyCode::Esc => {
            state.session.clear_vehicle();
            state.screen = Screen::Picker;
            state.status = "Change model".into();
            return;
        }
        _ => {}
    }

    if state.field.is_text() {
        edit_text_field(code, state);
        return;
    }

    match (state.field, code) {
        (Field::City, KeyCode::Left) => cycle_city(state, -1),
        (Field::City, KeyCode::Right) => cycle_city(state, 1),
        (Field::Distance, KeyCode::Left) => {
            state.chip_selected = state.chip_selected.saturating_sub(1);
        }
        (Field::Distance, KeyCode::Right) => {
            if state.chip_selected + 1 < KM_CHIPS.len() {
                state.chip_selected += 1;
            }
        }
        (Field::Distance, KeyCode::Enter | KeyCode::Char(' ')) => {
            let km = KM_CHIPS[state.chip_selected.min(KM_CHIPS.len() - 1)];
            state.session.select_km_chip(km);
            state.status = format!("{km} km/day");
        }
        (Field::Share, KeyCode::Enter) | (_, KeyCode::Char('s')) => {
            queue_export_job(state, exporter, export_job);
        }
        (_, KeyCode::Char('z')) => toggle_compact(state),
        (_, KeyCode::Char('q')) => ask_quit(state),
        _ => {}
    }
}

fn cycle_city(state: &mut AppState, delta: isize) {
    let cities = state.session.catalog().cities();
    if cities.is_empty() {
        return;
    }
    let idx = (state.city_selected as isize + delta).rem_euclid(cities.len() as isize) as usize;
    let name = cities[idx].name.clone();
    match state.session.select_city(&name) {
        Ok(()) => {
            state.city_selected = idx;
            state.status = format!("Rates reset to the {name} preset");
        }
        Err(e) => show_error(state, e.to_string()),
    }
}

fn accepts_char(field: Field, ch: char) -> bool {
    match field {
        Field::Tariff | Field::Petrol | Field::CustomKm => ch.is_ascii_digit() || ch == '.',
        Field::Logo => !ch.is_control(),
        _ => false,
    }
}

fn edit_text_field(code: KeyCode, state: &mut AppState) {
    let mut text = match state.field {
        Field::Tariff => state.session.tariff_text().to_string(),
        Field::Petrol => state.session.petrol_text().to_string(),
        Field::CustomKm => state.session.usage().custom_text().to_string(),
        Field::Logo => state.logo_text.clone(),
        _ => return,
    };

    match code {
        KeyCode::Char(ch) if accepts_char(state.field, ch) => text.push(ch),
        KeyCode::Backspace => {
            if text.pop().is_none() {
                return;
            }
        }
        _ => return,
    }

    match state.field {
        Field::Tariff => state.session.set_tariff(&text),
        Field::Petrol => state.session.set_petrol(&text),
        Field::CustomKm => state.session.set_custom_km(&text),
        Field::Logo => {
            let trimmed = text.trim();
            let path = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            state.session.set_logo(path);
            state.logo_text = text;
        }
        _ => {}
    }
}

fn queue_export_job(
    state: &mut AppState,
    exporter: &Arc<Exporter>,
    export_job: &mut Option<ExportJob>,
) {
    if export_job.is_some() {
        state.status = "An export is already running.".into();
        return;
    }
    let Some(vehicle) = state.session.vehicle().cloned() else {
        return;
    };
    let result = match state.session.result() {
        Ok(Some(result)) => result,
        Ok(None) => {
            state.status = "Select a daily distance first.".into();
            return;
        }
        Err(e) => {
            show_error(state, e.to_string());
            return;
        }
    };

    let req = ExportRequest {
        vehicle,
        city: state.session.city().to_string(),
        rates: state.session.rates(),
        daily_km: state.session.daily_km(),
        result,
        logo: state.session.logo().cloned(),
    };
    let file_name = share_file_name(&req.vehicle.id, req.daily_km);
    let exporter = Arc::clone(exporter);
    let handle = tokio::spawn(async move { exporter.export(&req).await });

    append_export_log(
        state,
        LogLevel::Info,
        "export_started",
        &format!("Rendering {file_name}."),
    );
    state.export_status = ExportStatus::Running;
    state.status = format!("Exporting {file_name}...");
    *export_job = Some(ExportJob {
        file_name,
        started_at: Instant::now(),
        handle,
    });
}

async fn process_export_job(state: &mut AppState, export_job: &mut Option<ExportJob>) {
    let Some(job) = export_job.take() else {
        return;
    };
    let elapsed = job.started_at.elapsed();
    let outcome = match job.handle.await {
        Ok(outcome) => outcome,
        Err(e) => Err(AppError::from(e)),
    };

    match outcome {
        Ok(report) => {
            for fallback in &report.fallbacks {
                append_export_log(state, LogLevel::Warn, "fallback", &fallback_label(fallback));
            }
            match &report.logo {
                LogoStatus::Absent => {}
                LogoStatus::Composited => {
                    append_export_log(state, LogLevel::Info, "logo", "Logo added to the card.")
                }
                LogoStatus::Skipped(reason) => append_export_log(
                    state,
                    LogLevel::Warn,
                    "logo_skipped",
                    &format!("Logo left out: {reason}"),
                ),
            }
            let message = delivery_message(&report);
            append_export_log(
                state,
                LogLevel::Info,
                "export_finished",
                &format!("{message} ({} ms)", elapsed.as_millis()),
            );
            state.status = message.clone();
            state.export_status = ExportStatus::Done(message.clone());
            show_info(state, message);
        }
        Err(e) => {
            let message = format!("Could not create the share card: {e}");
            append_export_log(state, LogLevel::Warn, "export_failed", &message);
            state.status = format!("Export of {} failed.", job.file_name);
            state.export_status = ExportStatus::Failed(message.clone());
            show_error(state, message);
        }
    }
}

fn delivery_message(report: &ExportReport) -> String {
    match &report.delivery {
        Delivery::Shared { target } => format!("Shared {} via {target}.", report.file_name),
        Delivery::SharedAndSaved { target, path } => format!(
            "Copied {} via {target} and saved {}",
            report.file_name,
            path.display()
        ),
        Delivery::Downloaded { path } => format!("Saved {}", path.display()),
    }
}

fn fallback_label(reason: &FallbackReason) -> String {
    match reason {
        FallbackReason::PrimaryEncodingFailed(e) => {
            format!("PNG encoder failed ({e}); used the alternate encoder.")
        }
        FallbackReason::ShareUnsupported { target } => {
            format!("{target} cannot take PNG files; saving instead.")
        }
        FallbackReason::ShareCheckFailed { target, error } => {
            format!("{target} unavailable ({error}); saving instead.")
        }
        FallbackReason::ShareFailed { target, error } => {
            format!("{target} share failed ({error}); saving instead.")
        }
    }
}

fn append_export_log(state: &mut AppState, level: LogLevel, event: &str, detail: &str) {
    let ts = chrono::Local::now().format("%H:%M:%S").to_string();
    state.export_logs.push(ExportLogEntry {
        ts,
        level,
        event: event.to_string(),
        detail: detail.to_string(),
    });
    if state.export_logs.len() > state.max_export_logs {
        let trim = state.export_logs.len() - state.max_export_logs;
        state.export_logs.drain(0..trim);
    }
}

/// Dialogs return to the last non-dialog screen, even when one opens over
/// another.
fn open_dialog(state: &mut AppState, dialog: Screen) {
    if matches!(state.screen, Screen::Picker | Screen::Calculator) {
        state.previous_screen = state.screen.clone();
    }
    state.screen = dialog;
}

fn show_error(state: &mut AppState, message: String) {
    state.error_message = message;
    open_dialog(state, Screen::ErrorDialog);
}

fn show_info(state: &mut AppState, message: String) {
    state.info_message = message;
    open_dialog(state, Screen::InfoDialog);
}

fn swatch(hex: &str) -> Color {
    parse_hex(hex)
        .map(|c| Color::Rgb(c[0], c[1], c[2]))
        .unwrap_or(COLOR_ACCENT)
}

fn render(f: &mut ratatui::Frame, state: &AppState) {
    let size = f.area();
    let compact = state.compact_mode || size.width < 100;

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    let header = Paragraph::new(format!(
        " bharat-ev-cost  ·  {}  ·  {} ",
        state.session.city(),
        state.status
    ))
    .block(Block::default().borders(Borders::ALL).title(" Bharat EV Cost "))
    .style(Style::default().fg(COLOR_HEADER));
    f.render_widget(header, root[0]);

    match state.session.vehicle() {
        Some(vehicle) => render_calculator(f, root[1], state, vehicle, compact),
        None => render_picker(f, root[1], state, compact),
    }

    let footer = Paragraph::new(footer_text(state))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(COLOR_MUTED));
    f.render_widget(footer, root[2]);

    match &state.screen {
        Screen::Picker | Screen::Calculator => {}
        Screen::Confirm(action) => render_confirm(f, state, action),
        Screen::ErrorDialog => render_error(f, state),
        Screen::InfoDialog => render_info(f, state),
    }
}

fn footer_text(state: &AppState) -> &'static str {
    let base = match &state.screen {
        Screen::Confirm(_) | Screen::ErrorDialog | Screen::InfoDialog => &state.previous_screen,
        other => other,
    };
    match base {
        Screen::Calculator => {
            "Tab/Up/Down: field | Left/Right: city or chip | Enter: pick chip/share | s: share | Esc: change model | q: quit"
        }
        _ => "Up/Down: choose vehicle | Enter: open calculator | z: compact | q: quit",
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn render_picker(f: &mut ratatui::Frame, area: Rect, state: &AppState, compact: bool) {
    let catalog = state.session.catalog();
    let mut rows = Vec::new();
    let mut index = 0;
    for category in CATEGORY_ORDER {
        let vehicles = catalog.vehicles_in(category);
        if vehicles.is_empty() {
            continue;
        }
        rows.push(
            Row::new(vec![Cell::from(category.heading())]).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        );
        for v in vehicles {
            let selected = index == state.picker_selected;
            let marker = if selected { "› " } else { "  " };
            let mut row = Row::new(vec![
                Cell::from(Line::from(vec![
                    Span::raw(marker),
                    Span::styled("■ ", Style::default().fg(swatch(&v.color_a))),
                    Span::raw(v.display_name()),
                ])),
                Cell::from(format!("{} kWh/100km", plain_number(v.kwh_per_100km))),
                Cell::from(format!("{} km/L petrol", plain_number(v.petrol_alt_kmpl))),
                Cell::from(format!("₹{}", rupees(v.ev_premium))),
            ]);
            if selected {
                row = row.style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(COLOR_ACCENT)
                        .add_modifier(Modifier::BOLD),
                );
            }
            rows.push(row);
            index += 1;
        }
    }

    let widths = if compact {
        [
            Constraint::Percentage(46),
            Constraint::Percentage(18),
            Constraint::Percentage(18),
            Constraint::Percentage(18),
        ]
    } else {
        [
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ]
    };
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Vehicle", "Consumption", "Petrol alt", "EV premium"])
                .style(Style::default().fg(COLOR_MUTED)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Choose your EV "),
        );
    f.render_widget(table, area);
}

fn field_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let label_style = if active {
        Style::default()
            .fg(Color::Black)
            .bg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED)
    };
    let cursor = if active { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!(" {label:<16}"), label_style),
        Span::raw(" "),
        Span::raw(format!("{value}{cursor}")),
    ])
}

fn chip_line(state: &AppState) -> Line<'static> {
    let active = state.field == Field::Distance;
    let chosen = state.session.usage().selected_chip();
    let mut spans = vec![Span::styled(
        format!(" {:<16} ", "Daily km"),
        if active {
            Style::default()
                .fg(Color::Black)
                .bg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        },
    )];
    for (i, km) in KM_CHIPS.iter().enumerate() {
        let mut style = Style::default();
        if chosen == Some(*km) {
            style = style.fg(Color::Black).bg(COLOR_INFO).add_modifier(Modifier::BOLD);
        }
        if active && i == state.chip_selected {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!("[{km}]"), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_calculator(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &AppState,
    vehicle: &VehicleProfile,
    compact: bool,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if compact {
            [Constraint::Percentage(50), Constraint::Percentage(50)]
        } else {
            [Constraint::Percentage(45), Constraint::Percentage(55)]
        })
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8)])
        .split(columns[0]);

    let vehicle_block = Paragraph::new(vec![
        Line::from(Span::styled(
            vehicle.display_name(),
            Style::default()
                .fg(swatch(&vehicle.color_b))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{} kWh/100km · petrol alt {} km/L · premium ₹{}",
            plain_number(vehicle.kwh_per_100km),
            plain_number(vehicle.petrol_alt_kmpl),
            rupees(vehicle.ev_premium)
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(swatch(&vehicle.color_a)))
            .title(format!(" {} ", vehicle.category.heading())),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(vehicle_block, left[0]);

    let session = &state.session;
    let mut lines = vec![field_line(
        "City",
        &format!("< {} >", session.city()),
        state.field == Field::City,
    )];
    if let Some(preset) = session.city_preset() {
        let mut source = Vec::new();
        if let Some(discom) = &preset.discom {
            source.push(format!("DISCOM: {discom}"));
        }
        if let Some(updated) = preset.updated {
            source.push(format!("updated {}", updated.format("%d %b %Y")));
        }
        if !source.is_empty() {
            lines.push(Line::from(Span::styled(
                format!(" {}", source.join(" · ")),
                Style::default().fg(COLOR_MUTED),
            )));
        }
    }
    lines.push(field_line(
        "Tariff ₹/kWh",
        session.tariff_text(),
        state.field == Field::Tariff,
    ));
    lines.push(field_line(
        "Petrol ₹/L",
        session.petrol_text(),
        state.field == Field::Petrol,
    ));
    lines.push(Line::from(Span::styled(
        " *Estimates only. Tariffs vary by slab & time.",
        Style::default().fg(COLOR_MUTED),
    )));
    lines.push(Line::from(""));
    lines.push(chip_line(state));
    lines.push(field_line(
        "Custom km/day",
        session.usage().custom_text(),
        state.field == Field::CustomKm,
    ));
    lines.push(field_line(
        "Logo (optional)",
        &state.logo_text,
        state.field == Field::Logo,
    ));
    lines.push(Line::from(""));
    let share_label = if state.export_status == ExportStatus::Running {
        "[ Exporting... ]"
    } else {
        "[ Share result ]"
    };
    let share_style = if state.field == Field::Share {
        Style::default()
            .fg(Color::Black)
            .bg(COLOR_INFO)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_INFO)
    };
    lines.push(Line::from(Span::styled(format!(" {share_label}"), share_style)));

    let inputs = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Your inputs "));
    f.render_widget(inputs, left[1]);

    match session.result() {
        Ok(Some(result)) => render_results(f, columns[1], state, &result, compact),
        Ok(None) => {
            let hint = Paragraph::new("Select a daily distance first.")
                .block(Block::default().borders(Borders::ALL).title(" Results "))
                .style(Style::default().fg(COLOR_MUTED))
                .alignment(Alignment::Center);
            f.render_widget(hint, columns[1]);
        }
        Err(e) => {
            let error = Paragraph::new(e.to_string())
                .block(Block::default().borders(Borders::ALL).title(" Results "))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(error, columns[1]);
        }
    }
}

fn render_results(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &AppState,
    result: &CostResult,
    compact: bool,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let kpis = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    let cards = [
        ("₹/day", result.daily_cost, COLOR_ACCENT),
        (if compact { "₹/mo" } else { "₹/month" }, result.monthly_cost, COLOR_ACCENT),
        (if compact { "₹/yr" } else { "₹/year" }, result.yearly_cost, COLOR_ACCENT),
        ("Petrol/day", result.daily_petrol_cost, Color::Yellow),
    ];
    for (slot, (title, amount, color)) in kpis.iter().zip(cards) {
        let kpi = Paragraph::new(format!("₹{}", rupees(amount)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {title} ")),
            )
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        f.render_widget(kpi, *slot);
    }

    let break_even = Paragraph::new(vec![
        Line::from(Span::styled(
            break_even_message(result.break_even),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Savings ₹{}/month vs petrol.",
            rupees(result.monthly_savings)
        )),
        Line::from(Span::styled(
            "Break-even = EV price premium ÷ monthly savings",
            Style::default().fg(COLOR_MUTED),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Break-even "))
    .wrap(Wrap { trim: true });
    f.render_widget(break_even, rows[1]);

    let (ratio, label) = gauge_progress(result.break_even);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(COLOR_INFO))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, rows[2]);

    let visible = rows[3].height.saturating_sub(2) as usize;
    let log_lines = state
        .export_logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(format_export_log_line)
        .collect::<Vec<_>>();
    let logs = Paragraph::new(log_lines)
        .block(Block::default().borders(Borders::ALL).title(" Share log "))
        .wrap(Wrap { trim: true });
    f.render_widget(logs, rows[3]);
}

/// Gauge fill shrinks as the payback period grows; unreachable stays empty.
fn gauge_progress(break_even: BreakEven) -> (f64, String) {
    match break_even.months() {
        Some(months) => {
            let clamped = months.min(GAUGE_MONTHS);
            let ratio = 1.0 - clamped as f64 / GAUGE_MONTHS as f64;
            (ratio, format!("{months} months"))
        }
        None => (0.0, "not reached".into()),
    }
}

fn format_export_log_line(entry: &ExportLogEntry) -> Line<'static> {
    let (level, color) = match entry.level {
        LogLevel::Info => ("INFO", COLOR_INFO),
        LogLevel::Warn => ("WARN", Color::Yellow),
    };
    Line::from(vec![
        Span::styled(format!("{} ", entry.ts), Style::default().fg(COLOR_MUTED)),
        Span::styled(format!("{level:<5}"), Style::default().fg(color)),
        Span::raw(format!("{}: {}", entry.event, entry.detail)),
    ])
}

fn render_confirm(f: &mut ratatui::Frame, state: &AppState, action: &ConfirmAction) {
    let area = centered_rect(56, 34, f.area());
    f.render_widget(Clear, area);

    let (title, message, consequence) = match action {
        ConfirmAction::Quit => (
            "Confirm Quit",
            "Do you want to exit bharat-ev-cost?",
            "Consequence: closes TUI and returns to shell.",
        ),
    };

    let cancel_style = if state.confirm_selected == 0 {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let confirm_style = if state.confirm_selected == 1 {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let content = Paragraph::new(vec![
        Line::from(message),
        Line::from(Span::styled(consequence, Style::default().fg(COLOR_MUTED))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Cancel (Esc)]", cancel_style),
            Span::raw("   "),
            Span::styled("[Confirm (Enter)]", confirm_style),
        ]),
        Line::from("Use Left/Right to choose"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title)),
    )
    .alignment(Alignment::Center);

    f.render_widget(content, area);
}

fn render_error(f: &mut ratatui::Frame, state: &AppState) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);
    let content = Paragraph::new(vec![
        Line::from(state.error_message.clone()),
        Line::from(""),
        Line::from("Press Enter or Esc"),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Error "))
    .style(Style::default().fg(Color::Red))
    .wrap(Wrap { trim: true });
    f.render_widget(content, area);
}

fn render_info(f: &mut ratatui::Frame, state: &AppState) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);
    let content = Paragraph::new(vec![
        Line::from(state.info_message.clone()),
        Line::from(""),
        Line::from("Press Enter or Esc"),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Info "))
    .style(Style::default().fg(COLOR_INFO))
    .wrap(Wrap { trim: true });
    f.render_widget(content, area);
}
