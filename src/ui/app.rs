use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Picker,
    Calculator,
    Confirm(ConfirmAction),
    ErrorDialog,
    InfoDialog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Quit,
}

/// Focusable inputs on the calculator screen, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    City,
    Tariff,
    Petrol,
    Distance,
    CustomKm,
    Logo,
    Share,
}

pub const FIELDS: [Field; 7] = [
    Field::City,
    Field::Tariff,
    Field::Petrol,
    Field::Distance,
    Field::CustomKm,
    Field::Logo,
    Field::Share,
];

impl Field {
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::Tariff | Field::Petrol | Field::CustomKm | Field::Logo
        )
    }

    pub fn next(self) -> Field {
        let idx = FIELDS.iter().position(|f| *f == self).unwrap_or(0);
        FIELDS[(idx + 1) % FIELDS.len()]
    }

    pub fn prev(self) -> Field {
        let idx = FIELDS.iter().position(|f| *f == self).unwrap_or(0);
        FIELDS[(idx + FIELDS.len() - 1) % FIELDS.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportStatus {
    #[default]
    Idle,
    Running,
    Done(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone)]
pub struct ExportLogEntry {
    pub ts: String,
    pub level: LogLevel,
    pub event: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub running: bool,
    pub status: String,
    pub compact_mode: bool,
    pub screen: Screen,
    pub previous_screen: Screen,
    pub session: Session,
    pub picker_selected: usize,
    pub field: Field,
    pub city_selected: usize,
    pub chip_selected: usize,
    pub logo_text: String,
    pub confirm_selected: usize,
    pub export_status: ExportStatus,
    pub export_logs: Vec<ExportLogEntry>,
    pub max_export_logs: usize,
    pub error_message: String,
    pub info_message: String,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        let city_selected = session
            .catalog()
            .cities()
            .iter()
            .position(|c| c.name == session.city())
            .unwrap_or(0);
        let logo_text = session
            .logo()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self {
            running: true,
            status: "ready".into(),
            compact_mode: false,
            screen: Screen::Picker,
            previous_screen: Screen::Picker,
            session,
            picker_selected: 0,
            field: Field::City,
            city_selected,
            chip_selected: 0,
            logo_text,
            confirm_selected: 0,
            export_status: ExportStatus::Idle,
            export_logs: vec![],
            max_export_logs: 50,
            error_message: String::new(),
            info_message: String::new(),
        }
    }
}
