use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Preset daily distances offered as chips, in km/day.
pub const KM_CHIPS: [u32; 7] = [50, 80, 100, 150, 200, 250, 300];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleCategory {
    #[serde(alias = "scooter", alias = "two_wheeler")]
    TwoWheeler,
    Car,
}

impl VehicleCategory {
    pub fn as_label(self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "two-wheeler",
            VehicleCategory::Car => "car",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "Scooters & Bikes",
            VehicleCategory::Car => "Cars",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleProfile {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: VehicleCategory,
    pub kwh_per_100km: f64,
    pub petrol_alt_kmpl: f64,
    pub ev_premium: f64,
    #[serde(default = "default_color_a")]
    pub color_a: String,
    #[serde(default = "default_color_b")]
    pub color_b: String,
}

fn default_color_a() -> String {
    "#0D3B66".into()
}

fn default_color_b() -> String {
    "#EF476F".into()
}

impl VehicleProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.name)
    }

    /// First letter of the brand and of the model name, `E`/`V` when absent.
    pub fn initials(&self) -> String {
        let b = self.brand.chars().next().unwrap_or('E');
        let n = self.name.chars().next().unwrap_or('V');
        format!("{b}{n}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityPreset {
    pub name: String,
    pub tariff: f64,
    pub petrol: f64,
    pub discom: Option<String>,
    pub updated: Option<NaiveDate>,
}

impl CityPreset {
    pub fn rates(&self) -> LocalRates {
        LocalRates {
            tariff: self.tariff,
            petrol: self.petrol,
        }
    }
}

/// Electricity tariff (₹/kWh) and petrol price (₹/L) in effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocalRates {
    pub tariff: f64,
    pub petrol: f64,
}

/// Daily distance, either a preset chip or free-form text. Never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInput {
    chip: Option<u32>,
    custom: String,
}

impl UsageInput {
    pub fn select_chip(&mut self, km: u32) {
        self.chip = Some(km);
        self.custom.clear();
    }

    pub fn set_custom(&mut self, text: impl Into<String>) {
        self.custom = text.into();
        self.chip = None;
    }

    pub fn clear(&mut self) {
        self.chip = None;
        self.custom.clear();
    }

    pub fn selected_chip(&self) -> Option<u32> {
        self.chip
    }

    pub fn custom_text(&self) -> &str {
        &self.custom
    }

    /// Distance in km/day; 0 when nothing usable was entered.
    pub fn daily_km(&self) -> f64 {
        match self.chip {
            Some(km) => f64::from(km),
            None => crate::format::parse_amount(&self.custom),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BreakEven {
    Months(u64),
    Unreachable,
}

impl BreakEven {
    pub fn months(self) -> Option<u64> {
        match self {
            BreakEven::Months(m) => Some(m),
            BreakEven::Unreachable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostResult {
    pub ev_cost_per_km: f64,
    pub daily_cost: f64,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub petrol_cost_per_km: f64,
    pub daily_petrol_cost: f64,
    pub monthly_savings: f64,
    pub break_even: BreakEven,
}
