use crate::catalog::Catalog;
use crate::cost::{compute_cost, CostError};
use crate::error::AppError;
use crate::format::parse_amount;
use crate::models::{CityPreset, CostResult, LocalRates, UsageInput, VehicleProfile};
use std::path::PathBuf;

/// Everything the user has chosen so far. Each user action has exactly one
/// mutation method; the cost result is always derived, never stored.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    vehicle: Option<VehicleProfile>,
    city: String,
    rates: LocalRates,
    tariff_text: String,
    petrol_text: String,
    usage: UsageInput,
    logo: Option<PathBuf>,
}

impl Session {
    pub fn new(catalog: Catalog, city: &str) -> Result<Self, AppError> {
        let preset = catalog.city(city)?.clone();
        let rates = preset.rates();
        Ok(Self {
            catalog,
            vehicle: None,
            city: preset.name,
            rates,
            tariff_text: crate::format::plain_number(rates.tariff),
            petrol_text: crate::format::plain_number(rates.petrol),
            usage: UsageInput::default(),
            logo: None,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn select_vehicle(&mut self, id: &str) -> Result<(), AppError> {
        let vehicle = self.catalog.vehicle(id)?.clone();
        self.vehicle = Some(vehicle);
        Ok(())
    }

    /// Back to the picker: the distance belongs to the previous vehicle.
    pub fn clear_vehicle(&mut self) {
        self.vehicle = None;
        self.usage.clear();
    }

    /// Reseeds both rates from the preset, discarding manual overrides.
    pub fn select_city(&mut self, name: &str) -> Result<(), AppError> {
        let preset = self.catalog.city(name)?;
        self.city = preset.name.clone();
        self.rates = preset.rates();
        self.tariff_text = crate::format::plain_number(self.rates.tariff);
        self.petrol_text = crate::format::plain_number(self.rates.petrol);
        Ok(())
    }

    pub fn set_tariff(&mut self, text: &str) {
        self.tariff_text = text.to_string();
        self.rates.tariff = parse_amount(text);
    }

    pub fn set_petrol(&mut self, text: &str) {
        self.petrol_text = text.to_string();
        self.rates.petrol = parse_amount(text);
    }

    pub fn select_km_chip(&mut self, km: u32) {
        self.usage.select_chip(km);
    }

    pub fn set_custom_km(&mut self, text: &str) {
        self.usage.set_custom(text);
    }

    pub fn set_logo(&mut self, path: Option<PathBuf>) {
        self.logo = path;
    }

    pub fn vehicle(&self) -> Option<&VehicleProfile> {
        self.vehicle.as_ref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn city_preset(&self) -> Option<&CityPreset> {
        self.catalog.city(&self.city).ok()
    }

    pub fn rates(&self) -> LocalRates {
        self.rates
    }

    pub fn tariff_text(&self) -> &str {
        &self.tariff_text
    }

    pub fn petrol_text(&self) -> &str {
        &self.petrol_text
    }

    pub fn usage(&self) -> &UsageInput {
        &self.usage
    }

    pub fn daily_km(&self) -> f64 {
        self.usage.daily_km()
    }

    pub fn logo(&self) -> Option<&PathBuf> {
        self.logo.as_ref()
    }

    pub fn result(&self) -> Result<Option<CostResult>, CostError> {
        compute_cost(self.vehicle.as_ref(), &self.rates, self.daily_km())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreakEven;

    fn session() -> Session {
        Session::new(Catalog::default(), "Gurugram").expect("session")
    }

    #[test]
    fn new_session_is_seeded_from_city_preset() {
        let s = session();
        assert_eq!(s.city(), "Gurugram");
        assert_eq!(s.rates(), LocalRates { tariff: 8.2, petrol: 96.0 });
        assert_eq!(s.tariff_text(), "8.2");
        assert_eq!(s.petrol_text(), "96");
        assert_eq!(s.result(), Ok(None));
    }

    #[test]
    fn overrides_survive_until_next_city_selection() {
        let mut s = session();
        s.set_tariff("6.5");
        s.set_petrol("oops");
        assert_eq!(s.rates(), LocalRates { tariff: 6.5, petrol: 0.0 });

        s.select_city("mumbai").expect("mumbai");
        assert_eq!(s.city(), "Mumbai");
        assert_eq!(s.rates(), LocalRates { tariff: 9.5, petrol: 104.0 });
    }

    #[test]
    fn result_appears_once_vehicle_and_distance_are_set() {
        let mut s = session();
        s.select_km_chip(50);
        assert_eq!(s.result(), Ok(None));

        s.select_vehicle("ola-s1-air").expect("ola");
        let r = s.result().expect("valid").expect("result");
        assert_eq!(r.break_even, BreakEven::Months(10));
    }

    #[test]
    fn clearing_vehicle_also_clears_distance() {
        let mut s = session();
        s.select_vehicle("nexon-ev").expect("nexon");
        s.set_custom_km("65");
        assert_eq!(s.daily_km(), 65.0);

        s.clear_vehicle();
        assert!(s.vehicle().is_none());
        assert_eq!(s.daily_km(), 0.0);
    }

    #[test]
    fn unknown_selections_leave_state_unchanged() {
        let mut s = session();
        assert!(s.select_city("Atlantis").is_err());
        assert_eq!(s.city(), "Gurugram");
        assert!(s.select_vehicle("vespa").is_err());
        assert!(s.vehicle().is_none());
    }
}
