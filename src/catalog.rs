use crate::config::{normalize_vehicle_id, AppConfig, CityOverride};
use crate::error::AppError;
use crate::models::{CityPreset, VehicleCategory, VehicleProfile};
use chrono::NaiveDate;

pub const DEFAULT_CITY: &str = "Gurugram";

#[allow(clippy::too_many_arguments)]
fn vehicle(
    id: &str,
    name: &str,
    brand: &str,
    category: VehicleCategory,
    kwh_per_100km: f64,
    petrol_alt_kmpl: f64,
    ev_premium: f64,
    color_b: &str,
) -> VehicleProfile {
    VehicleProfile {
        id: id.into(),
        name: name.into(),
        brand: brand.into(),
        category,
        kwh_per_100km,
        petrol_alt_kmpl,
        ev_premium,
        color_a: "#0D3B66".into(),
        color_b: color_b.into(),
    }
}

pub fn built_in_vehicles() -> Vec<VehicleProfile> {
    use VehicleCategory::{Car, TwoWheeler};
    vec![
        vehicle("ola-s1-air", "S1 Air", "Ola", TwoWheeler, 3.5, 45.0, 25_000.0, "#EF476F"),
        vehicle("ather-450s", "450S", "Ather", TwoWheeler, 3.2, 45.0, 30_000.0, "#06D6A0"),
        vehicle("tvs-iqube", "iQube", "TVS", TwoWheeler, 3.4, 45.0, 28_000.0, "#FFD166"),
        vehicle("nexon-ev", "Nexon EV", "Tata", Car, 14.0, 14.0, 200_000.0, "#06D6A0"),
        vehicle("tiago-ev", "Tiago EV", "Tata", Car, 12.0, 16.0, 150_000.0, "#EF476F"),
        vehicle("xuv400", "XUV400", "Mahindra", Car, 16.0, 13.0, 220_000.0, "#FFD166"),
    ]
}

pub fn built_in_cities() -> Vec<CityPreset> {
    let updated = NaiveDate::from_ymd_opt(2025, 8, 8);
    [
        ("Gurugram", 8.2, 96.0, "DHBVN"),
        ("Delhi", 8.0, 94.0, "BSES"),
        ("Mumbai", 9.5, 104.0, "Adani"),
        ("Bengaluru", 8.8, 101.0, "BESCOM"),
        ("Hyderabad", 9.0, 108.0, "TSSPDCL"),
        ("Chennai", 8.6, 102.0, "TANGEDCO"),
        ("Kolkata", 8.4, 102.0, "CESC"),
        ("Pune", 9.2, 105.0, "MSEDCL"),
        ("Ahmedabad", 8.1, 96.0, "Torrent"),
        ("Jaipur", 8.6, 103.0, "JVVNL"),
        ("Lucknow", 8.3, 98.0, "UPPCL"),
        ("Surat", 8.0, 95.0, "DGVCL"),
        ("Indore", 8.2, 100.0, "MPMKVVCL"),
        ("Bhopal", 8.4, 101.0, "MPMKVVCL"),
        ("Patna", 8.7, 102.0, "SBPDCL"),
        ("Chandigarh", 8.1, 96.0, "Admin"),
        ("Noida", 8.2, 96.0, "NPCL"),
        ("Ghaziabad", 8.2, 96.0, "PVVNL"),
        ("Thane", 9.4, 104.0, "MSEDCL"),
        ("Nagpur", 8.9, 100.0, "MSEDCL"),
    ]
    .into_iter()
    .map(|(name, tariff, petrol, discom)| CityPreset {
        name: name.into(),
        tariff,
        petrol,
        discom: Some(discom.into()),
        updated,
    })
    .collect()
}

/// Reference data in effect: built-ins merged with user configuration.
#[derive(Debug, Clone)]
pub struct Catalog {
    vehicles: Vec<VehicleProfile>,
    cities: Vec<CityPreset>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            vehicles: built_in_vehicles(),
            cities: built_in_cities(),
        }
    }
}

impl Catalog {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let mut catalog = Self::default();

        for user in &cfg.vehicles {
            validate_vehicle(user)?;
            let mut user = user.clone();
            user.id = normalize_vehicle_id(&user.id);
            match catalog.vehicles.iter_mut().find(|v| v.id == user.id) {
                Some(existing) => *existing = user,
                None => catalog.vehicles.push(user),
            }
        }

        for ov in &cfg.city_overrides {
            catalog.apply_city_override(ov)?;
        }

        Ok(catalog)
    }

    fn apply_city_override(&mut self, ov: &CityOverride) -> Result<(), AppError> {
        let name = ov.city.trim();
        if name.is_empty() {
            return Err(AppError::Config("city override with empty name".into()));
        }
        if let Some(city) = self
            .cities
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
        {
            if let Some(tariff) = ov.tariff {
                city.tariff = tariff;
            }
            if let Some(petrol) = ov.petrol {
                city.petrol = petrol;
            }
            if ov.discom.is_some() {
                city.discom = ov.discom.clone();
            }
            if ov.updated.is_some() {
                city.updated = ov.updated;
            }
            return Ok(());
        }

        let (Some(tariff), Some(petrol)) = (ov.tariff, ov.petrol) else {
            return Err(AppError::Config(format!(
                "new city '{name}' needs both tariff and petrol"
            )));
        };
        self.cities.push(CityPreset {
            name: name.to_string(),
            tariff,
            petrol,
            discom: ov.discom.clone(),
            updated: ov.updated,
        });
        Ok(())
    }

    pub fn vehicles(&self) -> &[VehicleProfile] {
        &self.vehicles
    }

    pub fn vehicles_in(&self, category: VehicleCategory) -> Vec<&VehicleProfile> {
        self.vehicles
            .iter()
            .filter(|v| v.category == category)
            .collect()
    }

    pub fn cities(&self) -> &[CityPreset] {
        &self.cities
    }

    pub fn vehicle(&self, id: &str) -> Result<&VehicleProfile, AppError> {
        let id = normalize_vehicle_id(id);
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or(AppError::UnknownVehicle(id))
    }

    pub fn city(&self, name: &str) -> Result<&CityPreset, AppError> {
        let name = name.trim();
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::UnknownCity(name.to_string()))
    }
}

/// User-supplied vehicles must keep the cost model's denominators positive.
pub fn validate_vehicle(v: &VehicleProfile) -> Result<(), AppError> {
    let id = normalize_vehicle_id(&v.id);
    if id.is_empty() {
        return Err(AppError::Config("vehicle with empty id".into()));
    }
    let invalid = |field: &str, value: f64| {
        AppError::Config(format!("vehicle '{id}' has invalid {field}: {value}"))
    };
    if !v.kwh_per_100km.is_finite() || v.kwh_per_100km < 0.0 {
        return Err(invalid("kwh_per_100km", v.kwh_per_100km));
    }
    if !v.petrol_alt_kmpl.is_finite() || v.petrol_alt_kmpl <= 0.0 {
        return Err(invalid("petrol_alt_kmpl", v.petrol_alt_kmpl));
    }
    if !v.ev_premium.is_finite() || v.ev_premium < 0.0 {
        return Err(invalid("ev_premium", v.ev_premium));
    }
    Ok(())
}
