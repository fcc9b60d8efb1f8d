use crate::models::{BreakEven, CostResult, LocalRates, VehicleProfile};
use thiserror::Error;

pub const DAYS_PER_MONTH: f64 = 30.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("vehicle '{vehicle}' has no usable petrol fuel economy ({kmpl} km/L)")]
    InvalidFuelEconomy { vehicle: String, kmpl: f64 },

    #[error("cost inputs for vehicle '{vehicle}' are not finite numbers")]
    NonFiniteInput { vehicle: String },
}

/// Running cost of `profile` at `rates` for `daily_km` per day.
///
/// `Ok(None)` means there is nothing to compute yet: no vehicle chosen, or no
/// positive distance. Months are 30 days and a year is 12 months.
pub fn compute_cost(
    profile: Option<&VehicleProfile>,
    rates: &LocalRates,
    daily_km: f64,
) -> Result<Option<CostResult>, CostError> {
    let Some(profile) = profile else {
        return Ok(None);
    };
    if !daily_km.is_finite() || daily_km <= 0.0 {
        return Ok(None);
    }

    let finite = [
        rates.tariff,
        rates.petrol,
        profile.kwh_per_100km,
        profile.ev_premium,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err(CostError::NonFiniteInput {
            vehicle: profile.id.clone(),
        });
    }
    if !profile.petrol_alt_kmpl.is_finite() || profile.petrol_alt_kmpl <= 0.0 {
        return Err(CostError::InvalidFuelEconomy {
            vehicle: profile.id.clone(),
            kmpl: profile.petrol_alt_kmpl,
        });
    }

    let ev_cost_per_km = (profile.kwh_per_100km / 100.0) * rates.tariff;
    let daily_cost = ev_cost_per_km * daily_km;
    let monthly_cost = daily_cost * DAYS_PER_MONTH;
    let yearly_cost = monthly_cost * MONTHS_PER_YEAR;

    let petrol_cost_per_km = rates.petrol / profile.petrol_alt_kmpl;
    let daily_petrol_cost = petrol_cost_per_km * daily_km;
    let monthly_savings = (daily_petrol_cost * DAYS_PER_MONTH - monthly_cost).max(0.0);

    let break_even = if monthly_savings > 0.0 {
        let months = (profile.ev_premium / monthly_savings).ceil();
        if months.is_finite() {
            BreakEven::Months(months.max(0.0) as u64)
        } else {
            BreakEven::Unreachable
        }
    } else {
        BreakEven::Unreachable
    };

    Ok(Some(CostResult {
        ev_cost_per_km,
        daily_cost,
        monthly_cost,
        yearly_cost,
        petrol_cost_per_km,
        daily_petrol_cost,
        monthly_savings,
        break_even,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::built_in_vehicles;
    use crate::models::VehicleCategory;

    fn ola() -> VehicleProfile {
        VehicleProfile {
            id: "ola-s1-air".into(),
            name: "S1 Air".into(),
            brand: "Ola".into(),
            category: VehicleCategory::TwoWheeler,
            kwh_per_100km: 3.5,
            petrol_alt_kmpl: 45.0,
            ev_premium: 25_000.0,
            color_a: "#0D3B66".into(),
            color_b: "#EF476F".into(),
        }
    }

    fn gurugram() -> LocalRates {
        LocalRates {
            tariff: 8.2,
            petrol: 96.0,
        }
    }

    #[test]
    fn ola_in_gurugram_at_fifty_km() {
        let r = compute_cost(Some(&ola()), &gurugram(), 50.0)
            .expect("valid inputs")
            .expect("result");
        assert!((r.ev_cost_per_km - 0.287).abs() < 1e-9);
        assert!((r.daily_cost - 14.35).abs() < 1e-9);
        assert!((r.monthly_cost - 430.5).abs() < 1e-9);
        assert!((r.petrol_cost_per_km - 96.0 / 45.0).abs() < 1e-12);
        assert!((r.daily_petrol_cost - 106.666_666_666).abs() < 1e-6);
        assert!((r.monthly_savings - 2769.5).abs() < 1e-6);
        assert_eq!(r.break_even, BreakEven::Months(10));
    }

    #[test]
    fn zero_distance_or_missing_vehicle_yields_nothing() {
        assert_eq!(compute_cost(Some(&ola()), &gurugram(), 0.0), Ok(None));
        assert_eq!(compute_cost(None, &gurugram(), 50.0), Ok(None));
        let absurd = LocalRates {
            tariff: -1.0,
            petrol: 1e9,
        };
        assert_eq!(compute_cost(None, &absurd, 0.0), Ok(None));
    }

    #[test]
    fn month_and_year_are_exact_multiples() {
        for vehicle in built_in_vehicles() {
            for km in [1.0, 50.0, 137.5, 300.0] {
                let r = compute_cost(Some(&vehicle), &gurugram(), km)
                    .expect("valid")
                    .expect("result");
                assert!(r.daily_cost >= 0.0);
                assert_eq!(r.monthly_cost, r.daily_cost * 30.0);
                assert_eq!(r.yearly_cost, r.monthly_cost * 12.0);
            }
        }
    }

    #[test]
    fn savings_never_negative_when_electricity_is_dearer() {
        let rates = LocalRates {
            tariff: 500.0,
            petrol: 1.0,
        };
        let r = compute_cost(Some(&ola()), &rates, 100.0)
            .expect("valid")
            .expect("result");
        assert_eq!(r.monthly_savings, 0.0);
        assert_eq!(r.break_even, BreakEven::Unreachable);
    }

    #[test]
    fn break_even_is_ceiling_of_premium_over_savings() {
        for vehicle in built_in_vehicles() {
            let r = compute_cost(Some(&vehicle), &gurugram(), 80.0)
                .expect("valid")
                .expect("result");
            assert!(r.monthly_savings > 0.0);
            let expected = (vehicle.ev_premium / r.monthly_savings).ceil() as u64;
            assert_eq!(r.break_even, BreakEven::Months(expected));
            assert!(expected > 0);
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let a = compute_cost(Some(&ola()), &gurugram(), 73.0).expect("valid");
        let b = compute_cost(Some(&ola()), &gurugram(), 73.0).expect("valid");
        let (a, b) = (a.expect("result"), b.expect("result"));
        assert_eq!(a.daily_cost.to_bits(), b.daily_cost.to_bits());
        assert_eq!(a.monthly_savings.to_bits(), b.monthly_savings.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn zero_fuel_economy_is_rejected_instead_of_infinite() {
        let mut broken = ola();
        broken.petrol_alt_kmpl = 0.0;
        let err = compute_cost(Some(&broken), &gurugram(), 50.0).expect_err("guarded");
        assert!(matches!(err, CostError::InvalidFuelEconomy { .. }));
    }

    #[test]
    fn non_finite_rates_are_rejected() {
        let rates = LocalRates {
            tariff: f64::NAN,
            petrol: 96.0,
        };
        let err = compute_cost(Some(&ola()), &rates, 50.0).expect_err("guarded");
        assert!(matches!(err, CostError::NonFiniteInput { .. }));
    }

    #[test]
    fn zero_tariff_is_free_to_run() {
        let rates = LocalRates {
            tariff: 0.0,
            petrol: 96.0,
        };
        let r = compute_cost(Some(&ola()), &rates, 50.0)
            .expect("valid")
            .expect("result");
        assert_eq!(r.daily_cost, 0.0);
        assert!(r.monthly_savings > 0.0);
    }
}
