//! Seeded customer generator
//!
//! Columns are drawn one at a time over the whole dataset from a single
//! `ChaCha8Rng` stream, in this fixed order:
//! age, gender, tenure, monthly charges, contract type, payment method,
//! number of services, support tickets, satisfaction, online activity,
//! partner, dependents, churn.

use super::dataset::Dataset;
use super::record::{
    customer_id, CustomerProfile, CustomerRecord, CONTRACT_TYPES, GENDERS, MONTHLY_CONTRACT,
    ONLINE_ACTIVITY_LEVELS, PAYMENT_METHODS,
};
use crate::error::{ChurnError, Result};
use crate::utils::round_to;
use rand::distributions::{Bernoulli, Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Exp, Normal, Poisson};
use tracing::{debug, info};

const CONTRACT_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];
const PAYMENT_WEIGHTS: [f64; 4] = [0.4, 0.35, 0.15, 0.1];
const PARTNER_RATE: f64 = 0.6;
const DEPENDENTS_RATE: f64 = 0.3;

/// Lower and upper bound of the churn probability
pub const CHURN_PROB_BOUNDS: (f64, f64) = (0.05, 0.85);

/// Tenure (months) under which a customer counts as recent
pub const RECENT_TENURE_MONTHS: u32 = 12;
/// Ticket count above which support load is a risk factor
pub const HIGH_TICKET_COUNT: u32 = 3;
/// Satisfaction below which a customer counts as unhappy
pub const LOW_SATISFACTION: f64 = 3.0;
/// Monthly bill above which charges are a risk factor
pub const HIGH_MONTHLY_CHARGES: f64 = 80.0;
/// Service count above which a customer counts as well-anchored
pub const ANCHORED_SERVICE_COUNT: u32 = 4;

/// Churn probability implied by a profile, clipped to [`CHURN_PROB_BOUNDS`]
pub fn churn_probability(profile: &CustomerProfile) -> f64 {
    let indicator = |cond: bool| -> f64 { if cond { 1.0 } else { 0.0 } };

    let raw: f64 = 0.10
        + 0.25 * indicator(profile.contract_type == MONTHLY_CONTRACT)
        + 0.15 * indicator(profile.tenure_months < RECENT_TENURE_MONTHS)
        + 0.20 * indicator(profile.support_tickets > HIGH_TICKET_COUNT)
        + 0.25 * indicator(profile.satisfaction_score < LOW_SATISFACTION)
        + 0.10 * indicator(profile.monthly_charges > HIGH_MONTHLY_CHARGES)
        - 0.15 * indicator(profile.num_services > ANCHORED_SERVICE_COUNT);

    raw.clamp(CHURN_PROB_BOUNDS.0, CHURN_PROB_BOUNDS.1)
}

/// Generate `n_samples` customers from `seed`.
///
/// Pure in its inputs: the same `(n_samples, seed)` always yields the same
/// dataset.
pub fn generate(n_samples: usize, seed: u64) -> Result<Dataset> {
    if n_samples == 0 {
        return Err(ChurnError::InvalidParameter {
            name: "n_samples".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    debug!(n_samples, seed, "Generating synthetic customers");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = n_samples;

    let age = draw(&mut rng, &normal(45.0, 15.0)?, n)
        .into_iter()
        .map(|v| v.clamp(18.0, 80.0) as u32)
        .collect::<Vec<_>>();
    let gender = draw_uniform(&mut rng, &GENDERS, n);
    let tenure = draw(&mut rng, &exponential(24.0)?, n)
        .into_iter()
        .map(|v| v.clamp(1.0, 72.0) as u32)
        .collect::<Vec<_>>();
    let monthly = draw(&mut rng, &normal(65.0, 30.0)?, n)
        .into_iter()
        .map(|v| round_to(v.clamp(20.0, 150.0), 2))
        .collect::<Vec<_>>();
    let contract = draw_weighted(&mut rng, &CONTRACT_TYPES, &CONTRACT_WEIGHTS, n)?;
    let payment = draw_weighted(&mut rng, &PAYMENT_METHODS, &PAYMENT_WEIGHTS, n)?;
    let services = draw(&mut rng, &poisson(3.0)?, n)
        .into_iter()
        .map(|v| v.clamp(1.0, 8.0) as u32)
        .collect::<Vec<_>>();
    let tickets = draw(&mut rng, &poisson(2.0)?, n)
        .into_iter()
        .map(|v| v as u32)
        .collect::<Vec<_>>();
    let satisfaction = draw(&mut rng, &normal(3.5, 1.0)?, n)
        .into_iter()
        .map(|v| round_to(v.clamp(1.0, 5.0), 1))
        .collect::<Vec<_>>();
    let activity = draw_uniform(&mut rng, &ONLINE_ACTIVITY_LEVELS, n);
    let partner = draw_flags(&mut rng, PARTNER_RATE, n)?;
    let dependents = draw_flags(&mut rng, DEPENDENTS_RATE, n)?;

    let mut records = Vec::with_capacity(n);
    for i in 0..n {
        let profile = CustomerProfile {
            age: age[i],
            gender: gender[i].clone(),
            tenure_months: tenure[i],
            monthly_charges: monthly[i],
            contract_type: contract[i].clone(),
            payment_method: payment[i].clone(),
            num_services: services[i],
            support_tickets: tickets[i],
            satisfaction_score: satisfaction[i],
            online_activity: activity[i].clone(),
            has_partner: partner[i],
            has_dependents: dependents[i],
        };
        // Last column: one uniform draw per record, in record order.
        let churn = rng.gen::<f64>() < churn_probability(&profile);
        records.push(CustomerRecord::new(customer_id(i), profile, churn));
    }

    let dataset = Dataset::from_records(records);
    info!(
        n_samples,
        seed,
        churn_rate = dataset.churn_rate(),
        "Synthetic dataset generated"
    );
    Ok(dataset)
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| distribution_error("normal", e))
}

fn exponential(mean: f64) -> Result<Exp<f64>> {
    Exp::new(1.0 / mean).map_err(|e| distribution_error("exponential", e))
}

fn poisson(lambda: f64) -> Result<Poisson<f64>> {
    Poisson::new(lambda).map_err(|e| distribution_error("poisson", e))
}

fn distribution_error(name: &str, err: impl std::fmt::Display) -> ChurnError {
    ChurnError::InvalidParameter {
        name: name.to_string(),
        value: err.to_string(),
        reason: "invalid distribution parameters".to_string(),
    }
}

fn draw<D: Distribution<f64>>(rng: &mut ChaCha8Rng, dist: &D, n: usize) -> Vec<f64> {
    dist.sample_iter(&mut *rng).take(n).collect()
}

fn draw_uniform(rng: &mut ChaCha8Rng, choices: &[&str], n: usize) -> Vec<String> {
    (0..n)
        .map(|_| choices[rng.gen_range(0..choices.len())].to_string())
        .collect()
}

fn draw_weighted(
    rng: &mut ChaCha8Rng,
    choices: &[&str],
    weights: &[f64],
    n: usize,
) -> Result<Vec<String>> {
    let index = WeightedIndex::new(weights).map_err(|e| distribution_error("weighted", e))?;
    Ok((0..n)
        .map(|_| choices[index.sample(&mut *rng)].to_string())
        .collect())
}

fn draw_flags(rng: &mut ChaCha8Rng, p: f64, n: usize) -> Result<Vec<bool>> {
    let dist = Bernoulli::new(p).map_err(|e| distribution_error("bernoulli", e))?;
    Ok(dist.sample_iter(&mut *rng).take(n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate(300, 42).unwrap();
        let b = generate(300, 42).unwrap();
        assert_eq!(a, b);

        let c = generate(300, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_generate_rejects_empty() {
        assert!(matches!(
            generate(0, 42),
            Err(ChurnError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_fields_within_domain() {
        let ds = generate(2000, 7).unwrap();
        for r in ds.iter() {
            let p = &r.profile;
            assert!((18..=80).contains(&p.age));
            assert!((1..=72).contains(&p.tenure_months));
            assert!((20.0..=150.0).contains(&p.monthly_charges));
            assert!((1..=8).contains(&p.num_services));
            assert!((1.0..=5.0).contains(&p.satisfaction_score));
            assert_eq!(round_to(p.satisfaction_score, 1), p.satisfaction_score);
            assert_eq!(round_to(p.monthly_charges, 2), p.monthly_charges);
            assert!(GENDERS.contains(&p.gender.as_str()));
            assert!(CONTRACT_TYPES.contains(&p.contract_type.as_str()));
            assert!(PAYMENT_METHODS.contains(&p.payment_method.as_str()));
            assert!(ONLINE_ACTIVITY_LEVELS.contains(&p.online_activity.as_str()));
            assert_eq!(
                r.total_charges,
                round_to(p.monthly_charges * p.tenure_months as f64, 2)
            );
        }
    }

    #[test]
    fn test_customer_ids_are_sequential() {
        let ds = generate(12, 1).unwrap();
        assert_eq!(ds.get(0).unwrap().customer_id, "CUST_00000");
        assert_eq!(ds.get(11).unwrap().customer_id, "CUST_00011");
    }

    #[test]
    fn test_churn_probability_formula() {
        let risky = CustomerProfile {
            contract_type: "Mensuel".to_string(),
            tenure_months: 3,
            support_tickets: 5,
            satisfaction_score: 2.0,
            monthly_charges: 120.0,
            num_services: 2,
            ..Default::default()
        };
        // 0.10 + 0.25 + 0.15 + 0.20 + 0.25 + 0.10 = 1.05, clipped
        assert_eq!(churn_probability(&risky), 0.85);

        let safe = CustomerProfile {
            contract_type: "Bi-annuel".to_string(),
            tenure_months: 40,
            support_tickets: 0,
            satisfaction_score: 4.5,
            monthly_charges: 30.0,
            num_services: 6,
            ..Default::default()
        };
        // 0.10 - 0.15 = -0.05, clipped
        assert_eq!(churn_probability(&safe), 0.05);

        let middle = CustomerProfile {
            contract_type: "Annuel".to_string(),
            tenure_months: 5,
            support_tickets: 1,
            satisfaction_score: 4.0,
            monthly_charges: 50.0,
            num_services: 3,
            ..Default::default()
        };
        assert!((churn_probability(&middle) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let boundary = CustomerProfile {
            contract_type: "Annuel".to_string(),
            tenure_months: RECENT_TENURE_MONTHS,
            support_tickets: HIGH_TICKET_COUNT,
            satisfaction_score: LOW_SATISFACTION,
            monthly_charges: HIGH_MONTHLY_CHARGES,
            num_services: ANCHORED_SERVICE_COUNT,
            ..Default::default()
        };
        assert!((churn_probability(&boundary) - 0.10).abs() < 1e-12);

        let recent = CustomerProfile {
            tenure_months: RECENT_TENURE_MONTHS - 1,
            ..boundary.clone()
        };
        assert!((churn_probability(&recent) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_category_mix_follows_weights() {
        let ds = generate(5000, 42).unwrap();
        let monthly = ds
            .iter()
            .filter(|r| r.profile.contract_type == "Mensuel")
            .count() as f64
            / ds.len() as f64;
        assert!((monthly - 0.5).abs() < 0.03, "monthly share = {}", monthly);

        let partner = ds.iter().filter(|r| r.profile.has_partner).count() as f64 / ds.len() as f64;
        assert!((partner - 0.6).abs() < 0.03, "partner share = {}", partner);
    }
}
