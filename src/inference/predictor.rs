//! Single-customer churn scoring

use crate::error::Result;
use crate::preprocessing::{feature_vector, CategoricalEncoders, StandardScaler};
use crate::synthetic::{
    CustomerProfile, HIGH_MONTHLY_CHARGES, HIGH_TICKET_COUNT, LOW_SATISFACTION, MONTHLY_CONTRACT,
    RECENT_TENURE_MONTHS,
};
use crate::training::Classifier;
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the low-risk gauge band
pub const LOW_RISK_BOUND: f64 = 0.30;
/// Upper bound of the medium-risk gauge band
pub const MEDIUM_RISK_BOUND: f64 = 0.60;

/// Profile trait known to raise churn, independent of any model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFlag {
    MonthlyContract,
    RecentCustomer,
    LowSatisfaction,
    ManySupportTickets,
    HighCharges,
}

impl RiskFlag {
    pub const ALL: [RiskFlag; 5] = [
        RiskFlag::MonthlyContract,
        RiskFlag::RecentCustomer,
        RiskFlag::LowSatisfaction,
        RiskFlag::ManySupportTickets,
        RiskFlag::HighCharges,
    ];

    pub fn applies_to(&self, profile: &CustomerProfile) -> bool {
        match self {
            RiskFlag::MonthlyContract => profile.contract_type == MONTHLY_CONTRACT,
            RiskFlag::RecentCustomer => profile.tenure_months < RECENT_TENURE_MONTHS,
            RiskFlag::LowSatisfaction => profile.satisfaction_score < LOW_SATISFACTION,
            RiskFlag::ManySupportTickets => profile.support_tickets > HIGH_TICKET_COUNT,
            RiskFlag::HighCharges => profile.monthly_charges > HIGH_MONTHLY_CHARGES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskFlag::MonthlyContract => "Contrat mensuel",
            RiskFlag::RecentCustomer => "Client récent (< 12 mois)",
            RiskFlag::LowSatisfaction => "Satisfaction < 3",
            RiskFlag::ManySupportTickets => "Tickets support > 3",
            RiskFlag::HighCharges => "Charges élevées",
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flags raised by a raw profile, in fixed order
pub fn risk_flags(profile: &CustomerProfile) -> Vec<RiskFlag> {
    RiskFlag::ALL
        .iter()
        .copied()
        .filter(|flag| flag.applies_to(profile))
        .collect()
}

/// Gauge band of a churn probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability < LOW_RISK_BOUND {
            RiskLevel::Low
        } else if probability < MEDIUM_RISK_BOUND {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Faible",
            RiskLevel::Medium => "Modéré",
            RiskLevel::High => "Élevé",
        };
        f.write_str(s)
    }
}

const RETENTION_ACTIONS: [&str; 6] = [
    "Contact proactif",
    "Offre de fidélisation",
    "Passage au contrat annuel",
    "Conseiller dédié",
    "Enquête satisfaction",
    "Suivi personnalisé",
];

const LOYALTY_ACTIONS: [&str; 3] = [
    "Remercier sa fidélité",
    "Proposer des services complémentaires",
    "Programme parrainage",
];

/// Scored customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1 = churn, 0 = fidèle
    pub label: u8,
    /// Positive-class probability, or the label itself for models without one
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub risk_flags: Vec<RiskFlag>,
}

impl Prediction {
    pub fn is_churn(&self) -> bool {
        self.label == 1
    }

    /// Retention actions for a predicted churner, loyalty actions otherwise
    pub fn recommendations(&self) -> &'static [&'static str] {
        if self.is_churn() {
            &RETENTION_ACTIONS
        } else {
            &LOYALTY_ACTIONS
        }
    }
}

/// Encode, scale and score one profile with a fitted model.
///
/// Unknown categorical values fail with `UnknownCategory`.
pub fn predict_one<M: Classifier + ?Sized>(
    model: &M,
    scaler: &StandardScaler,
    encoders: &CategoricalEncoders,
    profile: &CustomerProfile,
) -> Result<Prediction> {
    let features = Array1::from_vec(feature_vector(profile, encoders)?.to_vec());
    let row = scaler.transform_row(features.view())?.insert_axis(Axis(0));

    let label = if model.predict(&row)?[0] >= 0.5 { 1u8 } else { 0u8 };
    let probability = match model.predict_proba(&row)? {
        Some(p) => p[0],
        None => f64::from(label),
    };

    Ok(Prediction {
        label,
        probability,
        risk_level: RiskLevel::from_probability(probability),
        risk_flags: risk_flags(profile),
    })
}
