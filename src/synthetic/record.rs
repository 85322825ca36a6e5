//! Customer record types and categorical domains

use crate::utils::round_to;
use serde::{Deserialize, Serialize};

pub const GENDERS: [&str; 2] = ["Homme", "Femme"];
pub const CONTRACT_TYPES: [&str; 3] = ["Mensuel", "Annuel", "Bi-annuel"];
pub const PAYMENT_METHODS: [&str; 4] = ["Carte bancaire", "Prélèvement", "Virement", "Chèque"];
pub const ONLINE_ACTIVITY_LEVELS: [&str; 3] = ["Faible", "Moyenne", "Élevée"];

/// Contract type carrying the highest churn weight
pub const MONTHLY_CONTRACT: &str = "Mensuel";

/// Categorical columns of a customer profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Gender,
    ContractType,
    PaymentMethod,
    OnlineActivity,
}

impl CategoricalColumn {
    /// All categorical columns, in feature-vector order
    pub const ALL: [CategoricalColumn; 4] = [
        CategoricalColumn::Gender,
        CategoricalColumn::ContractType,
        CategoricalColumn::PaymentMethod,
        CategoricalColumn::OnlineActivity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CategoricalColumn::Gender => "gender",
            CategoricalColumn::ContractType => "contract_type",
            CategoricalColumn::PaymentMethod => "payment_method",
            CategoricalColumn::OnlineActivity => "online_activity",
        }
    }

    /// The enumerated values a well-formed profile may carry
    pub fn domain(&self) -> &'static [&'static str] {
        match self {
            CategoricalColumn::Gender => &GENDERS,
            CategoricalColumn::ContractType => &CONTRACT_TYPES,
            CategoricalColumn::PaymentMethod => &PAYMENT_METHODS,
            CategoricalColumn::OnlineActivity => &ONLINE_ACTIVITY_LEVELS,
        }
    }

    /// Read this column's raw value from a profile
    pub fn value<'a>(&self, profile: &'a CustomerProfile) -> &'a str {
        match self {
            CategoricalColumn::Gender => &profile.gender,
            CategoricalColumn::ContractType => &profile.contract_type,
            CategoricalColumn::PaymentMethod => &profile.payment_method,
            CategoricalColumn::OnlineActivity => &profile.online_activity,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The raw, customer-describing fields of a record.
///
/// This is what a front end submits for a single prediction. Categorical
/// fields are plain strings so that out-of-domain input can be represented
/// and rejected by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub age: u32,
    pub gender: String,
    pub tenure_months: u32,
    pub monthly_charges: f64,
    pub contract_type: String,
    pub payment_method: String,
    pub num_services: u32,
    pub support_tickets: u32,
    pub satisfaction_score: f64,
    pub online_activity: String,
    pub has_partner: bool,
    pub has_dependents: bool,
}

impl CustomerProfile {
    /// `monthly_charges * tenure_months`, rounded to cents
    pub fn total_charges(&self) -> f64 {
        round_to(self.monthly_charges * self.tenure_months as f64, 2)
    }
}

impl Default for CustomerProfile {
    /// Starting values of the prediction form
    fn default() -> Self {
        Self {
            age: 35,
            gender: GENDERS[0].to_string(),
            tenure_months: 12,
            monthly_charges: 65.0,
            contract_type: CONTRACT_TYPES[0].to_string(),
            payment_method: PAYMENT_METHODS[0].to_string(),
            num_services: 3,
            support_tickets: 2,
            satisfaction_score: 3.5,
            online_activity: ONLINE_ACTIVITY_LEVELS[0].to_string(),
            has_partner: false,
            has_dependents: false,
        }
    }
}

/// One generated customer row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    #[serde(flatten)]
    pub profile: CustomerProfile,
    /// Always equal to `profile.total_charges()`
    pub total_charges: f64,
    pub churn: bool,
}

impl CustomerRecord {
    pub fn new(customer_id: String, profile: CustomerProfile, churn: bool) -> Self {
        let total_charges = profile.total_charges();
        Self {
            customer_id,
            profile,
            total_charges,
            churn,
        }
    }

    /// Label as 0.0 / 1.0
    pub fn label(&self) -> f64 {
        if self.churn {
            1.0
        } else {
            0.0
        }
    }
}

/// Identifier of the `index`-th generated customer
pub fn customer_id(index: usize) -> String {
    format!("CUST_{:05}", index)
}
