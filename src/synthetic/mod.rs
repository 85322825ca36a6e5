//! Synthetic customer data
//!
//! Produces the deterministic customer dataset every other stage consumes:
//! - [`CustomerProfile`] / [`CustomerRecord`] row types and categorical domains
//! - [`generate`] seeded generator with a fixed churn rule
//! - [`Dataset`] immutable row container with fingerprinting and tabular export

mod dataset;
mod generator;
mod record;

pub use dataset::Dataset;
pub use generator::{
    churn_probability, generate, ANCHORED_SERVICE_COUNT, CHURN_PROB_BOUNDS, HIGH_MONTHLY_CHARGES,
    HIGH_TICKET_COUNT, LOW_SATISFACTION, RECENT_TENURE_MONTHS,
};
pub use record::{
    customer_id, CategoricalColumn, CustomerProfile, CustomerRecord, CONTRACT_TYPES, GENDERS,
    MONTHLY_CONTRACT, ONLINE_ACTIVITY_LEVELS, PAYMENT_METHODS,
};
