//! Dataset analytics
//!
//! Descriptive statistics over a generated dataset: headline figures, churn
//! by category, the dashboard insights and a Pearson correlation matrix.

use crate::error::Result;
use crate::synthetic::{CategoricalColumn, CustomerRecord, Dataset, LOW_SATISFACTION, MONTHLY_CONTRACT};
use crate::utils::{mean, safe_div};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric columns of the correlation matrix, in matrix order
pub const CORRELATION_COLUMNS: [&str; 7] = [
    "age",
    "tenure_months",
    "monthly_charges",
    "num_services",
    "support_tickets",
    "satisfaction_score",
    "churn",
];

/// Headline figures of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_clients: usize,
    pub churn_count: usize,
    /// Percentage, 0–100
    pub churn_rate: f64,
    pub avg_tenure: f64,
    pub avg_charges: f64,
    pub avg_satisfaction: f64,
    pub total_revenue: f64,
}

impl SummaryStats {
    pub fn compute(dataset: &Dataset) -> Self {
        let records = dataset.records();
        let churn_count = records.iter().filter(|r| r.churn).count();
        let column = |f: fn(&CustomerRecord) -> f64| records.iter().map(f).collect::<Vec<_>>();

        Self {
            total_clients: records.len(),
            churn_count,
            churn_rate: safe_div(churn_count as f64, records.len() as f64) * 100.0,
            avg_tenure: mean(&column(|r| r.profile.tenure_months as f64)),
            avg_charges: mean(&column(|r| r.profile.monthly_charges)),
            avg_satisfaction: mean(&column(|r| r.profile.satisfaction_score)),
            total_revenue: records.iter().map(|r| r.total_charges).sum(),
        }
    }
}

/// Churn figures of one category value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub count: usize,
    pub churned: usize,
    /// Share of churned customers, 0–1
    pub churn_rate: f64,
    pub avg_monthly_charges: f64,
}

/// Per-category churn statistics, categories sorted
pub fn churn_by_category(dataset: &Dataset, column: CategoricalColumn) -> Vec<CategoryStats> {
    let mut groups: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();
    for record in dataset.iter() {
        let entry = groups.entry(column.value(&record.profile)).or_default();
        entry.0 += 1;
        entry.1 += usize::from(record.churn);
        entry.2 += record.profile.monthly_charges;
    }

    groups
        .into_iter()
        .map(|(category, (count, churned, charges))| CategoryStats {
            category: category.to_string(),
            count,
            churned,
            churn_rate: safe_div(churned as f64, count as f64),
            avg_monthly_charges: safe_div(charges, count as f64),
        })
        .collect()
}

/// Tabular export of [`churn_by_category`]
pub fn category_table(column: CategoricalColumn, stats: &[CategoryStats]) -> Result<DataFrame> {
    let df = df!(
        column.name() => stats.iter().map(|s| s.category.as_str()).collect::<Vec<_>>(),
        "count" => stats.iter().map(|s| s.count as u64).collect::<Vec<_>>(),
        "churned" => stats.iter().map(|s| s.churned as u64).collect::<Vec<_>>(),
        "churn_rate" => stats.iter().map(|s| s.churn_rate).collect::<Vec<_>>(),
        "avg_monthly_charges" => stats.iter().map(|s| s.avg_monthly_charges).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Churn rates of the two segments the dashboard calls out, as percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyInsights {
    pub monthly_contract_churn_rate: f64,
    pub low_satisfaction_churn_rate: f64,
}

impl KeyInsights {
    pub fn compute(dataset: &Dataset) -> Self {
        let rate = |pred: &dyn Fn(&CustomerRecord) -> bool| {
            let (n, churned) = dataset
                .iter()
                .filter(|r| pred(r))
                .fold((0usize, 0usize), |(n, c), r| (n + 1, c + usize::from(r.churn)));
            safe_div(churned as f64, n as f64) * 100.0
        };

        Self {
            monthly_contract_churn_rate: rate(&|r| r.profile.contract_type == MONTHLY_CONTRACT),
            low_satisfaction_churn_rate: rate(&|r| r.profile.satisfaction_score < LOW_SATISFACTION),
        }
    }
}

/// Which labels to keep when filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChurnFilter {
    #[default]
    All,
    LoyalOnly,
    ChurnOnly,
}

/// Records whose contract type is in `contract_types` and whose label passes
/// `churn`. Row order is preserved.
pub fn filter_records(dataset: &Dataset, contract_types: &[&str], churn: ChurnFilter) -> Dataset {
    let records = dataset
        .iter()
        .filter(|r| contract_types.contains(&r.profile.contract_type.as_str()))
        .filter(|r| match churn {
            ChurnFilter::All => true,
            ChurnFilter::LoyalOnly => !r.churn,
            ChurnFilter::ChurnOnly => r.churn,
        })
        .cloned()
        .collect();
    Dataset::from_records(records)
}

fn numeric_column(dataset: &Dataset, name: &str) -> Array1<f64> {
    dataset
        .iter()
        .map(|r| match name {
            "age" => r.profile.age as f64,
            "tenure_months" => r.profile.tenure_months as f64,
            "monthly_charges" => r.profile.monthly_charges,
            "num_services" => r.profile.num_services as f64,
            "support_tickets" => r.profile.support_tickets as f64,
            "satisfaction_score" => r.profile.satisfaction_score,
            _ => r.label(),
        })
        .collect()
}

fn pearson(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let (Some(ma), Some(mb)) = (a.mean(), b.mean()) else {
        return f64::NAN;
    };
    let da = a - ma;
    let db = b - mb;
    let denom = (da.dot(&da) * db.dot(&db)).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        da.dot(&db) / denom
    }
}

/// Pearson correlations between [`CORRELATION_COLUMNS`].
///
/// A constant column correlates as NaN with everything but itself.
pub fn correlation_matrix(dataset: &Dataset) -> Array2<f64> {
    let columns: Vec<Array1<f64>> = CORRELATION_COLUMNS
        .iter()
        .map(|name| numeric_column(dataset, name))
        .collect();
    let n = columns.len();

    let mut corr = Array2::from_elem((n, n), f64::NAN);
    for i in 0..n {
        corr[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }
    corr
}
