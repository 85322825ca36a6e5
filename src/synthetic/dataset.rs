//! Immutable customer dataset

use super::record::CustomerRecord;
use crate::error::Result;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Ordered sequence of generated customers.
///
/// A dataset is never mutated after construction; downstream stages only
/// borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CustomerRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CustomerRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records.iter()
    }

    /// Churn labels as 0.0 / 1.0
    pub fn labels(&self) -> Array1<f64> {
        self.records.iter().map(|r| r.label()).collect()
    }

    /// Share of churned customers in [0, 1]
    pub fn churn_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().filter(|r| r.churn).count() as f64 / self.records.len() as f64
    }

    /// SHA-256 over the canonical JSON encoding of every row, hex encoded.
    ///
    /// Two datasets share a fingerprint iff they hold the same rows in the
    /// same order.
    pub fn fingerprint(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(serde_json::to_vec(record)?);
            hasher.update(b"\n");
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Tabular view of the dataset, one column per record field
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.records;
        let flag = |b: bool| if b { 1u32 } else { 0u32 };

        let df = df!(
            "customer_id" => rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
            "age" => rows.iter().map(|r| r.profile.age).collect::<Vec<_>>(),
            "gender" => rows.iter().map(|r| r.profile.gender.as_str()).collect::<Vec<_>>(),
            "tenure_months" => rows.iter().map(|r| r.profile.tenure_months).collect::<Vec<_>>(),
            "monthly_charges" => rows.iter().map(|r| r.profile.monthly_charges).collect::<Vec<_>>(),
            "total_charges" => rows.iter().map(|r| r.total_charges).collect::<Vec<_>>(),
            "contract_type" => rows.iter().map(|r| r.profile.contract_type.as_str()).collect::<Vec<_>>(),
            "payment_method" => rows.iter().map(|r| r.profile.payment_method.as_str()).collect::<Vec<_>>(),
            "num_services" => rows.iter().map(|r| r.profile.num_services).collect::<Vec<_>>(),
            "support_tickets" => rows.iter().map(|r| r.profile.support_tickets).collect::<Vec<_>>(),
            "satisfaction_score" => rows.iter().map(|r| r.profile.satisfaction_score).collect::<Vec<_>>(),
            "online_activity" => rows.iter().map(|r| r.profile.online_activity.as_str()).collect::<Vec<_>>(),
            "has_partner" => rows.iter().map(|r| flag(r.profile.has_partner)).collect::<Vec<_>>(),
            "has_dependents" => rows.iter().map(|r| flag(r.profile.has_dependents)).collect::<Vec<_>>(),
            "churn" => rows.iter().map(|r| flag(r.churn)).collect::<Vec<_>>()
        )?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::record::{customer_id, CustomerProfile};

    fn sample() -> Dataset {
        let records = (0..4)
            .map(|i| {
                let profile = CustomerProfile {
                    age: 30 + i as u32,
                    ..Default::default()
                };
                CustomerRecord::new(customer_id(i), profile, i % 2 == 0)
            })
            .collect();
        Dataset::from_records(records)
    }

    #[test]
    fn test_labels_and_rate() {
        let ds = sample();
        assert_eq!(ds.labels().to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
        assert!((ds.churn_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = sample();
        let mut records = a.records().to_vec();
        assert_eq!(a.fingerprint().unwrap(), Dataset::from_records(records.clone()).fingerprint().unwrap());

        records[0].profile.age += 1;
        let b = Dataset::from_records(records);
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_to_dataframe_shape() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.shape(), (4, 15));
        assert!(df.column("total_charges").is_ok());
    }
}
