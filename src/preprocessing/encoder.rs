//! Categorical label encoding

use crate::error::{ChurnError, Result};
use crate::synthetic::{CategoricalColumn, CustomerProfile, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label encoder for one categorical column.
///
/// Codes `0..k` are assigned in the order categories are first encountered
/// during fit, not alphabetically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    mapping: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            classes: Vec::new(),
            mapping: HashMap::new(),
        }
    }

    /// Fit on a sequence of values, replacing any previous fit
    pub fn fit<'a, I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.classes.clear();
        self.mapping.clear();
        for val in values {
            if !self.mapping.contains_key(val) {
                self.mapping.insert(val.to_string(), self.classes.len());
                self.classes.push(val.to_string());
            }
        }
        self
    }

    pub fn encode(&self, value: &str) -> Result<usize> {
        self.mapping
            .get(value)
            .copied()
            .ok_or_else(|| ChurnError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Fitted categories in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Fitted encoders for the categorical columns of a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    encoders: Vec<(CategoricalColumn, LabelEncoder)>,
}

impl CategoricalEncoders {
    /// Fit one encoder per requested column over the dataset, in row order
    pub fn fit(dataset: &Dataset, columns: &[CategoricalColumn]) -> Self {
        let encoders = columns
            .iter()
            .map(|&column| {
                let mut encoder = LabelEncoder::new(column.name());
                encoder.fit(dataset.iter().map(|r| column.value(&r.profile)));
                (column, encoder)
            })
            .collect();
        Self { encoders }
    }

    pub fn get(&self, column: CategoricalColumn) -> Option<&LabelEncoder> {
        self.encoders
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, e)| e)
    }

    /// Encode one column of a profile
    pub fn encode(&self, column: CategoricalColumn, profile: &CustomerProfile) -> Result<usize> {
        self.get(column)
            .ok_or_else(|| ChurnError::FeatureNotFound(format!("{}_encoded", column.name())))?
            .encode(column.value(profile))
    }

    pub fn columns(&self) -> impl Iterator<Item = CategoricalColumn> + '_ {
        self.encoders.iter().map(|(c, _)| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{customer_id, CustomerRecord};

    #[test]
    fn test_first_occurrence_order() {
        let mut encoder = LabelEncoder::new("contract_type");
        encoder.fit(["Annuel", "Mensuel", "Annuel", "Bi-annuel", "Mensuel"]);

        assert_eq!(encoder.encode("Annuel").unwrap(), 0);
        assert_eq!(encoder.encode("Mensuel").unwrap(), 1);
        assert_eq!(encoder.encode("Bi-annuel").unwrap(), 2);
        assert_eq!(encoder.classes(), &["Annuel", "Mensuel", "Bi-annuel"]);
    }

    #[test]
    fn test_bijection() {
        let mut encoder = LabelEncoder::new("online_activity");
        encoder.fit(["Élevée", "Faible", "Moyenne"]);
        for class in encoder.classes() {
            let code = encoder.encode(class).unwrap();
            assert_eq!(encoder.decode(code), Some(class.as_str()));
        }
        assert_eq!(encoder.decode(3), None);
    }

    #[test]
    fn test_unknown_category() {
        let mut encoder = LabelEncoder::new("gender");
        encoder.fit(["Homme"]);
        match encoder.encode("Femme") {
            Err(ChurnError::UnknownCategory { column, value }) => {
                assert_eq!(column, "gender");
                assert_eq!(value, "Femme");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_encoder() {
        let records = vec![CustomerRecord::new(
            customer_id(0),
            CustomerProfile::default(),
            false,
        )];
        let ds = Dataset::from_records(records);
        let encoders = CategoricalEncoders::fit(&ds, &[CategoricalColumn::Gender]);

        let profile = CustomerProfile::default();
        assert_eq!(encoders.encode(CategoricalColumn::Gender, &profile).unwrap(), 0);
        assert!(matches!(
            encoders.encode(CategoricalColumn::PaymentMethod, &profile),
            Err(ChurnError::FeatureNotFound(_))
        ));
    }
}
