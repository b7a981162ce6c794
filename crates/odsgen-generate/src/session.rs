use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use odsgen_core::TableSchema;

use crate::catalog::GenerationCatalog;
use crate::errors::GenerationError;
use crate::fields::{FieldError, FieldRules, FieldValue, validate_field};
use crate::generators::RowSynthesizer;

/// One generated row, fields in schema declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub row_id: u64,
    pub fields: Vec<FieldValue>,
    /// Set when synthesis failed and the fallback row was used.
    pub fallback: Option<String>,
    /// Field failures, as (column index, error).
    pub field_errors: Vec<(usize, FieldError)>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_csv(&self) -> Vec<String> {
        self.fields.iter().map(FieldValue::to_csv).collect()
    }
}

/// Schema-bounded record generator for one session.
///
/// Owns the seeded RNG, so two generators built with the same seed, catalog
/// and clock yield the same records.
pub struct RecordGenerator<'a> {
    synth: RowSynthesizer<'a>,
    rules: Vec<FieldRules>,
    catalog: GenerationCatalog,
    rng: ChaCha8Rng,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(
        schema: &'a TableSchema,
        catalog: GenerationCatalog,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        let synth = RowSynthesizer::new(schema)?;
        let rules = schema.columns.iter().map(FieldRules::from_spec).collect();
        Ok(Self {
            synth,
            rules,
            catalog,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn schema(&self) -> &'a TableSchema {
        self.synth.schema()
    }

    /// Generate the record for `row_id`. Never fails: synthesis errors and
    /// panics degrade to the fallback row, field failures to empty fields.
    pub fn generate(&mut self, row_id: u64) -> Record {
        let synth = &self.synth;
        let catalog = &self.catalog;
        let rng = &mut self.rng;
        let outcome = catch_unwind(AssertUnwindSafe(|| synth.synthesize(row_id, catalog, rng)));

        let (raw, fallback) = match outcome {
            Ok(Ok(raw)) => (raw, None),
            Ok(Err(err)) => {
                warn!(row_id, error = %err, "row synthesis failed, using fallback row");
                (synth.fallback(row_id, catalog), Some(err.to_string()))
            }
            Err(panic) => {
                let message = panic_message(panic);
                warn!(row_id, error = %message, "row synthesis panicked, using fallback row");
                (synth.fallback(row_id, catalog), Some(message))
            }
        };

        let mut fields = Vec::with_capacity(self.rules.len());
        let mut field_errors = Vec::new();
        for (idx, (rules, value)) in self.rules.iter().zip(raw).enumerate() {
            match validate_field(rules, value) {
                Ok(value) => fields.push(value),
                Err(err) => {
                    debug!(row_id, column = %rules.name, error = %err, "field validation failed");
                    fields.push(FieldValue::Empty);
                    field_errors.push((idx, err));
                }
            }
        }
        // a short raw row still yields one field per column
        fields.resize(self.rules.len(), FieldValue::Empty);

        Record {
            row_id,
            fields,
            fallback,
            field_errors,
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during row synthesis".to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use odsgen_core::{ColumnSpec, Dataset, FieldGenerator, FieldType};

    use super::*;
    use crate::faker_rs::LocaleKey;
    use crate::model::Clock;

    fn clock() -> Clock {
        Clock::Fixed(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .and_then(|date| date.and_hms_opt(8, 30, 0))
                .expect("instant"),
        )
    }

    #[test]
    fn records_match_schema_width() {
        let schema = Dataset::Employees.schema();
        let catalog = GenerationCatalog::for_schema(&schema, LocaleKey::FrFr, clock());
        let mut generator = RecordGenerator::new(&schema, catalog, 11).expect("generator");

        for row_id in 1..=50 {
            let record = generator.generate(row_id);
            assert_eq!(record.len(), schema.columns.len());
            assert!(record.fallback.is_none());
            assert!(record.field_errors.is_empty(), "{:?}", record.field_errors);
            assert_eq!(record.fields[0], FieldValue::Int(row_id as i64));
        }
    }

    #[test]
    fn failing_row_uses_validated_fallback() {
        let schema = TableSchema::new("t")
            .column(ColumnSpec::new("id", FieldType::Int64, FieldGenerator::RowId).required())
            .column(
                ColumnSpec::new(
                    "statut",
                    FieldType::String,
                    FieldGenerator::Choice {
                        list: "statuts".to_string(),
                    },
                )
                .max_length(3)
                .fallback("actif"),
            );
        // no list in the catalog: every row falls back
        let catalog = GenerationCatalog::new(LocaleKey::FrFr, clock());
        let mut generator = RecordGenerator::new(&schema, catalog, 1).expect("generator");

        let record = generator.generate(5);
        assert!(record.fallback.is_some());
        assert_eq!(record.to_csv(), vec!["5".to_string(), "act".to_string()]);
    }

    #[test]
    fn unparsable_fallback_becomes_empty_field() {
        let schema = TableSchema::new("t").column(
            ColumnSpec::new(
                "age",
                FieldType::Int64,
                FieldGenerator::Choice {
                    list: "missing".to_string(),
                },
            )
            .fallback("n/a"),
        );
        let catalog = GenerationCatalog::new(LocaleKey::FrFr, clock());
        let mut generator = RecordGenerator::new(&schema, catalog, 1).expect("generator");

        let record = generator.generate(1);
        assert_eq!(record.fields, vec![FieldValue::Empty]);
        assert_eq!(record.field_errors.len(), 1);
    }

    #[test]
    fn same_seed_same_records() {
        let schema = Dataset::Contracts.schema();
        let mut a = RecordGenerator::new(
            &schema,
            GenerationCatalog::for_schema(&schema, LocaleKey::FrFr, clock()),
            99,
        )
        .expect("generator");
        let mut b = RecordGenerator::new(
            &schema,
            GenerationCatalog::for_schema(&schema, LocaleKey::FrFr, clock()),
            99,
        )
        .expect("generator");

        for row_id in 1..=20 {
            assert_eq!(a.generate(row_id), b.generate(row_id));
        }
    }
}
