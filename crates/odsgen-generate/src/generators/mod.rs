use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rand::Rng;

use odsgen_core::{DATE_FORMAT, FieldGenerator, TableSchema, derivation_order, parse_date};

use crate::catalog::GenerationCatalog;
use crate::errors::GenerationError;
use crate::faker_rs::FakeKind;

/// Timestamp format written for `timestamp` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Raw value produced for a column, before field validation.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl GeneratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GeneratedValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GeneratedValue::Null => "null",
            GeneratedValue::Int(_) => "int",
            GeneratedValue::Float(_) => "float",
            GeneratedValue::Text(_) => "text",
            GeneratedValue::Date(_) => "date",
            GeneratedValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeneratedValue::Int(value) => Some(*value as f64),
            GeneratedValue::Float(value) => Some(*value),
            GeneratedValue::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            GeneratedValue::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            GeneratedValue::Date(value) => Some(*value),
            GeneratedValue::Timestamp(value) => Some(value.date()),
            GeneratedValue::Text(value) => parse_date(value),
            _ => None,
        }
    }

    /// Text rendering used when a value lands in a string column.
    pub fn render(&self) -> String {
        match self {
            GeneratedValue::Null => String::new(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Float(value) => value.to_string(),
            GeneratedValue::Text(value) => value.clone(),
            GeneratedValue::Date(value) => value.format(DATE_FORMAT).to_string(),
            GeneratedValue::Timestamp(value) => value.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Synthesizes the raw values of one row, column generators evaluated in
/// dependency order.
#[derive(Debug, Clone)]
pub struct RowSynthesizer<'a> {
    schema: &'a TableSchema,
    order: Vec<usize>,
    plans: Vec<ColumnPlan<'a>>,
}

#[derive(Debug, Clone)]
struct ColumnPlan<'a> {
    name: &'a str,
    generator: &'a FieldGenerator,
    inputs: Vec<usize>,
    date_range: Option<(NaiveDate, i64)>,
}

impl<'a> RowSynthesizer<'a> {
    pub fn new(schema: &'a TableSchema) -> Result<Self, GenerationError> {
        let order = derivation_order(schema).map_err(|stuck| {
            GenerationError::InvalidSchema(format!(
                "cyclic derived columns: {}",
                stuck.join(", ")
            ))
        })?;

        let mut plans = Vec::with_capacity(schema.columns.len());
        for column in &schema.columns {
            let mut inputs = Vec::new();
            for input in column.generator.inputs() {
                let idx = schema.column_index(input).ok_or_else(|| {
                    GenerationError::InvalidSchema(format!(
                        "{}: unknown input column '{input}'",
                        column.name
                    ))
                })?;
                inputs.push(idx);
            }

            let date_range = match &column.generator {
                FieldGenerator::DateRange { min, max } => {
                    let (Some(min), Some(max)) = (parse_date(min), parse_date(max)) else {
                        return Err(GenerationError::InvalidSchema(format!(
                            "{}: invalid date_range bounds",
                            column.name
                        )));
                    };
                    Some((min, (max - min).num_days().max(0)))
                }
                _ => None,
            };

            plans.push(ColumnPlan {
                name: &column.name,
                generator: &column.generator,
                inputs,
                date_range,
            });
        }

        Ok(Self {
            schema,
            order,
            plans,
        })
    }

    pub fn schema(&self) -> &'a TableSchema {
        self.schema
    }

    /// Raw values for `row_id`, indexed like the schema columns.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        row_id: u64,
        catalog: &GenerationCatalog,
        rng: &mut R,
    ) -> Result<Vec<GeneratedValue>, GenerationError> {
        let mut row = vec![GeneratedValue::Null; self.plans.len()];
        for &idx in &self.order {
            let plan = &self.plans[idx];
            row[idx] = generate_value(plan, row_id, &row, catalog, rng)?;
        }
        Ok(row)
    }

    /// Safe defaults used when a whole row could not be synthesized.
    ///
    /// Columns take their declared `fallback` literal (`{row_id}` is
    /// substituted), row ids and `now` columns keep their natural value,
    /// anything else is null.
    pub fn fallback(&self, row_id: u64, catalog: &GenerationCatalog) -> Vec<GeneratedValue> {
        self.schema
            .columns
            .iter()
            .map(|column| match (&column.fallback, &column.generator) {
                (Some(literal), FieldGenerator::Reference { width, .. }) => {
                    let width = *width;
                    GeneratedValue::Text(
                        literal.replace("{row_id}", &format!("{row_id:0width$}")),
                    )
                }
                (Some(literal), _) => {
                    GeneratedValue::Text(literal.replace("{row_id}", &row_id.to_string()))
                }
                (None, FieldGenerator::RowId) => GeneratedValue::Int(row_id as i64),
                (None, FieldGenerator::Now) => GeneratedValue::Timestamp(catalog.clock().now()),
                (None, _) => GeneratedValue::Null,
            })
            .collect()
    }
}

fn generate_value<R: Rng + ?Sized>(
    plan: &ColumnPlan<'_>,
    row_id: u64,
    row: &[GeneratedValue],
    catalog: &GenerationCatalog,
    rng: &mut R,
) -> Result<GeneratedValue, GenerationError> {
    let value = match plan.generator {
        FieldGenerator::RowId => GeneratedValue::Int(row_id as i64),
        FieldGenerator::FirstName => GeneratedValue::Text(catalog.fake(FakeKind::FirstName, rng)),
        FieldGenerator::LastName => GeneratedValue::Text(catalog.fake(FakeKind::LastName, rng)),
        FieldGenerator::FullName => GeneratedValue::Text(catalog.fake(FakeKind::FullName, rng)),
        FieldGenerator::Email => GeneratedValue::Text(catalog.fake(FakeKind::Email, rng)),
        FieldGenerator::Company => GeneratedValue::Text(catalog.fake(FakeKind::Company, rng)),
        FieldGenerator::PostCode => GeneratedValue::Text(catalog.fake(FakeKind::PostCode, rng)),
        FieldGenerator::PhoneNumber => {
            GeneratedValue::Text(catalog.fake(FakeKind::PhoneNumber, rng))
        }
        FieldGenerator::Choice { list } => GeneratedValue::Text(catalog.pick(list, rng)?.to_string()),
        FieldGenerator::IntRange { min, max } => GeneratedValue::Int(rng.random_range(*min..=*max)),
        FieldGenerator::FloatRange { min, max } => {
            GeneratedValue::Float(rng.random_range(*min..=*max))
        }
        FieldGenerator::DateRange { .. } => {
            let (min, span) = plan
                .date_range
                .ok_or_else(|| synthesis_error(plan, "date range was not prepared"))?;
            let offset = rng.random_range(0..=span);
            GeneratedValue::Date(add_days(plan, min, offset)?)
        }
        FieldGenerator::DateOffset {
            min_days, max_days, ..
        } => {
            let from = input_date(plan, row, 0)?;
            let offset = rng.random_range(*min_days..=*max_days);
            GeneratedValue::Date(add_days(plan, from, offset)?)
        }
        FieldGenerator::DateAfterMonths { .. } => {
            let from = input_date(plan, row, 0)?;
            let months = input(plan, row, 1)?
                .as_i64()
                .ok_or_else(|| synthesis_error(plan, "months input is not an integer"))?;
            let days = months
                .checked_mul(30)
                .ok_or_else(|| synthesis_error(plan, "month offset overflows"))?;
            GeneratedValue::Date(add_days(plan, from, days)?)
        }
        FieldGenerator::Ratio { .. } => {
            let numerator = input(plan, row, 0)?
                .as_f64()
                .ok_or_else(|| synthesis_error(plan, "numerator is not numeric"))?;
            let denominator = input(plan, row, 1)?
                .as_f64()
                .ok_or_else(|| synthesis_error(plan, "denominator is not numeric"))?;
            if denominator == 0.0 {
                return Err(synthesis_error(plan, "division by zero"));
            }
            GeneratedValue::Float(numerator / denominator)
        }
        FieldGenerator::Reference { prefix, width, .. } => {
            let year = input_date(plan, row, 0)?.year();
            let width = *width;
            GeneratedValue::Text(format!("{prefix}-{year}-{row_id:0width$}"))
        }
        FieldGenerator::Lorem { max_chars } => GeneratedValue::Text(catalog.text(*max_chars, rng)),
        FieldGenerator::Uuid => GeneratedValue::Text(random_uuid(rng)),
        FieldGenerator::Now => GeneratedValue::Timestamp(catalog.clock().now()),
    };
    Ok(value)
}

fn input<'r>(
    plan: &ColumnPlan<'_>,
    row: &'r [GeneratedValue],
    position: usize,
) -> Result<&'r GeneratedValue, GenerationError> {
    plan.inputs
        .get(position)
        .and_then(|idx| row.get(*idx))
        .filter(|value| !value.is_null())
        .ok_or_else(|| synthesis_error(plan, "input column has no value"))
}

fn input_date(
    plan: &ColumnPlan<'_>,
    row: &[GeneratedValue],
    position: usize,
) -> Result<NaiveDate, GenerationError> {
    input(plan, row, position)?
        .as_date()
        .ok_or_else(|| synthesis_error(plan, "input column is not a date"))
}

fn add_days(plan: &ColumnPlan<'_>, date: NaiveDate, days: i64) -> Result<NaiveDate, GenerationError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| synthesis_error(plan, "date out of range"))
}

fn synthesis_error(plan: &ColumnPlan<'_>, message: &str) -> GenerationError {
    GenerationError::Synthesis {
        column: plan.name.to_string(),
        message: message.to_string(),
    }
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.random();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use odsgen_core::{ColumnSpec, Dataset, FieldType};

    use super::*;
    use crate::faker_rs::LocaleKey;
    use crate::model::Clock;

    fn fixed_clock() -> Clock {
        let instant = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid instant");
        Clock::Fixed(instant)
    }

    #[test]
    fn contract_derived_columns_are_consistent() {
        let schema = Dataset::Contracts.schema();
        let catalog = GenerationCatalog::for_schema(&schema, LocaleKey::FrFr, fixed_clock());
        let synth = RowSynthesizer::new(&schema).expect("synthesizer");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let row = synth.synthesize(42, &catalog, &mut rng).expect("row");
        let idx = |name: &str| schema.column_index(name).expect("column");

        let signature = row[idx("date_signature")].as_date().expect("signature");
        let debut = row[idx("date_debut")].as_date().expect("debut");
        let fin = row[idx("date_fin")].as_date().expect("fin");
        let months = row[idx("duree_mois")].as_i64().expect("months");
        assert!((1..=30).contains(&(debut - signature).num_days()));
        assert_eq!((fin - debut).num_days(), months * 30);

        let total = row[idx("montant_total")].as_f64().expect("total");
        let monthly = row[idx("montant_mensuel")].as_f64().expect("monthly");
        assert!((monthly - total / months as f64).abs() < 1e-9);

        let reference = row[idx("numero_contrat")].render();
        assert_eq!(
            reference,
            format!("CTR-{}-000042", signature.year())
        );
    }

    #[test]
    fn missing_list_fails_the_row() {
        let schema = TableSchema::new("t").column(ColumnSpec::new(
            "ville",
            FieldType::String,
            FieldGenerator::Choice {
                list: "villes".to_string(),
            },
        ));
        let catalog = GenerationCatalog::new(LocaleKey::FrFr, fixed_clock());
        let synth = RowSynthesizer::new(&schema).expect("synthesizer");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let result = synth.synthesize(1, &catalog, &mut rng);
        assert!(matches!(result, Err(GenerationError::Catalog(_))));
    }

    #[test]
    fn fallback_substitutes_row_id() {
        let schema = Dataset::Contracts.schema();
        let catalog = GenerationCatalog::for_schema(&schema, LocaleKey::FrFr, fixed_clock());
        let synth = RowSynthesizer::new(&schema).expect("synthesizer");

        let row = synth.fallback(7, &catalog);
        assert_eq!(row.len(), schema.columns.len());
        assert_eq!(row[0], GeneratedValue::Int(7));
        assert_eq!(row[1].render(), "CTR-2023-000007");
        assert_eq!(row[2], GeneratedValue::Null);
        assert_eq!(row[5].render(), "CDI");
    }

    #[test]
    fn generated_uuid_is_version_4() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let value = random_uuid(&mut rng);
        let parsed = uuid::Uuid::parse_str(&value).expect("uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }
}
