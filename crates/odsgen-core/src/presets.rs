//! Built-in ODS table schemas.
//!
//! Column order and bounds mirror the raw-ingest tables the generated files
//! are loaded into; do not reorder columns.

use std::str::FromStr;

use crate::error::Error;
use crate::schema::{ColumnSpec, TableSchema};
use crate::types::{FieldGenerator, FieldType};

/// Built-in datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Employees,
    Contracts,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Employees, Dataset::Contracts];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Contracts => "contracts",
        }
    }

    /// Prefix of generated file names, e.g. `contract_5mb.csv`.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Contracts => "contract",
        }
    }

    pub fn schema(self) -> TableSchema {
        match self {
            Self::Employees => employees_schema(),
            Self::Contracts => contracts_schema(),
        }
    }
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employees" | "employee" => Ok(Self::Employees),
            "contracts" | "contract" => Ok(Self::Contracts),
            other => Err(Error::UnknownPreset(other.to_string())),
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn string(name: &str, max_length: usize, generator: FieldGenerator) -> ColumnSpec {
    ColumnSpec::new(name, FieldType::String, generator).max_length(max_length)
}

fn choice(name: &str, max_length: usize, list: &str) -> ColumnSpec {
    string(
        name,
        max_length,
        FieldGenerator::Choice {
            list: list.to_string(),
        },
    )
}

fn float_range(name: &str, min: f64, max: f64) -> ColumnSpec {
    ColumnSpec::new(name, FieldType::Float64, FieldGenerator::FloatRange { min, max })
}

fn date_range(min: &str, max: &str) -> FieldGenerator {
    FieldGenerator::DateRange {
        min: min.to_string(),
        max: max.to_string(),
    }
}

/// `ods.employees`: 20 columns.
pub fn employees_schema() -> TableSchema {
    TableSchema::new("employees")
        .column(ColumnSpec::new("id", FieldType::Int64, FieldGenerator::RowId).required().min(1.0))
        .column(string("nom", 50, FieldGenerator::LastName))
        .column(string("prenom", 50, FieldGenerator::FirstName))
        .column(string("email", 100, FieldGenerator::Email))
        .column(
            ColumnSpec::new(
                "age",
                FieldType::Int64,
                FieldGenerator::IntRange { min: 18, max: 65 },
            )
            .bounds(16.0, 70.0)
            .fallback("25"),
        )
        .column(choice("ville", 50, "villes"))
        .column(string("code_postal", 10, FieldGenerator::PostCode))
        .column(string("telephone", 20, FieldGenerator::PhoneNumber))
        .column(
            float_range("salaire", 25_000.0, 120_000.0)
                .bounds(20_000.0, 150_000.0)
                .scale(2)
                .fallback("30000.0"),
        )
        .column(choice("departement", 50, "departements"))
        .column(
            ColumnSpec::new(
                "date_embauche",
                FieldType::Date,
                date_range("2020-01-01", "2024-12-31"),
            )
            .date_bounds("2020-01-01", "2024-12-31")
            .fallback("2023-01-01"),
        )
        .column(choice("statut", 20, "statuts").fallback("actif"))
        .column(float_range("score", 0.0, 100.0).bounds(0.0, 100.0).scale(2).fallback("50.0"))
        .column(float_range("latitude", 42.0, 51.0).bounds(42.0, 51.0).scale(6).fallback("46.0"))
        .column(float_range("longitude", -5.0, 8.0).bounds(-5.0, 8.0).scale(6).fallback("2.0"))
        .column(string("commentaire", 200, FieldGenerator::Lorem { max_chars: 150 }))
        .column(string("reference", 50, FieldGenerator::Uuid))
        .column(choice("niveau", 20, "niveaux").fallback("junior"))
        .column(choice("categorie", 5, "categories").fallback("A"))
        .column(ColumnSpec::new("timestamp", FieldType::Timestamp, FieldGenerator::Now))
        .list(
            "villes",
            [
                "Paris",
                "Lyon",
                "Marseille",
                "Toulouse",
                "Nice",
                "Nantes",
                "Strasbourg",
                "Montpellier",
                "Bordeaux",
                "Lille",
            ],
        )
        .list(
            "departements",
            [
                "IT",
                "RH",
                "Marketing",
                "Finance",
                "Commercial",
                "Production",
                "Logistique",
                "R&D",
            ],
        )
        .list("statuts", ["actif", "inactif"])
        .list("niveaux", ["junior", "senior", "expert"])
        .list("categories", ["A", "B", "C"])
}

/// `ods.contract`: 20 columns, several derived from each other.
pub fn contracts_schema() -> TableSchema {
    TableSchema::new("contracts")
        .column(
            ColumnSpec::new("contract_id", FieldType::Int64, FieldGenerator::RowId)
                .required()
                .min(1.0),
        )
        .column(
            string(
                "numero_contrat",
                50,
                FieldGenerator::Reference {
                    prefix: "CTR".to_string(),
                    year_from: "date_signature".to_string(),
                    width: 6,
                },
            )
            .fallback("CTR-2023-{row_id}"),
        )
        .column(string("nom_client", 100, FieldGenerator::FullName))
        .column(string("entreprise", 100, FieldGenerator::Company))
        .column(string("email_contact", 100, FieldGenerator::Email))
        .column(choice("type_contrat", 20, "types_contrat").fallback("CDI"))
        .column(choice("departement", 50, "departements").fallback("IT"))
        .column(
            float_range("montant_total", 5_000.0, 2_000_000.0)
                .bounds(1_000.0, 5_000_000.0)
                .scale(2)
                .fallback("50000.0"),
        )
        .column(choice("devise", 3, "devises").fallback("EUR"))
        .column(
            ColumnSpec::new(
                "date_signature",
                FieldType::Date,
                date_range("2020-01-01", "2024-12-31"),
            )
            .date_bounds("2020-01-01", "2024-12-31")
            .fallback("2023-01-01"),
        )
        .column(
            ColumnSpec::new(
                "date_debut",
                FieldType::Date,
                FieldGenerator::DateOffset {
                    from: "date_signature".to_string(),
                    min_days: 1,
                    max_days: 30,
                },
            )
            .date_bounds("2020-01-01", "2024-12-31")
            .fallback("2023-02-01"),
        )
        .column(
            ColumnSpec::new(
                "date_fin",
                FieldType::Date,
                FieldGenerator::DateAfterMonths {
                    from: "date_debut".to_string(),
                    months: "duree_mois".to_string(),
                },
            )
            .date_bounds("2020-01-01", "2025-12-31")
            .fallback("2024-02-01"),
        )
        .column(
            ColumnSpec::new(
                "duree_mois",
                FieldType::Int64,
                FieldGenerator::IntRange { min: 1, max: 48 },
            )
            .bounds(1.0, 60.0)
            .fallback("12"),
        )
        .column(choice("statut", 20, "statuts_contrat").fallback("actif"))
        .column(choice("priorite", 15, "priorites").fallback("moyenne"))
        .column(string("description", 500, FieldGenerator::Lorem { max_chars: 400 }))
        .column(string("referent_interne", 100, FieldGenerator::FullName))
        .column(
            ColumnSpec::new(
                "montant_mensuel",
                FieldType::Float64,
                FieldGenerator::Ratio {
                    numerator: "montant_total".to_string(),
                    denominator: "duree_mois".to_string(),
                },
            )
            .bounds(100.0, 500_000.0)
            .scale(2)
            .fallback("4166.67"),
        )
        .column(
            float_range("pourcentage_completion", 0.0, 100.0)
                .bounds(0.0, 100.0)
                .scale(1)
                .fallback("50.0"),
        )
        .column(ColumnSpec::new("timestamp", FieldType::Timestamp, FieldGenerator::Now))
        .list(
            "types_contrat",
            ["CDI", "CDD", "Stage", "Freelance", "Prestation", "Consultant"],
        )
        .list(
            "statuts_contrat",
            ["actif", "expire", "suspendu", "resilié", "en_cours", "signe"],
        )
        .list(
            "departements",
            [
                "IT",
                "RH",
                "Marketing",
                "Finance",
                "Commercial",
                "Production",
                "Logistique",
                "R&D",
                "Direction",
                "Support",
            ],
        )
        .list("priorites", ["haute", "moyenne", "basse", "critique"])
        .list("devises", ["EUR", "USD", "GBP"])
}
