//! Data model shared by extraction, merging, report parsing and rendering.
//!
//! The eleven extracted fields and the sentinel string are a contract with
//! every renderer and downstream consumer: field keys are serialised in
//! `snake_case` exactly as listed in [`Field::ALL`], and a missing value is
//! always spelled [`NOT_PROVIDED`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stand-in value for any field the document does not answer.
pub const NOT_PROVIDED: &str = "Information not provided in the document.";

// ── Fields ───────────────────────────────────────────────────────────────

/// One of the eleven business fields extracted from an executive summary.
///
/// Declaration order is the canonical field order; `Ord` follows it so a
/// `BTreeMap<Field, _>` iterates in the same order as [`Field::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CompanyName,
    TechnologyType,
    NeedAddressed,
    MarketSize,
    MarketCalculationMethod,
    ProductDevelopmentStage,
    CurrentSales,
    ExitValueRange,
    YearsToExit,
    InvestmentNeeded,
    MissingSkills,
}

impl Field {
    /// Every field, in canonical order.
    pub const ALL: [Field; 11] = [
        Field::CompanyName,
        Field::TechnologyType,
        Field::NeedAddressed,
        Field::MarketSize,
        Field::MarketCalculationMethod,
        Field::ProductDevelopmentStage,
        Field::CurrentSales,
        Field::ExitValueRange,
        Field::YearsToExit,
        Field::InvestmentNeeded,
        Field::MissingSkills,
    ];

    /// JSON key used in LLM replies and serialised output.
    pub fn key(self) -> &'static str {
        match self {
            Field::CompanyName => "company_name",
            Field::TechnologyType => "technology_type",
            Field::NeedAddressed => "need_addressed",
            Field::MarketSize => "market_size",
            Field::MarketCalculationMethod => "market_calculation_method",
            Field::ProductDevelopmentStage => "product_development_stage",
            Field::CurrentSales => "current_sales",
            Field::ExitValueRange => "exit_value_range",
            Field::YearsToExit => "years_to_exit",
            Field::InvestmentNeeded => "investment_needed",
            Field::MissingSkills => "missing_skills",
        }
    }

    /// Human-readable label used by the renderers.
    pub fn label(self) -> &'static str {
        match self {
            Field::CompanyName => "Company Name",
            Field::TechnologyType => "Technology Type",
            Field::NeedAddressed => "Need Addressed",
            Field::MarketSize => "Market Size",
            Field::MarketCalculationMethod => "Market Calculation",
            Field::ProductDevelopmentStage => "Development Stage",
            Field::CurrentSales => "Current Sales",
            Field::ExitValueRange => "Exit Value Range",
            Field::YearsToExit => "Years to Exit",
            Field::InvestmentNeeded => "Investment Needed",
            Field::MissingSkills => "Missing Skills",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn from_label(label: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The eleven field values of one document. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    pub company_name: String,
    pub technology_type: String,
    pub need_addressed: String,
    pub market_size: String,
    pub market_calculation_method: String,
    pub product_development_stage: String,
    pub current_sales: String,
    pub exit_value_range: String,
    pub years_to_exit: String,
    pub investment_needed: String,
    pub missing_skills: String,
}

impl Default for FieldSet {
    /// Every field set to [`NOT_PROVIDED`].
    fn default() -> Self {
        Self::from_fn(|_| NOT_PROVIDED.to_string())
    }
}

impl FieldSet {
    /// Build a field set by computing each value from its [`Field`].
    pub fn from_fn(mut value: impl FnMut(Field) -> String) -> Self {
        Self {
            company_name: value(Field::CompanyName),
            technology_type: value(Field::TechnologyType),
            need_addressed: value(Field::NeedAddressed),
            market_size: value(Field::MarketSize),
            market_calculation_method: value(Field::MarketCalculationMethod),
            product_development_stage: value(Field::ProductDevelopmentStage),
            current_sales: value(Field::CurrentSales),
            exit_value_range: value(Field::ExitValueRange),
            years_to_exit: value(Field::YearsToExit),
            investment_needed: value(Field::InvestmentNeeded),
            missing_skills: value(Field::MissingSkills),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::CompanyName => &self.company_name,
            Field::TechnologyType => &self.technology_type,
            Field::NeedAddressed => &self.need_addressed,
            Field::MarketSize => &self.market_size,
            Field::MarketCalculationMethod => &self.market_calculation_method,
            Field::ProductDevelopmentStage => &self.product_development_stage,
            Field::CurrentSales => &self.current_sales,
            Field::ExitValueRange => &self.exit_value_range,
            Field::YearsToExit => &self.years_to_exit,
            Field::InvestmentNeeded => &self.investment_needed,
            Field::MissingSkills => &self.missing_skills,
        }
    }

    /// `(field, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

// ── Extraction ───────────────────────────────────────────────────────────

/// One LLM extraction reply for one text chunk.
///
/// Fields the reply did not answer are simply absent from `values`; fields
/// without a reported confidence are absent from `confidence_scores` and
/// read as `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub values: BTreeMap<Field, String>,
    pub confidence_scores: BTreeMap<Field, f64>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, field: Field, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn with_confidence(mut self, field: Field, confidence: f64) -> Self {
        self.confidence_scores.insert(field, confidence);
        self
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn confidence(&self, field: Field) -> f64 {
        self.confidence_scores.get(&field).copied().unwrap_or(0.0)
    }

    /// Number of fields this reply answered with something other than a
    /// "not provided" statement.
    pub fn informative_fields(&self) -> usize {
        self.values.values().filter(|v| is_informative(v)).count()
    }
}

/// True when `value` is non-empty and not a "not provided" statement
/// (case-insensitive). Whitespace counts as content.
pub fn is_informative(value: &str) -> bool {
    !value.is_empty() && !value.to_lowercase().contains("not provided")
}

/// The merged, canonical extraction for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInformation {
    #[serde(flatten)]
    pub fields: FieldSet,
    pub extraction_timestamp: DateTime<Local>,
    pub confidence_scores: BTreeMap<Field, f64>,
}

impl ExtractedInformation {
    /// Stamp `fields` with the current local time.
    pub fn new(fields: FieldSet, confidence_scores: BTreeMap<Field, f64>) -> Self {
        Self {
            fields,
            extraction_timestamp: Local::now(),
            confidence_scores,
        }
    }

    /// All fields set to the sentinel, every confidence 0.
    pub fn not_provided() -> Self {
        Self::new(
            FieldSet::default(),
            Field::ALL.into_iter().map(|f| (f, 0.0)).collect(),
        )
    }

    pub fn get(&self, field: Field) -> &str {
        self.fields.get(field)
    }

    pub fn confidence(&self, field: Field) -> f64 {
        self.confidence_scores.get(&field).copied().unwrap_or(0.0)
    }

    pub fn company_name(&self) -> &str {
        &self.fields.company_name
    }
}

// ── Report ───────────────────────────────────────────────────────────────

/// One of the four report sections, in header-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    NatureAndState,
    MarketNeedAndSize,
    RoiElements,
    ManagementTeamStrength,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::NatureAndState,
        Section::MarketNeedAndSize,
        Section::RoiElements,
        Section::ManagementTeamStrength,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::NatureAndState => "nature_and_state",
            Section::MarketNeedAndSize => "market_need_and_size",
            Section::RoiElements => "roi_elements",
            Section::ManagementTeamStrength => "management_team_strength",
        }
    }

    /// Heading used in rendered reports.
    pub fn title(self) -> &'static str {
        match self {
            Section::NatureAndState => "Nature and State of the Product",
            Section::MarketNeedAndSize => "Market Need and Size",
            Section::RoiElements => "Elements of Potential ROI",
            Section::ManagementTeamStrength => "Strength of the Management Team",
        }
    }
}

/// The four text blocks of a generated report. Any of them may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSections {
    pub nature_and_state: String,
    pub market_need_and_size: String,
    pub roi_elements: String,
    pub management_team_strength: String,
}

impl ReportSections {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::NatureAndState => &self.nature_and_state,
            Section::MarketNeedAndSize => &self.market_need_and_size,
            Section::RoiElements => &self.roi_elements,
            Section::ManagementTeamStrength => &self.management_team_strength,
        }
    }

    pub fn get_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::NatureAndState => &mut self.nature_and_state,
            Section::MarketNeedAndSize => &mut self.market_need_and_size,
            Section::RoiElements => &mut self.roi_elements,
            Section::ManagementTeamStrength => &mut self.management_team_strength,
        }
    }

    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| self.get(*s).is_empty())
    }
}

/// Metadata copied from the [`ExtractedInformation`] a report was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub company_name: String,
    pub extraction_timestamp: DateTime<Local>,
    pub confidence_scores: BTreeMap<Field, f64>,
}

/// A parsed investment report plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub sections: ReportSections,
    pub metadata: ReportMetadata,
}

impl Report {
    pub fn new(sections: ReportSections, info: &ExtractedInformation) -> Self {
        Self {
            sections,
            metadata: ReportMetadata {
                company_name: info.company_name().to_string(),
                extraction_timestamp: info.extraction_timestamp,
                confidence_scores: info.confidence_scores.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_round_trip() {
        for f in Field::ALL {
            assert_eq!(Field::from_key(f.key()), Some(f));
            assert_eq!(Field::from_label(f.label()), Some(f));
        }
        assert_eq!(Field::from_key("confidence_scores"), None);
    }

    #[test]
    fn field_serde_matches_key() {
        for f in Field::ALL {
            let json = serde_json::to_string(&f).unwrap();
            assert_eq!(json, format!("\"{}\"", f.key()));
        }
    }

    #[test]
    fn default_field_set_is_all_sentinel() {
        let fs = FieldSet::default();
        assert!(fs.iter().all(|(_, v)| v == NOT_PROVIDED));
        assert_eq!(fs.iter().count(), 11);
    }

    #[test]
    fn informative_rejects_empty_and_not_provided() {
        assert!(is_informative("Acme Robotics"));
        assert!(is_informative("   "));
        assert!(!is_informative(""));
        assert!(!is_informative(NOT_PROVIDED));
        assert!(!is_informative("Sales figures NOT PROVIDED"));
    }

    #[test]
    fn extracted_information_serialises_flat() {
        let info = ExtractedInformation::not_provided();
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v["company_name"], NOT_PROVIDED);
        assert_eq!(v["confidence_scores"]["missing_skills"], 0.0);
        assert!(v["extraction_timestamp"].is_string());
    }

    #[test]
    fn report_copies_metadata() {
        let mut info = ExtractedInformation::not_provided();
        info.fields.company_name = "Acme".into();
        info.confidence_scores.insert(Field::CompanyName, 0.9);
        let report = Report::new(ReportSections::default(), &info);
        assert_eq!(report.metadata.company_name, "Acme");
        assert_eq!(report.metadata.extraction_timestamp, info.extraction_timestamp);
        assert_eq!(report.metadata.confidence_scores[&Field::CompanyName], 0.9);

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["roi_elements"], "");
        assert_eq!(v["metadata"]["company_name"], "Acme");
    }
}
