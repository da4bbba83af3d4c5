//! End-to-end pipeline: validate, normalize, filter, build the star schema, compute KPIs
//!
//! Every run is a pure function of the input table and the filter. Nothing is
//! kept between runs, so repeating a run yields identical output.

use crate::core::error::{Outcome, PipelineError};
use crate::core::filter::{FilterOptions, FilterSpec};
use crate::core::kpi::{self, KpiSettings, KpiSummary, NamedSummary};
use crate::core::models::RawTable;
use crate::core::normalize::{normalize, NormalizationReport};
use crate::core::schema::SchemaSpec;
use crate::core::star::StarSchema;
use tracing::{debug, info, warn};

/// Star schema and KPI tables of one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    /// Dimension and fact tables
    pub star: StarSchema,
    /// KPIs over the whole view
    pub overall: KpiSummary,
    /// KPIs per production line
    pub by_line: Vec<NamedSummary>,
    /// KPIs per shift
    pub by_shift: Vec<NamedSummary>,
    /// KPIs per product × modification
    pub by_product: Vec<NamedSummary>,
    /// KPIs per month, chronological
    pub by_month: Vec<NamedSummary>,
    /// KPIs per year, chronological
    pub by_year: Vec<NamedSummary>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Row counts of the normalization step
    pub normalization: NormalizationReport,
    /// Filter values available in the normalized data
    pub options: FilterOptions,
    /// Rows left after filtering
    pub filtered_rows: usize,
    /// The analysis, or [`Outcome::NoData`] when the filter matched nothing
    pub view: Outcome<AnalysisView>,
}

/// Configured pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    schema: SchemaSpec,
    settings: KpiSettings,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(KpiSettings::default())
    }
}

impl Pipeline {
    /// Pipeline over the production schema
    #[must_use]
    pub fn new(settings: KpiSettings) -> Self {
        Self {
            schema: SchemaSpec::production(),
            settings,
        }
    }

    /// KPI settings in use
    #[must_use]
    pub const fn settings(&self) -> &KpiSettings {
        &self.settings
    }

    /// Run every stage on `table` restricted by `filter`.
    ///
    /// # Errors
    /// Returns [`PipelineError::Schema`] when required columns are missing;
    /// no dimension or fact table is built in that case.
    /// [`PipelineError::Integrity`] signals an internal inconsistency.
    pub fn run(&self, table: &RawTable, filter: &FilterSpec) -> Result<PipelineRun, PipelineError> {
        let table = self.schema.validate(table)?;

        let normalized = normalize(table);
        let options = FilterOptions::from_records(&normalized.records);
        let filtered = filter.apply(&normalized.records);
        debug!(
            normalized = normalized.records.len(),
            filtered = filtered.len(),
            "filter applied"
        );

        if filtered.is_empty() {
            warn!("no rows match the current filter");
            return Ok(PipelineRun {
                normalization: normalized.report,
                options,
                filtered_rows: 0,
                view: Outcome::NoData,
            });
        }

        let star = StarSchema::build(&filtered)?;
        let view = match kpi::overall(&star, &self.settings) {
            Outcome::Ready(overall) => Outcome::Ready(AnalysisView {
                overall,
                by_line: kpi::by_line(&star, &self.settings),
                by_shift: kpi::by_shift(&star, &self.settings),
                by_product: kpi::by_product(&star, &self.settings),
                by_month: kpi::by_month(&star, &self.settings),
                by_year: kpi::by_year(&star, &self.settings),
                star,
            }),
            Outcome::NoData => Outcome::NoData,
        };
        info!(facts = filtered.len(), "analysis view built");

        Ok(PipelineRun {
            normalization: normalized.report,
            options,
            filtered_rows: filtered.len(),
            view,
        })
    }
}
