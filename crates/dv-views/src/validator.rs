//! View capability validation
//!
//! Filters the candidate views of an answer down to the ones the decoded
//! data can actually back, resolving every suggested axis and column name
//! against the schema on the way.

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};
use dv_data::ColumnNameResolver;

use crate::answer::{AnswerContext, CandidateView, ChartConfig, ChartKind, OneOrMany};
use crate::ViewError;

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Chart kinds the renderer can draw
    pub renderable_charts: Vec<ChartKind>,

    /// Chart kind assumed when a chart config names none
    pub default_chart: ChartKind,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            renderable_charts: vec![
                ChartKind::Bar,
                ChartKind::Line,
                ChartKind::Funnel,
                ChartKind::Column,
            ],
            default_chart: ChartKind::Bar,
        }
    }
}

/// Chart config after name resolution, plus whether it can be drawn
struct ResolvedChart {
    config: ChartConfig,
    renderable_types: Vec<ChartKind>,
}

impl ResolvedChart {
    fn is_renderable(&self) -> bool {
        !self.renderable_types.is_empty()
            && self.config.x_axis.is_some()
            && !self.config.y_axis().is_empty()
    }
}

/// Decides which candidate views of an answer are renderable
#[derive(Debug, Clone, Default)]
pub struct ViewCapabilityValidator {
    config: ValidatorConfig,
}

impl ViewCapabilityValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Normalize the answer and keep only renderable candidate views.
    ///
    /// The answer is consumed and a new one returned, with candidate views,
    /// chart config and table columns replaced by their normalized forms.
    /// Fails when no candidate view survives. Answers flagged `skip_data`
    /// pass through untouched.
    pub fn normalize_and_validate(&self, mut answer: AnswerContext) -> Result<AnswerContext, ViewError> {
        if answer.skip_data {
            debug!("Answer skips data validation, passing through");
            return Ok(answer);
        }

        let candidates = std::mem::take(&mut answer.candidate_views).into_vec();
        let resolver = answer.schema.as_ref().map(ColumnNameResolver::new);

        let chart = answer
            .chart_config
            .take()
            .map(|config| self.resolve_chart(config, resolver.as_ref()));

        let table_columns = answer.table_columns.take().map(|columns| {
            let resolved = resolve_all(resolver.as_ref(), &columns);
            if resolved.len() < columns.len() {
                debug!("Dropped {} unresolved table columns", columns.len() - resolved.len());
            }
            resolved
        });

        let chart_valid = chart.as_ref().is_some_and(ResolvedChart::is_renderable);
        let table_valid = table_columns.as_ref().is_some_and(|columns| !columns.is_empty());

        let (valid, rejected): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|view| match view {
                CandidateView::Chart => chart_valid,
                CandidateView::Table => table_valid,
                CandidateView::Other(_) => false,
            });

        if valid.is_empty() {
            warn!("No renderable view among candidates {:?}", rejected);
            return Err(ViewError::NoRenderableView { rejected });
        }

        info!("Renderable views: {:?}, rejected: {:?}", valid, rejected);

        answer.chart_config = chart.map(|chart| {
            let mut config = chart.config;
            if chart_valid && valid.contains(&CandidateView::Chart) {
                config.supported_types = Some(OneOrMany::Many(chart.renderable_types));
            }
            config
        });
        answer.table_columns = table_columns;
        answer.candidate_views = OneOrMany::Many(valid);

        Ok(answer)
    }

    fn resolve_chart(
        &self,
        config: ChartConfig,
        resolver: Option<&ColumnNameResolver<'_>>,
    ) -> ResolvedChart {
        let supported = config
            .supported_types
            .map(OneOrMany::into_vec)
            .unwrap_or_else(|| vec![self.config.default_chart.clone()]);

        let renderable_types = supported
            .iter()
            .filter(|kind| self.config.renderable_charts.contains(kind))
            .cloned()
            .collect();

        let x_axis = config.x_axis.as_deref().and_then(|name| resolve(resolver, name));
        if config.x_axis.is_some() && x_axis.is_none() {
            debug!("Chart x axis {:?} does not resolve", config.x_axis);
        }

        let y_axis = config.y_axis.map(|names| {
            let names = names.into_vec();
            let resolved = resolve_all(resolver, &names);
            if resolved.len() < names.len() {
                debug!("Dropped {} unresolved y axis columns", names.len() - resolved.len());
            }
            OneOrMany::Many(resolved)
        });

        let z_axis = config.z_axis.as_deref().and_then(|name| resolve(resolver, name));

        ResolvedChart {
            config: ChartConfig {
                supported_types: Some(OneOrMany::Many(supported)),
                x_axis,
                y_axis,
                z_axis,
            },
            renderable_types,
        }
    }
}

fn resolve(resolver: Option<&ColumnNameResolver<'_>>, name: &str) -> Option<String> {
    resolver?.resolve(name).map(str::to_owned)
}

fn resolve_all(resolver: Option<&ColumnNameResolver<'_>>, names: &[String]) -> Vec<String> {
    match resolver {
        Some(resolver) => resolver.resolve_all(names.iter().map(String::as_str)),
        None => Vec::new(),
    }
}

/// Validate an answer with the default renderer capabilities
pub fn normalize_and_validate(answer: AnswerContext) -> Result<AnswerContext, ViewError> {
    ViewCapabilityValidator::new().normalize_and_validate(answer)
}
