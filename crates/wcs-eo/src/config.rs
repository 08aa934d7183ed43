//! EO service configuration loading and types.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::axis::AxisLabelParser;
use crate::granule::DimensionDescriptor;

/// EO configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EoConfig {
    /// Default cap on the number of coverages a DescribeEOCoverageSet returns.
    #[serde(default)]
    pub count_default: Option<u32>,

    /// Axis URI prefixes stripped in addition to the built-in ones.
    #[serde(default)]
    pub axis_prefixes: Vec<String>,

    #[serde(default)]
    pub coverages: Vec<CoverageConfig>,
}

impl EoConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            "Loaded {} EO coverages from {:?}",
            config.coverages.len(),
            path
        );
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: EoConfig = serde_yaml::from_str(content).context("Invalid EO configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for coverage in &self.coverages {
            if coverage.name.trim().is_empty() {
                anyhow::bail!("Coverage with empty name in EO configuration");
            }
            if !seen.insert(coverage.prefixed_name()) {
                anyhow::bail!("Duplicate coverage in EO configuration: {}", coverage.prefixed_name());
            }
            if coverage.dataset && !coverage.has_time() {
                tracing::warn!(
                    coverage = %coverage.prefixed_name(),
                    "Coverage is flagged as dataset but has no enabled time dimension"
                );
            }
        }
        if self.count_default == Some(0) {
            tracing::warn!("count_default is 0, DescribeEOCoverageSet will return no coverages");
        }
        Ok(())
    }

    /// Find a coverage by plain name or `workspace:name`.
    pub fn find_coverage(&self, name: &str) -> Option<&CoverageConfig> {
        self.coverages
            .iter()
            .find(|c| c.prefixed_name() == name)
            .or_else(|| self.coverages.iter().find(|c| c.name == name))
    }

    pub fn axis_parser(&self) -> AxisLabelParser {
        AxisLabelParser::with_extra_prefixes(self.axis_prefixes.iter().cloned())
    }
}

/// A published coverage and its dimension setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    pub name: String,

    #[serde(default)]
    pub workspace: Option<String>,

    /// Exposed as an EO dataset series.
    #[serde(default)]
    pub dataset: bool,

    /// Backed by a granule index.
    #[serde(default)]
    pub structured: bool,

    #[serde(default)]
    pub dimensions: DimensionsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionsConfig {
    #[serde(default)]
    pub time: Option<DimensionConfig>,

    #[serde(default)]
    pub elevation: Option<DimensionConfig>,

    #[serde(default)]
    pub custom: Vec<CustomDimensionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub start_attribute: String,

    #[serde(default)]
    pub end_attribute: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomDimensionConfig {
    pub name: String,

    #[serde(flatten)]
    pub dimension: DimensionConfig,
}

fn default_enabled() -> bool {
    true
}

impl DimensionConfig {
    fn descriptor(&self, name: &str) -> DimensionDescriptor {
        DimensionDescriptor {
            name: name.to_string(),
            start_attribute: self.start_attribute.clone(),
            end_attribute: self.end_attribute.clone(),
        }
    }
}

impl CoverageConfig {
    pub fn prefixed_name(&self) -> String {
        match &self.workspace {
            Some(ws) => format!("{}:{}", ws, self.name),
            None => self.name.clone(),
        }
    }

    pub fn has_time(&self) -> bool {
        self.time_descriptor().is_some()
    }

    pub fn time_descriptor(&self) -> Option<DimensionDescriptor> {
        self.dimensions
            .time
            .as_ref()
            .filter(|d| d.enabled)
            .map(|d| d.descriptor("time"))
    }

    pub fn elevation_descriptor(&self) -> Option<DimensionDescriptor> {
        self.dimensions
            .elevation
            .as_ref()
            .filter(|d| d.enabled)
            .map(|d| d.descriptor("elevation"))
    }

    /// Names of the enabled custom dimensions.
    pub fn custom_dimension_names(&self) -> Vec<String> {
        self.dimensions
            .custom
            .iter()
            .filter(|c| c.dimension.enabled)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Descriptors of every enabled dimension: time, elevation, then custom.
    pub fn dimension_descriptors(&self) -> Vec<DimensionDescriptor> {
        let mut descriptors: Vec<DimensionDescriptor> = self
            .time_descriptor()
            .into_iter()
            .chain(self.elevation_descriptor())
            .collect();
        descriptors.extend(
            self.dimensions
                .custom
                .iter()
                .filter(|c| c.dimension.enabled)
                .map(|c| c.dimension.descriptor(&c.name)),
        );
        descriptors
    }
}
