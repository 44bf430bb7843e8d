//! Report configuration: which tables to load and which figures to draw
//! from them. Serializable as JSON; two presets mirror the paper and
//! publication figure sets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::charts::{Annotation, AxisScale, ImageFormat, LabelOrientation};
use crate::data::TrialGroup;

pub const TAG_PLACEHOLDER: &str = "{tag}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Figures for the paper draft.
    #[default]
    Paper,
    /// Figures for the final publication.
    Publication,
}

/// Literal substring replacement applied to row labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRewrite {
    pub from: String,
    pub to: String,
}

impl LabelRewrite {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn apply(&self, label: &str) -> String {
        label.replace(&self.from, &self.to)
    }
}

/// One metric of a chart group, written to its own file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFigure {
    pub column: String,
    pub y_label: String,
    /// File stem, may contain `{tag}`.
    pub output: String,
    #[serde(default)]
    pub scale: AxisScale,
    #[serde(default)]
    pub stretch_ylim: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MetricFigure {
    pub fn new(column: &str, y_label: &str, output: &str) -> Self {
        Self {
            column: column.to_string(),
            y_label: y_label.to_string(),
            output: output.to_string(),
            scale: AxisScale::Linear,
            stretch_ylim: false,
            annotations: Vec::new(),
        }
    }

    pub fn log_scale(mut self) -> Self {
        self.scale = AxisScale::Log;
        self
    }

    pub fn stretched(mut self) -> Self {
        self.stretch_ylim = true;
        self
    }

    pub fn annotate(mut self, row: usize, text: &str) -> Self {
        self.annotations.push(Annotation {
            row,
            text: text.to_string(),
        });
        self
    }
}

/// Figures drawn from one results file (or one file per tag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGroup {
    pub name: String,
    /// File name under the results directory, may contain `{tag}`.
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_label_column")]
    pub label_column: String,
    #[serde(default)]
    pub label_rewrites: Vec<LabelRewrite>,
    #[serde(default)]
    pub splits: Vec<usize>,
    #[serde(default)]
    pub orientation: LabelOrientation,
    pub figures: Vec<MetricFigure>,
}

impl ChartGroup {
    /// `None` for an untagged group, otherwise each tag in order.
    pub fn instances(&self) -> Vec<Option<&str>> {
        if self.tags.is_empty() {
            vec![None]
        } else {
            self.tags.iter().map(|t| Some(t.as_str())).collect()
        }
    }
}

fn default_label_column() -> String {
    "name".to_string()
}

fn default_formats() -> Vec<ImageFormat> {
    vec![ImageFormat::Png]
}

fn default_width() -> u32 {
    800
}

fn default_size_ratio() -> f64 {
    0.75
}

/// Replace `{tag}` in `template`.
pub fn expand_tag(template: &str, tag: Option<&str>) -> String {
    match tag {
        Some(tag) => template.replace(TAG_PLACEHOLDER, tag),
        None => template.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub results_dir: PathBuf,
    pub out_dir: PathBuf,
    #[serde(default = "default_formats")]
    pub formats: Vec<ImageFormat>,
    #[serde(default = "default_width")]
    pub width: u32,
    /// Figure height as a fraction of its width.
    #[serde(default = "default_size_ratio")]
    pub size_ratio: f64,
    #[serde(default)]
    pub trial_groups: Vec<TrialGroup>,
    pub groups: Vec<ChartGroup>,
}

impl ReportConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Paper => Self::paper(),
            Preset::Publication => Self::publication(),
        }
    }

    fn paper() -> Self {
        let wrap_words = vec![LabelRewrite::new(" ", "\n")];
        let wrap_params = vec![LabelRewrite::new(" (", "\n(")];

        Self {
            results_dir: PathBuf::from("results"),
            out_dir: PathBuf::from("../testdata/output"),
            formats: default_formats(),
            width: default_width(),
            size_ratio: default_size_ratio(),
            trial_groups: vec![TrialGroup::new("time_seconds", 5)],
            groups: vec![
                ChartGroup {
                    name: "search".to_string(),
                    source: "results_search.txt".to_string(),
                    tags: Vec::new(),
                    label_column: default_label_column(),
                    label_rewrites: wrap_words,
                    splits: vec![2, 4],
                    orientation: LabelOrientation::Vertical,
                    figures: Self::search_figures(),
                },
                ChartGroup {
                    name: "search_big".to_string(),
                    source: "results_search_big.txt".to_string(),
                    tags: Vec::new(),
                    label_column: default_label_column(),
                    label_rewrites: wrap_params.clone(),
                    splits: vec![3, 5],
                    orientation: LabelOrientation::Vertical,
                    figures: vec![MetricFigure::new("time_seconds", "Time (s)", "search_big")
                        .log_scale()
                        .annotate(5, "X")],
                },
                ChartGroup {
                    name: "clust".to_string(),
                    source: "results_clust_{tag}.txt".to_string(),
                    tags: vec!["frag".to_string(), "snps".to_string()],
                    label_column: default_label_column(),
                    label_rewrites: wrap_params,
                    splits: vec![4],
                    orientation: LabelOrientation::Vertical,
                    figures: Self::clust_figures(),
                },
            ],
        }
    }

    fn publication() -> Self {
        Self {
            results_dir: PathBuf::from("."),
            out_dir: PathBuf::from("."),
            formats: default_formats(),
            width: default_width(),
            size_ratio: default_size_ratio(),
            trial_groups: vec![TrialGroup::new("time_seconds", 5).required()],
            groups: vec![
                ChartGroup {
                    name: "search".to_string(),
                    source: "results_search.txt".to_string(),
                    tags: Vec::new(),
                    label_column: default_label_column(),
                    label_rewrites: vec![LabelRewrite::new(" ", "\n")],
                    splits: vec![2, 4],
                    orientation: LabelOrientation::Horizontal,
                    figures: Self::search_figures(),
                },
                ChartGroup {
                    name: "clust".to_string(),
                    source: "results_clust_{tag}.txt".to_string(),
                    tags: vec!["frag".to_string(), "snps".to_string()],
                    label_column: default_label_column(),
                    label_rewrites: Vec::new(),
                    splits: vec![4],
                    orientation: LabelOrientation::Horizontal,
                    figures: Self::clust_figures(),
                },
            ],
        }
    }

    fn search_figures() -> Vec<MetricFigure> {
        vec![
            MetricFigure::new("time_seconds", "Average time (s)", "search_time").log_scale(),
            MetricFigure::new(
                "source_found",
                "Successful matches (out of 100)",
                "search_found",
            ),
            MetricFigure::new("others_found", "Non-source matches", "search_others"),
        ]
    }

    fn clust_figures() -> Vec<MetricFigure> {
        vec![
            MetricFigure::new("time_seconds", "Average time (s)", "clust_{tag}_time"),
            MetricFigure::new("max_mem_mb", "Max memory (MB)", "clust_{tag}_mem"),
            MetricFigure::new("ari", "Adjusted Rand-Index", "clust_{tag}_ari").stretched(),
            MetricFigure::new("n_clusters", "Number of clusters", "clust_{tag}_nclust"),
        ]
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Figure size in pixels.
    pub fn figure_size(&self) -> (u32, u32) {
        let height = (self.width as f64 * self.size_ratio).round() as u32;
        (self.width, height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.formats.is_empty() {
            return invalid("no output formats".to_string());
        }
        if self.width == 0 || !(self.size_ratio > 0.0) || self.figure_size().1 == 0 {
            return invalid(format!(
                "figure size {}x{} is empty",
                self.width,
                self.figure_size().1
            ));
        }
        if let Some(group) = self.trial_groups.iter().find(|g| g.trials == 0) {
            return invalid(format!("trial group '{}' has no trials", group.prefix));
        }

        for group in &self.groups {
            if group.figures.is_empty() {
                return invalid(format!("group '{}' has no figures", group.name));
            }
            if group.splits.windows(2).any(|w| w[0] > w[1]) {
                return invalid(format!(
                    "group '{}' has unsorted splits {:?}",
                    group.name, group.splits
                ));
            }

            let tagged = !group.tags.is_empty();
            let mut templates = vec![group.source.as_str()];
            templates.extend(group.figures.iter().map(|f| f.output.as_str()));
            for template in templates {
                if template.contains(TAG_PLACEHOLDER) != tagged {
                    let reason = if tagged {
                        "must contain {tag}"
                    } else {
                        "uses {tag} but the group has no tags"
                    };
                    return invalid(format!("group '{}': '{}' {}", group.name, template, reason));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn presets_are_valid() {
        ReportConfig::preset(Preset::Paper).validate().unwrap();
        ReportConfig::preset(Preset::Publication).validate().unwrap();
    }

    #[test]
    fn paper_preset_matches_figure_set() {
        let config = ReportConfig::preset(Preset::Paper);
        let outputs: Vec<String> = config
            .groups
            .iter()
            .flat_map(|g| {
                g.instances()
                    .into_iter()
                    .flat_map(move |tag| g.figures.iter().map(move |f| expand_tag(&f.output, tag)))
            })
            .collect();
        assert_eq!(
            outputs,
            vec![
                "search_time",
                "search_found",
                "search_others",
                "search_big",
                "clust_frag_time",
                "clust_frag_mem",
                "clust_frag_ari",
                "clust_frag_nclust",
                "clust_snps_time",
                "clust_snps_mem",
                "clust_snps_ari",
                "clust_snps_nclust",
            ]
        );
    }

    #[test]
    fn figure_size_uses_ratio() {
        let config = ReportConfig::preset(Preset::Paper);
        assert_eq!(config.figure_size(), (800, 600));
    }

    #[test]
    fn json_round_trip_through_file() {
        let config = ReportConfig::preset(Preset::Publication);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json().unwrap().as_bytes()).unwrap();

        let loaded = ReportConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn json_defaults_fill_optional_fields() {
        let json = r#"{
            "results_dir": "results",
            "out_dir": "out",
            "groups": [{
                "name": "search",
                "source": "results_search.txt",
                "figures": [{ "column": "ari", "y_label": "ARI", "output": "ari" }]
            }]
        }"#;
        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.formats, vec![ImageFormat::Png]);
        assert_eq!(config.figure_size(), (800, 600));
        assert_eq!(config.groups[0].label_column, "name");
        assert_eq!(config.groups[0].figures[0].scale, AxisScale::Linear);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_stray_tag_placeholder() {
        let mut config = ReportConfig::preset(Preset::Paper);
        config.groups[0].figures[0].output = "search_{tag}_time".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_tagged_group_without_placeholder() {
        let mut config = ReportConfig::preset(Preset::Paper);
        config.groups[2].figures[0].output = "clust_time".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_empty_formats() {
        let mut config = ReportConfig::preset(Preset::Paper);
        config.formats.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReportConfig::from_json_file(&dir.path().join("report.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn label_rewrite_wraps_parameters() {
        let rewrite = LabelRewrite::new(" (", "\n(");
        assert_eq!(rewrite.apply("blini (k=5)"), "blini\n(k=5)");
    }
}
