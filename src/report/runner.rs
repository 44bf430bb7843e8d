//! Report Runner Module
//! Loads each group's table, builds its bar charts and writes one image per
//! figure and format.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use super::config::{expand_tag, ChartGroup, ReportConfig};
use crate::charts::{BarChart, BarChartRenderer, ChartError};
use crate::data::{LoaderError, Table, TableError, TableLoader};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoaderError,
    },
    #[error("Figure '{figure}': {source}")]
    Column {
        figure: String,
        #[source]
        source: TableError,
    },
    #[error("Figure '{figure}': {source}")]
    Chart {
        figure: String,
        #[source]
        source: ChartError,
    },
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown chart group '{0}'")]
    UnknownGroup(String),
}

/// A chart ready to be written, keyed by its output file stem.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFigure {
    pub output: String,
    pub chart: BarChart,
}

pub struct ReportRunner<'a> {
    config: &'a ReportConfig,
    loader: TableLoader,
}

impl<'a> ReportRunner<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            loader: TableLoader::new(config.trial_groups.clone()),
        }
    }

    /// Render every group (or only those whose name equals `only`) and
    /// return the written files in order. Naming a group the config does
    /// not declare is an error.
    pub fn run(&self, only: Option<&str>) -> Result<Vec<PathBuf>, ReportError> {
        if let Some(name) = only {
            if !self.config.groups.iter().any(|g| g.name == name) {
                return Err(ReportError::UnknownGroup(name.to_string()));
            }
        }

        let mut written = Vec::new();

        for group in &self.config.groups {
            if only.is_some_and(|name| name != group.name) {
                log::debug!("skipping group '{}'", group.name);
                continue;
            }
            for tag in group.instances() {
                written.extend(self.render_group(group, tag)?);
            }
        }

        Ok(written)
    }

    fn render_group(
        &self,
        group: &ChartGroup,
        tag: Option<&str>,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let path = self.config.results_dir.join(expand_tag(&group.source, tag));
        let table = self
            .loader
            .load(&path)
            .map_err(|source| ReportError::Load {
                path: path.clone(),
                source,
            })?;
        log::info!(
            "loaded {} ({} rows, {} columns)",
            path.display(),
            table.row_count(),
            table.column_count()
        );

        let figures = Self::plan(&table, group, tag)?;

        let out_dir = &self.config.out_dir;
        fs::create_dir_all(out_dir).map_err(|source| ReportError::OutputDir {
            path: out_dir.clone(),
            source,
        })?;

        let size = self.config.figure_size();
        let mut written = Vec::new();
        for figure in figures {
            for &format in &self.config.formats {
                let file = out_dir.join(format!("{}.{}", figure.output, format.extension()));
                BarChartRenderer::render_to_file(&figure.chart, &file, format, size).map_err(
                    |source| ReportError::Chart {
                        figure: figure.output.clone(),
                        source,
                    },
                )?;
                log::info!("generated plot at: {}", file.display());
                written.push(file);
            }
        }
        Ok(written)
    }

    /// Build the charts of one group instance from its loaded table.
    pub fn plan(
        table: &Table,
        group: &ChartGroup,
        tag: Option<&str>,
    ) -> Result<Vec<PlannedFigure>, ReportError> {
        let labels: Vec<String> = table
            .labels(&group.label_column)
            .map_err(|source| ReportError::Column {
                figure: group.name.clone(),
                source,
            })?
            .into_iter()
            .map(|label| {
                group
                    .label_rewrites
                    .iter()
                    .fold(label, |acc, rewrite| rewrite.apply(&acc))
            })
            .collect();

        group
            .figures
            .iter()
            .map(|figure| {
                let output = expand_tag(&figure.output, tag);
                let values = table
                    .numeric(&figure.column)
                    .map_err(|source| ReportError::Column {
                        figure: output.clone(),
                        source,
                    })?
                    .to_vec();

                let mut chart = BarChart::new(labels.clone(), values, figure.y_label.clone());
                chart.splits = group.splits.clone();
                chart.scale = figure.scale;
                chart.stretch_ylim = figure.stretch_ylim;
                chart.orientation = group.orientation;
                chart.annotations = figure.annotations.clone();

                Ok(PlannedFigure { output, chart })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{AxisScale, LabelOrientation};
    use crate::data::TrialGroup;
    use crate::report::config::{LabelRewrite, Preset};
    use std::io::Write;

    const CLUST: &str = "\
name,time_seconds_1,time_seconds_2,time_seconds_3,time_seconds_4,time_seconds_5,max_mem_mb,ari,n_clusters
blini (k=5),1,2,3,4,5,120,0.91,40
blini (k=7),2,2,2,2,2,130,0.88,42
mmseqs (easy-linclust),10,10,10,10,10,900,0.95,38
";

    fn clust_table() -> (tempfile::TempDir, Table) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results_clust_frag.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(CLUST.as_bytes()).unwrap();

        let table = TableLoader::new(vec![TrialGroup::new("time_seconds", 5)])
            .load(&path)
            .unwrap();
        (dir, table)
    }

    fn clust_group() -> ChartGroup {
        ReportConfig::preset(Preset::Paper)
            .groups
            .into_iter()
            .find(|g| g.name == "clust")
            .unwrap()
    }

    #[test]
    fn plans_one_chart_per_metric() {
        let (_dir, table) = clust_table();
        let figures = ReportRunner::plan(&table, &clust_group(), Some("frag")).unwrap();

        let outputs: Vec<&str> = figures.iter().map(|f| f.output.as_str()).collect();
        assert_eq!(
            outputs,
            vec![
                "clust_frag_time",
                "clust_frag_mem",
                "clust_frag_ari",
                "clust_frag_nclust"
            ]
        );

        let time = &figures[0].chart;
        assert!((time.values[0] - 3.0).abs() < 1e-12);
        assert!((time.values[2] - 10.0).abs() < 1e-12);
        assert_eq!(time.splits, vec![4]);
        assert_eq!(time.orientation, LabelOrientation::Vertical);
        assert!(figures[2].chart.stretch_ylim);
        assert_eq!(figures[3].chart.values, vec![40.0, 42.0, 38.0]);
    }

    #[test]
    fn plan_rewrites_labels() {
        let (_dir, table) = clust_table();
        let figures = ReportRunner::plan(&table, &clust_group(), Some("frag")).unwrap();
        assert_eq!(
            figures[0].chart.labels,
            vec!["blini\n(k=5)", "blini\n(k=7)", "mmseqs\n(easy-linclust)"]
        );
    }

    #[test]
    fn plan_applies_rewrites_in_order() {
        let (_dir, table) = clust_table();
        let mut group = clust_group();
        group.label_rewrites = vec![LabelRewrite::new(" (", "\n("), LabelRewrite::new("k=", "")];
        let figures = ReportRunner::plan(&table, &group, Some("frag")).unwrap();
        assert_eq!(figures[0].chart.labels[0], "blini\n(5)");
    }

    #[test]
    fn plan_fails_on_missing_metric() {
        let (_dir, table) = clust_table();
        let mut group = clust_group();
        group.figures[0].column = "source_found".to_string();
        let err = ReportRunner::plan(&table, &group, Some("frag")).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Column { ref figure, source: TableError::MissingColumn(_) } if figure == "clust_frag_time"
        ));
    }

    #[test]
    fn plan_fails_on_text_metric() {
        let (_dir, table) = clust_table();
        let mut group = clust_group();
        group.figures[0].column = "name".to_string();
        assert!(matches!(
            ReportRunner::plan(&table, &group, Some("frag")),
            Err(ReportError::Column {
                source: TableError::NotNumeric(_),
                ..
            })
        ));
    }

    #[test]
    fn search_big_marks_timeout() {
        let config = ReportConfig::preset(Preset::Paper);
        let group = &config.groups[1];
        assert_eq!(group.figures[0].scale, AxisScale::Log);
        assert_eq!(group.figures[0].annotations[0].row, 5);
    }

    #[test]
    fn run_fails_when_results_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ReportConfig::preset(Preset::Paper);
        config.results_dir = dir.path().to_path_buf();
        config.out_dir = dir.path().join("out");

        let err = ReportRunner::new(&config).run(Some("search")).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Load {
                source: LoaderError::NotFound(_),
                ..
            }
        ));
        assert!(!config.out_dir.exists());
    }

    #[test]
    fn run_rejects_unknown_group() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ReportConfig::preset(Preset::Paper);
        config.results_dir = dir.path().to_path_buf();
        config.out_dir = dir.path().join("out");

        let err = ReportRunner::new(&config).run(Some("nope")).unwrap_err();
        assert!(matches!(err, ReportError::UnknownGroup(ref name) if name == "nope"));
        assert!(!config.out_dir.exists());
    }
}
