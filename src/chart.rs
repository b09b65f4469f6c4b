// src/chart.rs
//! Scatter chart for a single job result.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::client::JobSource;
use crate::errors::{DashboardError, Result};
use crate::models::ScatterPoint;

pub const TOOLTIP_POINT_FORMAT: &str = "{point.x} M, {point.y} Days";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    pub title: AxisTitle,
    pub start_on_tick: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_tick: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_last_label: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub zoom_type: String,
    pub render_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exporting {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub layout: String,
    pub align: String,
    pub vertical_align: String,
    pub x: i32,
    pub y: i32,
    pub floating: bool,
    pub background_color: String,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerHover {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStates {
    pub hover: MarkerHover,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<MarkerStates>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesHover {
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStates {
    pub hover: SeriesHover,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub point_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlotOptions {
    pub marker: Marker,
    pub states: SeriesStates,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotOptions {
    pub scatter: ScatterPlotOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub data: Vec<ScatterPoint>,
}

/// Chart options in the charting widget's own (camelCase) schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart: ChartOptions,
    pub title: Title,
    pub subtitle: Title,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub exporting: Exporting,
    pub legend: Legend,
    pub plot_options: PlotOptions,
    pub series: Vec<Series>,
}

impl ChartConfig {
    /// The fixed magnitude-vs-distance scatter configuration with an empty series.
    pub fn scatter() -> Self {
        Self {
            chart: ChartOptions {
                kind: "scatter".to_string(),
                zoom_type: "xy".to_string(),
                render_to: "container".to_string(),
            },
            title: Title { text: "Sample GACS request".to_string() },
            subtitle: Title { text: "G Magnitude vs distance".to_string() },
            x_axis: Axis {
                axis_type: AxisType::Linear,
                title: AxisTitle { enabled: Some(true), text: "Distance".to_string() },
                start_on_tick: true,
                end_on_tick: Some(true),
                show_last_label: Some(true),
            },
            y_axis: Axis {
                axis_type: AxisType::Logarithmic,
                title: AxisTitle { enabled: None, text: "G Magnitude".to_string() },
                start_on_tick: true,
                end_on_tick: None,
                show_last_label: None,
            },
            exporting: Exporting { enabled: true },
            legend: Legend {
                layout: "vertical".to_string(),
                align: "left".to_string(),
                vertical_align: "top".to_string(),
                x: 100,
                y: 70,
                floating: true,
                background_color: "#FFFFFF".to_string(),
                border_width: 1,
            },
            plot_options: PlotOptions {
                scatter: ScatterPlotOptions {
                    marker: Marker {
                        radius: Some(3),
                        enabled: None,
                        states: Some(MarkerStates {
                            hover: MarkerHover {
                                enabled: true,
                                line_color: Some("rgb(100,100,100)".to_string()),
                            },
                        }),
                    },
                    states: SeriesStates {
                        hover: SeriesHover {
                            marker: Marker { radius: None, enabled: Some(false), states: None },
                        },
                    },
                    tooltip: Tooltip { point_format: TOOLTIP_POINT_FORMAT.to_string() },
                },
            },
            series: vec![Series {
                name: "GACS Query Data".to_string(),
                color: "rgba(223, 83, 83, .5)".to_string(),
                data: Vec::new(),
            }],
        }
    }
}

/// Tooltip text for one point, as the widget renders [`TOOLTIP_POINT_FORMAT`].
pub fn format_tooltip(point: &ScatterPoint) -> String {
    TOOLTIP_POINT_FORMAT
        .replace("{point.x}", &point.x.to_string())
        .replace("{point.y}", &point.y.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStatus {
    Ready,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultChart {
    pub generation: u64,
    pub url: String,
    pub status: ChartStatus,
    pub config: ChartConfig,
}

impl ResultChart {
    fn new(generation: u64, url: &str) -> Self {
        Self {
            generation,
            url: url.to_string(),
            status: ChartStatus::Ready,
            config: ChartConfig::scatter(),
        }
    }

    pub fn data(&self) -> &[ScatterPoint] {
        self.config
            .series
            .first()
            .map(|s| s.data.as_slice())
            .unwrap_or_default()
    }

    /// Replaces the data of the first series. Only a ready chart accepts data.
    pub fn set_data(&mut self, data: Vec<ScatterPoint>) -> Result<()> {
        if self.status != ChartStatus::Ready {
            return Err(DashboardError::ChartNotReady);
        }
        let series = self
            .config
            .series
            .first_mut()
            .ok_or(DashboardError::ChartNotReady)?;
        series.data = data;
        self.status = ChartStatus::Loaded;
        Ok(())
    }
}

/// Owns the single result chart and feeds it from a [`JobSource`].
pub struct ChartLoader {
    source: Arc<dyn JobSource>,
    chart: RwLock<Option<ResultChart>>,
    generation: AtomicU64,
}

impl ChartLoader {
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        Self {
            source,
            chart: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn current(&self) -> Option<ResultChart> {
        self.chart.read().await.clone()
    }

    /// Replaces any existing chart with a fresh, empty one and returns its generation.
    /// The chart is ready to receive data as soon as this returns.
    pub async fn init_chart(&self, url: &str) -> u64 {
        // The generation is taken under the lock so the installed chart is always the newest.
        let mut slot = self.chart.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = slot.take() {
            log::debug!("Disposing result chart {} ({})", previous.generation, previous.url);
        }
        *slot = Some(ResultChart::new(generation, url));
        generation
    }

    /// Fetches `url` once and sets the data of chart `generation`.
    /// A failed fetch leaves the chart empty.
    pub async fn load_result(&self, generation: u64, url: &str) {
        let payload = self.source.fetch_result(url).await;

        let mut slot = self.chart.write().await;
        let Some(chart) = slot.as_mut().filter(|c| c.generation == generation) else {
            log::debug!("Result chart {} was replaced before {} arrived", generation, url);
            return;
        };

        match payload {
            Ok(payload) => {
                let points = payload.data.len();
                match chart.set_data(payload.data) {
                    Ok(()) => log::info!("Loaded {} points from {}", points, url),
                    Err(e) => log::warn!("Could not set chart data from {}: {}", url, e),
                }
            }
            Err(e) => {
                log::warn!("Failed to load result data from {}: {}", url, e);
                chart.status = ChartStatus::Failed;
            }
        }
    }

    pub async fn view_result(&self, url: &str) -> Option<ResultChart> {
        let generation = self.init_chart(url).await;
        self.load_result(generation, url).await;
        self.current().await.filter(|c| c.generation == generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobRecord, ResultPayload};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct FixedResult {
        calls: AtomicUsize,
        payload: Option<ResultPayload>,
    }

    #[async_trait]
    impl JobSource for FixedResult {
        async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
            Ok(Vec::new())
        }

        async fn fetch_result(&self, url: &str) -> Result<ResultPayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payload.clone().ok_or_else(|| DashboardError::Upstream {
                url: url.to_string(),
                status: 404,
                body: "missing".to_string(),
            })
        }
    }

    fn points() -> Vec<ScatterPoint> {
        vec![ScatterPoint { x: 1.5, y: 10.0 }, ScatterPoint { x: 2.0, y: 100.0 }]
    }

    #[test]
    fn test_scatter_config_shape() {
        let value = serde_json::to_value(ChartConfig::scatter()).unwrap();
        assert_eq!(value["chart"]["type"], "scatter");
        assert_eq!(value["chart"]["zoomType"], "xy");
        assert_eq!(value["xAxis"]["type"], "linear");
        assert_eq!(value["yAxis"]["type"], "logarithmic");
        assert_eq!(value["exporting"]["enabled"], true);
        assert_eq!(
            value["plotOptions"]["scatter"]["tooltip"]["pointFormat"],
            "{point.x} M, {point.y} Days"
        );
        assert_eq!(value["series"][0]["data"], json!([]));
    }

    #[test]
    fn test_tooltip_format() {
        assert_eq!(format_tooltip(&ScatterPoint { x: 3.0, y: 12.5 }), "3 M, 12.5 Days");
    }

    #[test]
    fn test_new_chart_accepts_data_exactly_once() {
        let mut chart = ResultChart::new(1, "job_list/1/data/");
        assert_eq!(chart.status, ChartStatus::Ready);

        chart.set_data(points()).unwrap();
        assert_eq!(chart.status, ChartStatus::Loaded);
        assert!(matches!(chart.set_data(Vec::new()), Err(DashboardError::ChartNotReady)));
        assert_eq!(chart.data(), points().as_slice());

        let mut failed = ResultChart::new(2, "job_list/2/data/");
        failed.status = ChartStatus::Failed;
        assert!(matches!(failed.set_data(points()), Err(DashboardError::ChartNotReady)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inits_keep_the_newest_chart() {
        let source = Arc::new(FixedResult { calls: AtomicUsize::new(0), payload: None });
        let loader = Arc::new(ChartLoader::new(source));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.init_chart(&format!("job_list/{}/data/", i)).await })
            })
            .collect();
        let mut generations = Vec::new();
        for handle in handles {
            generations.push(handle.await.unwrap());
        }

        let newest = generations.iter().copied().max().unwrap();
        assert_eq!(newest, 16);
        assert_eq!(loader.current().await.unwrap().generation, newest);
    }

    #[tokio::test]
    async fn test_view_result_fetches_once_and_sets_series() {
        let source = Arc::new(FixedResult {
            calls: AtomicUsize::new(0),
            payload: Some(ResultPayload { data: points() }),
        });
        let loader = ChartLoader::new(source.clone());

        let chart = loader.view_result("job_list/3/data/").await.unwrap();
        assert_eq!(chart.status, ChartStatus::Loaded);
        assert_eq!(chart.data(), points().as_slice());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_chart_empty() {
        let source = Arc::new(FixedResult { calls: AtomicUsize::new(0), payload: None });
        let loader = ChartLoader::new(source);

        let chart = loader.view_result("job_list/3/data/").await.unwrap();
        assert_eq!(chart.status, ChartStatus::Failed);
        assert!(chart.data().is_empty());
    }

    #[tokio::test]
    async fn test_replaced_chart_ignores_late_data() {
        let source = Arc::new(FixedResult {
            calls: AtomicUsize::new(0),
            payload: Some(ResultPayload { data: points() }),
        });
        let loader = ChartLoader::new(source);

        let first = loader.init_chart("job_list/1/data/").await;
        let second = loader.init_chart("job_list/2/data/").await;
        loader.load_result(first, "job_list/1/data/").await;

        let chart = loader.current().await.unwrap();
        assert_eq!(chart.generation, second);
        assert_eq!(chart.status, ChartStatus::Ready);
        assert!(chart.data().is_empty());
    }
}
