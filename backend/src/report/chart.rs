//! Chart rendering collaborator and the series fed to it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use plotters::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::error::ChartError;
use crate::models::{AlignedRecord, Variable};

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Opaque rendered chart.
///
/// Serialized as a `data:` URL so it can be dropped straight into an `<img>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ChartImage {
    pub fn new(content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            data,
        }
    }

    pub fn svg(data: Vec<u8>) -> Self {
        Self::new(SVG_CONTENT_TYPE, data)
    }

    /// `data:<content-type>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.data))
    }

    pub fn from_data_url(url: &str) -> Result<Self, String> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| "missing 'data:' prefix".to_string())?;
        let (content_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| "missing ';base64,' separator".to_string())?;
        if content_type.is_empty() {
            return Err("empty content type".to_string());
        }
        let data = STANDARD
            .decode(payload)
            .map_err(|e| format!("invalid base64 payload: {}", e))?;
        Ok(Self::new(content_type, data))
    }
}

impl Serialize for ChartImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for ChartImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        ChartImage::from_data_url(&url).map_err(serde::de::Error::custom)
    }
}

/// What to do with absent samples when plotting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Drop absent samples together with their x labels.
    #[default]
    Skip,
    /// Fill interior gaps linearly; leading and trailing gaps are dropped.
    Interpolate,
}

impl FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "interpolate" | "linear" => Ok(Self::Interpolate),
            _ => Err(format!("Unknown gap policy: {}", s)),
        }
    }
}

/// Chart rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub gap_policy: GapPolicy,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    400
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            gap_policy: GapPolicy::default(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Plottable values of one variable with their x-axis labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extract the series of `variable` under `policy`.
///
/// Labels are `HH:MM` when every plotted sample carries a time, otherwise the
/// 1-based sample index.
pub fn chart_series(records: &[AlignedRecord], variable: Variable, policy: GapPolicy) -> ChartSeries {
    let present: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(pos, r)| r.value(variable).map(|v| (pos, v)))
        .collect();

    let (Some(&(first, _)), Some(&(last, _))) = (present.first(), present.last()) else {
        return ChartSeries::default();
    };

    let points: Vec<(usize, f64)> = match policy {
        GapPolicy::Skip => present,
        GapPolicy::Interpolate => {
            let mut points = Vec::with_capacity(last - first + 1);
            for pair in present.windows(2) {
                let (p0, v0) = pair[0];
                let (p1, v1) = pair[1];
                for pos in p0..p1 {
                    let t = (pos - p0) as f64 / (p1 - p0) as f64;
                    points.push((pos, v0 * (1.0 - t) + v1 * t));
                }
            }
            points.push((last, records[last].value(variable).unwrap_or_default()));
            points
        }
    };

    let timed = points.iter().all(|(pos, _)| records[*pos].time.is_some());
    let labels = points
        .iter()
        .map(|(pos, _)| {
            let record = &records[*pos];
            match record.time {
                Some(time) if timed => time.label(),
                _ => record.index.to_string(),
            }
        })
        .collect();

    ChartSeries {
        values: points.into_iter().map(|(_, v)| v).collect(),
        labels,
    }
}

/// External chart rendering collaborator.
pub trait ChartRenderer: Send + Sync {
    /// Render every named series onto one chart.
    fn render(
        &self,
        series: &BTreeMap<String, Vec<f64>>,
        x_labels: Option<&[String]>,
    ) -> Result<ChartImage, ChartError>;
}

/// Line charts drawn with plotters' SVG backend.
#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl SvgChartRenderer {
    pub fn new(options: &ChartOptions) -> Self {
        Self {
            width: options.width,
            height: options.height,
        }
    }
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::new(&ChartOptions::default())
    }
}

const SERIES_COLORS: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];

fn backend_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Backend(err.to_string())
}

/// Padded y-range of the finite values in `series`.
///
/// Padding grows with the magnitude of the readings so that tick steps stay
/// representable. A range whose width overflows `f64` is rejected.
fn value_bounds(series: &BTreeMap<String, Vec<f64>>) -> Result<(f64, f64), ChartError> {
    let (min, max) = series
        .values()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if min > max {
        return Err(backend_error("no finite values to plot"));
    }

    let span = max - min;
    let pad = if span.is_finite() {
        (span * 0.1).max(min.abs().max(max.abs()) * 0.01).max(1.0)
    } else {
        0.0
    };
    let lo = (min - pad).max(f64::MIN);
    let hi = (max + pad).min(f64::MAX);

    if !(hi - lo).is_finite() {
        return Err(backend_error(format!(
            "value range {}..{} is too wide to plot",
            min, max
        )));
    }
    Ok((lo, hi))
}

impl ChartRenderer for SvgChartRenderer {
    fn render(
        &self,
        series: &BTreeMap<String, Vec<f64>>,
        x_labels: Option<&[String]>,
    ) -> Result<ChartImage, ChartError> {
        let caption = series.keys().cloned().collect::<Vec<_>>().join(" / ");
        let len = series.values().map(Vec::len).max().unwrap_or(0);
        if len == 0 {
            return Err(ChartError::EmptySeries(caption));
        }

        let (y_min, y_max) = value_bounds(series)?;
        let x_max = len.saturating_sub(1).max(1) as f64;
        let label_at = |x: &f64| -> String {
            let i = x.round().max(0.0) as usize;
            match x_labels {
                Some(labels) => labels.get(i).cloned().unwrap_or_default(),
                None => (i + 1).to_string(),
            }
        };

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let mut chart = ChartBuilder::on(&root)
                .margin(15)
                .caption(&caption, ("sans-serif", 20))
                .x_label_area_size(30)
                .y_label_area_size(50)
                .build_cartesian_2d(0f64..x_max, y_min..y_max)
                .map_err(backend_error)?;

            chart
                .configure_mesh()
                .x_desc("Medición")
                .x_labels(len.min(24))
                .x_label_formatter(&label_at)
                .draw()
                .map_err(backend_error)?;

            for (idx, (name, values)) in series.iter().enumerate() {
                let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
                let points: Vec<(f64, f64)> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f64, *v))
                    .collect();

                chart
                    .draw_series(LineSeries::new(points.iter().copied(), &color))
                    .map_err(backend_error)?
                    .label(name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                chart
                    .draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))
                    .map_err(backend_error)?;
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(backend_error)?;

            root.present().map_err(backend_error)?;
        }

        Ok(ChartImage::svg(svg.into_bytes()))
    }
}
