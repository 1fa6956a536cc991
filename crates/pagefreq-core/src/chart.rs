//! Declarative chart descriptions.
//!
//! A `ChartSpec` never holds pixels: it names the data fields each encoding
//! reads and the presentation options a renderer should apply.

use crate::{Error, RankedEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field name used for the token column.
pub const WORD_FIELD: &str = "word";
/// Field name used for the count column.
pub const FREQUENCY_FIELD: &str = "frequency";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Donut,
    Radar,
}

impl ChartKind {
    /// All kinds, in the order a selector offers them.
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::Donut,
        ChartKind::Radar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
            ChartKind::Donut => "donut",
            ChartKind::Radar => "radar",
        }
    }

    /// Selector label used by the Chinese-language UI.
    pub fn label_zh(self) -> &'static str {
        match self {
            ChartKind::Bar => "数状图",
            ChartKind::Line => "折线图",
            ChartKind::Pie => "饼状图",
            ChartKind::Scatter => "散点图",
            ChartKind::Area => "面积图",
            ChartKind::Donut => "圆环图",
            ChartKind::Radar => "雷达图",
        }
    }

    pub fn title(self) -> String {
        let name = self.as_str();
        let mut cap = String::with_capacity(name.len());
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            cap.extend(first.to_uppercase());
            cap.push_str(chars.as_str());
        }
        format!("Word frequency - {cap} chart")
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower || k.label_zh() == t)
            .ok_or_else(|| Error::UnsupportedChartKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bar,
    Line,
    Scatter,
    Area,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartesianAxes {
    /// Distance between y-axis ticks; always >= 1.
    pub y_tick_interval: u64,
    /// Explicit tick positions: 0, step, 2*step, ... up to the max frequency.
    pub y_tick_values: Vec<u64>,
    /// Rotation of the category (word) axis labels, in degrees.
    pub x_tick_angle: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum ChartEncoding {
    Cartesian {
        mark: Mark,
        x_field: String,
        y_field: String,
        axes: CartesianAxes,
        font: FontSpec,
    },
    Pie {
        names_field: String,
        values_field: String,
        /// Relative radius of the centre hole; `None` for a full pie.
        hole: Option<f32>,
        font: FontSpec,
    },
    Polar {
        theta_field: String,
        r_field: String,
        line_close: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub data: Vec<RankedEntry>,
    pub encoding: ChartEncoding,
}

impl ChartSpec {
    /// Polar layouts have no x/y axes, so tick and label-rotation options do not apply.
    pub fn supports_cartesian_axes(&self) -> bool {
        matches!(self.encoding, ChartEncoding::Cartesian { .. })
    }

    pub fn axes(&self) -> Option<&CartesianAxes> {
        match &self.encoding {
            ChartEncoding::Cartesian { axes, .. } => Some(axes),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&FontSpec> {
        match &self.encoding {
            ChartEncoding::Cartesian { font, .. } | ChartEncoding::Pie { font, .. } => Some(font),
            ChartEncoding::Polar { .. } => None,
        }
    }

    /// (category field, value field) regardless of layout.
    pub fn fields(&self) -> (&str, &str) {
        match &self.encoding {
            ChartEncoding::Cartesian {
                x_field, y_field, ..
            } => (x_field, y_field),
            ChartEncoding::Pie {
                names_field,
                values_field,
                ..
            } => (names_field, values_field),
            ChartEncoding::Polar {
                theta_field,
                r_field,
                ..
            } => (theta_field, r_field),
        }
    }
}
