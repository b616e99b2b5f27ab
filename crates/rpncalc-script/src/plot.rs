//! Plot containers.
//!
//! A container is plain data: a y-series, an optional x-series and styling.
//! Rendering belongs to whatever sink the calculator hands it to.

use std::fmt;

/// A named data series plus display style.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotContainer {
    pub name: String,
    pub data: Vec<f64>,
    pub x_data: Option<Vec<f64>>,
    pub color: Option<String>,
    pub line_style: String,
    pub marker: Option<String>,
    pub linewidth: f64,
    pub markersize: f64,
    pub alpha: f64,
    pub grid: bool,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
}

impl PlotContainer {
    /// A solid-line series with default style.
    pub fn new(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data,
            x_data: None,
            color: None,
            line_style: "-".into(),
            marker: None,
            linewidth: 1.5,
            markersize: 6.0,
            alpha: 1.0,
            grid: true,
            xlabel: None,
            ylabel: None,
        }
    }

    pub fn with_x(mut self, x_data: Vec<f64>) -> Self {
        self.x_data = Some(x_data);
        self
    }

    /// Points as `(x, y)` pairs; without x-data the index is used.
    pub fn points(&self) -> Vec<(f64, f64)> {
        match &self.x_data {
            Some(xs) => xs.iter().copied().zip(self.data.iter().copied()).collect(),
            None => self
                .data
                .iter()
                .enumerate()
                .map(|(i, y)| (i as f64, *y))
                .collect(),
        }
    }
}

impl fmt::Display for PlotContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<plot '{}'>", self.name)
    }
}
