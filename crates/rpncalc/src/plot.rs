//! The plotting collaborator.
//!
//! The engine never draws; it hands a [`PlotRequest`] to whatever
//! [`PlotSink`] the front-end installed.

use rpncalc_script::{PlotContainer, Value};

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq)]
pub enum PlotRequest {
    /// A bare numeric series from the X cell.
    Series(Vec<f64>),
    /// Named, styled containers.
    Named(Vec<(String, PlotContainer)>),
}

pub trait PlotSink {
    fn show(&mut self, request: PlotRequest) -> Result<(), String>;
}

/// Logs plot requests instead of drawing them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogPlotSink;

impl PlotSink for LogPlotSink {
    fn show(&mut self, request: PlotRequest) -> Result<(), String> {
        match request {
            PlotRequest::Series(data) => log::info!("plot: series of {} point(s)", data.len()),
            PlotRequest::Named(plots) => {
                for (name, container) in plots {
                    log::info!("plot '{}': {} point(s)", name, container.data.len());
                }
            }
        }
        Ok(())
    }
}

/// Work out what a cell asks to plot.
pub fn request_for(value: &Value) -> Result<PlotRequest, EngineError> {
    if let Value::Plot(container) = value {
        return Ok(PlotRequest::Named(vec![(container.name.clone(), (**container).clone())]));
    }
    let items = value
        .iter_items()
        .filter(|_| !value.is_str())
        .ok_or_else(|| EngineError::Structural(format!("cannot plot a {}", value.type_name())))?;
    if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Plot(_))) {
        let plots = items
            .iter()
            .filter_map(|v| match v {
                Value::Plot(c) => Some((c.name.clone(), (**c).clone())),
                _ => None,
            })
            .collect();
        return Ok(PlotRequest::Named(plots));
    }
    let data = items
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| EngineError::Structural(format!("cannot plot {}", v.repr())))
        })
        .collect::<Result<Vec<f64>, EngineError>>()?;
    Ok(PlotRequest::Series(data))
}
