//! A plot sink that draws sparklines on the terminal.

use rpncalc::{PlotContainer, PlotRequest, PlotSink};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Prints each series as one line of block characters.
#[derive(Clone, Copy, Debug)]
pub struct TextPlotSink {
    /// Maximum number of columns per series.
    pub width: usize,
}

impl Default for TextPlotSink {
    fn default() -> Self {
        Self { width: 60 }
    }
}

impl TextPlotSink {
    /// The lines [`PlotSink::show`] prints for a request.
    pub fn render(&self, request: &PlotRequest) -> Vec<String> {
        match request {
            PlotRequest::Series(data) => vec![self.line("X", data)],
            PlotRequest::Named(plots) => plots
                .iter()
                .flat_map(|(name, container)| self.container(name, container))
                .collect(),
        }
    }

    fn container(&self, name: &str, container: &PlotContainer) -> Vec<String> {
        let mut lines = vec![self.line(name, &container.data)];
        if let Some(label) = &container.ylabel {
            lines.push(format!("  y: {}", label));
        }
        if let Some(label) = &container.xlabel {
            lines.push(format!("  x: {}", label));
        }
        lines
    }

    fn line(&self, name: &str, data: &[f64]) -> String {
        let finite: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        let Some(low) = finite.iter().copied().reduce(f64::min) else {
            return format!("{}: (no data)", name);
        };
        let high = finite.iter().copied().fold(low, f64::max);
        format!(
            "{}: {} [{} .. {}]",
            name,
            sparkline(&resample(data, self.width)),
            low,
            high
        )
    }
}

impl PlotSink for TextPlotSink {
    fn show(&mut self, request: PlotRequest) -> Result<(), String> {
        for line in self.render(&request) {
            println!("{}", line);
        }
        Ok(())
    }
}

/// Block characters scaled between the smallest and largest finite value.
/// Non-finite points are blank.
pub fn sparkline(data: &[f64]) -> String {
    let finite = data.iter().copied().filter(|x| x.is_finite());
    let low = finite.clone().fold(f64::INFINITY, f64::min);
    let high = finite.fold(f64::NEG_INFINITY, f64::max);
    let span = high - low;
    data.iter()
        .map(|&x| {
            if !x.is_finite() {
                return ' ';
            }
            if span <= 0.0 {
                return BARS[BARS.len() / 2];
            }
            let level = ((x - low) / span * (BARS.len() - 1) as f64).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

/// Average consecutive points down to at most `width` columns.
fn resample(data: &[f64], width: usize) -> Vec<f64> {
    if width == 0 || data.len() <= width {
        return data.to_vec();
    }
    (0..width)
        .map(|i| {
            let start = i * data.len() / width;
            let end = ((i + 1) * data.len() / width).max(start + 1);
            let chunk = &data[start..end];
            chunk.iter().sum::<f64>() / chunk.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_spans_the_range() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[1.0, 1.0]), "▅▅");
        assert_eq!(sparkline(&[0.0, f64::NAN, 1.0]), "▁ █");
    }

    #[test]
    fn long_series_are_resampled() {
        let data: Vec<f64> = (0..100).map(f64::from).collect();
        assert_eq!(resample(&data, 10).len(), 10);
        assert_eq!(resample(&data[..5], 10).len(), 5);
    }

    #[test]
    fn named_plots_carry_labels() {
        let mut container = PlotContainer::new("speed", vec![1.0, 2.0]);
        container.ylabel = Some("m/s".to_string());
        let sink = TextPlotSink::default();
        let lines = sink.render(&PlotRequest::Named(vec![("speed".to_string(), container)]));
        assert_eq!(lines, vec!["speed: ▁█ [1 .. 2]", "  y: m/s"]);
    }

    #[test]
    fn empty_series() {
        let sink = TextPlotSink::default();
        assert_eq!(sink.render(&PlotRequest::Series(Vec::new())), vec!["X: (no data)"]);
    }
}
