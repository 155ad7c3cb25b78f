//! Chart rasterisation to PNG.

use std::path::Path;

use chrono::NaiveDateTime;
use plotters::prelude::*;

use crate::error::{Error, Result};
use crate::report::layout::ChartData;

const HISTORY_COLOR: RGBColor = RGBColor(255, 149, 0);
const FORECAST_COLOR: RGBColor = RGBColor(26, 26, 26);
const GRID_COLOR: RGBColor = RGBColor(235, 235, 235);
const MARKER_COLOR: RGBColor = RGBColor(153, 153, 153);
const BACKGROUND: RGBColor = RGBColor(250, 250, 250);

/// Draws [`ChartData`] into an image file.
pub trait ChartRasterizer {
    /// Write a PNG of the chart to `path`.
    fn rasterize(&self, chart: &ChartData, path: &Path) -> Result<()>;
}

/// Line chart drawn with plotters' bitmap backend.
///
/// History is an orange line with dot markers, the forecast a dark line
/// joined to the last observation, and a grey rule marks where the forecast
/// starts. Only geometry is drawn; labels live in the surrounding report.
#[derive(Debug, Clone, Copy)]
pub struct PlottersRasterizer {
    pub width: u32,
    pub height: u32,
}

impl Default for PlottersRasterizer {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 800,
        }
    }
}

impl ChartRasterizer for PlottersRasterizer {
    fn rasterize(&self, chart: &ChartData, path: &Path) -> Result<()> {
        let (start, end) = chart
            .time_range()
            .ok_or_else(|| Error::Export("nothing to chart".into()))?;
        let (lo, hi) = chart
            .value_range()
            .ok_or_else(|| Error::Export("nothing to chart".into()))?;
        let pad = ((hi - lo).abs() * 0.08).max(hi.abs() * 0.02).max(1.0);
        let (y_min, y_max) = (lo - pad, hi + pad);
        let x_max = days_between(start, end).max(1.0);

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(Error::export)?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(self.height / 16)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(Error::export)?;

        ctx.plotting_area().fill(&BACKGROUND).map_err(Error::export)?;

        let grid = (0..=5).map(|i| {
            let y = y_min + (y_max - y_min) * i as f64 / 5.0;
            PathElement::new(vec![(0.0, y), (x_max, y)], GRID_COLOR.stroke_width(1))
        });
        ctx.draw_series(grid).map_err(Error::export)?;

        let to_xy = |points: &[(NaiveDateTime, f64)]| -> Vec<(f64, f64)> {
            points
                .iter()
                .map(|(d, v)| (days_between(start, *d), *v))
                .collect()
        };
        let history = to_xy(&chart.history);
        let forecast = to_xy(&chart.forecast);

        if let Some(&(x0, _)) = forecast.first() {
            ctx.draw_series(std::iter::once(PathElement::new(
                vec![(x0, y_min), (x0, y_max)],
                MARKER_COLOR.stroke_width(2),
            )))
            .map_err(Error::export)?;
        }

        let stroke = (self.height / 250).max(2);
        let radius = stroke as i32 + 3;
        ctx.draw_series(LineSeries::new(
            history.iter().copied(),
            HISTORY_COLOR.stroke_width(stroke),
        ))
        .map_err(Error::export)?;
        ctx.draw_series(
            history
                .iter()
                .map(|p| Circle::new(*p, radius, HISTORY_COLOR.filled())),
        )
        .map_err(Error::export)?;

        ctx.draw_series(LineSeries::new(
            forecast.iter().copied(),
            FORECAST_COLOR.stroke_width(stroke),
        ))
        .map_err(Error::export)?;
        ctx.draw_series(
            forecast
                .iter()
                .skip(1)
                .map(|p| Circle::new(*p, radius, FORECAST_COLOR.filled())),
        )
        .map_err(Error::export)?;

        root.present().map_err(Error::export)?;
        Ok(())
    }
}

fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_seconds() as f64 / 86_400.0
}
