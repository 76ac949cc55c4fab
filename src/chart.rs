use super::{
    min_and_max, suitable_xfmt, LineCounts, RenderError, CHART_TITLE, FIGURE_SIZE, SOURCE_LABEL,
    TEST_LABEL, X_DESC, Y_DESC,
};
use chrono::prelude::*;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedDateTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

pub const SOURCE_COLOR: RGBColor = BLUE;
pub const TEST_COLOR: RGBColor = RGBColor(255, 165, 0);
const GRID_COLOR: RGBColor = RGBColor(150, 150, 150);
const GRID_ALPHA: f64 = 0.7;
// dashes across the full width (or height) of the plotting area
const GRID_DASHES: usize = 150;
const GRID_DASH_DUTY: f64 = 0.7;
const X_LABELS: usize = 12;
const Y_LABELS: usize = 10;

/// Padded axis ranges for the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub xmin: DateTime<Utc>,
    pub xmax: DateTime<Utc>,
    pub ymin: f64,
    pub ymax: f64,
    /// first to last date, before padding
    pub data_xspan: chrono::Duration,
}

impl PlotBounds {
    pub fn xspan(&self) -> chrono::Duration {
        self.xmax - self.xmin
    }

    pub fn xfmt(&self) -> &'static str {
        suitable_xfmt(self.data_xspan)
    }

    /// dates of the x labels and vertical gridlines
    pub fn x_key_points(&self) -> Vec<DateTime<Utc>> {
        RangedDateTime::from(self.xmin..self.xmax).key_points(X_LABELS)
    }

    pub fn x_labels(&self) -> Vec<String> {
        let xfmt = self.xfmt();
        self.x_key_points()
            .iter()
            .map(|x| x.format(xfmt).to_string())
            .collect()
    }

    /// datetime at fraction `p` of the x range
    fn x_at(&self, p: f64) -> DateTime<Utc> {
        let ms = self.xspan().num_milliseconds() as f64 * p;
        self.xmin + chrono::Duration::milliseconds(ms.round() as i64)
    }

    fn y_at(&self, p: f64) -> f64 {
        self.ymin + (self.ymax - self.ymin) * p
    }
}

fn utc_midnight(d: NaiveDate) -> DateTime<Utc> {
    TimeZone::from_utc_datetime(&Utc, &d.and_time(NaiveTime::MIN))
}

/// Start and end fractions (within 0..1) of the dashes of a gridline.
pub fn dash_segments(dashes: usize, duty: f64) -> Vec<(f64, f64)> {
    let period = 1. / dashes as f64;
    (0..dashes)
        .map(|i| {
            let start = i as f64 * period;
            (start, start + period * duty)
        })
        .collect()
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

impl LineCounts {
    /// x: first..last date with a margin of 1/20 of the span (a day if all dates match),
    /// y: min..max over both series with a margin of 1/10 of the span (1 if flat).
    pub fn bounds(&self) -> Result<PlotBounds, RenderError> {
        let (dmin, dmax) = min_and_max(&self.date[..]).ok_or(RenderError::NoData)?;
        let (smin, smax) = min_and_max(&self.source_lines[..]).ok_or(RenderError::NoData)?;
        let (tmin, tmax) = min_and_max(&self.test_lines[..]).ok_or(RenderError::NoData)?;
        let xmindt = utc_midnight(dmin);
        let xmaxdt = utc_midnight(dmax);
        let xspan = xmaxdt - xmindt;
        let xmargin = if xspan == chrono::Duration::zero() {
            chrono::Duration::days(1)
        } else {
            xspan / 20
        };
        let ymin = smin.min(tmin) as f64;
        let ymax = smax.max(tmax) as f64;
        let ymargin = if ymax > ymin { (ymax - ymin) / 10. } else { 1. };
        Ok(PlotBounds {
            xmin: xmindt - xmargin,
            xmax: xmaxdt + xmargin,
            ymin: ymin - ymargin,
            ymax: ymax + ymargin,
            data_xspan: xspan,
        })
    }

    /// plots the source and test line counts to a png file, overwriting it
    pub fn plot_png(&self, fout: &Path) -> Result<(), RenderError> {
        let bounds = self.bounds()?;
        let root = BitMapBackend::new(fout, FIGURE_SIZE).into_drawing_area();
        self.draw_growth(&root, &bounds).map_err(draw_err)?;
        root.present().map_err(draw_err)?;
        Ok(())
    }

    /// same figure as `plot_png`, as a row-major RGB8 buffer of `FIGURE_SIZE`
    pub fn plot_rgb(&self) -> Result<Vec<u8>, RenderError> {
        let bounds = self.bounds()?;
        let (w, h) = FIGURE_SIZE;
        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, FIGURE_SIZE).into_drawing_area();
            self.draw_growth(&root, &bounds).map_err(draw_err)?;
            root.present().map_err(draw_err)?;
        }
        Ok(buf)
    }

    fn draw_growth<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        bounds: &PlotBounds,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let xfmt = bounds.xfmt();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(root)
            .caption(CHART_TITLE, ("sans-serif", 32))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(100)
            .build_cartesian_2d(bounds.xmin..bounds.xmax, bounds.ymin..bounds.ymax)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .set_all_tick_mark_size(2)
            .label_style(("sans-serif", 18))
            .x_labels(X_LABELS)
            .y_labels(Y_LABELS)
            .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
            .y_label_formatter(&|y: &f64| format!("{:.0}", y))
            .x_desc(X_DESC)
            .y_desc(Y_DESC)
            .draw()?;

        // dashed grid at the label positions
        let xticks = bounds.x_key_points();
        let yticks = chart.as_coord_spec().y_spec().key_points(Y_LABELS);
        let grid = GRID_COLOR.mix(GRID_ALPHA).stroke_width(1);
        let dashes = dash_segments(GRID_DASHES, GRID_DASH_DUTY);
        chart.draw_series(yticks.iter().flat_map(|&y| {
            dashes.iter().map(move |&(a, b)| {
                PathElement::new(vec![(bounds.x_at(a), y), (bounds.x_at(b), y)], grid)
            })
        }))?;
        chart.draw_series(xticks.iter().flat_map(|&x| {
            dashes.iter().map(move |&(a, b)| {
                PathElement::new(vec![(x, bounds.y_at(a)), (x, bounds.y_at(b))], grid)
            })
        }))?;

        let dates: Vec<DateTime<Utc>> = self.date.iter().map(|&d| utc_midnight(d)).collect();
        chart
            .draw_series(LineSeries::new(
                dates
                    .iter()
                    .zip(self.source_lines.iter())
                    .map(|(&x, &y)| (x, y as f64)),
                SOURCE_COLOR.stroke_width(2),
            ))?
            .label(SOURCE_LABEL)
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], SOURCE_COLOR.stroke_width(2))
            });
        chart
            .draw_series(LineSeries::new(
                dates
                    .iter()
                    .zip(self.test_lines.iter())
                    .map(|(&x, &y)| (x, y as f64)),
                TEST_COLOR.stroke_width(2),
            ))?
            .label(TEST_LABEL)
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], TEST_COLOR.stroke_width(2))
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(("sans-serif", 18))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(data: &str) -> LineCounts {
        LineCounts::from_reader(Cursor::new(data)).unwrap()
    }

    #[test]
    fn bounds_pad_both_axes() {
        let lc = load("2024-01-01 100 0\n2024-01-21 200 50\n");
        let b = lc.bounds().unwrap();
        assert_eq!(b.xmin, Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap());
        assert_eq!(b.xmax, Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap());
        assert_eq!(b.ymin, -20.);
        assert_eq!(b.ymax, 220.);
    }

    #[test]
    fn bounds_of_a_single_row_are_not_empty() {
        let lc = load("2024-05-05 42 42\n");
        let b = lc.bounds().unwrap();
        assert_eq!(b.xspan(), chrono::Duration::days(2));
        assert_eq!((b.ymin, b.ymax), (41., 43.));
    }

    #[test]
    fn bounds_follow_dates_not_file_order() {
        let lc = load("2024-03-01 1 1\n2024-01-01 1 1\n2024-02-01 1 1\n");
        let b = lc.bounds().unwrap();
        assert!(b.xmin < utc_midnight(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(b.xmax > utc_midnight(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn empty_counts_have_nothing_to_plot() {
        let lc = LineCounts::new(0);
        assert!(matches!(lc.bounds(), Err(RenderError::NoData)));
        assert!(matches!(lc.plot_rgb(), Err(RenderError::NoData)));
    }

    #[test]
    fn short_histories_get_distinct_x_labels() {
        for data in [
            "2024-01-01 10 2\n2024-01-02 15 4\n2024-01-03 20 7\n",
            "2024-05-05 42 42\n",
            "2024-01-01 10 2\n2024-01-21 40 9\n",
        ] {
            let labels = load(data).bounds().unwrap().x_labels();
            assert!(labels.len() > 1, "{:?}", labels);
            let mut unique = labels.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), labels.len(), "repeated labels {:?}", labels);
        }
    }

    #[test]
    fn xfmt_follows_the_unpadded_span() {
        let b = load("2024-01-01 1 1\n2024-01-08 2 2\n").bounds().unwrap();
        assert_eq!(b.data_xspan, chrono::Duration::days(7));
        assert!(b.xspan() > chrono::Duration::weeks(1));
        assert_eq!(b.xfmt(), "%m-%d %H");
        let b = load("2024-01-01 1 1\n2024-01-21 2 2\n").bounds().unwrap();
        assert_eq!(b.xfmt(), "%Y-%m-%d");
    }

    #[test]
    fn dashes_tile_the_unit_interval() {
        let d = dash_segments(4, 0.5);
        assert_eq!(d, vec![(0., 0.125), (0.25, 0.375), (0.5, 0.625), (0.75, 0.875)]);
        let d = dash_segments(GRID_DASHES, GRID_DASH_DUTY);
        assert_eq!(d.len(), GRID_DASHES);
        assert!(d.iter().all(|&(a, b)| a < b && b <= 1.));
    }

    #[test]
    fn fractions_map_onto_the_bounds() {
        let lc = load("2024-01-01 0 0\n2024-01-21 100 10\n");
        let b = lc.bounds().unwrap();
        assert_eq!(b.x_at(0.), b.xmin);
        assert_eq!(b.x_at(1.), b.xmax);
        assert_eq!(b.y_at(0.5), (b.ymin + b.ymax) / 2.);
    }
}
