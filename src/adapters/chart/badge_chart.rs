//! Badge progression chart.
//!
//! Turns an ordered badge history into a cumulative series, rendered as a PNG
//! line chart (`plotters` bitmap backend, `image` PNG encoder). The CSV export
//! and the monthly text bar chart stand in when rendering fails.

use crate::domain::{Attachment, BadgeAward};
use chrono::NaiveDate;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;
const MARGIN: u32 = 24;
const LINE_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot")]
    Empty,
    #[error("chart render failed: {0}")]
    Render(String),
    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Width of the longest bar in the text chart.
const BAR_WIDTH: usize = 20;
/// Most recent months shown in the text chart.
const MAX_MONTHS: usize = 24;

/// One point per award: (award date, badges held after it).
pub fn cumulative_series(awards: &[BadgeAward]) -> Vec<(NaiveDate, usize)> {
    awards
        .iter()
        .enumerate()
        .map(|(i, a)| (a.awarded_at.date_naive(), i + 1))
        .collect()
}

/// CSV with header `awarded_date,cumulative_badges`.
pub fn series_to_csv(series: &[(NaiveDate, usize)]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    wtr.write_record(["awarded_date", "cumulative_badges"])?;
    for (date, total) in series {
        wtr.write_record([date.format("%Y-%m-%d").to_string(), total.to_string()])?;
    }
    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::other(e.to_string()))
    })?;
    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Cumulative count at the end of each month, as `YYYY-MM ████ n` lines.
pub fn monthly_bars(series: &[(NaiveDate, usize)]) -> String {
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    for (date, total) in series {
        by_month.insert(date.format("%Y-%m").to_string(), *total);
    }
    let max = by_month.values().copied().max().unwrap_or(0);
    if max == 0 {
        return String::new();
    }

    let skip = by_month.len().saturating_sub(MAX_MONTHS);
    by_month
        .iter()
        .skip(skip)
        .map(|(month, total)| {
            let len = (total * BAR_WIDTH).div_ceil(max).max(1);
            format!("{} {} {}", month, "█".repeat(len), total)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chart coordinates: (days since first award, cumulative count), one per award.
pub fn plot_points(series: &[(NaiveDate, usize)]) -> Vec<(f64, f64)> {
    let Some((first, _)) = series.first() else {
        return Vec::new();
    };
    series
        .iter()
        .map(|(date, total)| ((*date - *first).num_days() as f64, *total as f64))
        .collect()
}

/// Render the cumulative series as a PNG line chart with a marker per award.
pub fn render_png(series: &[(NaiveDate, usize)]) -> Result<Vec<u8>, ChartError> {
    let points = plot_points(series);
    if points.is_empty() {
        return Err(ChartError::Empty);
    }
    let max_x = points.iter().map(|p| p.0).fold(1.0, f64::max);
    let max_y = points.iter().map(|p| p.1).fold(1.0, f64::max) * 1.05;
    let render = |e: &dyn std::fmt::Display| ChartError::Render(e.to_string());

    let mut rgb = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| render(&e))?;
        let mut chart = ChartBuilder::on(&root)
            .margin(MARGIN)
            .build_cartesian_2d(0.0..max_x, 0.0..max_y)
            .map_err(|e| render(&e))?;

        // axes
        chart
            .draw_series(LineSeries::new(vec![(0.0, max_y), (0.0, 0.0), (max_x, 0.0)], &BLACK))
            .map_err(|e| render(&e))?;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(2)))
            .map_err(|e| render(&e))?;
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 3, LINE_COLOR.filled())))
            .map_err(|e| render(&e))?;
        root.present().map_err(|e| render(&e))?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&rgb, CHART_WIDTH, CHART_HEIGHT, ColorType::Rgb8)?;
    Ok(png)
}

/// PNG chart attachment for `username`'s badge history.
pub fn chart_attachment(username: &str, awards: &[BadgeAward]) -> Result<Attachment, ChartError> {
    let png = render_png(&cumulative_series(awards))?;
    Ok(Attachment {
        file_name: format!("badge_progression_{}.png", sanitize_file_stem(username)),
        mime: "image/png",
        bytes: png,
    })
}

/// CSV export of the same series, sent when the chart cannot be drawn.
pub fn csv_attachment(username: &str, awards: &[BadgeAward]) -> Result<Attachment, csv::Error> {
    let csv = series_to_csv(&cumulative_series(awards))?;
    Ok(Attachment {
        file_name: format!("badge_progression_{}.csv", sanitize_file_stem(username)),
        mime: "text/csv",
        bytes: csv.into_bytes(),
    })
}

fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn award(y: i32, m: u32, d: u32) -> BadgeAward {
        BadgeAward {
            awarded_at: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
            badge_name: format!("b{}{}{}", y, m, d),
        }
    }

    #[test]
    fn series_counts_up_from_one() {
        let s = cumulative_series(&[award(2021, 1, 1), award(2021, 1, 5), award(2021, 3, 2)]);
        let counts: Vec<usize> = s.iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(s[2].0, NaiveDate::from_ymd_opt(2021, 3, 2).unwrap());
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = series_to_csv(&cumulative_series(&[award(2020, 2, 29), award(2020, 3, 1)])).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["awarded_date,cumulative_badges", "2020-02-29,1", "2020-03-01,2"]);
    }

    #[test]
    fn monthly_bars_keep_last_total_per_month() {
        let bars = monthly_bars(&cumulative_series(&[
            award(2021, 1, 1),
            award(2021, 1, 9),
            award(2021, 4, 2),
            award(2021, 4, 3),
        ]));
        let lines: Vec<&str> = bars.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2021-01 "));
        assert!(lines[0].ends_with(" 2"));
        assert!(lines[1].ends_with(" 4"));
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn empty_history_has_no_bars() {
        assert_eq!(monthly_bars(&[]), "");
    }

    #[test]
    fn csv_attachment_name_is_file_safe() {
        let a = csv_attachment("weird name/..", &[award(2022, 1, 1)]).unwrap();
        assert_eq!(a.file_name, "badge_progression_weird-name---.csv");
        assert_eq!(a.mime, "text/csv");
    }

    #[test]
    fn one_point_per_award() {
        let awards = [award(2021, 1, 1), award(2021, 1, 1), award(2021, 1, 11)];
        let points = plot_points(&cumulative_series(&awards));
        assert_eq!(points, vec![(0.0, 1.0), (0.0, 2.0), (10.0, 3.0)]);
        assert!(plot_points(&[]).is_empty());
    }

    #[test]
    fn chart_is_a_png_of_the_expected_size() {
        let awards = [award(2020, 5, 1), award(2021, 2, 3), award(2023, 8, 9)];
        let a = chart_attachment("alt_01", &awards).unwrap();
        assert_eq!(a.mime, "image/png");
        assert_eq!(a.file_name, "badge_progression_alt_01.png");
        assert_eq!(&a.bytes[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory_with_format(&a.bytes, image::ImageFormat::Png).unwrap();
        assert_eq!(img.to_rgb8().dimensions(), (CHART_WIDTH, CHART_HEIGHT));
    }

    #[test]
    fn single_award_still_renders() {
        let png = render_png(&cumulative_series(&[award(2022, 2, 2)])).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn empty_history_is_not_rendered() {
        assert!(matches!(render_png(&[]), Err(ChartError::Empty)));
    }
}
