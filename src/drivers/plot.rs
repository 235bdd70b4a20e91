use std::fs;
use std::io::Cursor;
use std::ops::Range;
use std::path::{Path, PathBuf};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use crate::drivers::error::DashboardError;
use crate::drivers::Sample;
/// Plot-ready points for the two dashboard panels, as `(time, value)` pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSeries {
    pub temperature: Vec<(f64, f64)>,
    /// Only samples that carried a heart-rate; gaps are left out.
    pub heart_rate: Vec<(f64, f64)>,
}
impl DashboardSeries {
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Self {
        let mut series = Self::default();
        for sample in samples {
            series.temperature.push((sample.time, sample.temperature));
            if let Some(bpm) = sample.heart_rate {
                series.heart_rate.push((sample.time, bpm));
            }
        }
        series
    }
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
    /// Time span shared by both panels.
    pub fn time_range(&self) -> Range<f64> {
        padded_range(self.temperature.iter().map(|p| p.0), 0.02, 0.5)
    }
    pub fn temperature_range(&self) -> Range<f64> {
        padded_range(self.temperature.iter().map(|p| p.1), 0.1, 0.5)
    }
    pub fn heart_rate_range(&self) -> Range<f64> {
        padded_range(self.heart_rate.iter().map(|p| p.1), 0.1, 5.0)
    }
}
/// Min/max of the finite values, widened so the axis never collapses.
fn padded_range(values: impl Iterator<Item = f64>, fraction: f64, min_pad: f64) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    let pad = ((max - min) * fraction).max(min_pad);
    (min - pad)..(max + pad)
}
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub temperature_color: RGBColor,
    pub heart_rate_color: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: WHITE,
            foreground: BLACK,
            temperature_color: RGBColor(31, 119, 180),
            heart_rate_color: RED,
        }
    }
}
#[derive(Clone, Copy)]
enum Marker {
    Circle,
    Cross,
}
struct Panel<'a> {
    title: &'a str,
    y_label: &'a str,
    x_label: Option<&'a str>,
    points: &'a [(f64, f64)],
    y_range: Range<f64>,
    color: RGBColor,
    marker: Marker,
}
fn draw_dashboard<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &DashboardSeries,
    style: &PlotStyle,
) -> Result<(), DashboardError>
where
    DB::ErrorType: 'static,
{
    root.fill(&style.background)?;
    let areas = root.split_evenly((2, 1));
    let time_range = series.time_range();
    let panels = [
        Panel {
            title: "Temperature vs Time",
            y_label: "Temp (°C)",
            x_label: None,
            points: &series.temperature,
            y_range: series.temperature_range(),
            color: style.temperature_color,
            marker: Marker::Circle,
        },
        Panel {
            title: "BPM vs Time",
            y_label: "BPM",
            x_label: Some("Time (s)"),
            points: &series.heart_rate,
            y_range: series.heart_rate_range(),
            color: style.heart_rate_color,
            marker: Marker::Cross,
        },
    ];
    for (area, panel) in areas.iter().zip(panels) {
        draw_panel(area, panel, time_range.clone(), style)?;
    }
    root.present()?;
    Ok(())
}
fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: Panel<'_>,
    time_range: Range<f64>,
    style: &PlotStyle,
) -> Result<(), DashboardError>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(
            panel.title,
            ("sans-serif", 18).into_font().color(&style.foreground),
        )
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(time_range, panel.y_range)?;
    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(&style.foreground.mix(0.05))
        .label_style(("sans-serif", 12).into_font().color(&style.foreground))
        .y_desc(panel.y_label);
    if let Some(x_label) = panel.x_label {
        mesh.x_desc(x_label);
    }
    mesh.draw()?;
    if panel.points.is_empty() {
        return Ok(());
    }
    let color = panel.color;
    chart.draw_series(LineSeries::new(panel.points.iter().copied(), &color))?;
    match panel.marker {
        Marker::Circle => {
            chart.draw_series(
                panel
                    .points
                    .iter()
                    .map(|&p| Circle::new(p, 3, color.filled())),
            )?;
        }
        Marker::Cross => {
            chart.draw_series(panel.points.iter().map(|&p| Cross::new(p, 4, &color)))?;
        }
    }
    Ok(())
}
/// Renders both panels into an RGB bitmap.
pub fn render_dashboard(
    series: &DashboardSeries,
    style: &PlotStyle,
) -> Result<ImageBuffer<Rgb<u8>, Vec<u8>>, DashboardError> {
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        draw_dashboard(&root, series, style)?;
    }
    ImageBuffer::<Rgb<u8>, _>::from_raw(style.width, style.height, buffer)
        .ok_or_else(|| DashboardError::Plot("failed to allocate image buffer".into()))
}
/// Output format chosen for a chart path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageTarget {
    Svg,
    Bitmap(ImageFormat),
}
/// Picks the chart format from the extension (svg, png, jpg/jpeg or bmp).
/// A path without an extension is written as PNG with `.png` appended.
pub fn resolve_target(path: &Path) -> Result<(PathBuf, ImageTarget), DashboardError> {
    let Some(extension) = path.extension() else {
        return Ok((
            path.with_extension("png"),
            ImageTarget::Bitmap(ImageFormat::Png),
        ));
    };
    if extension.eq_ignore_ascii_case("svg") {
        return Ok((path.to_path_buf(), ImageTarget::Svg));
    }
    match ImageFormat::from_extension(extension) {
        Some(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp)) => {
            Ok((path.to_path_buf(), ImageTarget::Bitmap(format)))
        }
        _ => Err(DashboardError::UnsupportedImageFormat(path.to_path_buf())),
    }
}
/// Saves the chart and returns the path actually written.
pub fn save_dashboard(
    series: &DashboardSeries,
    path: &Path,
    style: &PlotStyle,
) -> Result<PathBuf, DashboardError> {
    let (target, format) = match resolve_target(path)? {
        (target, ImageTarget::Svg) => {
            {
                let root =
                    SVGBackend::new(&target, (style.width, style.height)).into_drawing_area();
                draw_dashboard(&root, series, style)?;
            }
            return Ok(target);
        }
        (target, ImageTarget::Bitmap(format)) => (target, format),
    };
    let image = render_dashboard(series, style)?;
    let bytes = encode_image(image, format)?;
    fs::write(&target, bytes).map_err(|source| DashboardError::Write {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}
fn encode_image(
    image: ImageBuffer<Rgb<u8>, Vec<u8>>,
    format: ImageFormat,
) -> Result<Vec<u8>, DashboardError> {
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), format)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    fn samples() -> Vec<Sample> {
        vec![
            Sample::new(1.0, 22.5, Some(72.0)),
            Sample::new(2.0, 22.7, None),
            Sample::new(3.0, 22.6, Some(75.0)),
        ]
    }
    #[test]
    fn missing_heart_rate_only_drops_from_bpm_panel() {
        let series = DashboardSeries::from_samples(&samples());
        assert_eq!(
            series.temperature,
            vec![(1.0, 22.5), (2.0, 22.7), (3.0, 22.6)]
        );
        assert_eq!(series.heart_rate, vec![(1.0, 72.0), (3.0, 75.0)]);
    }
    #[test]
    fn building_twice_gives_identical_series() {
        let data = samples();
        assert_eq!(
            DashboardSeries::from_samples(&data),
            DashboardSeries::from_samples(&data)
        );
    }
    #[test]
    fn ranges_never_collapse() {
        let empty = DashboardSeries::default();
        assert_eq!(empty.time_range(), 0.0..1.0);
        let single = DashboardSeries::from_samples(&[Sample::new(5.0, 20.0, None)]);
        let range = single.time_range();
        assert!(range.start < 5.0 && range.end > 5.0);
        assert_eq!(single.heart_rate_range(), 0.0..1.0);
    }
    #[test]
    fn non_finite_values_are_ignored_for_bounds() {
        let series = DashboardSeries::from_samples(&[
            Sample::new(0.0, f64::NAN, None),
            Sample::new(1.0, 20.0, None),
            Sample::new(2.0, 30.0, None),
        ]);
        let range = series.temperature_range();
        assert!(range.start.is_finite() && range.end.is_finite());
        assert!(range.start < 20.0 && range.end > 30.0);
    }
    #[test]
    fn unknown_extension_is_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.tiff");
        let result = save_dashboard(&DashboardSeries::default(), &path, &PlotStyle::default());
        assert!(matches!(
            result,
            Err(DashboardError::UnsupportedImageFormat(_))
        ));
        assert!(!path.exists());
    }
    #[test]
    fn chart_format_follows_extension() {
        assert_eq!(
            resolve_target(Path::new("out/chart.SVG")).unwrap(),
            (PathBuf::from("out/chart.SVG"), ImageTarget::Svg)
        );
        assert_eq!(
            resolve_target(Path::new("chart.jpeg")).unwrap().1,
            ImageTarget::Bitmap(ImageFormat::Jpeg)
        );
        assert!(matches!(
            resolve_target(Path::new("chart.pdf")),
            Err(DashboardError::UnsupportedImageFormat(_))
        ));
    }
    #[test]
    fn bare_name_is_saved_as_png() {
        assert_eq!(
            resolve_target(Path::new("runs/plot")).unwrap(),
            (
                PathBuf::from("runs/plot.png"),
                ImageTarget::Bitmap(ImageFormat::Png)
            )
        );
        let dir = tempfile::tempdir().unwrap();
        let result = save_dashboard(
            &DashboardSeries::from_samples(&samples()),
            &dir.path().join("plot"),
            &PlotStyle::default(),
        );
        // rendering itself may still fail without system fonts
        assert!(!matches!(
            result,
            Err(DashboardError::UnsupportedImageFormat(_))
        ));
        if let Ok(written) = result {
            assert_eq!(written, dir.path().join("plot.png"));
            assert!(written.exists());
        }
    }
    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn saves_png_and_svg() {
        let dir = tempfile::tempdir().unwrap();
        let series = DashboardSeries::from_samples(&samples());
        for name in ["chart.png", "chart.svg", "chart.jpg"] {
            let path = dir.path().join(name);
            save_dashboard(&series, &path, &PlotStyle::default()).unwrap();
            assert!(fs::metadata(&path).unwrap().len() > 0, "{name}");
        }
    }
    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn rendering_is_deterministic() {
        let series = DashboardSeries::from_samples(&samples());
        let first = render_dashboard(&series, &PlotStyle::default()).unwrap();
        let second = render_dashboard(&series, &PlotStyle::default()).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
