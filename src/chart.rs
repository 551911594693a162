use crate::models::SentimentLabel;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 600);

#[derive(Debug, thiserror::Error)]
#[error("Failed to draw chart {path}: {reason}")]
pub struct ChartError {
    pub path: String,
    pub reason: String,
}

/// Bar chart of label counts. `.svg` paths get an SVG, anything else a bitmap.
pub fn draw_distribution(
    path: &Path,
    distribution: &[(SentimentLabel, usize)],
) -> Result<(), ChartError> {
    let chart_err = |e: &dyn std::fmt::Display| ChartError {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| chart_err(&e))?;
    }

    let is_svg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        draw_bars(&root, distribution).map_err(|e| chart_err(&e))?;
    } else {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        draw_bars(&root, distribution).map_err(|e| chart_err(&e))?;
    }

    log::info!("Saved sentiment distribution chart to {}", path.display());
    Ok(())
}

fn draw_bars<DB>(
    root: &DrawingArea<DB, Shift>,
    distribution: &[(SentimentLabel, usize)],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;

    let labels: Vec<String> = distribution.iter().map(|(l, _)| l.to_string()).collect();
    let max_count = distribution.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let y_top = (max_count as u32 + 1).max(1);

    let mut chart = ChartBuilder::on(root)
        .caption("Sentiment Distribution", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0u32..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Sentiment Class")
        .y_desc("Count")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(RGBColor(59, 82, 139).filled())
            .margin(30)
            .data(
                distribution
                    .iter()
                    .enumerate()
                    .map(|(i, (_, count))| (i, *count as u32)),
            ),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Needs system fonts for text layout
    fn test_draws_svg_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("distribution.svg");
        let distribution = vec![(SentimentLabel::Positive, 4), (SentimentLabel::Neutral, 1)];

        draw_distribution(&path, &distribution).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Sentiment Distribution"));
    }
}
