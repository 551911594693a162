//! The three pipeline stages: scrape, clean, sentiment.
//!
//! Each stage reads its inputs from disk (or the browser), writes one output
//! workbook and returns a short summary. Stages share nothing but files.

use crate::browser::{BrowserManager, BrowserScraper, ElementScroller};
use crate::chart::draw_distribution;
use crate::config::{CleanConfig, Config};
use crate::error::Result;
use crate::models::{ReviewRecord, SentimentLabel, SentimentRecord};
use crate::reviews::{extract_reviews, ReviewSelectors};
use crate::scroll::{scroll_until_idle, ScrollOutcome, SystemClock};
use crate::sentiment::{analyze_comments, label_distribution, InferenceClient, SentimentModel};
use crate::text::{first_occurrences, normalize_comment, Stopwords};
use crate::workbook::{read_table, write_table, Cell, Table};
use std::path::PathBuf;

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub reviews: usize,
    pub missing_ratings: usize,
    pub scroll_outcome: ScrollOutcome,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSummary {
    pub rows: usize,
    pub distribution: Vec<(SentimentLabel, usize)>,
    pub output: PathBuf,
    pub chart: Option<PathBuf>,
}

/// Open the review page, scroll the lazy list to its end and save every review.
///
/// The browser is shut down when this returns, on success or failure.
pub fn run_scrape(config: &Config) -> Result<ScrapeSummary> {
    let selectors = ReviewSelectors::new(&config.scrape.selectors)?;
    let url = config.scrape.require_url()?;

    let manager = BrowserManager::new(config.browser.clone())?;
    let scraper = BrowserScraper::with_timeout(manager.new_tab()?, config.scrape.wait_timeout());
    scraper.navigate(url)?;

    let container = scraper.wait_for_selector(&config.scrape.container_selector)?;
    let report = scroll_until_idle(
        &mut ElementScroller::new(container),
        &SystemClock,
        &config.scroll.options(),
    );
    log::info!(
        "Scrolling finished after {} steps in {:?} ({:?})",
        report.steps,
        report.elapsed,
        report.outcome
    );

    let html = scraper.get_html()?;
    let records = extract_reviews(&html, &selectors);
    save_reviews(&records, &config.scrape.output)?;
    log::info!("Work is DONE! {} reviews from {}", records.len(), url);

    Ok(ScrapeSummary {
        reviews: records.len(),
        missing_ratings: records.iter().filter(|r| r.rating.is_none()).count(),
        scroll_outcome: report.outcome,
        output: config.scrape.output.clone(),
    })
}

pub fn save_reviews(records: &[ReviewRecord], output: &std::path::Path) -> Result<()> {
    write_table(output, &Table::from(records))?;
    Ok(())
}

/// Deduplicate and normalize the comment column of a scraped workbook
pub fn run_clean(config: &CleanConfig) -> Result<CleanSummary> {
    let table = read_table(&config.input)?;
    let rows_in = table.len();
    let stopwords = Stopwords::english().with_extra(&config.extra_stopwords);

    let cleaned = clean_table(table, config, &stopwords)?;
    log_preview(&cleaned, &config.output_column);
    write_table(&config.output, &cleaned)?;

    Ok(CleanSummary {
        rows_in,
        rows_out: cleaned.len(),
        output: config.output.clone(),
    })
}

/// Drop rows with duplicate comments (first kept), then normalize the
/// remaining comments in place under `output_column`.
pub fn clean_table(mut table: Table, config: &CleanConfig, stopwords: &Stopwords) -> Result<Table> {
    let col = table.column_index(&config.column)?;

    let comments = table.text_column(col);
    let keep = first_occurrences(&comments);
    log::info!(
        "Removed {} duplicate comments out of {}",
        comments.len() - keep.len(),
        comments.len()
    );
    table.retain_rows(&keep);

    let normalized: Vec<Option<String>> = table
        .text_column(col)
        .into_iter()
        .map(|c| c.map(|text| normalize_comment(&text, stopwords)))
        .collect();
    for (row, comment) in normalized.into_iter().enumerate() {
        table.set(row, col, Cell::from_text(comment));
    }
    table.headers[col] = config.output_column.clone();

    Ok(table)
}

fn log_preview(table: &Table, column: &str) {
    let Ok(col) = table.column_index(column) else {
        return;
    };
    for (i, comment) in table.text_column(col).iter().take(PREVIEW_ROWS).enumerate() {
        log::info!("{:>3}: {}", i, comment.as_deref().unwrap_or("<empty>"));
    }
}

/// Score comments with the configured inference endpoint
pub fn run_sentiment(config: &Config) -> Result<SentimentSummary> {
    let model = InferenceClient::new(config.sentiment.inference())?;
    run_sentiment_with(config, &model)
}

/// Score comments with `model`, write the annotated workbook and the chart.
///
/// A chart that cannot be drawn is logged; the workbook is still kept.
pub fn run_sentiment_with<M>(config: &Config, model: &M) -> Result<SentimentSummary>
where
    M: SentimentModel + ?Sized,
{
    let settings = &config.sentiment;
    let mut table = read_table(&settings.input)?;
    let col = table.column_index(&settings.column)?;

    let comments = table.text_column(col);
    let records = analyze_comments(model, &comments, settings.batch_size);
    annotate_table(&mut table, &records);
    write_table(&settings.output, &table)?;

    let distribution = label_distribution(&records);
    println!("sentiment_class");
    for (label, count) in &distribution {
        println!("{:<16}{}", label.as_str(), count);
    }

    let chart = match draw_distribution(&settings.chart, &distribution) {
        Ok(()) => Some(settings.chart.clone()),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };

    Ok(SentimentSummary {
        rows: records.len(),
        distribution,
        output: settings.output.clone(),
        chart,
    })
}

/// Append `sentiment_class` and `sentiment_score` columns
pub fn annotate_table(table: &mut Table, records: &[SentimentRecord]) {
    table.push_column(
        "sentiment_class",
        records
            .iter()
            .map(|r| Cell::Text(r.sentiment_label.to_string()))
            .collect(),
    );
    table.push_column(
        "sentiment_score",
        records.iter().map(|r| Cell::Number(r.sentiment_score)).collect(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments_table(comments: &[Option<&str>]) -> Table {
        let mut table = Table::new(vec!["rating".to_string(), "review".to_string()]);
        table.rows = comments
            .iter()
            .enumerate()
            .map(|(i, c)| vec![Cell::Number(i as f64), Cell::from_text(c.map(str::to_string))])
            .collect();
        table
    }

    #[test]
    fn test_clean_table_dedups_before_normalizing() {
        let table = comments_table(&[
            Some("Great coffee!"),
            Some("The staff was rude."),
            Some("Great coffee!"),
            None,
            Some("great coffee"),
            None,
        ]);

        let cleaned = clean_table(table, &CleanConfig::default(), &Stopwords::english()).unwrap();

        assert_eq!(cleaned.headers, vec!["rating", "comments"]);
        assert_eq!(
            cleaned.text_column(1),
            vec![
                Some("great coffee".to_string()),
                Some("staff rude".to_string()),
                None,
                Some("great coffee".to_string()),
            ]
        );
        // other columns follow their rows
        assert_eq!(cleaned.text_column(0), vec![Some("0".into()), Some("1".into()), Some("3".into()), Some("4".into())]);
    }

    #[test]
    fn test_clean_table_requires_column() {
        let table = comments_table(&[Some("x")]);
        let config = CleanConfig {
            column: "comments".to_string(),
            ..CleanConfig::default()
        };
        assert!(clean_table(table, &config, &Stopwords::english()).is_err());
    }

    #[test]
    fn test_annotate_table() {
        let mut table = comments_table(&[Some("a"), None]);
        let records = vec![
            SentimentRecord {
                comment_text: Some("a".into()),
                sentiment_label: SentimentLabel::Positive,
                sentiment_score: 0.75,
            },
            SentimentRecord {
                comment_text: None,
                sentiment_label: SentimentLabel::Unknown,
                sentiment_score: 0.0,
            },
        ];

        annotate_table(&mut table, &records);

        assert_eq!(
            table.headers,
            vec!["rating", "review", "sentiment_class", "sentiment_score"]
        );
        assert_eq!(table.rows[0][2], Cell::Text("POSITIVE".into()));
        assert_eq!(table.rows[1][2], Cell::Text("unknown".into()));
        assert_eq!(table.rows[1][3], Cell::Number(0.0));
    }
}
