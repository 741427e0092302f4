//! Scorecard rendering.
//!
//! Turns an analysis into a PDF scorecard with an embedded radar chart. Files
//! land in the report directory as `scorecard_{timestamp}.pdf` and `.png`.
//! Rendering is synchronous and CPU-bound; callers run it on the blocking pool.

pub mod chart;
pub mod pdf;
pub mod text;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::instrument;

use speakerlab_core::{AnalysisResult, ScoreMap, TierAnalysis, format_score};

use crate::models::history::preview;
use pdf::Block;

/// Characters of the transcript printed on the scorecard.
pub const TRANSCRIPT_EXCERPT_CHARS: usize = 500;

/// Document title.
pub const TITLE: &str = "Speaker Lab AI - TEDxBrasov";

/// Errors that can occur while rendering a scorecard.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF encoding failed.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Chart drawing failed.
    #[error("chart error: {0}")]
    Chart(String),

    /// PNG encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The blocking render task did not complete.
    #[error("render task failed: {0}")]
    Task(String),
}

/// Everything a scorecard shows.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub transcript: String,
    pub result: AnalysisResult,
    pub speaker_name: String,
    pub generated_at: DateTime<Local>,
}

/// Files produced for one scorecard, as names inside the report directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub pdf_file: String,
    pub chart_file: Option<String>,
}

/// Writes scorecards into one directory.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    dir: PathBuf,
}

impl ReportRenderer {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The report directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render a scorecard.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the chart or the document cannot be produced.
    #[instrument(skip(self, input), fields(tier = %input.result.tier()))]
    pub fn render(&self, input: &ReportInput) -> Result<RenderedReport, ReportError> {
        std::fs::create_dir_all(&self.dir)?;
        let stem = self.claim_stem(input.generated_at)?;

        let rendered = self.write_files(&stem, input);
        if rendered.is_err() {
            for ext in ["pdf", "png"] {
                let path = self.dir.join(format!("{stem}.{ext}"));
                match std::fs::remove_file(&path) {
                    Err(e) if e.kind() != ErrorKind::NotFound => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to remove partial scorecard"
                        );
                    }
                    _ => {}
                }
            }
        }
        rendered
    }

    fn write_files(&self, stem: &str, input: &ReportInput) -> Result<RenderedReport, ReportError> {
        let scores = ScoreMap::from_result(&input.result);
        let chart = chart::render(&scores)?;
        let chart_file = match &chart {
            Some(chart) => {
                let name = format!("{stem}.png");
                chart.save_png(&self.dir.join(&name))?;
                Some(name)
            }
            None => {
                tracing::debug!("No scores to plot, skipping chart");
                None
            }
        };

        let blocks = build_blocks(input, &scores);
        let pdf_file = format!("{stem}.pdf");
        let pages = pdf::write(&blocks, chart.as_ref(), &self.dir.join(&pdf_file))?;

        tracing::info!(file = %pdf_file, pages, "Scorecard written");
        Ok(RenderedReport {
            pdf_file,
            chart_file,
        })
    }

    /// Render on the blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`ReportRenderer::render`], plus `ReportError::Task` if the
    /// task panics or is cancelled.
    pub async fn render_blocking(&self, input: ReportInput) -> Result<RenderedReport, ReportError> {
        let renderer = self.clone();
        tokio::task::spawn_blocking(move || renderer.render(&input))
            .await
            .map_err(|e| ReportError::Task(e.to_string()))?
    }

    /// Reserve `scorecard_{YYYYmmddHHMMSSmmm}`, suffixed if that name is taken.
    ///
    /// The PDF is created empty with `create_new`, so concurrent renders never
    /// share a stem. The chart reuses the reserved stem.
    fn claim_stem(&self, at: DateTime<Local>) -> std::io::Result<String> {
        let base = format!("scorecard_{}", at.format("%Y%m%d%H%M%S%3f"));
        let mut stem = base.clone();
        let mut n = 0_u32;
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(format!("{stem}.pdf")))
            {
                Ok(_) => return Ok(stem),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    n += 1;
                    stem = format!("{base}_{n}");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether `name` could be a file this renderer wrote.
///
/// Only plain `scorecard_*.pdf` / `.png` names qualify; anything with a path
/// separator or `..` does not.
#[must_use]
pub fn is_report_file_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(".pdf")
        .or_else(|| name.strip_suffix(".png"))
    else {
        return false;
    };
    stem.strip_prefix("scorecard_").is_some_and(|id| {
        !id.is_empty() && id.chars().all(|c| c.is_ascii_digit() || c == '_')
    })
}

/// Document content for `input`.
fn build_blocks(input: &ReportInput, scores: &ScoreMap) -> Vec<Block> {
    let tier = input.result.tier();
    let mut blocks = vec![
        Block::Title(TITLE.to_string()),
        Block::Byline(format!(
            "Speaker: {} | Tier: {} | {}",
            input.speaker_name,
            tier.display_name(),
            input.generated_at.format("%d.%m.%Y %H:%M"),
        )),
        Block::Gap(8.0),
        Block::Heading("Discurs analizat:".to_string()),
        Block::Text(preview(&input.transcript, TRANSCRIPT_EXCERPT_CHARS)),
    ];

    match (&input.result, input.result.view()) {
        (AnalysisResult::Failed { error, .. }, _) => {
            blocks.push(Block::Heading("Răspunsul nu a putut fi interpretat:".to_string()));
            blocks.push(Block::Text(error.clone()));
        }
        (AnalysisResult::Parsed { .. }, Some(view)) => push_breakdown(&mut blocks, &view),
        (AnalysisResult::Parsed { .. }, None) => {
            tracing::warn!(
                tier = %tier,
                "Stored analysis no longer matches schema, omitting breakdown"
            );
        }
    }

    if !scores.is_empty() {
        blocks.push(Block::Heading("Profil:".to_string()));
        let legend: Vec<String> = scores
            .iter()
            .enumerate()
            .map(|(i, (label, score))| format!("{}. {label}: {}/10", i + 1, format_score(score)))
            .collect();
        blocks.push(Block::Text(legend.join("\n")));
        blocks.push(Block::Chart);
    }

    blocks
}

fn push_breakdown(blocks: &mut Vec<Block>, view: &TierAnalysis) {
    match view {
        TierAnalysis::Free(criteria) => {
            blocks.push(Block::Heading("Analiza de bază:".to_string()));
            for (name, criterion) in criteria.iter() {
                blocks.push(Block::Subheading(format!(
                    "{name}: {}/10",
                    format_score(criterion.score)
                )));
                blocks.push(Block::Text(format!("Recomandare: {}", criterion.recommendation)));
                blocks.push(Block::Gap(2.0));
            }
        }
        TierAnalysis::Speaker(criteria) => {
            blocks.push(Block::Heading("Analiza - 9 Principii Gallo:".to_string()));
            for (name, criterion) in criteria.iter() {
                let marker = if criterion.present == Some(true) { "[x]" } else { "[ ]" };
                blocks.push(Block::Subheading(format!(
                    "{marker} {name}: {}/10",
                    format_score(criterion.score)
                )));
                blocks.push(Block::Text(criterion.recommendation.clone()));
                blocks.push(Block::Gap(2.0));
            }
        }
        TierAnalysis::Coach(plan) => {
            blocks.push(Block::Heading(format!(
                "Scor general: {}/10",
                format_score(plan.overall_score)
            )));
            blocks.push(Block::Text(plan.summary.clone()));
            push_list(blocks, "Puncte forte:", &plan.strengths);
            blocks.push(Block::Heading(format!(
                "Plan de coaching ({} sesiuni):",
                plan.coaching_sessions.len()
            )));
            for session in &plan.coaching_sessions {
                blocks.push(Block::Subheading(format!(
                    "Ziua {}: {}",
                    session.day, session.principle
                )));
                blocks.push(Block::Text(format!("Exercițiu: {}", session.exercise)));
                if !session.example_question.is_empty() {
                    blocks.push(Block::Text(format!("Întrebare: {}", session.example_question)));
                }
                if !session.ted_example.is_empty() {
                    blocks.push(Block::Text(format!("Exemplu TED: {}", session.ted_example)));
                }
                blocks.push(Block::Gap(2.0));
            }
            push_list(blocks, "Pașii următori:", &plan.next_steps);
        }
        TierAnalysis::Curator(feedback) => {
            blocks.push(Block::Heading(format!(
                "Verdict curator: {}",
                feedback.curator_verdict
            )));
            blocks.push(Block::Quote(feedback.curator_message.clone()));
            blocks.push(Block::Subheading(format!(
                "Scor general: {}/10",
                format_score(feedback.overall_score)
            )));
            blocks.push(Block::Heading("Ce m-a impresionat:".to_string()));
            blocks.push(Block::Text(feedback.what_moved_me.clone()));
            blocks.push(Block::Heading("Ce mă îngrijorează:".to_string()));
            blocks.push(Block::Text(feedback.what_worries_me.clone()));
            if let Some(readiness) = &feedback.stage_readiness {
                blocks.push(Block::Heading("Pregătire pentru scenă:".to_string()));
                let ready = if readiness.ready_to_present { "da" } else { "nu" };
                blocks.push(Block::Text(format!(
                    "Gata de prezentare: {ready} | Sesiuni estimate: {}\nPrioritate: {}",
                    readiness.estimated_sessions_needed, readiness.priority_action
                )));
            }
        }
    }
}

fn push_list(blocks: &mut Vec<Block>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    blocks.push(Block::Heading(heading.to_string()));
    let lines: Vec<String> = items.iter().map(|item| format!("- {item}")).collect();
    blocks.push(Block::Text(lines.join("\n")));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use speakerlab_core::Tier;

    use super::*;

    fn input(result: AnalysisResult) -> ReportInput {
        ReportInput {
            transcript: "Bună seara, Brașov! ".repeat(40),
            result,
            speaker_name: "Ana".to_string(),
            generated_at: Local::now(),
        }
    }

    fn headings(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_report_file_names() {
        assert!(is_report_file_name("scorecard_20250101120000123.pdf"));
        assert!(is_report_file_name("scorecard_20250101120000123_1.png"));
        assert!(!is_report_file_name("scorecard_.pdf"));
        assert!(!is_report_file_name("../users.json"));
        assert!(!is_report_file_name("scorecard_1/../../x.pdf"));
        assert!(!is_report_file_name("scorecard_1.pdf.exe"));
        assert!(!is_report_file_name("history.json"));
    }

    #[test]
    fn test_transcript_excerpt_is_truncated() {
        let result = AnalysisResult::Failed {
            tier: Tier::Free,
            error: "not json".to_string(),
        };
        let input = input(result);
        let blocks = build_blocks(&input, &ScoreMap::default());
        let Block::Text(excerpt) = &blocks[4] else {
            panic!("expected transcript text");
        };
        assert_eq!(excerpt.chars().count(), TRANSCRIPT_EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_failed_result_shows_raw_text() {
        let result = AnalysisResult::Failed {
            tier: Tier::Speaker,
            error: "not json".to_string(),
        };
        let blocks = build_blocks(&input(result), &ScoreMap::default());
        assert!(blocks.contains(&Block::Text("not json".to_string())));
        assert!(!blocks.contains(&Block::Chart));
    }

    #[test]
    fn test_speaker_breakdown_marks_presence() {
        let result = AnalysisResult::Parsed {
            tier: Tier::Speaker,
            analysis: json!({
                "Pasiunea": {"score": 8, "present": true, "recommendation": "Continuă"},
                "Umor": {"score": 3, "present": false, "recommendation": "O glumă"}
            }),
        };
        let scores = ScoreMap::from_result(&result);
        let blocks = build_blocks(&input(result), &scores);
        assert!(blocks.contains(&Block::Subheading("[x] Pasiunea: 8/10".to_string())));
        assert!(blocks.contains(&Block::Subheading("[ ] Umor: 3/10".to_string())));
        assert!(blocks.contains(&Block::Chart));
    }

    #[test]
    fn test_coach_and_curator_sections() {
        let coach = AnalysisResult::Parsed {
            tier: Tier::Coach,
            analysis: json!({
                "overall_score": 7,
                "summary": "Bun",
                "strengths": ["Energie"],
                "coaching_sessions": [{"day": 1, "principle": "Pasiunea", "exercise": "Scrie"}],
                "next_steps": ["Repetă"]
            }),
        };
        let blocks = build_blocks(&input(coach.clone()), &ScoreMap::from_result(&coach));
        assert_eq!(
            headings(&blocks),
            vec![
                "Discurs analizat:",
                "Scor general: 7/10",
                "Puncte forte:",
                "Plan de coaching (1 sesiuni):",
                "Pașii următori:",
                "Profil:"
            ]
        );

        let curator = AnalysisResult::Parsed {
            tier: Tier::Curator,
            analysis: json!({
                "curator_message": "Ai ceva de spus.",
                "overall_score": 8,
                "curator_verdict": "Aproape gata",
                "nine_principles_check": {"Pasiunea": {"score": 8}}
            }),
        };
        let blocks = build_blocks(&input(curator.clone()), &ScoreMap::from_result(&curator));
        assert!(blocks.contains(&Block::Quote("Ai ceva de spus.".to_string())));
        assert!(headings(&blocks).contains(&"Verdict curator: Aproape gata"));
    }

    #[test]
    fn test_render_writes_pdf_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ReportRenderer::new(dir.path().join("pdf"));
        let result = AnalysisResult::Parsed {
            tier: Tier::Free,
            analysis: json!({
                "Idea Strength": {"score": 8, "recommendation": "x"},
                "Cognitive Load": {"score": 5, "recommendation": "y"},
                "Emotional Arc": {"score": 6, "recommendation": "z"}
            }),
        };

        let report = renderer.render(&input(result)).unwrap();
        assert!(is_report_file_name(&report.pdf_file));
        assert!(renderer.dir().join(&report.pdf_file).is_file());
        let chart_file = report.chart_file.unwrap();
        assert!(renderer.dir().join(chart_file).is_file());
    }

    #[test]
    fn test_render_without_scores_skips_chart() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ReportRenderer::new(dir.path());
        let result = AnalysisResult::Parsed {
            tier: Tier::Coach,
            analysis: json!({"summary": "nothing scored"}),
        };

        let report = renderer.render(&input(result)).unwrap();
        assert!(report.chart_file.is_none());
        assert!(dir.path().join(&report.pdf_file).is_file());
    }

    #[test]
    fn test_same_timestamp_gets_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ReportRenderer::new(dir.path());
        let mut first = input(AnalysisResult::Failed {
            tier: Tier::Free,
            error: "x".to_string(),
        });
        first.generated_at = Local::now();
        let second = first.clone();

        let a = renderer.render(&first).unwrap();
        let b = renderer.render(&second).unwrap();
        assert_ne!(a.pdf_file, b.pdf_file);
        assert!(is_report_file_name(&b.pdf_file));
    }

    #[test]
    fn test_concurrent_renders_claim_distinct_names() {
        use std::sync::{Arc, Barrier};

        let dir = tempfile::tempdir().unwrap();
        let renderer = ReportRenderer::new(dir.path());
        let generated_at = Local::now();

        for _ in 0..20 {
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|i| {
                    let renderer = renderer.clone();
                    let barrier = Arc::clone(&barrier);
                    let mut input = input(AnalysisResult::Parsed {
                        tier: Tier::Free,
                        analysis: json!({"Idea Strength": {"score": i, "recommendation": "x"}}),
                    });
                    input.generated_at = generated_at;
                    std::thread::spawn(move || {
                        barrier.wait();
                        renderer.render(&input).unwrap()
                    })
                })
                .collect();
            let reports: Vec<RenderedReport> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            assert_ne!(reports[0].pdf_file, reports[1].pdf_file);
            assert_ne!(reports[0].chart_file, reports[1].chart_file);
            for report in &reports {
                let bytes = std::fs::read(dir.path().join(&report.pdf_file)).unwrap();
                assert!(bytes.starts_with(b"%PDF-"));
            }
        }
    }

    #[tokio::test]
    async fn test_render_blocking() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ReportRenderer::new(dir.path());
        let report = renderer
            .render_blocking(input(AnalysisResult::Failed {
                tier: Tier::Curator,
                error: "x".to_string(),
            }))
            .await
            .unwrap();
        assert!(dir.path().join(report.pdf_file).is_file());
    }
}
