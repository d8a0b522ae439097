//! Candidate panel
//!
//! Structured description of the popup shown over one mention: one row per
//! candidate entity, with an optional judgment control per row. The panel
//! holds display strings only, serialization to markup lives in
//! [`super::html`].

use serde::Serialize;

use crate::types::{Annotation, Candidate};

/// Canonical public page of an entity, keyed by id
pub const ENTITY_PAGE_BASE_URL: &str = "https://www.wikidata.org/wiki/";

pub fn entity_url(candidate_id: &str) -> String {
    format!("{}{}", ENTITY_PAGE_BASE_URL, candidate_id)
}

/// Checkbox-style control for one (mention, candidate) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgmentControl {
    pub start: usize,
    pub end: usize,
    pub candidate_id: String,
    pub checked: bool,
}

impl JudgmentControl {
    pub fn matches(&self, candidate_id: &str, start: usize, end: usize) -> bool {
        self.start == start && self.end == end && self.candidate_id == candidate_id
    }
}

/// Display row for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRow {
    pub candidate_id: String,
    /// `"label (id)"` or the bare id
    pub label: String,
    pub url: String,
    /// Empty when the entity has no description
    pub description: String,
    /// `"Rank: 0.50, phrase: -7.25"`
    pub scores: String,
    /// `"Statements: 12, sitelinks: 3"`
    pub counts: String,
    /// `"Score: 0.9"`, only for a present, non-zero score
    pub score: Option<String>,
    /// Candidate is the annotation's best id
    pub predicted: bool,
    pub control: Option<JudgmentControl>,
}

/// Popup for one annotated span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePanel {
    pub start: usize,
    pub end: usize,
    pub rows: Vec<CandidateRow>,
}

impl CandidatePanel {
    /// Build the panel for `annotation`, with judgment controls in review mode.
    pub fn build(annotation: &Annotation, include_controls: bool) -> Self {
        let rows = annotation
            .candidates
            .iter()
            .map(|candidate| build_row(annotation, candidate, include_controls))
            .collect();

        Self {
            start: annotation.start,
            end: annotation.end,
            rows,
        }
    }

    pub fn controls(&self) -> impl Iterator<Item = &JudgmentControl> {
        self.rows.iter().filter_map(|row| row.control.as_ref())
    }

    pub fn predicted_row(&self) -> Option<&CandidateRow> {
        self.rows.iter().find(|row| row.predicted)
    }
}

fn build_row(annotation: &Annotation, candidate: &Candidate, include_controls: bool) -> CandidateRow {
    let control = include_controls.then(|| JudgmentControl {
        start: annotation.start,
        end: annotation.end,
        candidate_id: candidate.id.clone(),
        checked: false,
    });

    CandidateRow {
        candidate_id: candidate.id.clone(),
        label: candidate.display_label(),
        url: entity_url(&candidate.id),
        description: candidate.description.clone().unwrap_or_default(),
        scores: format!(
            "Rank: {}, phrase: {}",
            two_decimals(candidate.rank),
            two_decimals(annotation.phrase_score)
        ),
        counts: format!(
            "Statements: {}, sitelinks: {}",
            candidate.statement_count, candidate.sitelink_count
        ),
        score: candidate.visible_score().map(|score| format!("Score: {}", score)),
        predicted: annotation.is_predicted(candidate),
        control,
    }
}

/// Two decimals with ties rounded away from zero (`{:.2}` rounds half to even).
fn two_decimals(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, label: Option<&str>, score: Option<f64>) -> Candidate {
        Candidate {
            id: id.to_string(),
            label: label.map(|l| vec![l.to_string()]),
            description: None,
            rank: 0.456,
            statement_count: 12,
            sitelink_count: 3,
            score,
        }
    }

    fn annotation(candidates: Vec<Candidate>, best: Option<&str>) -> Annotation {
        Annotation {
            start: 0,
            end: 5,
            candidates,
            best_candidate_id: best.map(str::to_string),
            phrase_score: -7.254,
        }
    }

    #[test]
    fn row_text_lines() {
        let ann = annotation(vec![candidate("Q90", Some("Paris"), Some(0.9))], Some("Q90"));
        let panel = CandidatePanel::build(&ann, false);
        let row = &panel.rows[0];

        assert_eq!(row.label, "Paris (Q90)");
        assert_eq!(row.url, "https://www.wikidata.org/wiki/Q90");
        assert_eq!(row.description, "");
        assert_eq!(row.scores, "Rank: 0.46, phrase: -7.25");
        assert_eq!(row.counts, "Statements: 12, sitelinks: 3");
        assert_eq!(row.score.as_deref(), Some("Score: 0.9"));
        assert!(row.predicted);
        assert!(row.control.is_none());
    }

    #[test]
    fn label_falls_back_to_id() {
        let ann = annotation(vec![candidate("Q1142326", None, None)], None);
        let panel = CandidatePanel::build(&ann, false);
        assert_eq!(panel.rows[0].label, "Q1142326");
    }

    #[test]
    fn score_line_only_for_nonzero_scores() {
        let ann = annotation(
            vec![
                candidate("Q1", None, Some(0.25)),
                candidate("Q2", None, Some(0.0)),
                candidate("Q3", None, None),
            ],
            None,
        );
        let panel = CandidatePanel::build(&ann, false);
        let scores: Vec<_> = panel.rows.iter().map(|r| r.score.as_deref()).collect();
        assert_eq!(scores, vec![Some("Score: 0.25"), None, None]);
    }

    #[test]
    fn predicted_flag_follows_best_id() {
        let ann = annotation(
            vec![candidate("Q1", None, None), candidate("Q2", None, None)],
            Some("Q2"),
        );
        let panel = CandidatePanel::build(&ann, true);
        let flags: Vec<_> = panel.rows.iter().map(|r| r.predicted).collect();
        assert_eq!(flags, vec![false, true]);
        assert_eq!(panel.predicted_row().map(|r| r.candidate_id.as_str()), Some("Q2"));

        let none_predicted = annotation(vec![candidate("Q1", None, None)], None);
        assert!(CandidatePanel::build(&none_predicted, true)
            .predicted_row()
            .is_none());
    }

    #[test]
    fn controls_carry_position_and_id() {
        let ann = annotation(
            vec![candidate("Q1", None, None), candidate("Q2", None, None)],
            None,
        );
        let panel = CandidatePanel::build(&ann, true);
        let controls: Vec<_> = panel.controls().cloned().collect();
        assert_eq!(
            controls,
            vec![
                JudgmentControl {
                    start: 0,
                    end: 5,
                    candidate_id: "Q1".into(),
                    checked: false
                },
                JudgmentControl {
                    start: 0,
                    end: 5,
                    candidate_id: "Q2".into(),
                    checked: false
                },
            ]
        );
        assert_eq!(CandidatePanel::build(&ann, false).controls().count(), 0);
    }

    #[test]
    fn score_ties_round_away_from_zero() {
        assert_eq!(two_decimals(0.125), "0.13");
        assert_eq!(two_decimals(-0.375), "-0.38");
        assert_eq!(two_decimals(2.0), "2.00");

        let mut tied = candidate("Q1", None, None);
        tied.rank = 0.125;
        let mut ann = annotation(vec![tied], None);
        ann.phrase_score = -0.625;
        let panel = CandidatePanel::build(&ann, false);
        assert_eq!(panel.rows[0].scores, "Rank: 0.13, phrase: -0.63");
    }
}
