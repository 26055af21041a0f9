//! Pie chart geometry for one question's vote counts.

use crate::error::ChartError;
use serde::Serialize;
use votekit_client::{QuestionTally, ResultsSnapshot};
use votekit_types::{OptionId, QuestionId};

/// Segment colours, assigned by option position and reused cyclically.
pub const PALETTE: [&str; 8] = [
    "#2563eb", "#dc2626", "#16a34a", "#d97706", "#7c3aed", "#db2777", "#0891b2", "#65a30d",
];

/// A segment whose displayed percentage reaches this is drawn as a whole circle.
pub const FULL_CIRCLE_PERCENT: f64 = 99.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentShape {
    /// No votes; nothing to draw.
    Empty,
    Arc,
    FullCircle,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieSegment {
    pub option_id: OptionId,
    pub label: String,
    pub count: u64,
    pub percentage: f64,
    /// Degrees clockwise from twelve o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: &'static str,
    pub leading: bool,
}

impl PieSegment {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn shape(&self) -> SegmentShape {
        if self.count == 0 {
            SegmentShape::Empty
        } else if self.display_percentage() >= FULL_CIRCLE_PERCENT {
            SegmentShape::FullCircle
        } else {
            SegmentShape::Arc
        }
    }

    /// Percentage rounded to one decimal place, for labels.
    pub fn display_percentage(&self) -> f64 {
        (self.percentage * 10.0).round() / 10.0
    }

    /// SVG path data for this segment in a circle of radius `r` centred on (`cx`, `cy`).
    pub fn svg_path(&self, cx: f64, cy: f64, r: f64) -> String {
        match self.shape() {
            SegmentShape::Empty => String::new(),
            SegmentShape::FullCircle => format!(
                "M {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} Z",
                cx - r,
                cy,
                cx + r,
                cy,
                cx - r,
                cy
            ),
            SegmentShape::Arc => {
                let (x1, y1) = point_on_circle(cx, cy, r, self.start_angle);
                let (x2, y2) = point_on_circle(cx, cy, r, self.end_angle);
                let large_arc = u8::from(self.span() > 180.0);
                format!(
                    "M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {r:.2} {r:.2} 0 {large_arc} 1 {x2:.2} {y2:.2} Z"
                )
            }
        }
    }
}

fn point_on_circle(cx: f64, cy: f64, r: f64, degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (cx + r * radians.sin(), cy - r * radians.cos())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PieChart {
    pub question_id: Option<QuestionId>,
    pub question_text: String,
    pub total: u64,
    pub segments: Vec<PieSegment>,
}

impl PieChart {
    /// The "no data" chart: unknown question, no options, or no votes yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn leading(&self) -> impl Iterator<Item = &PieSegment> {
        self.segments.iter().filter(|s| s.leading)
    }

    pub fn segment(&self, option: &OptionId) -> Option<&PieSegment> {
        self.segments.iter().find(|s| &s.option_id == option)
    }
}

/// Lay out `tally`'s options around the circle in their original order.
///
/// The total is the sum of the option counts. Every option with the highest
/// non-zero count is marked leading; ties are not broken.
///
/// Counts whose sum overflows `u64` are rejected rather than wrapped.
pub fn compute_chart(tally: &QuestionTally) -> Result<PieChart, ChartError> {
    let total = tally
        .options
        .iter()
        .try_fold(0u64, |acc, o| acc.checked_add(o.vote_count))
        .ok_or_else(|| ChartError::TotalOverflow(tally.id.clone()))?;
    if total == 0 {
        return Ok(PieChart {
            question_id: Some(tally.id.clone()),
            question_text: tally.question_text.clone(),
            ..PieChart::empty()
        });
    }

    let max = tally.options.iter().map(|o| o.vote_count).max().unwrap_or(0);
    let mut angle = 0.0;
    let segments = tally
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let share = option.vote_count as f64 / total as f64;
            let start_angle = angle;
            angle += share * 360.0;
            PieSegment {
                option_id: option.id.clone(),
                label: option.option_text.clone(),
                count: option.vote_count,
                percentage: share * 100.0,
                start_angle,
                end_angle: angle,
                color: PALETTE[i % PALETTE.len()],
                leading: option.vote_count > 0 && option.vote_count == max,
            }
        })
        .collect();

    Ok(PieChart {
        question_id: Some(tally.id.clone()),
        question_text: tally.question_text.clone(),
        total,
        segments,
    })
}

/// Chart for `question` (or the first question) in `snapshot`.
pub fn chart_for(
    snapshot: &ResultsSnapshot,
    question: Option<&QuestionId>,
) -> Result<PieChart, ChartError> {
    match snapshot.question(question) {
        Some(tally) => compute_chart(tally),
        None => Ok(PieChart::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votekit_client::OptionTally;

    fn tally(counts: &[(&str, u64)]) -> QuestionTally {
        QuestionTally {
            id: "q1".into(),
            question_text: "Chair".into(),
            total_votes: counts.iter().map(|(_, c)| c).sum(),
            options: counts
                .iter()
                .map(|(id, c)| OptionTally {
                    id: (*id).into(),
                    option_text: id.to_uppercase(),
                    vote_count: *c,
                })
                .collect(),
        }
    }

    #[test]
    fn three_to_one_split() {
        let chart = compute_chart(&tally(&[("a", 3), ("b", 1)])).unwrap();
        assert_eq!(chart.total, 4);
        let a = chart.segment(&"a".into()).unwrap();
        let b = chart.segment(&"b".into()).unwrap();
        assert_eq!(a.percentage, 75.0);
        assert_eq!(b.percentage, 25.0);
        assert_eq!((a.start_angle, a.end_angle), (0.0, 270.0));
        assert_eq!((b.start_angle, b.end_angle), (270.0, 360.0));
        assert!(a.leading);
        assert!(!b.leading);
    }

    #[test]
    fn ties_mark_every_leader() {
        let chart = compute_chart(&tally(&[("a", 2), ("b", 2), ("c", 1)])).unwrap();
        let leaders: Vec<_> = chart.leading().map(|s| s.option_id.as_str()).collect();
        assert_eq!(leaders, ["a", "b"]);
    }

    #[test]
    fn zero_votes_is_empty_not_a_fault() {
        let chart = compute_chart(&tally(&[("a", 0), ("b", 0)])).unwrap();
        assert!(chart.is_empty());
        assert!(chart.segments.is_empty());
        assert_eq!(chart.leading().count(), 0);
    }

    #[test]
    fn no_options_is_empty() {
        assert!(compute_chart(&tally(&[])).unwrap().is_empty());
    }

    #[test]
    fn unknown_question_is_empty() {
        let snapshot = ResultsSnapshot {
            questions: vec![tally(&[("a", 1)])],
        };
        assert!(chart_for(&snapshot, Some(&"nope".into())).unwrap().is_empty());
        assert_eq!(chart_for(&snapshot, None).unwrap().total, 1);
    }

    #[test]
    fn unanimous_option_is_a_full_circle() {
        let chart = compute_chart(&tally(&[("a", 5), ("b", 0)])).unwrap();
        let a = chart.segment(&"a".into()).unwrap();
        assert_eq!(a.shape(), SegmentShape::FullCircle);
        assert!(a.svg_path(50.0, 50.0, 40.0).starts_with("M 10.00 50.00 A 40.00 40.00"));
        let b = chart.segment(&"b".into()).unwrap();
        assert_eq!(b.shape(), SegmentShape::Empty);
        assert_eq!(b.svg_path(50.0, 50.0, 40.0), "");
        assert!(!b.leading);
    }

    #[test]
    fn near_unanimous_counts_as_full_circle() {
        let chart = compute_chart(&tally(&[("a", 9999), ("b", 1)])).unwrap();
        assert_eq!(chart.segments[0].shape(), SegmentShape::FullCircle);
        assert_eq!(chart.segments[1].shape(), SegmentShape::Arc);
    }

    #[test]
    fn full_circle_follows_the_rounded_percentage() {
        // 99.875% displays as 99.9%.
        let chart = compute_chart(&tally(&[("a", 7990), ("b", 10)])).unwrap();
        assert_eq!(chart.segments[0].display_percentage(), 99.9);
        assert_eq!(chart.segments[0].shape(), SegmentShape::FullCircle);

        // 99.84% displays as 99.8%.
        let chart = compute_chart(&tally(&[("a", 2496), ("b", 4)])).unwrap();
        assert_eq!(chart.segments[0].shape(), SegmentShape::Arc);
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let t = QuestionTally {
            id: "q1".into(),
            question_text: "Chair".into(),
            total_votes: 0,
            options: vec![
                OptionTally {
                    id: "a".into(),
                    option_text: "A".into(),
                    vote_count: u64::MAX,
                },
                OptionTally {
                    id: "b".into(),
                    option_text: "B".into(),
                    vote_count: 1,
                },
            ],
        };
        assert_eq!(compute_chart(&t), Err(ChartError::TotalOverflow("q1".into())));
    }

    #[test]
    fn largest_representable_total_still_charts() {
        let chart = compute_chart(&tally(&[("a", u64::MAX - 1), ("b", 1)])).unwrap();
        assert_eq!(chart.total, u64::MAX);
        assert!(chart.segments[0].leading);
    }

    #[test]
    fn svg_arc_uses_large_arc_flag_past_half() {
        let chart = compute_chart(&tally(&[("a", 3), ("b", 1)])).unwrap();
        assert_eq!(
            chart.segments[0].svg_path(50.0, 50.0, 40.0),
            "M 50.00 50.00 L 50.00 10.00 A 40.00 40.00 0 1 1 10.00 50.00 Z"
        );
        assert!(chart.segments[1].svg_path(50.0, 50.0, 40.0).contains(" 0 0 1 "));
    }

    #[test]
    fn colours_cycle_through_palette() {
        let counts: Vec<(String, u64)> = (0..10).map(|i| (format!("o{i}"), 1)).collect();
        let refs: Vec<(&str, u64)> = counts.iter().map(|(s, c)| (s.as_str(), *c)).collect();
        let chart = compute_chart(&tally(&refs)).unwrap();
        assert_eq!(chart.segments[0].color, PALETTE[0]);
        assert_eq!(chart.segments[8].color, PALETTE[0]);
        assert_eq!(chart.segments[9].color, PALETTE[1]);
    }

    #[test]
    fn display_percentage_rounds() {
        let chart = compute_chart(&tally(&[("a", 1), ("b", 2)])).unwrap();
        assert_eq!(chart.segments[0].display_percentage(), 33.3);
        assert_eq!(chart.segments[1].display_percentage(), 66.7);
    }
}
