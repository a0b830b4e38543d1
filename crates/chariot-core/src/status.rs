//! Inspection status aggregation.
//!
//! Precedence, highest first: any critical defect → `critical`; any other
//! defect → `warning`; otherwise `ok`. No weighting by question count.

use crate::entities::QuestionResponse;
use crate::enums::{InspectionStatus, Severity};

/// Fold a response sequence into one overall status.
///
/// Pure and order-independent.
#[must_use]
pub fn compute_status(responses: &[QuestionResponse]) -> InspectionStatus {
    responses
        .iter()
        .map(response_status)
        .max()
        .unwrap_or(InspectionStatus::Ok)
}

const fn response_status(response: &QuestionResponse) -> InspectionStatus {
    match response.severity() {
        None => InspectionStatus::Ok,
        Some(Severity::Minor) => InspectionStatus::Warning,
        Some(Severity::Critical) => InspectionStatus::Critical,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::entities::ResponseOutcome;

    fn response(idx: usize, outcome: ResponseOutcome) -> QuestionResponse {
        QuestionResponse {
            question_id: format!("Q{idx:03}"),
            question_text: format!("Question {idx}"),
            choice_id: format!("A{idx:03}-x"),
            choice_text: "choice".to_string(),
            outcome,
            answered_at: Utc::now(),
        }
    }

    fn defect(severity: Severity) -> ResponseOutcome {
        ResponseOutcome::Defect {
            severity,
            comment: None,
        }
    }

    #[test]
    fn empty_responses_are_ok() {
        assert_eq!(compute_status(&[]), InspectionStatus::Ok);
    }

    #[rstest]
    #[case(vec![], InspectionStatus::Ok)]
    #[case(vec![Severity::Minor], InspectionStatus::Warning)]
    #[case(vec![Severity::Minor, Severity::Minor], InspectionStatus::Warning)]
    #[case(vec![Severity::Critical], InspectionStatus::Critical)]
    #[case(vec![Severity::Minor, Severity::Critical], InspectionStatus::Critical)]
    fn defects_among_passes(#[case] defects: Vec<Severity>, #[case] expected: InspectionStatus) {
        let mut responses: Vec<_> = (0..6)
            .map(|i| response(i, ResponseOutcome::Acceptable))
            .collect();
        for (i, severity) in defects.into_iter().enumerate() {
            responses.push(response(100 + i, defect(severity)));
        }
        assert_eq!(compute_status(&responses), expected);
    }

    fn outcome_strategy() -> impl Strategy<Value = ResponseOutcome> {
        prop_oneof![
            Just(ResponseOutcome::Acceptable),
            Just(defect(Severity::Minor)),
            Just(defect(Severity::Critical)),
        ]
    }

    proptest! {
        #[test]
        fn status_is_order_independent(
            outcomes in proptest::collection::vec(outcome_strategy(), 0..20),
            rotate in 0usize..20,
        ) {
            let responses: Vec<_> = outcomes
                .into_iter()
                .enumerate()
                .map(|(i, o)| response(i, o))
                .collect();
            let mut reversed = responses.clone();
            reversed.reverse();
            let mut rotated = responses.clone();
            if !rotated.is_empty() {
                let by = rotate % rotated.len();
                rotated.rotate_left(by);
            }
            let status = compute_status(&responses);
            prop_assert_eq!(status, compute_status(&reversed));
            prop_assert_eq!(status, compute_status(&rotated));
        }

        #[test]
        fn one_critical_dominates_any_number_of_passes(passes in 0usize..50) {
            let mut responses: Vec<_> = (0..passes)
                .map(|i| response(i, ResponseOutcome::Acceptable))
                .collect();
            responses.push(response(passes, defect(Severity::Critical)));
            prop_assert_eq!(compute_status(&responses), InspectionStatus::Critical);
        }
    }
}
