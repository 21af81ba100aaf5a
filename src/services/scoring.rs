/// Highest points an option can carry; per-category maximums derive from it.
pub(crate) const MAX_OPTION_POINTS: i32 = 5;

/// One answer pair after its option resolved against the database.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedAnswer {
    pub(crate) question_id: String,
    pub(crate) option_id: String,
    pub(crate) points: i32,
    pub(crate) category_id: String,
}

/// Accumulated totals for one submission. Category order follows first
/// contribution, which keeps persisted CategoryScore rows deterministic.
#[derive(Debug, Default)]
pub(crate) struct ScoreTotals {
    pub(crate) total: i32,
    pub(crate) by_category: Vec<(String, i32)>,
}

pub(crate) fn accumulate(resolved: &[ResolvedAnswer]) -> ScoreTotals {
    let mut totals = ScoreTotals::default();

    for answer in resolved {
        totals.total += answer.points;
        match totals.by_category.iter_mut().find(|(id, _)| *id == answer.category_id) {
            Some((_, score)) => *score += answer.points,
            None => totals.by_category.push((answer.category_id.clone(), answer.points)),
        }
    }

    totals
}

/// Maximum attainable score for a category: question count times the top
/// option value. Matches the client-side estimate exactly when all answers
/// are present.
pub(crate) fn category_max_score(question_count: i64) -> i32 {
    question_count as i32 * MAX_OPTION_POINTS
}

pub(crate) fn percentage(score: i32, max_score: i32) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    f64::from(score) / f64::from(max_score) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(question: &str, option: &str, points: i32, category: &str) -> ResolvedAnswer {
        ResolvedAnswer {
            question_id: question.to_string(),
            option_id: option.to_string(),
            points,
            category_id: category.to_string(),
        }
    }

    #[test]
    fn accumulate_sums_total_and_per_category() {
        let answers = vec![
            resolved("q1", "o1", 3, "sales"),
            resolved("q2", "o2", 5, "sales"),
            resolved("q3", "o3", 1, "marketing"),
        ];

        let totals = accumulate(&answers);

        assert_eq!(totals.total, 9);
        assert_eq!(
            totals.by_category,
            vec![("sales".to_string(), 8), ("marketing".to_string(), 1)]
        );
    }

    #[test]
    fn accumulate_empty_is_zero() {
        let totals = accumulate(&[]);
        assert_eq!(totals.total, 0);
        assert!(totals.by_category.is_empty());
    }

    #[test]
    fn category_order_follows_first_contribution() {
        let answers = vec![
            resolved("q1", "o1", 2, "b"),
            resolved("q2", "o2", 4, "a"),
            resolved("q3", "o3", 1, "b"),
        ];

        let totals = accumulate(&answers);
        assert_eq!(totals.by_category[0].0, "b");
        assert_eq!(totals.by_category[1].0, "a");
    }

    #[test]
    fn category_max_is_question_count_times_five() {
        assert_eq!(category_max_score(0), 0);
        assert_eq!(category_max_score(1), 5);
        assert_eq!(category_max_score(10), 50);
    }

    #[test]
    fn percentage_handles_zero_max() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(3, 5), 60.0);
        assert_eq!(percentage(5, 5), 100.0);
    }
}
