use crate::schemas::audit::OptionPayload;

/// Questions always persist with exactly this many options.
pub(crate) const OPTIONS_PER_QUESTION: usize = 5;

/// Pad an authored option set to five entries. Missing slots get the default
/// label `Option N` with `points` N (1-based). Supplied entries are kept
/// as-is, including any duplicate point values.
pub(crate) fn pad_options(mut options: Vec<OptionPayload>) -> Vec<OptionPayload> {
    while options.len() < OPTIONS_PER_QUESTION {
        let slot = options.len() + 1;
        options.push(OptionPayload {
            id: None,
            text: format!("Option {slot}"),
            points: slot as i32,
        });
    }
    options
}

/// Ids present in a desired-state payload level. Rows persisted under the
/// same parent whose id is missing from this list get deleted.
pub(crate) fn keep_ids<'a, I>(ids: I) -> Vec<String>
where
    I: Iterator<Item = Option<&'a String>>,
{
    ids.flatten().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, points: i32) -> OptionPayload {
        OptionPayload { id: None, text: text.to_string(), points }
    }

    #[test]
    fn pads_empty_set_to_five_defaults() {
        let padded = pad_options(Vec::new());
        assert_eq!(padded.len(), 5);
        for (index, entry) in padded.iter().enumerate() {
            assert_eq!(entry.text, format!("Option {}", index + 1));
            assert_eq!(entry.points, (index + 1) as i32);
        }
    }

    #[test]
    fn pads_partial_set_preserving_supplied_entries() {
        let padded = pad_options(vec![option("Poor", 1), option("Great", 4)]);
        assert_eq!(padded.len(), 5);
        assert_eq!(padded[0].text, "Poor");
        assert_eq!(padded[1].text, "Great");
        assert_eq!(padded[2].text, "Option 3");
        assert_eq!(padded[2].points, 3);
        assert_eq!(padded[4].text, "Option 5");
        assert_eq!(padded[4].points, 5);
    }

    #[test]
    fn full_set_is_untouched() {
        let supplied = vec![
            option("a", 1),
            option("b", 2),
            option("c", 3),
            option("d", 4),
            option("e", 5),
        ];
        let padded = pad_options(supplied);
        assert_eq!(padded.len(), 5);
        assert_eq!(padded[4].text, "e");
    }

    #[test]
    fn keep_ids_skips_rows_without_id() {
        let with_id = Some("c1".to_string());
        let ids = keep_ids(vec![with_id.as_ref(), None].into_iter());
        assert_eq!(ids, vec!["c1".to_string()]);
    }
}
