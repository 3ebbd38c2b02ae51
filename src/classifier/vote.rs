use crate::models::RawLabel;

/// Mode of the given labels, scanned oldest to newest.
///
/// Ties go to the label whose running count reaches the maximum first, so the
/// winner depends only on the order of the input. Returns `None` when empty.
pub fn majority_label<'a, I>(labels: I) -> Option<RawLabel>
where
    I: IntoIterator<Item = &'a RawLabel> + Clone,
{
    let mut counts: Vec<(RawLabel, usize)> = Vec::with_capacity(3);
    for label in labels.clone() {
        match counts.iter_mut().find(|(seen, _)| seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((*label, 1)),
        }
    }

    let max = counts.iter().map(|(_, count)| *count).max()?;

    let mut running: Vec<(RawLabel, usize)> = Vec::with_capacity(counts.len());
    for label in labels {
        let count = match running.iter_mut().find(|(seen, _)| seen == label) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                running.push((*label, 1));
                1
            }
        };
        if count == max {
            return Some(*label);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use RawLabel::{Active, Resting};

    #[test]
    fn clear_majority_wins() {
        let labels = [Active, Resting, Active, Active, Resting, Active];
        assert_eq!(majority_label(&labels), Some(Active));
    }

    #[test]
    fn tie_goes_to_label_reaching_max_first() {
        let labels = [Resting, Resting, Resting, Active, Active, Active];
        assert_eq!(majority_label(&labels), Some(Resting));

        let labels = [Active, Resting, Resting, Active, Resting, Active];
        // Resting hits 3 at index 4, Active only at index 5.
        assert_eq!(majority_label(&labels), Some(Resting));
    }

    #[test]
    fn tie_break_is_reproducible() {
        let labels = [Active, Active, Resting, Resting];
        let first = majority_label(&labels);
        for _ in 0..100 {
            assert_eq!(majority_label(&labels), first);
        }
        assert_eq!(first, Some(Active));
    }

    #[test]
    fn empty_input_has_no_majority() {
        let labels: [RawLabel; 0] = [];
        assert_eq!(majority_label(&labels), None);
    }
}
