//! Lesson text shown around a collection run.

use percent_maze_core::{
    percent::{part_from_percentage, percentage_difference, percentage_of, whole_from_percentage},
    Category, Tally, Variant,
};

/// Lines shown one per intro step before collecting starts.
pub(crate) fn intro_lines(variant: Variant) -> &'static [&'static str] {
    match variant {
        Variant::PercentageOfNumber => &[
            "A percentage tells how many out of every hundred.",
            "Collect the animals, then we will work out what share each kind is.",
            "Ready? Use WASD or the arrow keys.",
        ],
        Variant::WholeFromPercentage => &[
            "If you know a part and its percentage, you can find the whole.",
            "Collect the animals, then we will rebuild the total from one kind.",
        ],
        Variant::PercentageDifference => &[
            "A percentage difference compares two amounts.",
            "Collect the animals, then we will compare the groups.",
        ],
        Variant::Home | Variant::Index | Variant::Game => &[],
    }
}

/// Worked examples built from the collected tally.
pub(crate) fn summary_lines(variant: Variant, tally: &Tally) -> Vec<String> {
    let total = tally.total();
    let mut lines = vec![format!("You collected {total} animals.")];
    if total == 0 {
        return lines;
    }

    match variant {
        Variant::PercentageOfNumber | Variant::Game => {
            for (category, count) in tally.iter() {
                if let Some(share) = percentage_of(count, total) {
                    lines.push(format!(
                        "{count} of {total} are {}: {share:.1}%",
                        category.label()
                    ));
                }
            }
        }
        Variant::WholeFromPercentage => {
            if let Some((category, count)) = largest(tally) {
                if let Some(share) = tally.share_percent(category) {
                    if let Some(whole) = whole_from_percentage(count, share) {
                        lines.push(format!(
                            "{count} {} make up {share:.1}% of the whole, so the whole is {whole:.0}.",
                            category.label()
                        ));
                    }
                }
            }
        }
        Variant::PercentageDifference => {
            let counts: Vec<(Category, u32)> = tally.iter().collect();
            for pair in counts.windows(2) {
                let [(from_category, from), (to_category, to)] = [pair[0], pair[1]];
                if let Some(change) = percentage_difference(from, to) {
                    lines.push(format!(
                        "From {from} {} to {to} {} is a change of {change:+.1}%.",
                        from_category.label(),
                        to_category.label()
                    ));
                }
            }
        }
        Variant::Home | Variant::Index => {
            for percent in [10.0, 25.0, 50.0] {
                lines.push(format!(
                    "{percent:.0}% of {total} is {:.1}.",
                    part_from_percentage(percent, total)
                ));
            }
        }
    }
    lines
}

fn largest(tally: &Tally) -> Option<(Category, u32)> {
    tally
        .iter()
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
}
