use shared::{
    domain::{Element, Response},
    protocol::{AggregatedResult, OptionTally, TextEntry},
};

/// Derives the read-side summary for one element from its raw responses.
///
/// Free-text elements list every submission in arrival order. Every other
/// kind is tallied per option; responses whose `option` is absent or out of
/// range still count toward `total` but land in no bucket.
pub fn aggregate(element: &Element, responses: &[Response]) -> AggregatedResult {
    let total = responses.len();

    if element.kind.is_free_text() {
        let responses = responses
            .iter()
            .map(|r| TextEntry {
                user: r.user.clone(),
                response: r.response.clone(),
                timestamp: r.timestamp,
            })
            .collect();
        return AggregatedResult::Text { responses, total };
    }

    let mut counts = vec![0usize; element.options.len()];
    for response in responses {
        let Some(index) = response.option.and_then(|i| usize::try_from(i).ok()) else {
            continue;
        };
        if let Some(count) = counts.get_mut(index) {
            *count += 1;
        }
    }

    let options = element
        .options
        .iter()
        .zip(counts)
        .map(|(text, count)| OptionTally {
            text: text.clone(),
            count,
            percentage: percentage(count, total),
        })
        .collect();

    AggregatedResult::Choice { options, total }
}

/// Share of `total` rounded to one decimal place; zero when nothing was
/// submitted.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
#[path = "tests/results_tests.rs"]
mod tests;
