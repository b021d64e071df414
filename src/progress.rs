use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};

use crate::downloader::ProgressFn;

const BAR_TEMPLATE: &str =
    "  {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "  {spinner} {msg} {bytes} ({bytes_per_sec})";

/// Returns a progress function that draws one `indicatif` bar per download.
///
/// Downloads without a `content-length` get a spinner instead of a bar.
pub fn default_progress_fn() -> ProgressFn {
    let current: Mutex<Option<(String, ProgressBar)>> = Mutex::new(None);

    Arc::new(move |label: &str, downloaded: u64, total: Option<u64>, complete: bool| {
        let Ok(mut current) = current.lock() else {
            return;
        };

        let stale = current.as_ref().is_some_and(|(name, _)| name != label);
        if stale {
            if let Some((_, bar)) = current.take() {
                bar.abandon();
            }
        }

        let (_, bar) = current.get_or_insert_with(|| (label.to_owned(), new_bar(label, total)));
        bar.set_position(downloaded);

        if complete {
            bar.finish();
            *current = None;
        }
    })
}

fn new_bar(label: &str, total: Option<u64>) -> ProgressBar {
    let bar = match total {
        Some(len) => ProgressBar::new(len).with_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        ),
        None => ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        ),
    };
    bar.with_message(label.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_valid() {
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
        assert!(ProgressStyle::with_template(SPINNER_TEMPLATE).is_ok());
    }

    #[test]
    fn handles_known_and_unknown_totals() {
        let progress = default_progress_fn();
        progress("a.zip", 10, Some(20), false);
        progress("a.zip", 20, Some(20), true);
        progress("b.bin", 5, None, false);
        // A new label replaces an unfinished bar.
        progress("c.bin", 5, None, false);
        progress("c.bin", 7, None, true);
    }
}
