//! Candidate page search.
//!
//! The annex with the PI-1/PI-2/PI-3 calculations sits near the end of an
//! assessment report, so only the final third of the pages is scanned.

use pefa_pdf::PageTextProvider;
use pefa_report_models::Candidate;

use crate::LocateError;
use crate::profile::LanguageProfile;

/// First 0-based page index to scan: the start of the final third.
#[must_use]
pub const fn scan_start(page_count: usize) -> usize {
    page_count / 3 * 2
}

/// Scans pages `start..page_count` for table start candidates.
///
/// A page is a candidate when it matches the profile's primary pattern and
/// either the profile has no secondary patterns or all of them match on the
/// same page. If the secondary patterns fail on the page itself, the next
/// page is tried instead (tables whose heading and column labels are split
/// by a page break), and on success the *next* page is recorded with its own
/// text. The lookahead never reaches the final page.
///
/// Candidates are returned in page order without duplicates.
///
/// # Errors
///
/// Returns [`LocateError::Pdf`] if a page's text cannot be read.
pub fn locate_candidates(
    pages: &(impl PageTextProvider + ?Sized),
    profile: &LanguageProfile,
    start: usize,
) -> Result<Vec<Candidate>, LocateError> {
    let page_count = pages.page_count();
    let mut candidates: Vec<Candidate> = Vec::new();

    for index in start..page_count {
        let text = pages.page_text(index)?;

        if !profile.matches_primary(text) {
            continue;
        }

        if !profile.has_secondary() || profile.matches_all_secondary(text) {
            push_candidate(&mut candidates, index, text);
            continue;
        }

        let next = index + 1;
        if next + 1 >= page_count {
            continue;
        }

        let next_text = pages.page_text(next)?;
        if profile.matches_all_secondary(next_text) {
            push_candidate(&mut candidates, next, next_text);
        }
    }

    Ok(candidates)
}

fn push_candidate(candidates: &mut Vec<Candidate>, page_index: usize, text: &str) {
    if candidates.last().is_some_and(|c| c.page_index == page_index) {
        return;
    }
    log::trace!("Candidate on page {}", page_index + 1);
    candidates.push(Candidate {
        page_index,
        text: text.to_owned(),
    });
}

#[cfg(test)]
mod tests {
    use pefa_pdf::PdfPages;

    use super::*;

    fn profile() -> LanguageProfile {
        LanguageProfile::from_patterns(
            "English",
            "Calculations? (?:.* )?pi",
            &["budget", "actual"],
            &["deviation"],
        )
        .unwrap()
    }

    fn pages(texts: &[&str]) -> PdfPages {
        PdfPages::from_texts(texts.iter().map(|&t| t.to_owned()).collect())
    }

    #[test]
    fn scan_starts_in_final_third() {
        assert_eq!(scan_start(0), 0);
        assert_eq!(scan_start(3), 2);
        assert_eq!(scan_start(10), 6);
        assert_eq!(scan_start(100), 66);
    }

    #[test]
    fn records_pages_matching_primary_and_secondary() {
        let doc = pages(&[
            "intro",
            "Calculations for PI-1: budget and actual",
            "unrelated",
        ]);
        let candidates = locate_candidates(&doc, &profile(), 0).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].page_index, 1);
    }

    #[test]
    fn primary_only_profile_records_every_primary_match() {
        let profile = LanguageProfile::from_patterns("Portuguese", "Anexo 4", &[], &[]).unwrap();
        let doc = pages(&["Anexo 4", "nothing", "anexo 4 cont."]);
        let indices: Vec<usize> = locate_candidates(&doc, &profile, 0)
            .unwrap()
            .iter()
            .map(|c| c.page_index)
            .collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn secondary_on_next_page_records_next_page() {
        let doc = pages(&[
            "Calculation for PI-1",
            "Budget  Actual  Deviation",
            "appendix",
            "back cover",
        ]);
        let candidates = locate_candidates(&doc, &profile(), 0).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].page_index, 1);
        assert!(candidates[0].text.contains("Deviation"));
    }

    #[test]
    fn lookahead_never_reaches_last_page() {
        let doc = pages(&["x", "Calculation for PI-1", "Budget Actual"]);
        assert!(locate_candidates(&doc, &profile(), 0).unwrap().is_empty());

        let doc = pages(&["Calculation for PI-1"]);
        assert!(locate_candidates(&doc, &profile(), 0).unwrap().is_empty());
    }

    #[test]
    fn lookahead_and_own_match_do_not_duplicate() {
        let doc = pages(&[
            "Calculation for PI-1",
            "Calculation for PI-1 budget actual",
            "tail",
            "tail",
        ]);
        let candidates = locate_candidates(&doc, &profile(), 0).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].page_index, 1);
    }

    #[test]
    fn respects_start_page() {
        let doc = pages(&["Calculation for PI-1 budget actual", "x", "y"]);
        assert!(locate_candidates(&doc, &profile(), 1).unwrap().is_empty());
    }
}
