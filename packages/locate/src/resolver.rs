//! Candidate resolution: from zero or more candidates to one start page.
//!
//! Rules are tried in a fixed order and the first one that produces a page
//! wins:
//!
//! 1. [`only_candidate`]: exactly one candidate.
//! 2. [`first_candidate`]: several candidates, no tertiary patterns.
//! 3. [`tertiary_match`]: first candidate matching any tertiary pattern.
//! 4. [`second_chance`]: rescan for a page matching every secondary and
//!    tertiary pattern at once.
//!
//! Anything else is [`Resolution::NotFound`]. All pages in a
//! [`Resolution`] are 1-based.

use pefa_pdf::PageTextProvider;
use pefa_report_models::{Candidate, Resolution, ResolutionRule, page_number};

use crate::LocateError;
use crate::locator::{locate_candidates, scan_start};
use crate::profile::LanguageProfile;

/// Resolves to the sole candidate when there is exactly one.
#[must_use]
pub fn only_candidate(candidates: &[Candidate]) -> Option<Resolution> {
    match candidates {
        [only] => Some(Resolution::Found {
            page: page_number(only.page_index),
            rule: ResolutionRule::OnlyCandidate,
        }),
        _ => None,
    }
}

/// Resolves to the first candidate when there are several and the profile
/// has no tertiary patterns to tell them apart.
#[must_use]
pub fn first_candidate(candidates: &[Candidate], profile: &LanguageProfile) -> Option<Resolution> {
    if candidates.len() < 2 || profile.has_tertiary() {
        return None;
    }
    candidates.first().map(|c| Resolution::Found {
        page: page_number(c.page_index),
        rule: ResolutionRule::FirstCandidate,
    })
}

/// Resolves to the first of several candidates whose text matches any
/// tertiary pattern.
#[must_use]
pub fn tertiary_match(candidates: &[Candidate], profile: &LanguageProfile) -> Option<Resolution> {
    if candidates.len() < 2 || !profile.has_tertiary() {
        return None;
    }
    candidates
        .iter()
        .find(|c| profile.matches_any_tertiary(&c.text))
        .map(|c| Resolution::Found {
            page: page_number(c.page_index),
            rule: ResolutionRule::TertiaryMatch,
        })
}

/// Rescans pages `start..` for the first page on which every secondary and
/// every tertiary pattern matches.
///
/// A profile without secondary or tertiary patterns matches the first page
/// of the range, leaving the reviewer a page to start from.
///
/// # Errors
///
/// Returns [`LocateError::Pdf`] if a page's text cannot be read.
pub fn second_chance(
    pages: &(impl PageTextProvider + ?Sized),
    profile: &LanguageProfile,
    start: usize,
) -> Result<Option<Resolution>, LocateError> {
    for index in start..pages.page_count() {
        if profile.matches_all_secondary_and_tertiary(pages.page_text(index)?) {
            return Ok(Some(Resolution::Found {
                page: page_number(index),
                rule: ResolutionRule::SecondChance,
            }));
        }
    }

    Ok(None)
}

/// Applies the resolution rules in order to `candidates`.
///
/// `start` is the 0-based page the candidate scan began at; the second
/// chance rescan covers the same range.
///
/// # Errors
///
/// Returns [`LocateError::Pdf`] if the rescan cannot read a page.
pub fn resolve(
    pages: &(impl PageTextProvider + ?Sized),
    profile: &LanguageProfile,
    start: usize,
    candidates: &[Candidate],
) -> Result<Resolution, LocateError> {
    let resolution = only_candidate(candidates)
        .or_else(|| first_candidate(candidates, profile))
        .or_else(|| tertiary_match(candidates, profile));

    let resolution = match resolution {
        Some(resolution) => resolution,
        None => second_chance(pages, profile, start)?.unwrap_or_else(|| Resolution::NotFound {
            candidate_pages: candidates.iter().map(|c| page_number(c.page_index)).collect(),
        }),
    };

    if let Resolution::Found { page, rule } = &resolution {
        log::debug!("({rule}) table start on page {page}");
    }

    Ok(resolution)
}

/// Locates candidates from the start of the final third and resolves them.
///
/// # Errors
///
/// Returns [`LocateError::Pdf`] if a page's text cannot be read.
pub fn locate_table_start(
    pages: &(impl PageTextProvider + ?Sized),
    profile: &LanguageProfile,
) -> Result<Resolution, LocateError> {
    locate_table_start_from(pages, profile, scan_start(pages.page_count()))
}

/// Locates candidates from the 0-based page `start` and resolves them.
///
/// # Errors
///
/// Returns [`LocateError::Pdf`] if a page's text cannot be read.
pub fn locate_table_start_from(
    pages: &(impl PageTextProvider + ?Sized),
    profile: &LanguageProfile,
    start: usize,
) -> Result<Resolution, LocateError> {
    log::debug!(
        "Searching for '{}' table starting at page ({start}/{})",
        profile.name(),
        pages.page_count()
    );
    let candidates = locate_candidates(pages, profile, start)?;
    resolve(pages, profile, start, &candidates)
}
