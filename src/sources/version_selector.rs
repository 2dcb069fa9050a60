// Unified version selection logic

use crate::error::ResolveError;
use crate::sources::version_matcher::{self, cmp_precedence, parse_constraint, parse_version};
use log::debug;

/// Filter candidates by `constraint`, newest first.
///
/// With no constraint (empty or `latest`) the candidates come back untouched
/// and unsorted; the caller supplies them newest first. Otherwise candidates
/// that fail to parse are dropped, the rest are matched and sorted by
/// precedence, descending. Equal versions keep their input order.
pub fn filter_versions<S: AsRef<str>>(
    candidates: &[S],
    constraint: &str,
) -> Result<Vec<String>, ResolveError> {
    let Some(constraint) = parse_constraint(constraint)? else {
        return Ok(candidates.iter().map(|c| c.as_ref().to_string()).collect());
    };

    let mut matched: Vec<(semver::Version, &str)> = candidates
        .iter()
        .map(|c| AsRef::<str>::as_ref(c))
        .filter_map(|raw| match parse_version(raw) {
            Ok(parsed) => Some((parsed, raw)),
            Err(e) => {
                debug!("Skipping candidate: {}", e);
                None
            }
        })
        .filter(|(parsed, _)| constraint.matches(parsed))
        .collect();

    matched.sort_by(|(a, _), (b, _)| cmp_precedence(b, a));

    Ok(matched
        .into_iter()
        .map(|(_, raw)| raw.to_string())
        .collect())
}

/// Pick the best candidate for `constraint`.
///
/// `Ok(None)` when there are no candidates or none match; whether that is
/// fatal is up to the caller.
pub fn select_best_version<S: AsRef<str>>(
    candidates: &[S],
    constraint: &str,
) -> Result<Option<String>, ResolveError> {
    if candidates.is_empty() {
        return Ok(None);
    }

    if version_matcher::is_unconstrained(constraint) {
        return Ok(candidates.first().map(|c| c.as_ref().to_string()));
    }

    Ok(filter_versions(candidates, constraint)?.into_iter().next())
}
