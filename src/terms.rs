//! Enrollment term lookup by display name.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{LmsError, TermLookupError},
    lms::{paths, LmsClient},
    models::{Term, TermId},
};

#[derive(Deserialize)]
#[serde(untagged)]
enum Catalog {
    Wrapped { enrollment_terms: Vec<Term> },
    Bare(Vec<Term>),
}

fn parse_catalog(path: &str, body: Value) -> Result<Vec<Term>, LmsError> {
    match serde_json::from_value(body) {
        Ok(Catalog::Wrapped { enrollment_terms }) => Ok(enrollment_terms),
        Ok(Catalog::Bare(terms)) => Ok(terms),
        Err(e) => Err(LmsError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Exact, case-sensitive match on `name`, then on `fallback`.
pub fn match_term(catalog: &[Term], name: &str, fallback: &str) -> Option<TermId> {
    catalog
        .iter()
        .find(|t| t.name == name)
        .or_else(|| catalog.iter().find(|t| t.name == fallback))
        .map(|t| t.id)
}

/// Resolve `term_name` to a term id in `account_id`'s catalog.
///
/// `Ok(None)` means no name was given and no read was made; the caller keeps
/// its default term. A blank name counts as no name. Any other name is
/// matched exactly as given, surrounding whitespace included.
pub async fn resolve_term_id(
    lms: &dyn LmsClient,
    account_id: &str,
    term_name: Option<&str>,
    fallback: &str,
) -> Result<Option<TermId>, TermLookupError> {
    let name = match term_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Ok(None),
    };

    let path = paths::terms(account_id);
    let body = lms
        .get(&path)
        .await
        .map_err(TermLookupError::CatalogUnavailable)?;
    let catalog = parse_catalog(&path, body).map_err(TermLookupError::CatalogUnavailable)?;
    tracing::debug!(account_id, terms = catalog.len(), "read enrollment term catalog");

    match match_term(&catalog, name, fallback) {
        Some(id) => Ok(Some(id)),
        None => Err(TermLookupError::TermNotFound {
            name: name.to_string(),
            fallback: fallback.to_string(),
        }),
    }
}
