//! Domain resolution for reverse engineered columns.
//!
//! Columns whose types render to the same definition share a domain when the
//! names line up; otherwise each column name gets its own domain, suffixed
//! `_1`, `_2`, ... when the plain name is taken.

use ergraph_core::{Domain, DomainId, Error, Model, Named, Result};

/// Upper bound of names tried per domain (`name`, `name_1` .. `name_9999`).
pub const MAX_NAME_PROBES: usize = 10_000;

/// Candidate names for `base`: the base itself, then suffixed variants.
pub fn candidate_names(base: &str, probes: usize) -> impl Iterator<Item = String> + '_ {
    (0..probes).map(move |attempt| {
        if attempt == 0 {
            base.to_string()
        } else {
            format!("{base}_{attempt}")
        }
    })
}

/// Find or create the domain for a column.
pub fn resolve_domain(
    model: &mut Model,
    proposed_name: &str,
    type_name: &str,
    size: Option<&str>,
    decimal_digits: Option<&str>,
) -> Result<DomainId> {
    resolve_domain_with_limit(
        model,
        proposed_name,
        type_name,
        size,
        decimal_digits,
        MAX_NAME_PROBES,
    )
}

pub(crate) fn resolve_domain_with_limit(
    model: &mut Model,
    proposed_name: &str,
    type_name: &str,
    size: Option<&str>,
    decimal_digits: Option<&str>,
    probes: usize,
) -> Result<DomainId> {
    let definition = model
        .dialect()
        .data_type(type_name)
        .ok_or_else(|| Error::UnknownDataType(type_name.to_string()))?
        .create_type_definition_for(size, decimal_digits);

    let rule = model.case_rule();
    let same_type = model
        .domain_by_data_type(&definition)
        .map(|existing| (existing.id(), rule.same(existing.name(), proposed_name)));

    match same_type {
        Some((id, true)) => Ok(id),
        Some(_) => probe(model, proposed_name, &definition, probes),
        None if !model.domains().exists(proposed_name) => {
            model.add_domain(Domain::new(proposed_name, definition))
        }
        None => probe(model, proposed_name, &definition, probes),
    }
}

fn probe(
    model: &mut Model,
    proposed_name: &str,
    definition: &str,
    probes: usize,
) -> Result<DomainId> {
    for candidate in candidate_names(proposed_name, probes) {
        let taken = model
            .domains()
            .find_by_name(&candidate)
            .map(|existing| (existing.id(), existing.data_type() == definition));

        match taken {
            Some((id, true)) => return Ok(id),
            Some(_) => continue,
            None => return model.add_domain(Domain::new(candidate, definition)),
        }
    }

    Err(Error::DomainNamesExhausted {
        name: proposed_name.to_string(),
        probes,
    })
}
