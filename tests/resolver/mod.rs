// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use planlint::{AttributeMap, AttributeResolver, ResolveError, Resolved, Value};

fn security_group() -> AttributeMap {
    [
        ("ingress.#", Value::from("2")),
        ("ingress.3133039999.cidr", Value::from("0.0.0.0/0")),
        ("ingress.3133039999.from_port", Value::from("443")),
        ("ingress.2541437006.cidr", Value::from("10.0.0.0/24")),
        ("egress.1.cidr", Value::from("0.0.0.0/0")),
        ("destroy", Value::Bool(false)),
    ]
    .into_iter()
    .collect()
}

#[test]
fn exact_key_returns_single() -> Result<()> {
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    let resolved = resolver.lookup("ingress.3133039999.cidr")?;
    assert_eq!(resolved, Resolved::Single(Value::from("0.0.0.0/0")));
    Ok(())
}

#[test]
fn exact_match_beats_pattern_interpretation() -> Result<()> {
    // `ingress.#` is a valid regex (`.` any char, `#` literal) that would
    // match several keys, but the exact key short-circuits.
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    let resolved = resolver.lookup("ingress.#")?;
    assert_eq!(resolved, Resolved::Single(Value::from("2")));
    Ok(())
}

#[test]
fn pattern_returns_values_in_map_order() -> Result<()> {
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    let resolved = resolver.lookup("^ingress.[0-9]+.cidr$")?;
    assert_eq!(
        resolved,
        Resolved::Multiple(vec![
            Value::from("0.0.0.0/0"),
            Value::from("10.0.0.0/24"),
        ])
    );
    Ok(())
}

#[test]
fn single_element_pattern_match_is_still_a_list() -> Result<()> {
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    let resolved = resolver.lookup("^egress.[0-9]+.cidr$")?;
    assert_eq!(resolved, Resolved::Multiple(vec![Value::from("0.0.0.0/0")]));
    Ok(())
}

#[test]
fn pattern_matches_from_start_not_full_string() -> Result<()> {
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    // Unanchored prefix pattern matches every ingress key.
    let resolved = resolver.lookup("ingress")?;
    assert_eq!(
        resolved,
        Resolved::Multiple(vec![
            Value::from("2"),
            Value::from("0.0.0.0/0"),
            Value::from("443"),
            Value::from("10.0.0.0/24"),
        ])
    );

    // A pattern that only matches mid-key does not match at all.
    let err = resolver.lookup("gress").expect_err("should not match");
    assert!(matches!(err, ResolveError::NotFound(_)), "{err}");
    Ok(())
}

#[test]
fn missing_key_is_not_found() {
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    match resolver.lookup("no_such_key") {
        Err(ResolveError::NotFound(spec)) => assert_eq!(spec, "no_such_key"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn invalid_regex_is_distinct_from_not_found() {
    let attrs = security_group();
    let resolver = AttributeResolver::new(&attrs);

    match resolver.lookup("ingress.(") {
        Err(ResolveError::InvalidPattern { pattern, .. }) => {
            assert_eq!(pattern, "ingress.(");
        }
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn duplicate_values_preserved() -> Result<()> {
    let attrs: AttributeMap = [
        ("tag.0", Value::from("prod")),
        ("tag.1", Value::from("prod")),
    ]
    .into_iter()
    .collect();
    let resolver = AttributeResolver::new(&attrs);

    let resolved = resolver.lookup("^tag")?;
    assert_eq!(
        resolved,
        Resolved::Multiple(vec![Value::from("prod"), Value::from("prod")])
    );
    Ok(())
}

#[test]
fn empty_map_lookup_fails() {
    let attrs = AttributeMap::new();
    let resolver = AttributeResolver::new(&attrs);
    assert!(matches!(
        resolver.lookup("anything"),
        Err(ResolveError::NotFound(_))
    ));
}
