// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use planlint::{Engine, ResourcePlan, ResourceRuleGroup, Rule, RuleSet, Violation};

fn db_rules() -> RuleSet {
    RuleSet::from_json_str(
        r#"[
          {
            "resource": "aws_db_instance",
            "rules": [
              { "name": "multi-az must be enabled", "expr": "R['multi_az']=='true'" },
              { "name": "must allocate no less than 10GB", "expr": "int(R['allocated_storage']) >= 10" }
            ]
          },
          {
            "resource": "aws_security_group",
            "rules": [
              { "name": "no ingress from everywhere", "expr": "all([val != '0.0.0.0/0' for val in R['^ingress.[0-9]+.cidr$']])" }
            ]
          }
        ]"#,
    )
    .expect("rule set parses")
}

fn violation(resource_id: &str, rule_name: &str) -> Violation {
    Violation {
        resource_id: resource_id.to_string(),
        rule_name: rule_name.to_string(),
    }
}

#[test]
fn failing_rule_is_reported() -> Result<()> {
    let plan = ResourcePlan::from_json_str(
        r#"{
          "destroy": false,
          "aws_db_instance.x": {
            "multi_az": "",
            "allocated_storage": "20",
            "destroy": false
          }
        }"#,
    )?;

    let violations = Engine::new(db_rules()).validate(&plan);
    assert_eq!(
        violations,
        vec![violation("aws_db_instance.x", "multi-az must be enabled")]
    );
    Ok(())
}

#[test]
fn destroyed_resource_is_skipped() -> Result<()> {
    let plan = ResourcePlan::from_json_str(
        r#"{
          "aws_db_instance.x": {
            "multi_az": "",
            "allocated_storage": "1",
            "destroy": true
          }
        }"#,
    )?;

    let violations = Engine::new(db_rules()).validate(&plan);
    assert!(violations.is_empty(), "{violations:?}");
    Ok(())
}

#[test]
fn open_ingress_is_reported_closed_is_not() -> Result<()> {
    let open = ResourcePlan::from_json_str(
        r#"{ "aws_security_group.sg": { "ingress.1.cidr": "0.0.0.0/0" } }"#,
    )?;
    let closed = ResourcePlan::from_json_str(
        r#"{ "aws_security_group.sg": { "ingress.1.cidr": "10.0.0.0/24" } }"#,
    )?;

    let engine = Engine::new(db_rules());
    assert_eq!(
        engine.validate(&open),
        vec![violation("aws_security_group.sg", "no ingress from everywhere")]
    );
    assert!(engine.validate(&closed).is_empty());
    Ok(())
}

#[test]
fn unevaluable_rule_fails_closed() -> Result<()> {
    let rules = RuleSet::from_json_str(
        r#"[
          {
            "resource": "aws_db_instance",
            "rules": [
              { "name": "broken syntax", "expr": "R['multi_az'] === 'true'" },
              { "name": "missing key", "expr": "R['no_such_key'] == 'x'" },
              { "name": "bad cast", "expr": "int(R['engine']) > 0" },
              { "name": "still runs", "expr": "R['engine'] == 'postgres'" }
            ]
          }
        ]"#,
    )?;
    let plan = ResourcePlan::from_json_str(
        r#"{ "aws_db_instance.x": { "engine": "postgres", "destroy": false } }"#,
    )?;

    // Three rules fail to evaluate; the fourth still runs and passes.
    let violations = Engine::new(rules).validate(&plan);
    assert_eq!(
        violations,
        vec![
            violation("aws_db_instance.x", "broken syntax"),
            violation("aws_db_instance.x", "missing key"),
            violation("aws_db_instance.x", "bad cast"),
        ]
    );
    Ok(())
}

#[test]
fn rule_failure_does_not_stop_other_resources() -> Result<()> {
    let plan = ResourcePlan::from_json_str(
        r#"{
          "aws_db_instance.a": { "multi_az": "", "allocated_storage": "5", "destroy": false },
          "aws_db_instance.b": { "multi_az": "true", "allocated_storage": "100", "destroy": false },
          "aws_db_instance.c": { "destroy": false }
        }"#,
    )?;

    // `c` has no attributes at all; both of its rules fail closed. `a`
    // violates both of its rules. `b` is clean.
    let violations = Engine::new(db_rules()).validate(&plan);
    assert_eq!(
        violations,
        vec![
            violation("aws_db_instance.a", "multi-az must be enabled"),
            violation("aws_db_instance.a", "must allocate no less than 10GB"),
            violation("aws_db_instance.c", "multi-az must be enabled"),
            violation("aws_db_instance.c", "must allocate no less than 10GB"),
        ]
    );
    Ok(())
}

#[test]
fn resources_without_matching_group_pass() -> Result<()> {
    let plan = ResourcePlan::from_json_str(
        r#"{ "aws_s3_bucket.logs": { "acl": "private" } }"#,
    )?;
    assert!(Engine::new(db_rules()).validate(&plan).is_empty());
    Ok(())
}

#[test]
fn empty_rule_set_reports_nothing() -> Result<()> {
    let plan = ResourcePlan::from_json_str(
        r#"{ "aws_db_instance.x": { "multi_az": "" } }"#,
    )?;
    assert!(Engine::new(RuleSet::default()).validate(&plan).is_empty());
    Ok(())
}

#[test]
fn multiple_groups_for_same_type_apply_in_order() -> Result<()> {
    let rules = RuleSet::new(vec![
        ResourceRuleGroup {
            resource: "aws_db_instance".to_string(),
            rules: vec![Rule {
                name: "first".to_string(),
                expr: "false".to_string(),
            }],
        },
        ResourceRuleGroup {
            resource: "aws_db_instance".to_string(),
            rules: vec![Rule {
                name: "second".to_string(),
                expr: "false".to_string(),
            }],
        },
    ]);
    let plan = ResourcePlan::from_json_str(r#"{ "aws_db_instance.x": {} }"#)?;

    let violations = Engine::new(rules).validate(&plan);
    assert_eq!(
        violations,
        vec![
            violation("aws_db_instance.x", "first"),
            violation("aws_db_instance.x", "second"),
        ]
    );
    Ok(())
}

#[test]
fn validation_is_deterministic() -> Result<()> {
    let plan = ResourcePlan::from_json_str(
        r#"{
          "aws_db_instance.a": { "multi_az": "", "allocated_storage": "5", "destroy": false },
          "aws_security_group.sg": { "ingress.1.cidr": "0.0.0.0/0" }
        }"#,
    )?;

    let engine = Engine::new(db_rules());
    assert_eq!(engine.validate(&plan), engine.validate(&plan));
    Ok(())
}

#[test]
fn violation_display() {
    let v = violation("aws_db_instance.x", "multi-az must be enabled");
    assert_eq!(v.to_string(), "aws_db_instance.x: multi-az must be enabled");
}
