use crate::workflows::eligibility::rules::{evaluate, Expr, Rule, RuleError};
use crate::workflows::eligibility::EvaluationContext;

#[test]
fn probation_threshold_is_inclusive() {
    let at_threshold = EvaluationContext::new().with("employmentDuration", 90);
    let below = EvaluationContext::new().with("employmentDuration", 89);

    assert_eq!(evaluate("employmentDuration >= 90", &at_threshold), Ok(true));
    assert_eq!(evaluate("employmentDuration >= 90", &below), Ok(false));
}

#[test]
fn missing_variable_is_unbound_not_zero() {
    let context = EvaluationContext::new().with("leaveBalance", 4);

    match evaluate("employmentDuration >= 90", &context) {
        Err(RuleError::UnboundVariable(name)) => assert_eq!(name, "employmentDuration"),
        other => panic!("expected unbound variable, got {other:?}"),
    }
    assert!(matches!(
        evaluate("employmentDuration < 90", &context),
        Err(RuleError::UnboundVariable(_))
    ));
}

#[test]
fn evaluation_is_deterministic() {
    let context = EvaluationContext::new()
        .with("department", "finance")
        .with("grade", 7)
        .with("remote", true);
    let rule = Rule::parse("department == \"finance\" && grade > 5 || remote == false")
        .expect("rule parses");

    let first = rule.evaluate(&context);
    for _ in 0..10 {
        assert_eq!(rule.evaluate(&context), first);
    }
    assert_eq!(first, Ok(true));
}

#[test]
fn and_binds_tighter_than_or() {
    let rule = Rule::parse("a == 1 || b == 2 && c == 3").expect("parses");
    assert_eq!(rule.expr().to_string(), "(a == 1 || (b == 2 && c == 3))");

    let context = EvaluationContext::new()
        .with("a", 1)
        .with("b", 0)
        .with("c", 0);
    assert_eq!(rule.evaluate(&context), Ok(true));
}

#[test]
fn parentheses_override_precedence() {
    let rule = Rule::parse("(a == 1 || b == 2) && c == 3").expect("parses");
    assert!(matches!(rule.expr(), Expr::LogicalAnd(_, _)));

    let context = EvaluationContext::new()
        .with("a", 1)
        .with("b", 0)
        .with("c", 0);
    assert_eq!(rule.evaluate(&context), Ok(false));
}

#[test]
fn compares_variables_against_variables() {
    let context = EvaluationContext::new()
        .with("leaveBalance", 3)
        .with("requestedDays", 5);
    assert_eq!(evaluate("leaveBalance >= requestedDays", &context), Ok(false));
    assert_eq!(evaluate("requestedDays != leaveBalance", &context), Ok(true));
}

#[test]
fn bare_boolean_operands_are_expressions() {
    let context = EvaluationContext::new().with("hasContract", true);
    assert_eq!(evaluate("hasContract", &context), Ok(true));
    assert_eq!(evaluate("false || hasContract", &context), Ok(true));
    assert_eq!(evaluate("true && false", &context), Ok(false));
}

#[test]
fn short_circuit_skips_unbound_right_hand_side() {
    let context = EvaluationContext::new().with("emergency", true);
    assert_eq!(evaluate("emergency == true || noticeDays >= 14", &context), Ok(true));
    assert!(matches!(
        evaluate("emergency == false || noticeDays >= 14", &context),
        Err(RuleError::UnboundVariable(_))
    ));
}

#[test]
fn mismatched_types_are_reported() {
    let context = EvaluationContext::new()
        .with("status", "active")
        .with("grade", 4)
        .with("remote", true);

    assert!(matches!(
        evaluate("status > 3", &context),
        Err(RuleError::TypeMismatch(_))
    ));
    assert!(matches!(
        evaluate("remote >= true", &context),
        Err(RuleError::TypeMismatch(_))
    ));
    assert!(matches!(
        evaluate("grade", &context),
        Err(RuleError::TypeMismatch(_))
    ));
}

#[test]
fn malformed_expressions_fail_to_parse() {
    for source in [
        "",
        "employmentDuration >=",
        "employmentDuration = 90",
        "(a == 1",
        "a == 1)",
        "a == 1 &&",
        "a == 1 b == 2",
        "a == 'open",
        "a ~ 2",
    ] {
        assert!(
            matches!(Rule::parse(source), Err(_)),
            "expected parse failure for {source:?}"
        );
        assert!(matches!(
            evaluate(source, &EvaluationContext::new()),
            Err(RuleError::Parse(_))
        ));
    }
}

#[test]
fn parse_error_points_at_offending_token() {
    let err = Rule::parse("grade >= 3 && && x").expect_err("double operator");
    assert_eq!(err.offset, 14);
    assert!(err.message.contains("'&&'"));
}

#[test]
fn reports_referenced_variables() {
    let rule = Rule::parse("leaveBalance >= requestedDays && (team.size > 3 || remote)")
        .expect("parses");
    let names: Vec<&str> = rule.variables().into_iter().collect();
    assert_eq!(names, vec!["leaveBalance", "remote", "requestedDays", "team.size"]);
}
