use crate::workflows::eligibility::{
    EligibilityConfig, EligibilityCriteriaSet, EvaluationContext, EvaluationType, Requirement,
    RequirementPriority,
};

pub(super) fn automatic(id: &str, rule: &str, priority: RequirementPriority) -> Requirement {
    Requirement {
        id: id.to_string(),
        name: id.replace('-', " "),
        description: format!("{id} must hold"),
        evaluation_type: EvaluationType::Automatic,
        rule: Some(rule.to_string()),
        priority,
        active: true,
    }
}

pub(super) fn manual(id: &str, priority: RequirementPriority) -> Requirement {
    Requirement {
        id: id.to_string(),
        name: id.replace('-', " "),
        description: "Line manager sign-off".to_string(),
        evaluation_type: EvaluationType::ManualApproval,
        rule: None,
        priority,
        active: true,
    }
}

pub(super) fn leave_criteria() -> EligibilityCriteriaSet {
    EligibilityCriteriaSet {
        request_type: "leave".to_string(),
        requirements: vec![
            automatic(
                "probation-complete",
                "employmentDuration >= 90",
                RequirementPriority::High,
            ),
            automatic(
                "sufficient-balance",
                "leaveBalance >= requestedDays",
                RequirementPriority::High,
            ),
            automatic(
                "notice-period",
                "noticeDays >= 14 || emergency == true",
                RequirementPriority::Medium,
            ),
            automatic("no-overlap", "teamOnLeave < 3", RequirementPriority::Low),
        ],
    }
}

pub(super) fn equipment_criteria() -> EligibilityCriteriaSet {
    EligibilityCriteriaSet {
        request_type: "equipment".to_string(),
        requirements: vec![
            automatic(
                "active-employee",
                "status == 'active'",
                RequirementPriority::High,
            ),
            manual("manager-approval", RequirementPriority::High),
        ],
    }
}

pub(super) fn config() -> EligibilityConfig {
    EligibilityConfig::new(vec![leave_criteria(), equipment_criteria()]).expect("valid config")
}

pub(super) fn eligible_leave_context() -> EvaluationContext {
    EvaluationContext::new()
        .with("employmentDuration", 240)
        .with("leaveBalance", 12.5)
        .with("requestedDays", 5)
        .with("noticeDays", 21)
        .with("emergency", false)
        .with("teamOnLeave", 1)
}
