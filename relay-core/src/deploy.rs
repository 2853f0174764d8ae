//! Deployment descriptor
//!
//! Pure data describing what a deployment tool has to provision around the
//! handler: the event rule that feeds it, the environment it reads and the
//! permissions it needs at runtime. Nothing here is used by the handler's
//! runtime path.

use serde::{Deserialize, Serialize};

use crate::domain::event::{ACTION_STATE_CHANGE, ActionState, CODEPIPELINE_SOURCE};

/// Default name of the parameter holding the Bitbucket access token
pub const DEFAULT_TOKEN_PARAMETER: &str = "BITBUCKET_UPDATE_BUILD_STATUS_TOKEN";

/// Environment variable carrying the Bitbucket server address
pub const SERVER_ENV: &str = "BITBUCKET_SERVER";

/// Environment variable carrying the token parameter name
pub const TOKEN_ENV: &str = "BITBUCKET_TOKEN";

/// Name of the event rule
pub const RULE_NAME: &str = "CodePipelineActionExecutionStateChangeRule";

/// Action states the event rule forwards
pub const REPORTED_STATES: [ActionState; 3] = [
    ActionState::Failed,
    ActionState::Succeeded,
    ActionState::Canceled,
];

/// Event pattern of the rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPattern {
    pub source: Vec<String>,
    #[serde(rename = "detail-type")]
    pub detail_type: Vec<String>,
    pub detail: DetailPattern,
}

/// Detail section of the event pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailPattern {
    pub state: Vec<ActionState>,
}

impl EventPattern {
    /// Pattern matching CodePipeline action state changes in the given states
    pub fn action_state_change(states: &[ActionState]) -> Self {
        Self {
            source: vec![CODEPIPELINE_SOURCE.to_string()],
            detail_type: vec![ACTION_STATE_CHANGE.to_string()],
            detail: DetailPattern {
                state: states.to_vec(),
            },
        }
    }

    /// Check whether a raw event would be forwarded by this pattern
    pub fn matches(&self, event: &serde_json::Value) -> bool {
        let field_in = |value: Option<&serde_json::Value>, allowed: &[String]| {
            value
                .and_then(|v| v.as_str())
                .is_some_and(|v| allowed.iter().any(|a| a == v))
        };

        let state_matches = event
            .get("detail")
            .and_then(|d| d.get("state"))
            .and_then(|s| s.as_str())
            .is_some_and(|s| self.detail.state.iter().any(|a| a.as_str() == s));

        field_in(event.get("source"), &self.source)
            && field_in(event.get("detail-type"), &self.detail_type)
            && state_matches
    }
}

/// Target of the event rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTarget {
    pub id: String,
    /// Reference to the handler the events are delivered to
    pub function: String,
}

/// Event rule wiring notifications to the handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRule {
    pub name: String,
    pub event_pattern: EventPattern,
    pub targets: Vec<RuleTarget>,
}

/// A single permission grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl PolicyStatement {
    fn allow(action: &str, resource: String) -> Self {
        Self {
            effect: "Allow".to_string(),
            action: vec![action.to_string()],
            resource: vec![resource],
        }
    }
}

/// Network placement passed through to the deployment tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcAttributes {
    pub vpc_id: String,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

/// Everything a deployment tool needs to install the handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDescriptor {
    pub description: String,
    pub environment: std::collections::BTreeMap<String, String>,
    pub policy: Vec<PolicyStatement>,
    pub rule: EventRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VpcAttributes>,
}

impl DeploymentDescriptor {
    /// Describe a handler deployment
    ///
    /// # Arguments
    /// * `function` - Reference to the deployed handler (name or ARN)
    /// * `server_address` - Bitbucket server base URL
    /// * `token_parameter` - Parameter name, [`DEFAULT_TOKEN_PARAMETER`] when `None`
    pub fn new(function: &str, server_address: &str, token_parameter: Option<&str>) -> Self {
        let token_parameter = token_parameter.unwrap_or(DEFAULT_TOKEN_PARAMETER);

        let environment = [
            (SERVER_ENV.to_string(), server_address.to_string()),
            (TOKEN_ENV.to_string(), token_parameter.to_string()),
        ]
        .into_iter()
        .collect();

        let policy = vec![
            PolicyStatement::allow(
                "ssm:GetParameter",
                format!("arn:aws:ssm:*:*:parameter/{}", token_parameter),
            ),
            PolicyStatement::allow(
                "codepipeline:GetPipelineExecution",
                "arn:aws:codepipeline:*:*:*".to_string(),
            ),
        ];

        Self {
            description: "Synchronize CodePipeline build statuses to BitBucket".to_string(),
            environment,
            policy,
            rule: EventRule {
                name: RULE_NAME.to_string(),
                event_pattern: EventPattern::action_state_change(&REPORTED_STATES),
                targets: vec![RuleTarget {
                    id: "Target0".to_string(),
                    function: function.to_string(),
                }],
            },
            vpc: None,
        }
    }

    pub fn with_vpc(mut self, vpc: VpcAttributes) -> Self {
        self.vpc = Some(vpc);
        self
    }
}
