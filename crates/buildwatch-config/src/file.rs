//! KDL configuration file parsing.

use crate::{ConfigError, ConfigResult, RawConfig};
use kdl::{KdlDocument, KdlNode};

/// Parse a configuration file from KDL text.
///
/// ```kdl
/// jenkins "https://ci.example.com" {
///     user "bot"
///     api-token "..."
/// }
/// slack {
///     bot-token "xoxb-..."
///     signing-secret "..."
///     channel "cicd-status"
/// }
/// poll interval=30
/// build job="deploy"
/// server listen="0.0.0.0:3000"
/// http timeout=30
/// ```
pub fn parse_config(kdl: &str) -> ConfigResult<RawConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut raw = RawConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "jenkins" => parse_jenkins(node, &mut raw),
            "slack" => parse_slack(node, &mut raw),
            "poll" => {
                raw.poll_interval_secs = get_u64_prop(node, "interval")?;
            }
            "build" => {
                raw.build_job = get_string_prop(node, "job");
            }
            "server" => {
                raw.listen = get_string_prop(node, "listen");
            }
            "http" => {
                raw.http_timeout_secs = get_u64_prop(node, "timeout")?;
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(raw)
}

fn parse_jenkins(node: &KdlNode, raw: &mut RawConfig) {
    raw.jenkins_url = get_first_string_arg(node);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "url" => raw.jenkins_url = get_first_string_arg(child),
                "user" => raw.jenkins_user = get_first_string_arg(child),
                "api-token" | "api_token" => raw.jenkins_api_token = get_first_string_arg(child),
                _ => {}
            }
        }
    }
}

fn parse_slack(node: &KdlNode, raw: &mut RawConfig) {
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "bot-token" | "bot_token" => raw.slack_bot_token = get_first_string_arg(child),
                "signing-secret" | "signing_secret" => {
                    raw.slack_signing_secret = get_first_string_arg(child)
                }
                "channel" => raw.slack_channel = get_first_string_arg(child),
                "api-url" | "api_url" => raw.slack_api_url = get_first_string_arg(child),
                _ => {}
            }
        }
    }
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_u64_prop(node: &KdlNode, name: &str) -> ConfigResult<Option<u64>> {
    let Some(value) = node.get(name) else {
        return Ok(None);
    };

    value
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidValue {
            field: format!("{} {}", node.name().value(), name),
            message: format!("expected a non-negative integer, got {}", value),
        })
}
