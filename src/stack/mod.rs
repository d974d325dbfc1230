//! CloudFormation templates for the deployed infrastructure.
//!
//! Templates are plain data: resources are built as typed [`Resource`] values
//! with JSON properties and rendered with `serde_json`. Nothing here talks to
//! AWS.

pub mod api;
pub mod ec2;

use std::collections::BTreeMap;
use std::fmt;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug)]
pub enum StackError {
    /// A required setting is missing or unusable.
    Config(String),
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Config(msg) => write!(f, "invalid stack configuration: {msg}"),
        }
    }
}

impl std::error::Error for StackError {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(kind: &str, properties: Value) -> Self {
        Self {
            kind: kind.to_string(),
            properties,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, logical_id: &str) -> Self {
        self.depends_on.push(logical_id.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub description: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    pub description: String,
    pub resources: BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: &str) -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: description.to_string(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Adds a resource and returns a `Ref` to it.
    pub fn add(&mut self, logical_id: &str, resource: Resource) -> Value {
        self.resources.insert(logical_id.to_string(), resource);
        reference(logical_id)
    }

    pub fn output(&mut self, name: &str, description: &str, value: Value) {
        self.outputs.insert(
            name.to_string(),
            Output {
                description: description.to_string(),
                value,
            },
        );
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    #[cfg(test)]
    pub(crate) fn resources_of_type<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.kind == kind)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

/// Command line of the `synth` binary. Every setting can also come from the
/// environment variable named in its help text.
#[derive(Debug, Parser)]
#[command(
    name = "synth",
    about = "Print the CloudFormation template for one of the stacks"
)]
pub struct SynthCli {
    #[command(subcommand)]
    pub stack: StackCommand,
}

#[derive(Debug, Subcommand)]
pub enum StackCommand {
    /// DynamoDB table, Lambda handlers and the REST API in front of them
    Api(api::ApiStackConfig),
    /// A single instance in an existing VPC
    Ec2(ec2::Ec2StackConfig),
}

impl StackCommand {
    pub fn synth(&self) -> Result<Template, StackError> {
        match self {
            StackCommand::Api(config) => Ok(api::api_stack(config)),
            StackCommand::Ec2(config) => ec2::ec2_stack(config),
        }
    }
}
