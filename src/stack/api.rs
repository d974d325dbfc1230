use clap::Args;
use serde_json::{json, Value};

use crate::config::DEFAULT_USERS_TABLE_NAME;

use super::{get_att, sub, Resource, Template};

const API_NAME: &str = "TrainingApi";
const STAGE_NAME: &str = "v1";
const LAMBDA_RUNTIME: &str = "provided.al2023";
const LAMBDA_HANDLER: &str = "bootstrap";
const LAMBDA_MEMORY_MB: u32 = 128;
const TOKEN_IDENTITY_SOURCE: &str = "method.request.header.authorizationToken";

const DEFAULT_ARTIFACT_BUCKET: &str = "training-lambda-artifacts";
const DEFAULT_ARTIFACT_PREFIX: &str = "users-api";
const DEFAULT_RATE_LIMIT: f64 = 5.0;
const DEFAULT_BURST_LIMIT: u32 = 2;
const DEFAULT_DAILY_QUOTA: u32 = 10;

const ROLE: &str = "IamRoleForLambda";
const POLICY: &str = "IamPolicyForLambda";
const TABLE: &str = "DynamoDbTableUsers";
const REST_API: &str = "TrainingApiRestApi";
const AUTHORIZER: &str = "TrainingApiAuthorizer";
const USERS_RESOURCE: &str = "TrainingApiUsers";
const USER_ID_RESOURCE: &str = "TrainingApiUsersUserId";
const DEPLOYMENT: &str = "TrainingApiDeployment";
const STAGE: &str = "TrainingApiStage";
const API_KEY: &str = "TrainingApiKey";
const USAGE_PLAN: &str = "TrainingApiUsagePlan";
const USAGE_PLAN_KEY: &str = "TrainingApiUsagePlanKey";

/// A Lambda function in the stack and the binary it runs.
#[derive(Debug, Clone, Copy)]
pub struct FunctionSpec {
    pub logical_id: &'static str,
    pub function_name: &'static str,
    pub binary: &'static str,
}

pub const GET_USERS: FunctionSpec = FunctionSpec {
    logical_id: "LambdaTrainingGetUsers",
    function_name: "TrainingGetUsers",
    binary: "list-users",
};
pub const POST_USER: FunctionSpec = FunctionSpec {
    logical_id: "LambdaTrainingPostUser",
    function_name: "TrainingPostUser",
    binary: "create-user",
};
pub const PUT_USER: FunctionSpec = FunctionSpec {
    logical_id: "LambdaTrainingPutUser",
    function_name: "TrainingPutUser",
    binary: "update-user",
};
pub const DELETE_USER: FunctionSpec = FunctionSpec {
    logical_id: "LambdaTrainingDeleteUser",
    function_name: "TrainingDeleteUser",
    binary: "delete-user",
};
pub const AUTH: FunctionSpec = FunctionSpec {
    logical_id: "LambdaTrainingAuth",
    function_name: "TrainingAuth",
    binary: "authorizer",
};

/// Per-key throttling and quota applied by the usage plan.
#[derive(Debug, Clone, Copy, PartialEq, Args)]
pub struct UsagePlanLimits {
    /// Steady-state requests per second
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT)]
    pub rate_limit: f64,
    #[arg(long, default_value_t = DEFAULT_BURST_LIMIT)]
    pub burst_limit: u32,
    /// Requests per key per day
    #[arg(long, default_value_t = DEFAULT_DAILY_QUOTA)]
    pub daily_quota: u32,
}

impl Default for UsagePlanLimits {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            burst_limit: DEFAULT_BURST_LIMIT,
            daily_quota: DEFAULT_DAILY_QUOTA,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ApiStackConfig {
    /// DynamoDB table created by the stack and passed to every handler
    #[arg(long, env = "USERS_TABLE_NAME", default_value = DEFAULT_USERS_TABLE_NAME)]
    pub users_table_name: String,

    /// S3 bucket holding the zipped `bootstrap` binaries
    #[arg(long, env = "STACK_ARTIFACT_BUCKET", default_value = DEFAULT_ARTIFACT_BUCKET)]
    pub artifact_bucket: String,

    #[arg(long, env = "STACK_ARTIFACT_PREFIX", default_value = DEFAULT_ARTIFACT_PREFIX)]
    pub artifact_prefix: String,

    /// Hex SHA-256 digests of the bearer tokens the authorizer accepts
    #[arg(
        long = "authorizer-token-sha256",
        env = "AUTHORIZER_TOKEN_SHA256",
        value_delimiter = ','
    )]
    pub authorizer_token_digests: Vec<String>,

    #[command(flatten)]
    pub limits: UsagePlanLimits,
}

impl Default for ApiStackConfig {
    fn default() -> Self {
        Self {
            users_table_name: DEFAULT_USERS_TABLE_NAME.to_string(),
            artifact_bucket: DEFAULT_ARTIFACT_BUCKET.to_string(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            authorizer_token_digests: Vec::new(),
            limits: UsagePlanLimits::default(),
        }
    }
}

pub fn api_stack(config: &ApiStackConfig) -> Template {
    let mut template = Template::new("Users CRUD API: DynamoDB table, Lambda handlers, REST API");

    let role = template.add(
        ROLE,
        Resource::new(
            "AWS::IAM::Role",
            json!({
                "RoleName": "TrainingLambdaRole",
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "lambda.amazonaws.com" },
                        "Action": "sts:AssumeRole",
                    }],
                },
            }),
        ),
    );

    template.add(
        POLICY,
        Resource::new(
            "AWS::IAM::Policy",
            json!({
                "PolicyName": "TrainingLambdaRolePolicy",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [
                        {
                            "Effect": "Allow",
                            "Action": ["logs:*"],
                            "Resource": ["arn:aws:logs:*:*:*"],
                        },
                        {
                            "Effect": "Allow",
                            "Action": ["dynamodb:*"],
                            "Resource": ["*"],
                        },
                    ],
                },
                "Roles": [role],
            }),
        ),
    );

    let table = template.add(
        TABLE,
        Resource::new(
            "AWS::DynamoDB::Table",
            json!({
                "TableName": config.users_table_name,
                "AttributeDefinitions": [
                    { "AttributeName": "UserId", "AttributeType": "S" },
                ],
                "KeySchema": [
                    { "AttributeName": "UserId", "KeyType": "HASH" },
                ],
                "BillingMode": "PROVISIONED",
                "ProvisionedThroughput": {
                    "ReadCapacityUnits": 1,
                    "WriteCapacityUnits": 1,
                },
            }),
        ),
    );

    for function in [GET_USERS, POST_USER, PUT_USER, DELETE_USER] {
        add_function(&mut template, config, function, handler_environment(&table));
    }

    let mut auth_environment = handler_environment(&table);
    auth_environment["AUTHORIZER_TOKEN_SHA256"] =
        Value::String(config.authorizer_token_digests.join(","));
    add_function(&mut template, config, AUTH, auth_environment);

    let rest_api = template.add(
        REST_API,
        Resource::new("AWS::ApiGateway::RestApi", json!({ "Name": API_NAME })),
    );

    let authorizer = template.add(
        AUTHORIZER,
        Resource::new(
            "AWS::ApiGateway::Authorizer",
            json!({
                "Name": "trainingApiAuthorizer",
                "RestApiId": rest_api,
                "Type": "TOKEN",
                "IdentitySource": TOKEN_IDENTITY_SOURCE,
                "AuthorizerResultTtlInSeconds": 0,
                "AuthorizerUri": lambda_invocation_uri(AUTH),
            }),
        ),
    );

    let users = template.add(
        USERS_RESOURCE,
        Resource::new(
            "AWS::ApiGateway::Resource",
            json!({
                "RestApiId": rest_api,
                "ParentId": get_att(REST_API, "RootResourceId"),
                "PathPart": "users",
            }),
        ),
    );

    let user_id = template.add(
        USER_ID_RESOURCE,
        Resource::new(
            "AWS::ApiGateway::Resource",
            json!({
                "RestApiId": rest_api,
                "ParentId": users,
                "PathPart": "{UserId}",
            }),
        ),
    );

    let methods = [
        ("TrainingApiUsersGet", &users, "GET", GET_USERS),
        ("TrainingApiUsersPost", &users, "POST", POST_USER),
        ("TrainingApiUsersUserIdPut", &user_id, "PUT", PUT_USER),
        ("TrainingApiUsersUserIdDelete", &user_id, "DELETE", DELETE_USER),
    ];

    let mut deployment = Resource::new(
        "AWS::ApiGateway::Deployment",
        json!({ "RestApiId": rest_api }),
    );

    for (logical_id, resource, http_method, function) in methods {
        template.add(
            logical_id,
            Resource::new(
                "AWS::ApiGateway::Method",
                json!({
                    "RestApiId": rest_api,
                    "ResourceId": resource,
                    "HttpMethod": http_method,
                    "AuthorizationType": "CUSTOM",
                    "AuthorizerId": authorizer,
                    "ApiKeyRequired": true,
                    "Integration": {
                        "Type": "AWS_PROXY",
                        "IntegrationHttpMethod": "POST",
                        "Uri": lambda_invocation_uri(function),
                    },
                }),
            ),
        );
        deployment = deployment.depends_on(logical_id);
    }

    let deployment = template.add(DEPLOYMENT, deployment);

    let stage = template.add(
        STAGE,
        Resource::new(
            "AWS::ApiGateway::Stage",
            json!({
                "StageName": STAGE_NAME,
                "RestApiId": rest_api,
                "DeploymentId": deployment,
            }),
        ),
    );

    let api_key = template.add(
        API_KEY,
        Resource::new(
            "AWS::ApiGateway::ApiKey",
            json!({ "Name": "TrainingApiKey", "Enabled": true }),
        ),
    );

    let usage_plan = template.add(
        USAGE_PLAN,
        Resource::new(
            "AWS::ApiGateway::UsagePlan",
            json!({
                "UsagePlanName": "TrainingApiUsagePlan",
                "Throttle": {
                    "RateLimit": config.limits.rate_limit,
                    "BurstLimit": config.limits.burst_limit,
                },
                "Quota": {
                    "Limit": config.limits.daily_quota,
                    "Period": "DAY",
                },
                "ApiStages": [{ "ApiId": rest_api, "Stage": stage }],
            }),
        ),
    );

    template.add(
        USAGE_PLAN_KEY,
        Resource::new(
            "AWS::ApiGateway::UsagePlanKey",
            json!({
                "KeyId": api_key,
                "KeyType": "API_KEY",
                "UsagePlanId": usage_plan,
            }),
        ),
    );

    template.output(
        "ApiEndpoint",
        "Base URL of the users API",
        sub(&format!(
            "https://${{{REST_API}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{STAGE_NAME}/"
        )),
    );
    template.output("ApiKeyId", "Id of the API key bound to the usage plan", api_key);

    template
}

fn handler_environment(table: &Value) -> Value {
    json!({
        "USERS_TABLE_NAME": table,
        "RUST_LOG": "info",
    })
}

fn add_function(
    template: &mut Template,
    config: &ApiStackConfig,
    function: FunctionSpec,
    environment: Value,
) {
    template.add(
        function.logical_id,
        Resource::new(
            "AWS::Lambda::Function",
            json!({
                "FunctionName": function.function_name,
                "Runtime": LAMBDA_RUNTIME,
                "Handler": LAMBDA_HANDLER,
                "MemorySize": LAMBDA_MEMORY_MB,
                "Role": get_att(ROLE, "Arn"),
                "Code": {
                    "S3Bucket": config.artifact_bucket,
                    "S3Key": format!("{}/{}.zip", config.artifact_prefix, function.binary),
                },
                "Environment": { "Variables": environment },
            }),
        )
        .depends_on(POLICY),
    );

    template.add(
        &format!("{}InvokePermission", function.logical_id),
        Resource::new(
            "AWS::Lambda::Permission",
            json!({
                "Action": "lambda:InvokeFunction",
                "FunctionName": get_att(function.logical_id, "Arn"),
                "Principal": "apigateway.amazonaws.com",
                "SourceArn": sub(&format!(
                    "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{REST_API}}}/*"
                )),
            }),
        ),
    );
}

fn lambda_invocation_uri(function: FunctionSpec) -> Value {
    sub(&format!(
        "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/${{{}.Arn}}/invocations",
        function.logical_id
    ))
}
