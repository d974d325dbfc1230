use clap::Args;
use serde_json::json;

use super::{get_att, reference, Resource, StackError, Template};

const INSTANCE: &str = "MyEc2Instance";
const INSTANCE_TYPE: &str = "t2.micro";
const AL2023_IMAGE_PARAMETER: &str =
    "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64";

const DEFAULT_VPC_ID: &str = "vpc-0d0ff7575f61e8f66";
const DEFAULT_SECURITY_GROUP_ID: &str = "sg-03002474e0e88cb02";
const DEFAULT_KEY_PAIR_NAME: &str = "TrainingKeyPair";

/// Pre-existing network resources the instance attaches to.
#[derive(Debug, Clone, Args)]
pub struct Ec2StackConfig {
    #[arg(long, env = "STACK_VPC_ID", default_value = DEFAULT_VPC_ID)]
    pub vpc_id: String,

    #[arg(long, env = "STACK_SECURITY_GROUP_ID", default_value = DEFAULT_SECURITY_GROUP_ID)]
    pub security_group_id: String,

    #[arg(long, env = "STACK_KEY_PAIR_NAME", default_value = DEFAULT_KEY_PAIR_NAME)]
    pub key_pair_name: String,

    /// Public subnets of the VPC; the instance goes into the first one
    #[arg(long, env = "STACK_PUBLIC_SUBNET_IDS", value_delimiter = ',')]
    pub public_subnet_ids: Vec<String>,
}

impl Default for Ec2StackConfig {
    fn default() -> Self {
        Self {
            vpc_id: DEFAULT_VPC_ID.to_string(),
            security_group_id: DEFAULT_SECURITY_GROUP_ID.to_string(),
            key_pair_name: DEFAULT_KEY_PAIR_NAME.to_string(),
            public_subnet_ids: Vec::new(),
        }
    }
}

pub fn ec2_stack(config: &Ec2StackConfig) -> Result<Template, StackError> {
    let subnet_id = config.public_subnet_ids.first().ok_or_else(|| {
        StackError::Config(format!(
            "no public subnet configured for {} (pass --public-subnet-ids or set STACK_PUBLIC_SUBNET_IDS)",
            config.vpc_id
        ))
    })?;

    let mut template = Template::new(&format!(
        "Single EC2 instance in existing VPC {}",
        config.vpc_id
    ));

    template.add(
        INSTANCE,
        Resource::new(
            "AWS::EC2::Instance",
            json!({
                "InstanceType": INSTANCE_TYPE,
                "ImageId": format!("{{{{resolve:ssm:{AL2023_IMAGE_PARAMETER}}}}}"),
                "KeyName": config.key_pair_name,
                "NetworkInterfaces": [{
                    "DeviceIndex": "0",
                    "AssociatePublicIpAddress": true,
                    "SubnetId": subnet_id,
                    "GroupSet": [config.security_group_id],
                }],
            }),
        ),
    );

    template.output("InstanceId", "Id of the instance", reference(INSTANCE));
    template.output(
        "PublicIp",
        "Public IP of the instance",
        get_att(INSTANCE, "PublicIp"),
    );

    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Ec2StackConfig {
        Ec2StackConfig {
            public_subnet_ids: vec!["subnet-public-a".to_string(), "subnet-public-c".to_string()],
            ..Ec2StackConfig::default()
        }
    }

    #[test]
    fn test_instance_in_first_public_subnet() {
        let template = ec2_stack(&config()).unwrap();
        let instance = &template.resource(INSTANCE).unwrap().properties;

        assert_eq!(instance["InstanceType"], "t2.micro");
        assert_eq!(instance["KeyName"], "TrainingKeyPair");
        let nic = &instance["NetworkInterfaces"][0];
        assert_eq!(nic["SubnetId"], "subnet-public-a");
        assert_eq!(nic["AssociatePublicIpAddress"], true);
        assert_eq!(nic["GroupSet"][0], "sg-03002474e0e88cb02");
    }

    #[test]
    fn test_image_resolves_latest_al2023() {
        let template = ec2_stack(&config()).unwrap();
        let instance = &template.resource(INSTANCE).unwrap().properties;
        assert_eq!(
            instance["ImageId"],
            "{{resolve:ssm:/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64}}"
        );
    }

    #[test]
    fn test_missing_subnet_is_config_error() {
        let err = ec2_stack(&Ec2StackConfig::default()).unwrap_err();
        assert!(matches!(err, StackError::Config(_)));
    }
}
