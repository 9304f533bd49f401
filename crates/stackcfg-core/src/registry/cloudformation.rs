//! CloudFormation stack outputs

use async_trait::async_trait;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudformation::Client;

use crate::naming::ComponentId;
use super::traits::{OutputRegistry, RegistryError, RegistryResult};

/// Output registry reading `DescribeStacks` outputs
pub struct CloudFormationRegistry {
    client: Client,
    region: String,
}

impl CloudFormationRegistry {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_default();
        Self {
            client: Client::new(sdk_config),
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// CloudFormation reports a missing stack as a `ValidationError`
fn is_missing_stack(code: Option<&str>, message: Option<&str>) -> bool {
    code == Some("ValidationError") && message.is_some_and(|m| m.contains("does not exist"))
}

#[async_trait]
impl OutputRegistry for CloudFormationRegistry {
    fn name(&self) -> &str {
        "cloudformation"
    }

    async fn get_output(&self, component: &ComponentId, key: &str) -> RegistryResult<String> {
        let stack_name = component.stack_name();
        let response = self
            .client
            .describe_stacks()
            .stack_name(&stack_name)
            .send()
            .await
            .map_err(|err| {
                if is_missing_stack(err.code(), err.message()) {
                    RegistryError::component_not_found(component, self.region.clone())
                } else {
                    RegistryError::unavailable(component, DisplayErrorContext(&err).to_string())
                }
            })?;

        let stack = response
            .stacks()
            .first()
            .ok_or_else(|| RegistryError::component_not_found(component, self.region.clone()))?;

        stack
            .outputs()
            .iter()
            .find(|output| output.output_key() == Some(key))
            .and_then(|output| output.output_value())
            .map(str::to_string)
            .ok_or_else(|| RegistryError::output_not_found(component, key))
    }
}
