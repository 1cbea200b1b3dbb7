use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;
use log::{debug, info};
use tokio::runtime::Runtime;

use super::{Parameter, ParameterPage, ParameterStore, Result, StoreError};

/// AWS Systems Manager Parameter Store
///
/// The SDK is async; every call is driven to completion on a private
/// current-thread runtime so the rest of the tool stays synchronous.
pub struct SsmStore {
    runtime: Runtime,
    client: Client,
}

impl SsmStore {
    /// Load AWS configuration from the default provider chain and build a client.
    pub fn connect(region: Option<&str>, profile: Option<&str>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Session(format!("failed to create runtime: {}", e)))?;

        let config = runtime.block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region.to_string()));
            }
            if let Some(profile) = profile {
                loader = loader.profile_name(profile);
            }
            loader.load().await
        });

        let region = config.region().ok_or_else(|| {
            StoreError::Session("no AWS region configured (set AWS_REGION or pass --region)".into())
        })?;
        info!("Using parameter store in region {}", region);

        Ok(Self {
            client: Client::new(&config),
            runtime,
        })
    }
}

impl ParameterStore for SsmStore {
    fn list_parameter_names(&self, next_token: Option<&str>) -> Result<ParameterPage> {
        debug!("DescribeParameters (next token: {:?})", next_token);

        let output = self
            .runtime
            .block_on(
                self.client
                    .describe_parameters()
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| StoreError::Listing(DisplayErrorContext(&e).to_string()))?;

        let names = output
            .parameters()
            .iter()
            .filter_map(|meta| meta.name())
            .map(str::to_string)
            .collect();

        Ok(ParameterPage {
            names,
            next_token: output.next_token().map(str::to_string),
        })
    }

    fn get_parameter_values(&self, names: &[String], decrypt: bool) -> Result<Vec<Parameter>> {
        debug!("GetParameters {:?} (decrypt: {})", names, decrypt);

        let output = self
            .runtime
            .block_on(
                self.client
                    .get_parameters()
                    .set_names(Some(names.to_vec()))
                    .with_decryption(decrypt)
                    .send(),
            )
            .map_err(|e| StoreError::Fetch(DisplayErrorContext(&e).to_string()))?;

        if !output.invalid_parameters().is_empty() {
            return Err(StoreError::Fetch(format!(
                "parameters not found: {}",
                output.invalid_parameters().join(", ")
            )));
        }

        output
            .parameters()
            .iter()
            .map(|param| {
                let name = param
                    .name()
                    .ok_or_else(|| StoreError::Fetch("parameter returned without a name".into()))?;
                let value = param
                    .value()
                    .ok_or_else(|| StoreError::Fetch(format!("parameter {} has no value", name)))?;
                Ok(Parameter {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            })
            .collect()
    }
}
