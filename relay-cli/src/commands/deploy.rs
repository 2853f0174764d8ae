//! Deploy command handlers
//!
//! Prints the description a deployment tool needs to install the handler.

use anyhow::{Context, Result};
use clap::Subcommand;
use relay_core::deploy::{DeploymentDescriptor, VpcAttributes};

/// Deploy subcommands
#[derive(Subcommand)]
pub enum DeployCommands {
    /// Print the deployment descriptor as JSON
    Describe {
        /// Name or ARN of the deployed handler
        #[arg(long, default_value = "CodePipelineBuildResultHandler")]
        function: String,

        /// Bitbucket server address
        #[arg(long, env = "BITBUCKET_SERVER")]
        server: String,

        /// Parameter holding the Bitbucket token
        #[arg(long, env = "BITBUCKET_TOKEN")]
        token_name: Option<String>,

        /// VPC to attach the handler to
        #[arg(long)]
        vpc_id: Option<String>,

        /// Subnets within the VPC
        #[arg(long = "subnet-id", requires = "vpc_id")]
        subnet_ids: Vec<String>,

        /// Security groups within the VPC
        #[arg(long = "security-group-id", requires = "vpc_id")]
        security_group_ids: Vec<String>,
    },
}

/// Handle deploy commands
pub fn handle_deploy_command(command: DeployCommands) -> Result<()> {
    match command {
        DeployCommands::Describe {
            function,
            server,
            token_name,
            vpc_id,
            subnet_ids,
            security_group_ids,
        } => {
            let mut descriptor =
                DeploymentDescriptor::new(&function, &server, token_name.as_deref());

            if let Some(vpc_id) = vpc_id {
                descriptor = descriptor.with_vpc(VpcAttributes {
                    vpc_id,
                    subnet_ids,
                    security_group_ids,
                });
            }

            let json = serde_json::to_string_pretty(&descriptor)
                .context("Failed to serialize deployment descriptor")?;
            println!("{}", json);
            Ok(())
        }
    }
}
