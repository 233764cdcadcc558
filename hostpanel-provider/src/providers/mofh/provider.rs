//! MOFH `ResellerApi` implementation

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{ProviderErrorMapper, ResellerApi};
use crate::types::{
    CreateAccountParams, CreatedAccount, DomainStatusEntry, InternalUsername, ProviderUsername,
};

use super::http::{parse_availability, parse_user_domains};
use super::{MofhProvider, PROVIDER_NAME};

/// Upper bound the panel accepts for a suspension reason.
const MAX_REASON_LEN: usize = 255;

#[async_trait]
impl ResellerApi for MofhProvider {
    fn id(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn create_account(&self, params: &CreateAccountParams) -> Result<CreatedAccount> {
        if !params.password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(self.invalid_parameter("password", "must be alphanumeric"));
        }

        let result = self
            .post_json_api(
                "createacct",
                &[
                    ("username", params.username.as_str()),
                    ("password", params.password.as_str()),
                    ("contactemail", params.contact_email.as_str()),
                    ("domain", params.domain.as_str()),
                    ("plan", params.plan.as_str()),
                ],
            )
            .await?;

        let provider_username = result
            .option_str("vpusername")
            .map(ProviderUsername::new)
            .ok_or_else(|| self.parse_error("createacct succeeded without options.vpusername"))?;

        log::info!(
            "[{PROVIDER_NAME}] Account {} created for {} as {provider_username}",
            params.username,
            params.domain
        );

        Ok(CreatedAccount {
            provider_username,
            message: result.statusmsg,
        })
    }

    async fn suspend_account(&self, username: &InternalUsername, reason: &str) -> Result<()> {
        if reason.len() > MAX_REASON_LEN {
            return Err(self.invalid_parameter("reason", "longer than 255 characters"));
        }
        self.post_json_api(
            "suspendacct",
            &[("user", username.as_str()), ("reason", reason)],
        )
        .await?;
        log::info!("[{PROVIDER_NAME}] Suspension of {username} accepted");
        Ok(())
    }

    async fn unsuspend_account(&self, username: &InternalUsername) -> Result<()> {
        self.post_json_api("unsuspendacct", &[("user", username.as_str())])
            .await?;
        log::info!("[{PROVIDER_NAME}] Reactivation of {username} accepted");
        Ok(())
    }

    async fn change_password(
        &self,
        username: &InternalUsername,
        new_password: &str,
    ) -> Result<()> {
        if !new_password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(self.invalid_parameter("pass", "must be alphanumeric"));
        }
        self.post_json_api(
            "passwd",
            &[("user", username.as_str()), ("pass", new_password)],
        )
        .await?;
        log::info!("[{PROVIDER_NAME}] Password of {username} changed");
        Ok(())
    }

    async fn get_user_domains(&self, username: &ProviderUsername) -> Result<Vec<DomainStatusEntry>> {
        let body = self
            .post_xml_api("getuserdomains", &[("username", username.as_str())])
            .await?;
        parse_user_domains(&body)
    }

    async fn check_available(&self, domain: &str) -> Result<bool> {
        let body = self
            .post_xml_api("checkavailable", &[("domain", domain)])
            .await?;
        parse_availability(&body)
    }
}
