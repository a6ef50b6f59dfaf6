use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, SdkError};
use aws_sdk_cognitoidentityprovider::operation::get_user::GetUserError;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client;
use parking_lot::Mutex;
use tracing::debug;

use crate::gateway::{AuthError, IdentityGateway, Player};

const PLAYER_NAME_ATTRIBUTE: &str = "custom:playerName";

#[derive(Clone, Debug)]
struct TokenSet {
    access_token: String,
    refresh_token: Option<String>,
}

pub struct CognitoIdentityGateway {
    client: Client,
    client_id: String,
    tokens: Mutex<Option<TokenSet>>,
}

impl CognitoIdentityGateway {
    pub fn new(config: &aws_config::SdkConfig, client_id: String) -> Self {
        CognitoIdentityGateway {
            client: Client::new(config),
            client_id,
            tokens: Mutex::new(None),
        }
    }

    fn access_token(&self) -> Option<String> {
        self.tokens.lock().as_ref().map(|t| t.access_token.clone())
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Player, SdkError<GetUserError>> {
        let user = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await?;
        let display_name = user
            .user_attributes()
            .iter()
            .find(|attribute| attribute.name() == PLAYER_NAME_ATTRIBUTE)
            .and_then(|attribute| attribute.value())
            .unwrap_or_else(|| user.username())
            .to_string();
        Ok(Player {
            id: user.username().to_string(),
            display_name,
        })
    }
}

#[async_trait]
impl IdentityGateway for CognitoIdentityGateway {
    async fn current_user(&self) -> Result<Option<Player>, AuthError> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };
        match self.fetch_user(&token).await {
            Ok(player) => Ok(Some(player)),
            Err(err)
                if err
                    .as_service_error()
                    .map_or(false, |e| e.is_not_authorized_exception()) =>
            {
                // Access token expired; renew once, then give up on the
                // stored session rather than erroring the caller out.
                self.refresh().await?;
                let Some(token) = self.access_token() else {
                    return Ok(None);
                };
                match self.fetch_user(&token).await {
                    Ok(player) => Ok(Some(player)),
                    Err(err) => {
                        debug!(error = %DisplayErrorContext(err), "stored session is no longer valid");
                        *self.tokens.lock() = None;
                        Ok(None)
                    }
                }
            }
            Err(err) => Err(AuthError::Provider(DisplayErrorContext(err).to_string())),
        }
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let refresh_token = self
            .tokens
            .lock()
            .as_ref()
            .and_then(|t| t.refresh_token.clone());
        let Some(refresh_token) = refresh_token else {
            return Ok(());
        };
        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .client_id(&self.client_id)
            .auth_parameters("REFRESH_TOKEN", refresh_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(DisplayErrorContext(e).to_string()))?;
        let access_token = response
            .authentication_result()
            .and_then(|result| result.access_token())
            .ok_or_else(|| AuthError::Provider("token refresh produced no credentials".into()))?
            .to_string();
        if let Some(tokens) = self.tokens.lock().as_mut() {
            tokens.access_token = access_token;
        }
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Player, AuthError> {
        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|err| {
                let service = err.into_service_error();
                if service.is_user_not_confirmed_exception() {
                    AuthError::NotConfirmed
                } else {
                    AuthError::Provider(service.to_string())
                }
            })?;
        let result = response
            .authentication_result()
            .ok_or_else(|| AuthError::Provider("login produced no credentials".into()))?;
        let access_token = result
            .access_token()
            .ok_or_else(|| AuthError::Provider("login produced no access token".into()))?
            .to_string();
        *self.tokens.lock() = Some(TokenSet {
            access_token: access_token.clone(),
            refresh_token: result.refresh_token().map(str::to_string),
        });
        self.fetch_user(&access_token)
            .await
            .map_err(|e| AuthError::Provider(DisplayErrorContext(e).to_string()))
    }

    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        let player_name = AttributeType::builder()
            .name(PLAYER_NAME_ATTRIBUTE)
            .value(display_name)
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.client
            .sign_up()
            .client_id(&self.client_id)
            .username(username)
            .password(password)
            .user_attributes(player_name)
            .send()
            .await
            .map_err(|e| AuthError::Provider(DisplayErrorContext(e).to_string()))?;
        Ok(())
    }

    async fn confirm(&self, username: &str, code: &str) -> Result<(), AuthError> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(username)
            .confirmation_code(code)
            .send()
            .await
            .map_err(|e| AuthError::Provider(DisplayErrorContext(e).to_string()))?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        // The local session is cleared even when the remote sign-out fails.
        let tokens = self.tokens.lock().take();
        if let Some(tokens) = tokens {
            if let Err(err) = self
                .client
                .global_sign_out()
                .access_token(tokens.access_token)
                .send()
                .await
            {
                debug!(error = %DisplayErrorContext(err), "remote sign-out failed");
            }
        }
        Ok(())
    }
}
