use super::api_client::ApiClient;
use crate::error::ApiError;
use crate::signup::{CompleteSignupRequest, SignupApi};
use async_trait::async_trait;
use serde_json::{json, Value};

#[async_trait]
impl SignupApi for ApiClient {
    async fn send_otp(&self, email: &str) -> Result<(), ApiError> {
        let _: Value = self
            .post("/auth/send-otp/", &json!({ "email": email }), None)
            .await?;
        Ok(())
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ApiError> {
        let _: Value = self
            .post(
                "/auth/verify-otp/",
                &json!({ "email": email, "otp": otp }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn complete_signup(&self, request: &CompleteSignupRequest) -> Result<(), ApiError> {
        let _: Value = self.post("/auth/complete-signup/", request, None).await?;
        Ok(())
    }
}
