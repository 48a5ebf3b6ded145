use reqwest::Method;
use serde_json::Value;

use cadence_types::api::{
    ChangePasswordRequest, EmailRequest, LoginResponse, MessageResponse, OtpRequest,
    RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
};

use crate::client::{ApiClient, enc};
use crate::error::ApiError;

// -- Users --

impl ApiClient {
    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.post("/api/users/register", req).await.map(ack)
    }

    /// First login step: the server mails a one-time code.
    pub async fn request_otp(&self, username: &str, password: &str) -> Result<MessageResponse, ApiError> {
        let req = OtpRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/api/users/login/request-otp", &req).await.map(ack)
    }

    pub async fn verify_otp(&self, username: &str, otp: &str) -> Result<LoginResponse, ApiError> {
        let req = VerifyOtpRequest {
            username: username.to_string(),
            otp: otp.to_string(),
        };
        self.post("/api/users/login/verify-otp", &req).await
    }

    pub async fn change_password(&self, req: &ChangePasswordRequest) -> Result<MessageResponse, ApiError> {
        self.post("/api/users/password/change", req).await.map(ack)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let req = EmailRequest {
            email: email.to_string(),
        };
        self.post("/api/users/password/reset/request", &req).await.map(ack)
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse, ApiError> {
        let req = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/api/users/password/reset", &req).await.map(ack)
    }

    /// `token` is the already-decoded value from the link.
    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError> {
        self.get(&format!("/api/users/verify-email?token={}", enc(token)))
            .await
            .map(ack)
    }

    pub async fn request_magic_link(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let req = EmailRequest {
            email: email.to_string(),
        };
        self.post("/api/users/recover/request", &req).await.map(ack)
    }

    pub async fn verify_magic_link(&self, token: &str) -> Result<LoginResponse, ApiError> {
        self.get(&format!("/api/users/recover/verify?token={}", enc(token))).await
    }

    /// Server-side logout notice. The session is cleared by the caller
    /// whatever this returns.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.call(Method::POST, "/api/users/logout").await
    }
}

/// Acknowledgements are informational; a body that does not fit is not an
/// error.
fn ack(value: Value) -> MessageResponse {
    serde_json::from_value(value).unwrap_or_default()
}
