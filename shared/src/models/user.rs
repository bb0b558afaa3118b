//! User Model

use serde::{Deserialize, Serialize};

/// Profile returned to the owning user (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_verified: bool,
    pub created_at: i64,
}

/// User summary embedded in the login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub name: String,
    pub email: String,
    pub created_at: i64,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: String,
}

/// OTP verification payload
///
/// `email` is optional for older clients; without it the OTP alone must
/// identify exactly one pending account.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: Option<String>,
    pub otp: OtpValue,
}

/// OTP as sent by clients: either a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OtpValue {
    Number(i64),
    Text(String),
}

impl OtpValue {
    /// Numeric value, if the input is a valid number
    pub fn as_code(&self) -> Option<i64> {
        match self {
            OtpValue::Number(n) => Some(*n),
            OtpValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Login payload (users and admins)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Resend OTP payload
#[derive(Debug, Clone, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// Forgot-password payload
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password payload (token travels in the path)
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Profile update wrapper, `{ "userInput": { ... } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_input: ProfileUpdate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Authenticated password change payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_accepts_number_or_string() {
        let req: VerifyOtpRequest = serde_json::from_str(r#"{"otp": 123456}"#).unwrap();
        assert_eq!(req.otp.as_code(), Some(123456));
        assert!(req.email.is_none());

        let req: VerifyOtpRequest =
            serde_json::from_str(r#"{"email": "a@x.com", "otp": " 654321 "}"#).unwrap();
        assert_eq!(req.otp.as_code(), Some(654321));
        assert_eq!(req.email.as_deref(), Some("a@x.com"));

        let req: VerifyOtpRequest = serde_json::from_str(r#"{"otp": "abc"}"#).unwrap();
        assert_eq!(req.otp.as_code(), None);
    }

    #[test]
    fn update_user_wrapper() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"userInput": {"name": "Asha", "phone": "99"}}"#).unwrap();
        assert_eq!(req.user_input.name, "Asha");
        assert_eq!(req.user_input.phone.as_deref(), Some("99"));
        assert!(req.user_input.address.is_none());
    }

    #[test]
    fn change_password_camel_case() {
        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"oldPassword": "a", "newPassword": "b"}"#).unwrap();
        assert_eq!(req.old_password, "a");
        assert_eq!(req.new_password, "b");
    }
}
