//! Unified error codes for the marketplace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors (users, admins, verification, password reset)
//! - 4xxx: Order errors
//! - 6xxx: Product errors (65xx: file upload)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Account ====================
    /// User not found
    UserNotFound = 3001,
    /// Admin not found
    AdminNotFound = 3002,
    /// Email already registered
    EmailAlreadyRegistered = 3003,
    /// Email not verified
    EmailNotVerified = 3004,
    /// Email already verified
    EmailAlreadyVerified = 3005,
    /// No pending verification matches the OTP
    OtpNotFound = 3006,
    /// OTP matches more than one pending account
    OtpAmbiguous = 3007,
    /// Password too short
    PasswordTooShort = 3008,
    /// Reset token unknown or already used
    ResetTokenInvalid = 3009,
    /// Reset token past its expiry
    ResetTokenExpired = 3010,
    /// Admin self-registration is disabled
    AdminRegistrationDisabled = 3011,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// A live order already exists for this user and product
    LiveOrderExists = 4002,
    /// Status change not allowed from the current status
    InvalidOrderTransition = 4003,
    /// Unknown order status
    InvalidOrderStatus = 4004,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price range
    ProductInvalidPrice = 6002,
    /// Product category is not one of the known categories
    ProductInvalidCategory = 6003,
    /// Product already in favourites
    AlreadyFavourite = 6101,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// No filename provided
    NoFilename = 6506,
    /// Invalid file extension
    InvalidFileExtension = 6507,
    /// File storage failed
    FileStorageFailed = 6509,
    /// Too many files in one request
    TooManyFiles = 6510,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Please login first",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::AdminNotFound => "Admin not found",
            ErrorCode::EmailAlreadyRegistered => "Email already registered",
            ErrorCode::EmailNotVerified => "Email not verified",
            ErrorCode::EmailAlreadyVerified => "Email already verified",
            ErrorCode::OtpNotFound => "Invalid OTP",
            ErrorCode::OtpAmbiguous => "OTP is ambiguous, provide the email as well",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",
            ErrorCode::ResetTokenInvalid => "Invalid or already used reset token",
            ErrorCode::ResetTokenExpired => "Reset token has expired",
            ErrorCode::AdminRegistrationDisabled => "Admin registration is disabled",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::LiveOrderExists => "Order already placed",
            ErrorCode::InvalidOrderTransition => "Order status change not allowed",
            ErrorCode::InvalidOrderStatus => "Unknown order status",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price range",
            ErrorCode::ProductInvalidCategory => "Unknown product category",
            ErrorCode::AlreadyFavourite => "Product already in favourites",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::InvalidFileExtension => "Invalid file extension",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::TooManyFiles => "Too many files",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Account
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::AdminNotFound),
            3003 => Ok(ErrorCode::EmailAlreadyRegistered),
            3004 => Ok(ErrorCode::EmailNotVerified),
            3005 => Ok(ErrorCode::EmailAlreadyVerified),
            3006 => Ok(ErrorCode::OtpNotFound),
            3007 => Ok(ErrorCode::OtpAmbiguous),
            3008 => Ok(ErrorCode::PasswordTooShort),
            3009 => Ok(ErrorCode::ResetTokenInvalid),
            3010 => Ok(ErrorCode::ResetTokenExpired),
            3011 => Ok(ErrorCode::AdminRegistrationDisabled),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::LiveOrderExists),
            4003 => Ok(ErrorCode::InvalidOrderTransition),
            4004 => Ok(ErrorCode::InvalidOrderStatus),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::ProductInvalidCategory),
            6101 => Ok(ErrorCode::AlreadyFavourite),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6506 => Ok(ErrorCode::NoFilename),
            6507 => Ok(ErrorCode::InvalidFileExtension),
            6509 => Ok(ErrorCode::FileStorageFailed),
            6510 => Ok(ErrorCode::TooManyFiles),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
