//! Storage key constants.

/// Storage keys used by the auth layer
pub struct StorageKeys;

impl StorageKeys {
    /// Application session identifier
    pub const SESSION_ID: &'static str = "auth.session_id";

    /// User ID owning the current session
    pub const SESSION_USER_ID: &'static str = "auth.session_user_id";

    /// Last user activity (RFC 3339)
    pub const LAST_ACTIVITY_AT: &'static str = "auth.last_activity_at";

    /// Throwaway key written by the storage health probe
    pub const HEALTH_CHECK: &'static str = "__health_check__";

    /// Audit trail: last identity assertion retrieved from the host
    pub const AUDIT_ID_TOKEN: &'static str = "auth_audit.id_token";

    /// Audit trail: last host profile (JSON)
    pub const AUDIT_PROFILE: &'static str = "auth_audit.profile";

    /// Audit trail: last handshake error message
    pub const AUDIT_LAST_ERROR: &'static str = "auth_audit.last_error";

    /// Audit trail: prefix for per-step timestamps
    pub const AUDIT_STEP_PREFIX: &'static str = "auth_audit.step.";
}
