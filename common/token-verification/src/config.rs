/// Placeholder substituted with the tenant identifier in issuer templates.
pub const TENANT_PLACEHOLDER: &str = "{tenant}";

/// Issuer convention the provider stamps into access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IssuerTemplate {
    /// `https://sts.windows.net/{tenant}/`, used by v1.0 access tokens.
    #[default]
    Legacy,
    /// `https://login.microsoftonline.com/{tenant}/v2.0`, used by v2.0 access tokens.
    V2,
    /// Arbitrary template; every `{tenant}` is replaced by the tenant id.
    Custom(String),
}

impl IssuerTemplate {
    pub fn issuer_for(&self, tenant_id: &str) -> String {
        match self {
            IssuerTemplate::Legacy => format!("https://sts.windows.net/{tenant_id}/"),
            IssuerTemplate::V2 => format!("https://login.microsoftonline.com/{tenant_id}/v2.0"),
            IssuerTemplate::Custom(template) => template.replace(TENANT_PLACEHOLDER, tenant_id),
        }
    }

    /// Accepts `legacy`/`v1`, `v2`, or a literal template.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "legacy" | "v1" => IssuerTemplate::Legacy,
            "v2" => IssuerTemplate::V2,
            _ => IssuerTemplate::Custom(trimmed.to_string()),
        }
    }
}

/// Which `aud` representations are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudienceShape {
    /// A single string or a list of strings.
    #[default]
    Any,
    /// Only the single string form.
    Single,
    /// Only the list form.
    List,
}

impl AudienceShape {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(AudienceShape::Any),
            "single" | "string" => Some(AudienceShape::Single),
            "list" | "array" => Some(AudienceShape::List),
            _ => None,
        }
    }
}

/// Runtime configuration for access token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Expected audience claim (aud).
    pub client_id: String,
    /// Tenant whose keys and issuer namespace are trusted.
    pub tenant_id: String,
    pub issuer_template: IssuerTemplate,
    pub audience_shape: AudienceShape,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl VerifierConfig {
    /// Construct config with the legacy issuer, either audience shape, and no leeway.
    pub fn new(client_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            tenant_id: tenant_id.into(),
            issuer_template: IssuerTemplate::default(),
            audience_shape: AudienceShape::default(),
            leeway_seconds: 0,
        }
    }

    pub fn with_issuer_template(mut self, template: IssuerTemplate) -> Self {
        self.issuer_template = template;
        self
    }

    pub fn with_audience_shape(mut self, shape: AudienceShape) -> Self {
        self.audience_shape = shape;
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn expected_issuer(&self) -> String {
        self.issuer_template.issuer_for(&self.tenant_id)
    }
}
