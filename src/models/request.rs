use serde::{Deserialize, Serialize};

/// Body of `POST /api/lilly/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `POST /api/lilly/enrich_cve` and `/api/lilly/simplify_cve`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CveRequest {
    /// CVE identifier, e.g. `CVE-2024-3094`
    pub cve_id: String,
    /// Advisory text to enrich or simplify
    pub cve_description: String,
}

impl CveRequest {
    pub fn new(cve_id: impl Into<String>, cve_description: impl Into<String>) -> Self {
        Self {
            cve_id: cve_id.into(),
            cve_description: cve_description.into(),
        }
    }
}

/// Response of the non-streaming chat and CVE endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatAnswer {
    pub answer: String,
}

/// Response of `POST /api/lilly/clear`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClearResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ClearResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
