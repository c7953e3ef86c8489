use anyhow::{anyhow, Result};

/// Validation utilities for chat input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate and trim a chat message, returning the text to send
    pub fn validate_message_text(text: &str, max_len: usize) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Message cannot be empty"));
        }

        if trimmed.chars().count() > max_len {
            return Err(anyhow!("Message too long (max {max_len} characters)"));
        }

        if trimmed.contains('\0') {
            return Err(anyhow!("Message contains invalid characters"));
        }

        Ok(trimmed.to_string())
    }

    /// Validate a reply endpoint URL
    pub fn validate_endpoint(url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(anyhow!("Endpoint URL cannot be empty"));
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!("Endpoint URL must start with http:// or https://"));
        }

        if url.len() > 2048 {
            return Err(anyhow!("Endpoint URL too long (max 2048 characters)"));
        }

        Ok(())
    }

    /// Validate a plan id typed on the paywall
    pub fn validate_plan_id(plan_id: &str) -> Result<()> {
        if plan_id.trim().is_empty() {
            return Err(anyhow!("Plan id cannot be empty"));
        }

        if !plan_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(anyhow!("Plan id contains invalid characters"));
        }

        Ok(())
    }
}
