//! Static API key gate, the alternative to JWT sessions for resource routes

use crate::{config::AppConfig, error::AppError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Holds only the SHA-256 digest of the configured key
pub struct ApiKeyVerifier {
    expected: [u8; 32],
}

impl ApiKeyVerifier {
    pub fn new(key: &str) -> Result<Self, AppError> {
        if key.is_empty() {
            return Err(AppError::Config("API key is not set".to_string()));
        }

        Ok(Self {
            expected: Self::digest(key),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let key = config
            .security
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::Config("API key is not set".to_string()))?;

        Self::new(key.expose_secret())
    }

    /// Compare digests in constant time so the key length and prefix don't leak
    pub fn matches(&self, candidate: &str) -> bool {
        let actual = Self::digest(candidate);

        self.expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    fn digest(key: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.finalize().into()
    }
}

/// Read the key from `X-API-Key`, falling back to `Authorization: Bearer <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, AppError> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        return value
            .to_str()
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MalformedCredential);
    }

    match headers.get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => value
            .to_str()
            .ok()
            .and_then(|s| s.strip_prefix("Bearer "))
            .ok_or(AppError::MalformedCredential),
        _ => Err(AppError::MissingCredential),
    }
}

/// API key middleware
pub async fn api_key_middleware(
    State(verifier): State<Arc<ApiKeyVerifier>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = extract_api_key(req.headers())?;

    if !verifier.matches(provided) {
        tracing::warn!(uri = %req.uri().path(), "Invalid API key");
        return Err(AppError::InvalidApiKey);
    }

    tracing::debug!("API key validated");
    Ok(next.run(req).await)
}
