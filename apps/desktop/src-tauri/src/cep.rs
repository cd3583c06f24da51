//! # CEP Lookup
//!
//! Fills address fields from a Brazilian postal code using ViaCEP.
//!
//! ## Request Flow
//! ```text
//! "01001-000" ──only_digits──► "01001000"
//!                                  │
//!                                  ▼
//!            GET {base}/01001000/json/
//!                                  │
//!             ┌────────────────────┼─────────────────────┐
//!             ▼                    ▼                     ▼
//!      200 + address        200 + {"erro": true}     non-2xx / timeout
//!      Ok(Some(Endereco))   Ok(None)                 Err(CepError)
//! ```

use std::time::Duration;

use avelar_core::validation::only_digits;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CepError {
    #[error("CEP inválido: {0}")]
    InvalidCep(String),

    #[error("Falha na requisição de CEP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serviço de CEP respondeu com status {0}")]
    Status(u16),

    #[error("Resposta de CEP inválida: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Address returned by the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endereco {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
}

impl Endereco {
    /// Single line for the supplier `endereco` field.
    pub fn linha(&self) -> String {
        [self.logradouro.as_str(), self.bairro.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// ViaCEP HTTP client.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CepError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ViaCepClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lookup URL for a CEP with 8 digits.
    pub fn url_for(&self, digits: &str) -> String {
        format!("{}/{}/json/", self.base_url, digits)
    }

    /// Looks up a CEP. Punctuation is stripped before the request.
    ///
    /// # Errors
    /// - `InvalidCep` when the input does not hold exactly 8 digits
    /// - `Status` for a non-success HTTP status
    /// - `Http` for transport failures and timeouts
    pub async fn lookup(&self, cep: &str) -> Result<Option<Endereco>, CepError> {
        let digits = only_digits(cep);
        if digits.len() != 8 {
            return Err(CepError::InvalidCep(cep.to_string()));
        }

        let url = self.url_for(&digits);
        debug!(url = %url, "CEP lookup");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CepError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_resposta(&body)
    }
}

/// Parses a ViaCEP body. `{"erro": true}` (or `"true"`) means unknown CEP.
pub fn parse_resposta(body: &str) -> Result<Option<Endereco>, CepError> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    let erro = match value.get("erro") {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "true",
        _ => false,
    };
    if erro {
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}
