//! # CEP Commands

use avelar_core::cep_pronto_para_busca;
use tracing::debug;

use crate::cep::{Endereco, ViaCepClient};
use crate::error::ApiResult;

/// Looks up an address while the user types a CEP.
///
/// Nothing is requested until the masked field is complete
/// (`00000-000`); an incomplete value or an unknown CEP gives `None`.
pub async fn buscar_cep(client: &ViaCepClient, cep: &str) -> ApiResult<Option<Endereco>> {
    if !cep_pronto_para_busca(cep) {
        debug!(cep = %cep, "CEP incomplete, skipping lookup");
        return Ok(None);
    }
    Ok(client.lookup(cep).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_incomplete_cep_skips_lookup() {
        let client = ViaCepClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(buscar_cep(&client, "01001").await.unwrap(), None);
        assert_eq!(buscar_cep(&client, "01001000").await.unwrap(), None);
    }
}
