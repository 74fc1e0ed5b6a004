use serde_json::Value;

use atlaslink_core::{is_valid_link, Converter, ExtractorConfig};

use crate::cli::ConvertArgs;
use crate::error::CliError;

pub fn run(args: &ConvertArgs) -> Result<Value, CliError> {
    let converter = Converter::builder()
        .extractor_config(ExtractorConfig {
            redirect_timeout_ms: args.timeout_ms,
            ..ExtractorConfig::from_env()?
        })
        .build()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(convert_with(&converter, &args.url))
}

/// Ungoverned conversion; a local user is never rate limited.
async fn convert_with(converter: &Converter, url: &str) -> Result<Value, CliError> {
    let url = url.trim();
    if !is_valid_link(url) {
        return Err(CliError::InvalidUrl(url.to_string()));
    }

    let conversion = converter.convert_url(url).await?;
    Ok(serde_json::to_value(conversion)?)
}
