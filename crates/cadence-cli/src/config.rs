use std::path::PathBuf;

use anyhow::bail;

use cadence_api::client::DEFAULT_BASE_URL;
use cadence_codec::ObfuscationCodec;

pub const DEFAULT_STORE_PATH: &str = "cadence-session.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub store_path: PathBuf,
    /// `None` keeps the codec's built-in key.
    pub obfuscation_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("CADENCE_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            bail!("CADENCE_API_URL must be an http(s) URL, got {api_url:?}");
        }
        let store_path: PathBuf = lookup("CADENCE_STORE_PATH")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.into())
            .into();
        let obfuscation_key = lookup("CADENCE_OBFUSCATION_KEY").filter(|k| !k.is_empty());

        Ok(Self {
            api_url,
            store_path,
            obfuscation_key,
        })
    }

    pub fn codec(&self) -> ObfuscationCodec {
        match &self.obfuscation_key {
            Some(key) => ObfuscationCodec::new(key),
            None => ObfuscationCodec::default(),
        }
    }
}
