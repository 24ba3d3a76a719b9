use std::net::SocketAddr;

use anyhow::{Context, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub supabase_url: String,
    pub supabase_key: String,
    pub gemini_key: Option<String>,
    pub openrouter_key: Option<String>,
    pub gnews_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &str| match var(name) {
            Some(v) => Ok(v),
            None => bail!("{name} must be set"),
        };

        let port = match var("AGRIHUB_PORT") {
            Some(p) => p.parse().with_context(|| format!("AGRIHUB_PORT={p} is not a port"))?,
            None => 3000,
        };

        Ok(Self {
            host: var("AGRIHUB_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            supabase_url: required("SUPABASE_URL")?,
            supabase_key: required("SUPABASE_ANON_KEY")?,
            gemini_key: var("GEMINI_API_KEY"),
            openrouter_key: var("OPENROUTER_API_KEY"),
            gnews_key: var("GNEWS_API_KEY"),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().with_context(|| format!("invalid listen address {addr}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_and_keys_are_optional() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("GEMINI_API_KEY", "  "),
        ]))
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.gemini_key, None);
        assert_eq!(config.addr().unwrap().port(), 3000);
    }

    #[test]
    fn backend_settings_are_required() {
        let err = Config::from_lookup(lookup(&[("SUPABASE_URL", "https://abc.supabase.co")])).unwrap_err();
        assert_eq!(err.to_string(), "SUPABASE_ANON_KEY must be set");
    }

    #[test]
    fn bad_port_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("AGRIHUB_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("AGRIHUB_PORT=eighty"));
    }
}
