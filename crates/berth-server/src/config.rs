use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::FixedOffset;

/// Moscow time, the zone the service has always stamped rows in.
const DEFAULT_TIMEZONE: &str = "+03:00";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub timezone: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("BERTH_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = get("BERTH_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("BERTH_PORT must be a port number")?;
        let db_path = get("BERTH_DB_PATH").unwrap_or_else(|| "berth.db".into()).into();
        let timezone = parse_utc_offset(
            &get("BERTH_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.into()),
        )?;

        Ok(Self {
            host,
            port,
            db_path,
            timezone,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// `+HH:MM`, `-HH:MM`, `+HH`, or `UTC`/`Z`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw == "Z" || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("UTC offset out of range"));
    }

    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        bail!("UTC offset '{raw}' must start with '+' or '-'");
    };

    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours
        .parse()
        .with_context(|| format!("bad hours in UTC offset '{raw}'"))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("bad minutes in UTC offset '{raw}'"))?;
    if !(0..60).contains(&minutes) {
        bail!("bad minutes in UTC offset '{raw}'");
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("UTC offset '{raw}' out of range"))
}
