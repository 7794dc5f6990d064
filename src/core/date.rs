//! Calendar-day keys
//!
//! A resolution works with two renderings of "today", both taken from one
//! instant:
//! - `date_key`: the UTC calendar date as `YYYY-MM-DD`, keying the shared store
//! - `freshness_tag`: the device-local date in the user's locale style,
//!   tagging the local cache entry
//!
//! The two can name different days near midnight.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};

/// How the local freshness tag is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateStyle {
    /// 19/10/2026
    #[default]
    PtBr,
    /// 10/19/2026
    EnUs,
    /// 2026-10-19
    Iso,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateStyle::PtBr => "%d/%m/%Y",
            DateStyle::EnUs => "%-m/%-d/%Y",
            DateStyle::Iso => "%Y-%m-%d",
        }
    }

    /// Pick a style from a locale identifier such as `pt-BR` or `en_US.UTF-8`
    pub fn from_locale(locale: &str) -> Self {
        let lang = locale.split('.').next().unwrap_or(locale).replace('_', "-");
        let lower = lang.to_lowercase();
        if lower.starts_with("pt") {
            DateStyle::PtBr
        } else if lower == "en-us" || lower == "en" {
            DateStyle::EnUs
        } else {
            DateStyle::Iso
        }
    }

    /// Style for the current system locale
    pub fn detect() -> Self {
        sys_locale::get_locale()
            .map(|l| Self::from_locale(&l))
            .unwrap_or_default()
    }
}

impl std::str::FromStr for DateStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pt-br" | "pt" => Ok(DateStyle::PtBr),
            "en-us" | "en" => Ok(DateStyle::EnUs),
            "iso" => Ok(DateStyle::Iso),
            "auto" => Ok(DateStyle::detect()),
            _ => Err(format!("Unknown date style: {}", s)),
        }
    }
}

impl std::fmt::Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DateStyle::PtBr => "pt-BR",
            DateStyle::EnUs => "en-US",
            DateStyle::Iso => "iso",
        };
        f.write_str(name)
    }
}

/// Both renderings of the current calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Today {
    pub date_key: String,
    pub freshness_tag: String,
}

impl Today {
    /// Compute both keys from a single device-local instant
    pub fn at(instant: DateTime<FixedOffset>, style: DateStyle) -> Self {
        Self {
            date_key: instant.with_timezone(&Utc).format("%Y-%m-%d").to_string(),
            freshness_tag: instant.date_naive().format(style.pattern()).to_string(),
        }
    }
}

/// Source of "now" for a resolution
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the device's time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
