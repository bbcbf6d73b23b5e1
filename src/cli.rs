use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::{Config, ConfigError};
use crate::context::{self, StaticContext};
use crate::ident::LocaleId;
use crate::metadata::NameMode;
use crate::registry::{Localizer, Session};

/// Priority assigned to the first `--source` directory; command-line
/// sources always outrank configured ones.
const CLI_SOURCE_PRIORITY: i32 = 1_000;

#[derive(Parser)]
#[command(name = "ulm", version, about = "Universal locale and translation manager")]
pub struct Cli {
    /// Additional translation source directory (repeatable, outranks
    /// configured sources)
    #[arg(short, long, value_name = "DIR")]
    pub source: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List discovered locales with codes, direction and coverage
    Locales,

    /// Resolve a translation key
    Translate {
        /// Translation key
        key: String,
        /// Locale to translate in (default: resolved current locale)
        #[arg(short, long)]
        locale: Option<String>,
        /// Plural count
        #[arg(short, long)]
        count: Option<i64>,
        /// Substitution parameters
        #[arg(value_name = "NAME=VALUE")]
        params: Vec<String>,
    },

    /// Report translation coverage against a reference locale
    Check {
        /// Reference locale (default: primary locale)
        #[arg(short, long)]
        reference: Option<String>,
        /// Coverage threshold
        #[arg(short, long, default_value_t = 0.9)]
        threshold: f64,
    },
}

impl Cli {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config = match Config::load() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Config::default(),
            Err(e) => return Err(e.into()),
        };

        let engine = Localizer::new();
        for entry in &config.sources {
            engine.register_source(&entry.path, entry.priority);
        }
        for (index, dir) in self.source.iter().enumerate() {
            engine.register_source(dir, CLI_SOURCE_PRIORITY + index as i32);
        }

        // every discovered locale is selectable from the command line
        let supported: Vec<String> = engine
            .available_locales()
            .iter()
            .map(|locale| locale.to_string())
            .collect();
        let ctx = StaticContext {
            client_locale: context::system_locale().map(|locale| locale.to_string()),
            primary_locale: config.primary_locale.clone(),
            supported_locales: supported,
            ..Default::default()
        };
        let session = engine.session(Arc::new(ctx));

        match &self.command {
            Commands::Locales => self.run_locales(&engine, &session)?,
            Commands::Translate {
                key,
                locale,
                count,
                params,
            } => self.run_translate(&session, key, locale.as_deref(), *count, params)?,
            Commands::Check {
                reference,
                threshold,
            } => self.run_check(&engine, &session, reference.as_deref(), *threshold)?,
        }

        Ok(())
    }

    fn run_locales(
        &self,
        engine: &Localizer,
        session: &Session,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let locales = engine.available_locales();
        if locales.is_empty() {
            println!("No locales discovered; register a source with --source");
            return Ok(());
        }

        let primary = session.primary_locale();
        for locale in locales {
            let Some(meta) = engine.metadata(&locale.to_string()) else {
                continue;
            };
            let name = meta.display_name(None, true, NameMode::With)?;
            let alpha3 = meta.iso_alpha3().unwrap_or("---");
            let direction = if meta.is_rtl() { "rtl" } else { "ltr" };
            let ratio = meta.completeness_ratio(Some(&primary))?;
            println!(
                " - {:<12} {}  {}  {:>5.1}%  {}",
                locale.to_string(),
                alpha3,
                direction,
                ratio * 100.0,
                name
            );
        }
        Ok(())
    }

    fn run_translate(
        &self,
        session: &Session,
        key: &str,
        locale: Option<&str>,
        count: Option<i64>,
        raw_params: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = parse_params(raw_params);
        let params: Vec<(&str, String)> = parsed
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();

        if let Some(candidate) = locale {
            session.set_locale(candidate);
        }
        let text = match count {
            Some(count) => session.translate_plural(key, count, &params)?,
            None => session.translate(key, &params)?,
        };
        println!("{text}");
        Ok(())
    }

    fn run_check(
        &self,
        engine: &Localizer,
        session: &Session,
        reference: Option<&str>,
        threshold: f64,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let reference = match reference {
            Some(raw) => match raw.parse::<LocaleId>() {
                Ok(locale) => locale,
                Err(_) => {
                    error!(raw, "invalid reference locale");
                    return Ok(());
                }
            },
            None => session.primary_locale(),
        };

        let report = engine.completeness_report(&reference)?;
        println!("Coverage against {reference}:");
        for entry in report {
            let verdict = if entry.ratio >= threshold {
                "ok"
            } else {
                "incomplete"
            };
            println!(
                " - {:<12} {:>5.1}%  missing {:<4} {}",
                entry.locale.to_string(),
                entry.ratio * 100.0,
                entry.missing,
                verdict
            );
        }
        Ok(())
    }
}

fn parse_params(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|pair| match pair.split_once('=') {
            Some((name, value)) => Some((name.to_string(), value.to_string())),
            None => {
                warn!(pair = %pair, "ignoring parameter without '='");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_splits_on_first_equals() {
        let raw = vec!["name=Ada".to_string(), "eq=a=b".to_string(), "bad".to_string()];
        let parsed = parse_params(&raw);
        assert_eq!(
            parsed,
            vec![
                ("name".to_string(), "Ada".to_string()),
                ("eq".to_string(), "a=b".to_string()),
            ]
        );
    }
}
