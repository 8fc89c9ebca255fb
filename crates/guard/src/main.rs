//! pageguard - audit and exercise request policy for a page.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use guard_security::{ResourceDescriptor, SourceMatching};
use http::Method;
use networking::{LegacyRequest, OutboundCall};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use common::GuardError;
use url::Url;

use pageguard::{GuardConfig, Page};

/// pageguard - client-side request policy enforcement
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Declared policy for the page (overrides the config file)
    #[arg(long, global = true)]
    policy: Option<String>,

    /// How allow-list tokens are matched
    #[arg(long, value_enum, global = true)]
    matching: Option<Matching>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide request targets for a page without touching the network
    Audit {
        /// Page URL the targets are resolved against
        page: String,

        /// Request targets (absolute URLs or relative paths)
        #[arg(required = true)]
        targets: Vec<String>,

        /// Print decisions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Perform a request from a page through the guard
    Fetch {
        /// Page URL
        page: String,

        /// Request target
        target: String,

        /// Use the legacy request primitive (transport-identity monitored, not gated)
        #[arg(long)]
        legacy: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Matching {
    Literal,
    Keywords,
}

impl From<Matching> for SourceMatching {
    fn from(matching: Matching) -> Self {
        match matching {
            Matching::Literal => SourceMatching::Literal,
            Matching::Keywords => SourceMatching::Keywords,
        }
    }
}

fn load_config(args: &Args) -> Result<GuardConfig> {
    let mut config = match &args.config {
        Some(path) => GuardConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path))?,
        None => GuardConfig::default(),
    };

    if let Some(policy) = &args.policy {
        config = config.with_declared_policy(policy);
    }
    if let Some(matching) = args.matching {
        config = config.with_source_matching(matching.into());
    }
    Ok(config)
}

fn audit(page: &Page, targets: &[String], json: bool) -> Result<()> {
    let guard = page.install_http()?;
    let gate = guard.gate();

    let mut rows = Vec::with_capacity(targets.len());
    for target in targets {
        let assessment = gate.assess(ResourceDescriptor::Text(target), None);
        let href = assessment.target.as_ref().map(|t| t.href().to_string());
        rows.push((target, href, assessment.decision));
    }

    if json {
        let report: Vec<_> = rows
            .iter()
            .map(|(target, href, decision)| {
                serde_json::json!({
                    "target": target,
                    "resolved": href,
                    "decision": decision,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("policy: {}", guard.policy().policy());
        for (target, href, decision) in &rows {
            let resolved = href.as_deref().unwrap_or("-");
            println!("{:<16} {} -> {}", decision.as_str(), target, resolved);
        }
    }
    Ok(())
}

async fn fetch(page: &Page, target: &str, legacy: bool) -> Result<()> {
    let guard = page.install_http()?;

    if legacy {
        let url = page.url().join(target)?;
        let mut request = LegacyRequest::new(Method::GET, url);
        guard.send_legacy(&mut request, None).await?;
        println!(
            "{} {}",
            request.status().map(|s| s.as_u16()).unwrap_or_default(),
            request.response_url()
        );
        return Ok(());
    }

    match guard.fetch(&OutboundCall::get(target)).await {
        Ok(response) => {
            println!(
                "{} {} ({} bytes)",
                response.status().as_u16(),
                response.url(),
                response.bytes().len()
            );
            Ok(())
        }
        Err(err) if err.is_blocked() => Err(GuardError::policy(err.to_string()).into()),
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("pageguard v{}", pageguard::VERSION);

    let config = load_config(&args)?;

    match &args.command {
        Command::Audit { page, targets, json } => {
            let page = Page::new(Url::parse(page)?, Default::default(), config);
            audit(&page, targets, *json)
        }
        Command::Fetch { page, target, legacy } => {
            let page = Page::new(Url::parse(page)?, Default::default(), config);
            fetch(&page, target, *legacy).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_audit() {
        let args = Args::parse_from([
            "pageguard",
            "audit",
            "https://example.com/app/",
            "./api",
            "http://example.com/",
        ]);
        match args.command {
            Command::Audit { page, targets, json } => {
                assert_eq!(page, "https://example.com/app/");
                assert_eq!(targets, vec!["./api", "http://example.com/"]);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!args.verbose);
    }

    #[test]
    fn test_audit_requires_targets() {
        assert!(Args::try_parse_from(["pageguard", "audit", "https://example.com/"]).is_err());
    }

    #[test]
    fn test_args_fetch_legacy() {
        let args = Args::parse_from([
            "pageguard",
            "fetch",
            "--legacy",
            "https://example.com/",
            "/data",
        ]);
        assert!(matches!(args.command, Command::Fetch { legacy: true, .. }));
    }

    #[test]
    fn test_global_overrides() {
        let args = Args::parse_from([
            "pageguard",
            "-v",
            "--policy",
            "connect-src https://api.example.com",
            "--matching",
            "keywords",
            "audit",
            "https://example.com/",
            "https://api.example.com/x",
        ]);
        let config = load_config(&args).unwrap();

        assert!(args.verbose);
        assert_eq!(config.declared_policy.as_deref(), Some("connect-src https://api.example.com"));
        assert_eq!(config.source_matching, SourceMatching::Keywords);
    }

    #[test]
    fn test_audit_offline() {
        let config = GuardConfig::default().with_declared_policy("connect-src https://api.example.com");
        let page = Page::parse("https://example.com/app/", config).unwrap();
        let targets = vec!["https://api.example.com/v1".to_string(), "./local".to_string()];

        assert!(audit(&page, &targets, true).is_ok());
    }
}
