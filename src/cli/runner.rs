//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::server::{serve, ServerConfig};
use crate::config::AppConfig;
use crate::engine::{FinishReason, Pipeline};
use crate::error::Result;
use crate::stream::FilterStage;
use crate::types::Record;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let mut config = self.load_config()?;

        match &self.cli.command {
            Commands::Serve { port, host } => {
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(host) = host {
                    config.server.host.clone_from(host);
                }
                config.validate()?;

                let server = ServerConfig::from_app_config(&config)?;
                serve(server, &config.server.host, config.server.port).await
            }
            Commands::Fetch { limit, format } => {
                config.validate()?;
                self.fetch(&config, *limit, *format).await
            }
        }
    }

    /// Load the config file, if any, and apply global overrides
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.cli.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.upstream.base_url.clone_from(base_url);
        }
        if let Some(min_abv) = self.cli.min_abv {
            config.filter.min_abv = min_abv;
        }

        tracing::debug!("Resolved config: {:?}", config);
        Ok(config)
    }

    /// Run one subscription and print each match
    async fn fetch(
        &self,
        config: &AppConfig,
        limit: Option<u64>,
        format: OutputFormat,
    ) -> Result<()> {
        let fetcher = Arc::new(config.upstream.build_fetcher()?);
        let mut pipeline = Pipeline::new(fetcher, FilterStage::abv_above(config.filter.min_abv));
        if let Some(limit) = limit {
            pipeline = pipeline.with_limit(limit);
        }

        let token = CancellationToken::new();
        let ctrl_c = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.cancel();
            }
        });

        let mut subscription = pipeline.subscribe(token);
        let mut collected: Vec<Record> = Vec::new();

        while let Some(record) = subscription.next().await {
            let record = record?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&record)?),
                OutputFormat::Pretty => collected.push(record),
            }
        }

        if format == OutputFormat::Pretty {
            println!("{}", serde_json::to_string_pretty(&collected)?);
        }

        let stats = subscription.stats();
        if subscription.finish_reason() == Some(FinishReason::Cancelled) {
            tracing::warn!("Interrupted after {} matching records", stats.records_matched);
        }
        eprintln!(
            "Fetched {} pages, {} of {} records matched",
            stats.pages_fetched, stats.records_matched, stats.records_seen
        );

        Ok(())
    }
}
