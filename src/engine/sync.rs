//! Sync runner
//!
//! Drives a full replication run: announce schemas, sync the accounts
//! parent stream, then fan out each child stream per account. Incremental
//! streams walk their day windows, advance per-account bookmarks from
//! record replication keys, and checkpoint each completed window; STATE is
//! emitted after every window so interrupted runs resume where they
//! stopped.

use crate::auth::Authenticator;
use crate::catalog::Catalog;
use crate::config::TapConfig;
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::singer::{Message, MessageWriter};
use crate::state::StateManager;
use crate::streams::{all_streams, AccountContext, TapStream};
use crate::template::{self, TemplateContext};
use crate::windows::{DateWindow, WindowPlanner};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::io::Write;
use tracing::{debug, info};

/// Counters for one sync run
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncStats {
    pub streams_synced: u32,
    pub records_emitted: u64,
    pub requests_made: u64,
}

/// Runs a replication pass over all selected streams
pub struct SyncRunner {
    config: TapConfig,
    catalog: Catalog,
    client: HttpClient,
    state: StateManager,
}

impl SyncRunner {
    /// Build a runner from config, catalog and state
    pub fn new(config: TapConfig, catalog: Option<Catalog>, state: StateManager) -> Result<Self> {
        let auth = Authenticator::new(&config.api_token);
        let mut client_config = HttpClientConfig::from_settings(config.base_url(), &config.http);
        if let Some(ref agent) = config.user_agent {
            client_config = client_config.with_user_agent(agent.clone());
        }
        let client = HttpClient::new(client_config, auth)?;

        Ok(Self {
            config,
            catalog: catalog.unwrap_or_default(),
            client,
            state,
        })
    }

    /// Run the sync, writing messages to the given sink
    pub async fn run<W: Write>(&self, writer: &mut MessageWriter<W>) -> Result<SyncStats> {
        let started = std::time::Instant::now();
        let mut stats = SyncStats::default();
        let streams = all_streams();

        // Announce every selected stream up front
        for stream in &streams {
            if self.catalog.is_selected(stream.name()) {
                writer.write(&schema_message(stream.as_ref()))?;
            }
        }

        // The accounts stream is always fetched: child streams need the
        // account contexts even when accounts itself is deselected
        let accounts_stream = &streams[0];
        let accounts_selected = self.catalog.is_selected(accounts_stream.name());

        self.state
            .set_currently_syncing(Some(accounts_stream.name()))
            .await;
        info!(stream = accounts_stream.name(), "Syncing stream");

        let records = self
            .fetch_records(accounts_stream.as_ref(), None, None, &mut stats)
            .await?;

        let mut contexts = Vec::new();
        for record in &records {
            if let Some(ctx) = AccountContext::from_record(record) {
                contexts.push(ctx);
            }
            if accounts_selected {
                writer.write(&Message::record(accounts_stream.name(), record.clone()))?;
                stats.records_emitted += 1;
            }
        }
        if accounts_selected {
            stats.streams_synced += 1;
        }
        info!(accounts = contexts.len(), "Discovered account contexts");
        self.emit_state(writer).await?;

        // Child streams, one pass per account
        for stream in &streams[1..] {
            if !self.catalog.is_selected(stream.name()) {
                debug!(stream = stream.name(), "Stream not selected, skipping");
                continue;
            }

            self.state.set_currently_syncing(Some(stream.name())).await;
            info!(stream = stream.name(), "Syncing stream");

            for account in &contexts {
                if !stream.applies_to(account) {
                    debug!(
                        stream = stream.name(),
                        account_id = %account.account_id,
                        "Skipping account"
                    );
                    continue;
                }
                self.sync_account(stream.as_ref(), account, writer, &mut stats)
                    .await?;
                self.emit_state(writer).await?;
            }
            stats.streams_synced += 1;
        }

        self.state.set_currently_syncing(None).await;
        self.emit_state(writer).await?;
        writer.flush()?;

        info!(
            streams = stats.streams_synced,
            records = stats.records_emitted,
            requests = stats.requests_made,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sync complete"
        );
        Ok(stats)
    }

    /// Sync one child stream for one account
    async fn sync_account<W: Write>(
        &self,
        stream: &dyn TapStream,
        account: &AccountContext,
        writer: &mut MessageWriter<W>,
        stats: &mut SyncStats,
    ) -> Result<()> {
        match stream.replication_key() {
            Some(replication_key) => {
                let planner =
                    WindowPlanner::new(self.config.start_date()?, self.config.lookback_days);
                let bookmark = self.bookmark_datetime(stream.name(), account).await;
                let checkpoint = self
                    .state
                    .window_checkpoint(stream.name(), &account.account_id)
                    .await
                    .and_then(|raw| parse_bookmark(&raw));
                let windows = planner.windows_resuming(bookmark, checkpoint, Utc::now());
                debug!(
                    stream = stream.name(),
                    account_id = %account.account_id,
                    windows = windows.len(),
                    resumed = checkpoint.is_some(),
                    "Planned date windows"
                );

                for window in &windows {
                    let records = self
                        .fetch_records(stream, Some(account), Some(window), stats)
                        .await?;

                    for mut record in records {
                        stream.postprocess(&mut record, Some(window));

                        if let Some(value) =
                            record.get(replication_key).and_then(|v| v.as_str())
                        {
                            self.state
                                .advance_account_bookmark(
                                    stream.name(),
                                    &account.account_id,
                                    value,
                                )
                                .await;
                        }

                        writer.write(&Message::record(stream.name(), record))?;
                        stats.records_emitted += 1;
                    }

                    // Checkpoint the completed window so an interrupted
                    // pass resumes here instead of re-planning from the
                    // bookmark
                    self.state
                        .set_window_checkpoint(
                            stream.name(),
                            &account.account_id,
                            window.end_datetime(),
                        )
                        .await;
                    self.emit_state(writer).await?;
                }

                self.state
                    .clear_window_checkpoint(stream.name(), &account.account_id)
                    .await;
            }
            None => {
                let records = self.fetch_records(stream, Some(account), None, stats).await?;
                for mut record in records {
                    stream.postprocess(&mut record, None);
                    writer.write(&Message::record(stream.name(), record))?;
                    stats.records_emitted += 1;
                }
            }
        }
        Ok(())
    }

    /// Fetch and decode one page of records
    async fn fetch_records(
        &self,
        stream: &dyn TapStream,
        account: Option<&AccountContext>,
        window: Option<&DateWindow>,
        stats: &mut SyncStats,
    ) -> Result<Vec<serde_json::Value>> {
        let path = self.render_path(stream, account)?;

        let mut request = RequestConfig::new();
        for (key, value) in stream.query_params(&self.config, window) {
            request = request.query(key, value);
        }

        let response = self.client.get(&path, request).await?;
        let body = response.text().await.map_err(Error::Http)?;
        stats.requests_made += 1;

        let decoder = JsonDecoder::with_path(stream.records_path());
        decoder
            .decode(&body)
            .map_err(|e| Error::sync(stream.name(), e.to_string()))
    }

    /// Render a stream's path for the given account
    fn render_path(&self, stream: &dyn TapStream, account: Option<&AccountContext>) -> Result<String> {
        let path = stream.path();
        if !template::has_templates(path) {
            return Ok(path.to_string());
        }
        let account = account.ok_or_else(|| {
            Error::sync(stream.name(), "path requires an account context")
        })?;
        let mut ctx = TemplateContext::with_config(serde_json::to_value(&self.config)?);
        ctx.set_account(account.to_template_value());
        template::render(path, &ctx)
    }

    /// Parse an account's bookmark into a datetime
    async fn bookmark_datetime(
        &self,
        stream: &str,
        account: &AccountContext,
    ) -> Option<DateTime<Utc>> {
        let raw = self
            .state
            .account_bookmark(stream, &account.account_id)
            .await?;
        parse_bookmark(&raw)
    }

    /// Emit and persist a STATE snapshot
    async fn emit_state<W: Write>(&self, writer: &mut MessageWriter<W>) -> Result<()> {
        let snapshot = self.state.snapshot().await?;
        writer.write(&Message::state(snapshot))?;
        self.state.save().await
    }
}

/// Parse a bookmark value, accepting RFC 3339 or the API's bare datetime
fn parse_bookmark(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Build a SCHEMA message for a stream
fn schema_message(stream: &dyn TapStream) -> Message {
    let bookmark_properties = stream
        .replication_key()
        .map(|k| vec![k.to_string()])
        .unwrap_or_default();
    Message::schema(
        stream.name(),
        stream.schema(),
        stream.key_properties(),
        bookmark_properties,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::TransactionsStream;

    #[test]
    fn test_parse_bookmark_formats() {
        assert_eq!(
            parse_bookmark("2024-01-15T10:30:00Z").unwrap().to_rfc3339(),
            "2024-01-15T10:30:00+00:00"
        );
        assert_eq!(
            parse_bookmark("2024-01-15T10:30:00").unwrap().to_rfc3339(),
            "2024-01-15T10:30:00+00:00"
        );
        assert!(parse_bookmark("garbage").is_none());
    }

    #[test]
    fn test_schema_message_carries_bookmark_properties() {
        let msg = schema_message(&TransactionsStream);
        match msg {
            Message::Schema {
                stream,
                bookmark_properties,
                ..
            } => {
                assert_eq!(stream, "transactions");
                assert_eq!(bookmark_properties, vec!["transactionDate"]);
            }
            _ => panic!("expected schema message"),
        }
    }
}
