//! Editor controller
//!
//! The two entry points are [`ConfigEditor::on_navigate`] and
//! [`ConfigEditor::on_row_action`]. Each navigation bumps a generation
//! counter and cancels the previous list fetch; a list response is only
//! applied to the widget while its generation is still the current one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::entity::{ConfigurationEntity, DiffPayload};
use crate::error::{ConfigEditorError, Result};
use crate::io::{fetch_list, HttpClient, ReqwestHttpClient};
use crate::links::LinkBuilder;
use crate::router::ViewRouter;
use crate::schema::SchemaRegistry;
use crate::table::{RowAction, TableMaterializer, TableView, TableWidget};
use crate::values::AttributeMap;

/// A navigation whose list has not been fetched yet
#[derive(Debug)]
pub struct PendingView {
    pub generation: u64,
    pub view: TableView,
    cancel: CancellationToken,
}

impl PendingView {
    /// Fetch the view's records; resolves early with `Cancelled` when a newer navigation starts
    pub async fn fetch(self, http: &dyn HttpClient) -> FetchedView {
        let records = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ConfigEditorError::Cancelled),
            result = fetch_list(http, &self.view.list_url) => result,
        };
        FetchedView {
            generation: self.generation,
            view: self.view,
            records,
        }
    }
}

/// Outcome of a list fetch, waiting to be applied
#[derive(Debug)]
pub struct FetchedView {
    pub generation: u64,
    pub view: TableView,
    pub records: Result<Vec<AttributeMap>>,
}

/// Drives one table widget from navigation and row events
pub struct ConfigEditor<W: TableWidget> {
    registry: Arc<SchemaRegistry>,
    router: ViewRouter,
    materializer: TableMaterializer,
    http: Arc<dyn HttpClient>,
    widget: W,
    default_token: String,
    generation: u64,
    in_flight: Option<CancellationToken>,
    current: Option<TableView>,
}

impl<W: TableWidget> ConfigEditor<W> {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        links: LinkBuilder,
        http: Arc<dyn HttpClient>,
        widget: W,
        default_token: impl Into<String>,
    ) -> Self {
        Self {
            router: ViewRouter::new(Arc::clone(&registry)),
            materializer: TableMaterializer::new(Arc::clone(&registry), links),
            registry,
            http,
            widget,
            default_token: default_token.into(),
            generation: 0,
            in_flight: None,
            current: None,
        }
    }

    /// Build an editor talking to the configured API over HTTP
    pub fn from_config(config: &Config, widget: W) -> Result<Self> {
        let registry = SchemaRegistry::from_config(&config.schema)?;
        let http = ReqwestHttpClient::new(Duration::from_secs(config.api.timeout_seconds))?;
        tracing::info!(
            "Editor using {} at {}",
            registry.kinds().collect::<Vec<_>>().join(", "),
            config.api.base_url
        );
        Ok(Self::new(
            Arc::new(registry),
            LinkBuilder::new(&config.api.base_url),
            Arc::new(http),
            widget,
            &config.navigation.default_token,
        ))
    }

    /// Resolve a token and start a new navigation generation
    ///
    /// Unparseable tokens fall back to the default view. Unknown kinds leave
    /// the displayed view and the generation untouched.
    pub fn begin_navigation(&mut self, token: &str) -> Result<PendingView> {
        let target = match self.router.resolve(token) {
            Ok(target) => target,
            Err(ConfigEditorError::InvalidToken(_)) => {
                tracing::warn!(
                    "Token '{}' is not a view, showing '{}'",
                    token,
                    self.default_token
                );
                self.router.resolve(&self.default_token)?
            }
            Err(e) => return Err(e),
        };
        let view = self
            .materializer
            .build_view(&target.kind, target.is_template)?;

        self.generation += 1;
        let cancel = CancellationToken::new();
        if let Some(previous) = self.in_flight.replace(cancel.clone()) {
            previous.cancel();
        }

        tracing::debug!(
            "Navigation {} to {} ({})",
            self.generation,
            target.token(),
            view.list_url
        );
        Ok(PendingView {
            generation: self.generation,
            view,
            cancel,
        })
    }

    /// Apply a fetched list if it belongs to the current generation
    pub fn complete_navigation(&mut self, fetched: FetchedView) -> Result<()> {
        if fetched.generation != self.generation {
            tracing::warn!(
                "Dropping {} response of generation {} (current {})",
                fetched.view.target.token(),
                fetched.generation,
                self.generation
            );
            return Err(ConfigEditorError::StaleResponse {
                generation: fetched.generation,
                current: self.generation,
            });
        }
        self.in_flight = None;

        let records = fetched.records.inspect_err(|e| {
            tracing::error!("Failed to load {}: {}", fetched.view.list_url, e);
        })?;
        self.materializer
            .materialize(&mut self.widget, &fetched.view, &records);
        self.current = Some(fetched.view);
        Ok(())
    }

    /// Show the view named by a navigation token
    pub async fn on_navigate(&mut self, token: &str) -> Result<()> {
        let pending = self.begin_navigation(token)?;
        let fetched = pending.fetch(self.http.as_ref()).await;
        self.complete_navigation(fetched)
    }

    /// Link a row action leads to, within the displayed view
    pub fn on_row_action(&self, action: RowAction, row: &AttributeMap) -> Result<String> {
        let view = self
            .current
            .as_ref()
            .ok_or(ConfigEditorError::NoActiveView)?;
        let links = self.materializer.row_links(view, row).ok_or_else(|| {
            ConfigEditorError::InvalidRecord(format!(
                "row has no '{}' value",
                view.identity_column()
            ))
        })?;
        let href = links.get(action).to_string();
        tracing::debug!("{} -> {}", action.label(), href);
        Ok(href)
    }

    /// Start an edit session on a server record
    pub fn open_entity(&self, record: Value) -> Result<ConfigurationEntity> {
        ConfigurationEntity::from_record(&self.registry, record)
    }

    /// Send an entity's changes to its edit endpoint
    ///
    /// Returns `Ok(None)` without any request when nothing changed.
    pub async fn submit(&self, entity: &ConfigurationEntity) -> Result<Option<DiffPayload>> {
        let payload = entity.export();
        if payload.is_empty() {
            tracing::info!("No changes to submit for {}", entity.object_type());
            return Ok(None);
        }

        let identity = entity.origin().ok_or_else(|| {
            ConfigEditorError::InvalidRecord(format!(
                "{} record was loaded without an identity",
                entity.object_type()
            ))
        })?;
        let url = self.materializer.links().edit(entity.target(), identity);

        let body = serde_json::to_value(&payload)?;
        let response = self.http.post_json(&url, &body).await?;
        if !response.is_success() {
            return Err(ConfigEditorError::Api {
                status: response.status,
                message: response.body,
            });
        }

        tracing::info!(
            "Submitted {} change(s) to {}",
            payload.changes.len(),
            url
        );
        Ok(Some(payload))
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn current_view(&self) -> Option<&TableView> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Client for driving [`PendingView::fetch`] outside `on_navigate`
    ///
    /// Callers that overlap navigations start each one with
    /// [`begin_navigation`](Self::begin_navigation), fetch with this client
    /// and hand the result to [`complete_navigation`](Self::complete_navigation).
    pub fn http(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.http)
    }
}

impl<W: TableWidget + fmt::Debug> fmt::Debug for ConfigEditor<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEditor")
            .field("widget", &self.widget)
            .field("default_token", &self.default_token)
            .field("generation", &self.generation)
            .field("current", &self.current.as_ref().map(|view| &view.target))
            .finish_non_exhaustive()
    }
}
