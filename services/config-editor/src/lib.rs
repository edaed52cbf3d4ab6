//! Config Editor - schema-driven editor core for monitoring configuration
//!
//! Resolves navigation tokens to entity kinds, materializes list tables from
//! the schema registry and tracks per-attribute edits of one record at a time.

pub mod config;
pub mod editor;
pub mod entity;
pub mod error;
pub mod io;
pub mod links;
pub mod router;
pub mod schema;
pub mod table;
pub mod text_table;
pub mod values;

pub use config::{load_config, Config};
pub use editor::{ConfigEditor, FetchedView, PendingView};
pub use entity::{ConfigurationEntity, DiffPayload, SetOutcome};
pub use error::{ConfigEditorError, Result};
pub use io::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use links::{LinkBuilder, RowIdentity, ServiceContainers};
pub use router::{parse_token, ViewRouter, ViewTarget};
pub use schema::{EntityTypeDescriptor, PropertyDescriptor, PropertyType, SchemaRegistry};
pub use table::{Cell, ColumnSpec, RowAction, TableMaterializer, TableView, TableWidget};
pub use text_table::TextTable;
