//! Table materializer: turns a resolved view into columns, rows and links
//!
//! Table widgets cannot add or remove columns in place. Showing a new view
//! on an initialized widget always destroys it first and rebuilds it from
//! the new column set.

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::links::{LinkBuilder, RowIdentity};
use crate::router::ViewTarget;
use crate::schema::{EntityTypeDescriptor, SchemaRegistry};
use crate::values::{value_text, AttributeMap};

/// What a column shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Value of the bound property
    Data,
    /// Edit and advanced-edit links
    EditActions,
    /// Delete link
    Delete,
}

/// One column of a materialized table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub title: String,
    /// Property the column is bound to
    pub data: String,
    pub default_content: String,
    pub orderable: bool,
    pub searchable: bool,
    pub role: ColumnRole,
}

impl ColumnSpec {
    fn property(title: &str, data: &str) -> Self {
        Self {
            title: title.to_string(),
            data: data.to_string(),
            default_content: String::new(),
            orderable: true,
            searchable: true,
            role: ColumnRole::Data,
        }
    }

    fn action(title: &str, data: &str, role: ColumnRole) -> Self {
        Self {
            title: title.to_string(),
            data: data.to_string(),
            default_content: String::new(),
            orderable: false,
            searchable: false,
            role,
        }
    }
}

/// Row-level user actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Edit,
    AdvancedEdit,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::AdvancedEdit => "Advanced",
            RowAction::Delete => "Delete",
        }
    }
}

/// A link rendered in an action column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionLink {
    pub action: RowAction,
    pub href: String,
}

/// Content of one table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Text(String),
    Links(Vec<ActionLink>),
}

/// Links for every action on one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLinks {
    pub edit: String,
    pub advanced_edit: String,
    pub delete: String,
}

impl RowLinks {
    pub fn get(&self, action: RowAction) -> &str {
        match action {
            RowAction::Edit => &self.edit,
            RowAction::AdvancedEdit => &self.advanced_edit,
            RowAction::Delete => &self.delete,
        }
    }
}

/// A view ready to be displayed: its columns and where to fetch its rows
#[derive(Debug, Clone)]
pub struct TableView {
    pub target: ViewTarget,
    pub columns: Vec<ColumnSpec>,
    pub list_url: String,
    pub create_url: String,
    descriptor: Arc<EntityTypeDescriptor>,
}

impl TableView {
    pub fn descriptor(&self) -> &EntityTypeDescriptor {
        &self.descriptor
    }

    /// Property identifying rows of this view
    pub fn identity_column(&self) -> &str {
        self.descriptor.identity_property(self.target.is_template)
    }

    pub fn row_identity(&self, row: &AttributeMap) -> Option<RowIdentity> {
        RowIdentity::from_row(&self.target, &self.descriptor, row)
    }
}

/// Receives materialized tables; implemented by the rendering layer
pub trait TableWidget {
    /// Whether the widget currently holds columns
    fn is_initialized(&self) -> bool;

    /// Drop all columns and rows
    fn destroy(&mut self);

    /// Create the columns and show the rows
    fn initialize(&mut self, columns: &[ColumnSpec], rows: Vec<Vec<Cell>>);
}

/// Builds views from the schema registry
#[derive(Debug, Clone)]
pub struct TableMaterializer {
    registry: Arc<SchemaRegistry>,
    links: LinkBuilder,
}

impl TableMaterializer {
    pub fn new(registry: Arc<SchemaRegistry>, links: LinkBuilder) -> Self {
        Self { registry, links }
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }

    /// Column specification and listing endpoint for a kind
    pub fn build_view(&self, kind: &str, is_template: bool) -> Result<TableView> {
        let descriptor = Arc::clone(self.registry.describe(kind)?);
        let target = ViewTarget::new(kind, is_template);
        let identity = descriptor.identity_property(is_template).to_string();

        let mut columns: Vec<ColumnSpec> = descriptor
            .default_columns
            .iter()
            .map(|column| {
                if *column == descriptor.key_property {
                    ColumnSpec::property(column, &identity)
                } else {
                    ColumnSpec::property(column, column)
                }
            })
            .collect();
        columns.push(ColumnSpec::action(
            "Edit",
            &identity,
            ColumnRole::EditActions,
        ));
        columns.push(ColumnSpec::action("Remove", &identity, ColumnRole::Delete));

        tracing::debug!(
            "Built {} view with {} columns",
            target.segment(),
            columns.len()
        );

        Ok(TableView {
            list_url: self.links.list(&target),
            create_url: self.links.create(&target),
            target,
            columns,
            descriptor,
        })
    }

    /// Links for a row of the view; `None` when the row has no identity
    pub fn row_links(&self, view: &TableView, row: &AttributeMap) -> Option<RowLinks> {
        let identity = view.row_identity(row)?;
        Some(RowLinks {
            edit: self.links.edit(&view.target, &identity),
            advanced_edit: self.links.advanced_edit(&view.target, &identity),
            delete: self.links.delete(&view.target, &identity),
        })
    }

    /// Cells of every row, in column order
    pub fn render_rows(&self, view: &TableView, records: &[AttributeMap]) -> Vec<Vec<Cell>> {
        records
            .iter()
            .map(|row| {
                let links = self.row_links(view, row);
                view.columns
                    .iter()
                    .map(|column| render_cell(column, row, links.as_ref()))
                    .collect()
            })
            .collect()
    }

    /// Show a view on the widget, tearing down any previous one
    pub fn materialize<W: TableWidget + ?Sized>(
        &self,
        widget: &mut W,
        view: &TableView,
        records: &[AttributeMap],
    ) {
        if widget.is_initialized() {
            tracing::debug!("Destroying previous table before showing {}", view.target.segment());
            widget.destroy();
        }
        let rows = self.render_rows(view, records);
        tracing::info!(
            "Showing {} {}",
            rows.len(),
            if view.target.is_template {
                format!("{} templates", view.descriptor.display_name)
            } else {
                view.descriptor.plural_display_name.clone()
            }
        );
        widget.initialize(&view.columns, rows);
    }
}

fn render_cell(column: &ColumnSpec, row: &AttributeMap, links: Option<&RowLinks>) -> Cell {
    let actions: &[RowAction] = match column.role {
        ColumnRole::Data => {
            let text = row
                .get(&column.data)
                .and_then(value_text)
                .unwrap_or_else(|| column.default_content.clone());
            return Cell::Text(text);
        }
        ColumnRole::EditActions => &[RowAction::Edit, RowAction::AdvancedEdit],
        ColumnRole::Delete => &[RowAction::Delete],
    };

    match links {
        Some(links) => Cell::Links(
            actions
                .iter()
                .map(|action| ActionLink {
                    action: *action,
                    href: links.get(*action).to_string(),
                })
                .collect(),
        ),
        None => Cell::Text(column.default_content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn materializer() -> TableMaterializer {
        TableMaterializer::new(
            Arc::new(SchemaRegistry::builtin().unwrap()),
            LinkBuilder::new(""),
        )
    }

    fn row(value: serde_json::Value) -> AttributeMap {
        value.as_object().unwrap().clone()
    }

    #[derive(Default)]
    struct RecordingWidget {
        columns: Option<Vec<ColumnSpec>>,
        rows: Vec<Vec<Cell>>,
        destroyed: u32,
    }

    impl TableWidget for RecordingWidget {
        fn is_initialized(&self) -> bool {
            self.columns.is_some()
        }

        fn destroy(&mut self) {
            self.columns = None;
            self.rows.clear();
            self.destroyed += 1;
        }

        fn initialize(&mut self, columns: &[ColumnSpec], rows: Vec<Vec<Cell>>) {
            assert!(self.columns.is_none(), "initialized twice without destroy");
            self.columns = Some(columns.to_vec());
            self.rows = rows;
        }
    }

    #[test]
    fn instance_view_columns() {
        let view = materializer().build_view("host", false).unwrap();
        let bindings: Vec<&str> = view.columns.iter().map(|c| c.data.as_str()).collect();
        assert_eq!(bindings, vec!["host_name", "address", "host_name", "host_name"]);
        assert_eq!(view.columns[2].role, ColumnRole::EditActions);
        assert_eq!(view.columns[3].role, ColumnRole::Delete);
        assert_eq!(view.list_url, "/config/list/hosts");
        assert_eq!(view.create_url, "/config/host/create");
    }

    #[test]
    fn template_view_swaps_identity_binding() {
        let view = materializer().build_view("host", true).unwrap();
        assert_eq!(view.columns[0].title, "host_name");
        assert_eq!(view.columns[0].data, "name");
        assert_eq!(view.columns[1].data, "address");
        assert_eq!(view.identity_column(), "name");
        assert_eq!(view.list_url, "/config/list/hosttemplates");
    }

    #[test]
    fn template_views_rebind_only_the_key_column() {
        let m = materializer();
        let registry = SchemaRegistry::builtin().unwrap();
        for kind in registry.kinds() {
            let instances = m.build_view(kind, false).unwrap();
            let templates = m.build_view(kind, true).unwrap();
            let key = &instances.descriptor().key_property;
            assert_eq!(instances.columns.len(), templates.columns.len(), "{kind}");

            let data_columns = templates.columns.len() - 2;
            for (instance, template) in instances.columns[..data_columns]
                .iter()
                .zip(&templates.columns[..data_columns])
            {
                assert_eq!(instance.title, template.title, "{kind}");
                if template.title == *key {
                    assert_eq!(template.data, "name", "{kind}");
                } else {
                    assert_eq!(template.data, instance.data, "{kind}");
                }
            }
            assert_eq!(
                templates.columns.iter().filter(|c| c.data == "name").count(),
                3,
                "{kind}"
            );
            for column in &templates.columns[data_columns..] {
                assert_eq!(column.data, "name", "{kind}");
                assert_ne!(column.role, ColumnRole::Data, "{kind}");
            }
        }
    }

    #[test]
    fn action_columns_are_render_only() {
        let view = materializer().build_view("contact", false).unwrap();
        for column in &view.columns[view.columns.len() - 2..] {
            assert!(!column.orderable);
            assert!(!column.searchable);
        }
        assert!(view.columns[0].orderable);
    }

    #[test]
    fn unknown_kind_fails() {
        assert!(materializer().build_view("printer", false).is_err());
    }

    #[test]
    fn service_row_links_use_containers() {
        let m = materializer();
        let view = m.build_view("service", false).unwrap();
        let links = m
            .row_links(
                &view,
                &row(json!({"service_description": "ping", "host_name": "h1", "hostgroup_name": "g1"})),
            )
            .unwrap();
        assert_eq!(links.edit, "/config/service/ping/$h1+g1");
        assert_eq!(links.advanced_edit, "/config/expert/service/ping/$h1+g1");
        assert_eq!(links.delete, "/config/delete/service/ping/$h1+g1");
    }

    #[test]
    fn rows_render_text_and_links() {
        let m = materializer();
        let view = m.build_view("host", false).unwrap();
        let rows = m.render_rows(&view, &[row(json!({"host_name": "web-01"}))]);

        assert_eq!(rows[0][0], Cell::Text("web-01".to_string()));
        assert_eq!(rows[0][1], Cell::Text(String::new()));
        assert_eq!(
            rows[0][2],
            Cell::Links(vec![
                ActionLink {
                    action: RowAction::Edit,
                    href: "/config/host/web-01".to_string()
                },
                ActionLink {
                    action: RowAction::AdvancedEdit,
                    href: "/config/expert/host/web-01".to_string()
                },
            ])
        );
    }

    #[test]
    fn row_without_identity_has_no_links() {
        let m = materializer();
        let view = m.build_view("host", false).unwrap();
        let rows = m.render_rows(&view, &[row(json!({"address": "10.0.0.1"}))]);
        assert_eq!(rows[0][2], Cell::Text(String::new()));
    }

    #[test]
    fn rematerializing_destroys_first() {
        let m = materializer();
        let mut widget = RecordingWidget::default();

        let hosts = m.build_view("host", false).unwrap();
        m.materialize(&mut widget, &hosts, &[]);
        assert_eq!(widget.destroyed, 0);

        let commands = m.build_view("command", false).unwrap();
        m.materialize(&mut widget, &commands, &[row(json!({"command_name": "check_ping"}))]);
        assert_eq!(widget.destroyed, 1);
        assert_eq!(widget.columns.as_ref().unwrap().len(), 3);
        assert_eq!(widget.rows.len(), 1);
    }
}
