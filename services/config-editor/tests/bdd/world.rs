//! BDD test world for the configuration editor

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cucumber::World;
use serde_json::Value;

use config_editor::entity::SetOutcome;
use config_editor::io::{HttpClient, HttpResponse};
use config_editor::{
    ConfigEditor, ConfigEditorError, ConfigurationEntity, DiffPayload, LinkBuilder, PendingView,
    SchemaRegistry, TextTable,
};

/// In-memory configuration API serving canned list bodies and recording posts
#[derive(Debug, Default)]
pub struct FakeApi {
    lists: Mutex<HashMap<String, Value>>,
    requested: Mutex<Vec<String>>,
    posted: Mutex<Vec<(String, Value)>>,
}

impl FakeApi {
    pub fn serve_list(&self, url: String, body: Value) {
        self.lists.lock().unwrap().insert(url, body);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<(String, Value)> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeApi {
    async fn get(&self, url: &str) -> config_editor::Result<HttpResponse> {
        self.requested.lock().unwrap().push(url.to_string());
        let response = match self.lists.lock().unwrap().get(url) {
            Some(body) => HttpResponse {
                status: 200,
                body: body.to_string(),
            },
            None => HttpResponse {
                status: 404,
                body: r#"{"success": false, "errormessage": "Unknown object type"}"#.to_string(),
            },
        };
        Ok(response)
    }

    async fn post_json(&self, url: &str, body: &Value) -> config_editor::Result<HttpResponse> {
        self.posted
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        Ok(HttpResponse {
            status: 200,
            body: r#"{"success": true}"#.to_string(),
        })
    }
}

#[derive(Debug, Default, World)]
pub struct EditorWorld {
    pub base_url: String,
    pub api: Arc<FakeApi>,
    pub editor: Option<ConfigEditor<TextTable>>,
    pub last_error: Option<ConfigEditorError>,

    // Overlapping navigations
    pub pending: Vec<PendingView>,
    pub stale_responses: usize,

    // Row actions
    pub link: Option<String>,

    // Edit sessions
    pub entity: Option<ConfigurationEntity>,
    pub last_outcome: Option<SetOutcome>,
    pub submitted: Option<Option<DiffPayload>>,
}

impl EditorWorld {
    pub fn start(&mut self, base_url: &str) {
        self.base_url = base_url.to_string();
        self.editor = Some(ConfigEditor::new(
            Arc::new(SchemaRegistry::builtin().unwrap()),
            LinkBuilder::new(base_url),
            self.api.clone(),
            TextTable::default(),
            "hosts",
        ));
    }

    pub fn editor(&mut self) -> &mut ConfigEditor<TextTable> {
        self.editor.as_mut().expect("editor not started")
    }
}
