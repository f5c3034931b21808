//! Event scripts: a JSON array of graph and view events replayed by the headless runner.
//!
//! ```json
//! [
//!   {"event": "add_node", "id": 1, "label": "root"},
//!   {"event": "add_neighbor", "node": 2, "link": 1, "neighbor": 1},
//!   {"event": "widget", "command": "play"}
//! ]
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::input::events::{GraphEvent, ViewEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Graph(GraphEvent),
    View(ViewEvent),
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>> {
    Ok(serde_json::from_str(json)?)
}

/// Load a script from `path`, or from stdin when the path is `-`.
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let json = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_script(&json)
}
