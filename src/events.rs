//! Serialized event scripts.
//!
//! Producers that cannot call the [`Configurator`] directly can emit their
//! events as JSON and have them replayed here:
//!
//! ```json
//! [
//!   {"event": "startChild", "name": "resolver"},
//!   {"event": "setAttribute", "name": "name", "value": "local"},
//!   {"event": "endChild"}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_core::{ConfigureError, Configurator};

/// One structural event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    StartChild {
        name: String,
    },
    EndChild,
    SetAttribute {
        name: String,
        value: String,
    },
    AddText {
        text: String,
    },
    StartMacroDef {
        name: String,
    },
    MacroAttribute {
        name: String,
        #[serde(default)]
        default: Option<String>,
    },
    MacroElement {
        name: String,
        #[serde(default)]
        optional: bool,
    },
    EndMacroDef,
}

impl Event {
    /// Forwards the event to `conf`.
    pub fn apply(&self, conf: &mut Configurator) -> Result<(), ConfigureError> {
        match self {
            Event::StartChild { name } => conf.start_child(name).map(drop),
            Event::EndChild => conf.end_child().map(drop),
            Event::SetAttribute { name, value } => conf.set_attribute(name, value),
            Event::AddText { text } => conf.add_text(text),
            Event::StartMacroDef { name } => {
                conf.start_macro_def(name);
                Ok(())
            }
            Event::MacroAttribute { name, default } => {
                conf.add_macro_attribute(name, default.as_deref())
            }
            Event::MacroElement { name, optional } => conf.add_macro_element(name, *optional),
            Event::EndMacroDef => conf.end_macro_def().map(drop),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("invalid event script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event #{index} ({event:?}) failed: {source}")]
    Event {
        index: usize,
        event: Event,
        #[source]
        source: ConfigureError,
    },
}

impl ScriptError {
    /// Index of the failing event, if the script was decoded.
    pub fn index(&self) -> Option<usize> {
        match self {
            ScriptError::Event { index, .. } => Some(*index),
            ScriptError::Json(_) => None,
        }
    }
}

/// Decodes a JSON array of events.
pub fn parse_script(json: &str) -> Result<Vec<Event>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Applies `events` in order, stopping at the first failure.
pub fn apply_events(conf: &mut Configurator, events: &[Event]) -> Result<(), ScriptError> {
    for (index, event) in events.iter().enumerate() {
        event.apply(conf).map_err(|source| {
            log::debug!("event #{} failed: {}", index, source);
            ScriptError::Event {
                index,
                event: event.clone(),
                source,
            }
        })?;
    }
    log::debug!("applied {} events", events.len());
    Ok(())
}

/// [`parse_script`] followed by [`apply_events`].
pub fn run_script(conf: &mut Configurator, json: &str) -> Result<(), ScriptError> {
    let events = parse_script(json)?;
    apply_events(conf, &events)
}
