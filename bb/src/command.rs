use std::fmt;

use bb_core::{ConfigError, Direction, LayerName, Span};
use serde::Deserialize;

/// A bookmark command as sent by the host, e.g. `{"subcommand": "layer_swap", "direction": "next"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "subcommand", rename_all = "snake_case")]
pub enum Command {
    /// Toggle marks on `layer` (default: the current layer). Without `line` the spans are taken
    /// from the host according to the marking mode.
    MarkLine { line: Option<Vec<Span>>, layer: Option<LayerName> },
    /// Move the cursor to the next or previous mark of the current layer.
    CycleMark { direction: Direction },
    ShowMarks,
    ClearMarks { layer: Option<LayerName> },
    ClearAll,
    LayerSwap { direction: Direction },
    OnLoad,
    OnSave,
    OnClose,
}

impl Command {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value = serde_json::from_str(json)
            .map_err(|err| ConfigError::InvalidCommand(err.to_string()))?;
        Self::from_value(value)
    }

    /// A bad `direction` is reported as [`ConfigError::InvalidDirection`], anything else that
    /// doesn't parse as [`ConfigError::InvalidCommand`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let takes_direction = matches!(
            value.get("subcommand").and_then(serde_json::Value::as_str),
            Some("cycle_mark" | "layer_swap")
        );
        if let Some(direction) = value.get("direction").and_then(serde_json::Value::as_str) {
            if takes_direction {
                direction.parse::<Direction>()?;
            }
        }

        serde_json::from_value(value).map_err(|err| ConfigError::InvalidCommand(err.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::MarkLine { .. } => "mark_line",
            Command::CycleMark { .. } => "cycle_mark",
            Command::ShowMarks => "show_marks",
            Command::ClearMarks { .. } => "clear_marks",
            Command::ClearAll => "clear_all",
            Command::LayerSwap { .. } => "layer_swap",
            Command::OnLoad => "on_load",
            Command::OnSave => "on_save",
            Command::OnClose => "on_close",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        match self {
            Command::MarkLine { line, layer } => {
                if let Some(layer) = layer {
                    write!(f, " layer={layer}")?;
                }
                if let Some(line) = line {
                    write!(f, " line={line:?}")?;
                }
            }
            Command::CycleMark { direction } | Command::LayerSwap { direction } => {
                write!(f, " {direction}")?
            }
            Command::ClearMarks { layer: Some(layer) } => write!(f, " layer={layer}")?,
            _ => {}
        }
        Ok(())
    }
}
