//! Tool table: the ordered collection of tools available to operations.

use serde::Serialize;
use std::path::Path;

use crate::error::{CamError, Result};
use crate::model::tool::{Tool, ToolMaterial, ToolType};
use crate::units::Units;

/// Title listed for "no tool" in tool choices.
pub const NO_TOOL_TITLE: &str = "No Tool";

/// Ordered tool collection keyed by unique, positive tool number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from tools in table order.
    pub fn from_tools(tools: impl IntoIterator<Item = Tool>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.add(tool)?;
        }
        Ok(registry)
    }

    /// Parse a JSON tool table (an array of tools).
    pub fn from_json(json: &str) -> Result<Self> {
        let tools: Vec<Tool> = serde_json::from_str(json)?;
        let mut registry = Self::from_tools(tools)?;
        // Stored derived attributes may be stale
        for tool in &mut registry.tools {
            tool.set_angle_and_radius();
        }
        Ok(registry)
    }

    /// Load a JSON tool table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&content)?;
        tracing::debug!("Loaded {} tools from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Save the tool table as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| CamError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append a tool. Its number must be positive and not already in use.
    pub fn add(&mut self, tool: Tool) -> Result<()> {
        self.check_free_number(tool.tool_number())?;
        self.tools.push(tool);
        Ok(())
    }

    /// Give a tool a new number, under the same rules as [`ToolRegistry::add`].
    pub fn renumber(&mut self, from: i32, to: i32) -> Result<()> {
        if from == to && self.find_by_number(from).is_some() {
            return Ok(());
        }
        self.check_free_number(to)?;
        let tool = self
            .find_by_number_mut(from)
            .ok_or(CamError::UnknownTool { number: from })?;
        tool.set_tool_number(to);
        tracing::debug!("Renumbered tool {} to {}", from, to);
        Ok(())
    }

    fn check_free_number(&self, number: i32) -> Result<()> {
        if number <= 0 {
            return Err(CamError::InvalidToolNumber { number });
        }
        if self.find_by_number(number).is_some() {
            return Err(CamError::DuplicateToolNumber { number });
        }
        Ok(())
    }

    /// Remove and return the tool with the given number.
    pub fn remove(&mut self, tool_number: i32) -> Option<Tool> {
        let index = self.tools.iter().position(|t| t.tool_number() == tool_number)?;
        Some(self.tools.remove(index))
    }

    /// Tool with the given number. Numbers of zero or below never match.
    pub fn find_by_number(&self, tool_number: i32) -> Option<&Tool> {
        if tool_number <= 0 {
            return None;
        }
        self.tools.iter().find(|t| t.tool_number() == tool_number)
    }

    pub fn find_by_number_mut(&mut self, tool_number: i32) -> Option<&mut Tool> {
        if tool_number <= 0 {
            return None;
        }
        self.tools.iter_mut().find(|t| t.tool_number() == tool_number)
    }

    /// Number of the first tool of a type, in table order.
    pub fn find_first_by_type(&self, tool_type: ToolType) -> Option<i32> {
        self.tools
            .iter()
            .find(|t| t.tool_type() == tool_type)
            .map(|t| t.tool_number())
    }

    /// Legacy numeric form of a lookup result: -1 for "not found".
    pub fn sentinel(tool_number: Option<i32>) -> i32 {
        tool_number.unwrap_or(-1)
    }

    /// Choices for a tool selector: "No Tool" first, then every tool in order.
    pub fn list_all(&self) -> Vec<(i32, String)> {
        std::iter::once((0, NO_TOOL_TITLE.to_string()))
            .chain(
                self.tools
                    .iter()
                    .map(|t| (t.tool_number(), t.title().to_string())),
            )
            .collect()
    }

    /// Type of the numbered tool, or `Undefined` when there is none.
    pub fn cutter_type(&self, tool_number: i32) -> ToolType {
        self.find_by_number(tool_number)
            .map(Tool::tool_type)
            .unwrap_or(ToolType::Undefined)
    }

    /// Material of the numbered tool.
    pub fn cutter_material(&self, tool_number: i32) -> Option<ToolMaterial> {
        self.find_by_number(tool_number).map(|t| t.params().material)
    }

    /// Lowest positive number not used by any tool.
    pub fn next_free_number(&self) -> i32 {
        let mut number = 1;
        while self.tools.iter().any(|t| t.tool_number() == number) {
            number += 1;
        }
        number
    }

    /// Re-express generated titles in new display units.
    pub fn on_change_units(&mut self, units: Units) {
        for tool in &mut self.tools {
            tool.on_change_units(units);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
