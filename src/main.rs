//! heeks-cam - CLI for tool geometry and depth pass planning.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cam_core::geometry::build_tool_solid;
use cam_core::planner::parse_user_depths;
use cam_core::validation::validate_registry;
use cam_core::{
    pass_depths, plan_operation, BoundingBox, BoundingBoxBuilder, DefaultsStore, DepthOpParams,
    DepthParamsRecord, Primitive, Tool, ToolDefinitionRecord, ToolParams, ToolRegistry, ToolType,
    Units, ValidationResult,
};

/// Defaults scope used when a job or command names none.
const DEFAULT_SCOPE: &str = "Operation";

/// Plan depth passes and inspect cutting tools for CNC machining.
#[derive(Parser, Debug)]
#[command(name = "heeks-cam")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Units for values entered and printed (mm or inch)
    #[arg(short, long, global = true, default_value = "mm")]
    units: Units,

    /// Defaults file holding tool and operation defaults
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the pass depths of an operation
    Depths {
        /// Top of the material
        #[arg(long, allow_hyphen_values = true, value_parser = parse_length)]
        start: Option<f64>,

        /// Bottom of the cut
        #[arg(long = "final", allow_hyphen_values = true, value_parser = parse_length)]
        final_depth: Option<f64>,

        /// Depth removed by each pass
        #[arg(long, allow_hyphen_values = true, value_parser = parse_length)]
        step: Option<f64>,

        /// Material left for a final finishing pass
        #[arg(long, value_parser = parse_length)]
        finish: Option<f64>,

        /// Extra depth cut below the final depth
        #[arg(long, value_parser = parse_length)]
        thru: Option<f64>,

        /// Explicit pass depths, e.g. "-1, -2.5, -4"
        #[arg(long, allow_hyphen_values = true)]
        user_depths: Option<String>,

        /// Defaults scope to start from
        #[arg(long, default_value = DEFAULT_SCOPE)]
        scope: String,

        /// Store the resulting parameters as the scope's defaults
        #[arg(long)]
        save_defaults: bool,
    },

    /// List the tools in a tool table
    Tools {
        /// Tool table (JSON)
        #[arg(short, long)]
        tools: PathBuf,
    },

    /// Add a tool built from the stored tool defaults
    AddTool {
        /// Tool table (JSON); created if missing
        #[arg(short, long)]
        tools: PathBuf,

        /// Tool type, e.g. Endmill or BallEndMill
        #[arg(long = "type", value_parser = parse_tool_type)]
        tool_type: ToolType,

        /// Tool diameter
        #[arg(short, long, value_parser = parse_length)]
        diameter: Option<f64>,

        /// Tool number; the lowest free number when omitted
        #[arg(short, long)]
        number: Option<i32>,

        /// Title; generated from the tool's size and type when omitted
        #[arg(long)]
        title: Option<String>,
    },

    /// Print a tool's cutting radius
    Radius {
        /// Tool table (JSON)
        #[arg(short, long)]
        tools: PathBuf,

        /// Tool number
        #[arg(long = "tool")]
        tool_number: i32,

        /// Height above the tip at which to measure
        #[arg(long, value_parser = parse_length)]
        depth: Option<f64>,
    },

    /// Print a tool's envelope primitives and bounds as JSON (millimetres)
    Envelope {
        /// Tool table (JSON)
        #[arg(short, long)]
        tools: PathBuf,

        /// Tool number
        #[arg(long = "tool")]
        tool_number: i32,
    },

    /// Plan an operation described by a job file
    Plan {
        /// Job file (JSON)
        job: PathBuf,

        /// Tool table (JSON)
        #[arg(short, long)]
        tools: PathBuf,

        /// Correct what the design rules can correct
        #[arg(long)]
        fix: bool,
    },
}

/// Operation to plan, in millimetres.
#[derive(Debug, Deserialize)]
struct Job {
    tool_number: i32,
    #[serde(default)]
    depth_params: Option<DepthOpParams>,
    #[serde(default)]
    references: Vec<BoundingBox>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    record: DepthParamsRecord,
    passes: Vec<f64>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EnvelopeOutput<'a> {
    tool_number: i32,
    primitives: &'a [Primitive],
    bounds: Option<BoundingBox>,
}

fn parse_tool_type(s: &str) -> std::result::Result<ToolType, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown tool type '{}'", s))
}

fn parse_length(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{}' is not a finite number", s))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let units = args.units;
    let mut store = match &args.defaults {
        Some(path) => DefaultsStore::load(path)
            .with_context(|| format!("Failed to read defaults {}", path.display()))?,
        None => DefaultsStore::new(),
    };

    match args.command {
        Command::Depths {
            start,
            final_depth,
            step,
            finish,
            thru,
            user_depths,
            scope,
            save_defaults,
        } => {
            let mut params = DepthOpParams::load_defaults(&store, &scope);
            let mm = |v: f64| units.to_canonical(v);

            if let Some(v) = start {
                params.start_depth = mm(v);
            }
            if let Some(v) = final_depth {
                params.final_depth = mm(v);
            }
            if let Some(v) = step {
                params.step_down = mm(v);
            }
            if let Some(v) = finish {
                params.z_finish_depth = mm(v);
            }
            if let Some(v) = thru {
                params.z_thru_depth = mm(v);
            }
            if let Some(text) = user_depths {
                let depths = parse_user_depths(&text)
                    .with_context(|| format!("Failed to parse user depths '{}'", text))?;
                params.user_depths = Some(depths.into_iter().map(mm).collect());
            }

            let passes = pass_depths(&params);
            if passes.is_empty() {
                warn!(
                    "No passes: start {} must be above final {} with a positive step",
                    params.start_depth, params.final_depth
                );
            }

            if save_defaults {
                match &args.defaults {
                    Some(path) => {
                        params.save_defaults(&mut store, &scope)?;
                        store
                            .save(path)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        info!("Saved {} defaults to {}", scope, path.display());
                    }
                    None => warn!("--save-defaults needs --defaults <file>; nothing saved"),
                }
            }

            let passes: Vec<f64> = passes.into_iter().map(|d| units.to_display(d)).collect();
            println!("{}", serde_json::to_string_pretty(&passes)?);
        }

        Command::Tools { tools } => {
            let mut registry = load_registry(&tools)?;
            registry.on_change_units(units);

            let records: Vec<ToolDefinitionRecord> = registry
                .iter()
                .map(|t| ToolDefinitionRecord::new(t, units))
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Command::AddTool {
            tools,
            tool_type,
            diameter,
            number,
            title,
        } => {
            let mut registry = if tools.exists() {
                load_registry(&tools)?
            } else {
                ToolRegistry::new()
            };

            let params = ToolParams {
                tool_type,
                ..ToolParams::load_defaults(&store)
            };
            let number = number.unwrap_or_else(|| registry.next_free_number());
            let mut tool = Tool::with_params(title.as_deref(), params, number);
            if let Some(d) = diameter {
                tool.set_diameter(units.to_canonical(d))?;
            }
            tool.on_change_units(units);

            let validation = cam_core::validation::validate_tool(&tool);
            report(&validation.warnings, &validation.errors);
            if !validation.passed {
                anyhow::bail!("Tool {} is not valid", number);
            }

            info!("Adding tool {}: {}", number, tool.title());
            registry.add(tool)?;
            registry
                .save(&tools)
                .with_context(|| format!("Failed to write {}", tools.display()))?;
        }

        Command::Radius {
            tools,
            tool_number,
            depth,
        } => {
            let registry = load_registry(&tools)?;
            let tool = registry
                .find_by_number(tool_number)
                .with_context(|| format!("No tool numbered {}", tool_number))?;

            let depth = depth.map(|d| units.to_canonical(d));
            println!("{}", tool.cutting_radius_in(units, depth));
        }

        Command::Envelope { tools, tool_number } => {
            let mut registry = load_registry(&tools)?;
            let tool = registry
                .find_by_number_mut(tool_number)
                .with_context(|| format!("No tool numbered {}", tool_number))?;

            let bounds = build_tool_solid(&mut BoundingBoxBuilder, tool);
            let envelope = tool
                .envelope()
                .with_context(|| format!("Failed to build envelope for tool {}", tool_number))?;

            let output = EnvelopeOutput {
                tool_number,
                primitives: &envelope.primitives,
                bounds,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Plan { job, tools, fix } => {
            let registry = load_registry(&tools)?;
            let content = std::fs::read_to_string(&job)
                .with_context(|| format!("Failed to read {}", job.display()))?;
            let job_spec: Job = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", job.display()))?;

            let scope = job_spec.scope.as_deref().unwrap_or(DEFAULT_SCOPE);
            let params = job_spec
                .depth_params
                .unwrap_or_else(|| DepthOpParams::load_defaults(&store, scope));

            info!(
                "Planning tool {} against {} reference(s)",
                job_spec.tool_number,
                job_spec.references.len()
            );

            let plan = plan_operation(
                &registry,
                job_spec.tool_number,
                params,
                &job_spec.references,
                fix,
                units,
            );
            report(&plan.validation.warnings, &plan.validation.errors);

            let output = PlanOutput {
                record: plan.record,
                passes: plan.passes.iter().map(|d| units.to_display(*d)).collect(),
                warnings: plan.validation.warnings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn load_registry(path: &Path) -> Result<ToolRegistry> {
    let registry = ToolRegistry::load(path)
        .with_context(|| format!("Failed to load tool table {}", path.display()))?;
    info!("Loaded {} tool(s)", registry.len());
    check_registry(&registry);
    Ok(registry)
}

/// Report problems with stored tools; they are still usable, so only warn.
fn check_registry(registry: &ToolRegistry) -> ValidationResult {
    let validation = validate_registry(registry);
    report(&validation.warnings, &validation.errors);
    validation
}

fn report(warnings: &[String], errors: &[String]) {
    for warning in warnings {
        warn!("{}", warning);
    }
    for err in errors {
        error!("{}", err);
    }
}
