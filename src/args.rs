//! Command-line argument parsing for the dashboard CLI.
//!
//! Hand-rolled over `std::env::args`: the surface is small and stable, and
//! error messages stay in the same voice as the rest of the tool.

use std::path::PathBuf;

use chrono::NaiveDate;

use agroclim::view::ViewMode;

#[derive(Debug, Clone)]
pub struct Cli {
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub command: Option<Command>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help,
    Historical {
        /// Falls back to `defaults.location_id` from config when omitted
        location: Option<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        view: ViewMode,
        export: Option<PathBuf>,
        no_fallback: bool,
    },
    Overview,
    Locations {
        /// Use the admin endpoint, which includes unpublished locations
        admin: bool,
    },
    AlertsList {
        export: Option<PathBuf>,
    },
    AlertsSend {
        title: String,
        message: String,
        priority: String,
        location: Option<String>,
    },
    AlertsDelete {
        id: String,
    },
    FarmersList {
        export: Option<PathBuf>,
    },
    FarmersRegister {
        name: String,
        phone: String,
        location: Option<String>,
        crop: Option<String>,
    },
    Broadcast {
        body: String,
        to: Vec<String>,
        location: Option<String>,
    },
}

/// Key/value flag collector for one subcommand.
#[derive(Debug, Default)]
struct Flags {
    values: Vec<(String, String)>,
    switches: Vec<String>,
}

impl Flags {
    fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn require(&self, name: &str) -> Result<String, String> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| format!("Missing required flag --{name}"))
    }

    fn has(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>, String> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| format!("--{name} expects a date like 2024-01-31, got '{raw}'")),
        }
    }
}

const VALUE_FLAGS: [&str; 14] = [
    "config", "location", "start", "end", "view", "export", "title", "message", "priority", "id",
    "name", "phone", "crop", "body",
];

impl Cli {
    /// Parse the process arguments (program name already stripped).
    pub fn parse(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut verbose = false;
        let mut config = None;
        let mut words: Vec<String> = Vec::new();
        let mut flags = Flags::default();

        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" | "help" => {
                    return Ok(Self {
                        verbose,
                        config,
                        command: Some(Command::Help),
                    });
                }
                "--no-fallback" => flags.switches.push("no-fallback".to_string()),
                "--admin" => flags.switches.push("admin".to_string()),
                "--to" => {
                    let value = args
                        .next()
                        .ok_or_else(|| "--to expects a comma-separated id list".to_string())?;
                    flags.values.push(("to".to_string(), value));
                }
                _ if arg.starts_with("--") => {
                    let name = arg.trim_start_matches("--").to_string();
                    if !VALUE_FLAGS.contains(&name.as_str()) {
                        return Err(format!("Unknown flag --{name}"));
                    }
                    let value = args
                        .next()
                        .ok_or_else(|| format!("Flag --{name} expects a value"))?;
                    if name == "config" {
                        config = Some(PathBuf::from(value));
                    } else {
                        flags.values.push((name, value));
                    }
                }
                _ => words.push(arg),
            }
        }

        let command = build_command(&words, &flags)?;
        Ok(Self {
            verbose,
            config,
            command,
        })
    }
}

fn build_command(words: &[String], flags: &Flags) -> Result<Option<Command>, String> {
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        [] => return Ok(None),
        ["historical"] => Command::Historical {
            location: flags.get("location").map(str::to_string),
            start: flags.date("start")?,
            end: flags.date("end")?,
            view: flags
                .get("view")
                .map(str::parse)
                .transpose()?
                .unwrap_or_default(),
            export: flags.get("export").map(PathBuf::from),
            no_fallback: flags.has("no-fallback"),
        },
        ["overview"] => Command::Overview,
        ["locations"] => Command::Locations {
            admin: flags.has("admin"),
        },
        ["alerts"] | ["alerts", "list"] => Command::AlertsList {
            export: flags.get("export").map(PathBuf::from),
        },
        ["alerts", "send"] => Command::AlertsSend {
            title: flags.require("title")?,
            message: flags.require("message")?,
            priority: flags.get("priority").unwrap_or("medium").to_string(),
            location: flags.get("location").map(str::to_string),
        },
        ["alerts", "delete"] => Command::AlertsDelete {
            id: flags.require("id")?,
        },
        ["farmers"] | ["farmers", "list"] => Command::FarmersList {
            export: flags.get("export").map(PathBuf::from),
        },
        ["farmers", "register"] => Command::FarmersRegister {
            name: flags.require("name")?,
            phone: flags.require("phone")?,
            location: flags.get("location").map(str::to_string),
            crop: flags.get("crop").map(str::to_string),
        },
        ["broadcast"] => Command::Broadcast {
            body: flags.require("body")?,
            to: flags
                .get("to")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            location: flags.get("location").map(str::to_string),
        },
        other => {
            return Err(format!(
                "Unknown command '{}'. Run 'agroclim --help' for usage.",
                other.join(" ")
            ));
        }
    };
    Ok(Some(command))
}
