// Civitrack
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Civitrack CLI Tool
//!
//! Command-line interface over an in-memory municipal core. Every invocation
//! starts from the sample data set (unless `--no-seed` is given), runs one
//! command and prints the result as JSON on stdout.

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use civitrack_core::models::{IssueReport, RequestPriority, RequestStatus};
use civitrack_core::{CoreConfig, MunicipalCore};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::process;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "civitrack")]
#[command(about = "Civitrack - Municipal events and service requests")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// Start from an empty catalog and tracker
    #[arg(long, global = true)]
    no_seed: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and search community events
    #[command(subcommand)]
    Events(EventCommands),
    /// Inspect and report service requests
    #[command(subcommand)]
    Requests(RequestCommands),
}

#[derive(Subcommand)]
enum EventCommands {
    /// List every event in insertion order
    List,
    /// Search events by text, category and start date
    Search {
        #[arg(long, short = 'q')]
        query: Option<String>,
        #[arg(long, short = 'c')]
        category: Option<String>,
        /// Earliest event date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
    },
    /// Show the featured events
    Featured {
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
    /// Score upcoming events against search history and the current filter
    Recommend {
        #[arg(long, short = 'q')]
        query: Option<String>,
        #[arg(long, short = 'c')]
        category: Option<String>,
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
    /// Events sharing tags with the given event
    Related {
        /// Event ID
        id: String,
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
    /// List all event categories
    Categories,
    /// Catalog counters and search statistics
    Stats,
    /// Events grouped by calendar day
    ByDate,
}

#[derive(Subcommand)]
enum RequestCommands {
    /// List every request, newest first
    List,
    /// Filter requests by text, status, category and priority
    Search {
        #[arg(long, short = 'q')]
        query: Option<String>,
        /// Status name or ordinal
        #[arg(long, short = 's')]
        status: Option<String>,
        #[arg(long, short = 'c')]
        category: Option<String>,
        /// Priority name or level (1-4)
        #[arg(long, short = 'p')]
        priority: Option<String>,
    },
    /// Full tracking view for one request
    Track {
        /// Request ID
        id: String,
    },
    /// Most urgent requests first
    Priority {
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
    /// Requests submitted between two dates, inclusive (YYYY-MM-DD)
    Range { from: String, to: String },
    /// Aggregate request statistics
    Stats,
    /// Every dependency edge between requests
    Graph,
    /// Status history of one request
    Timeline {
        /// Request ID
        id: String,
    },
    /// Report an issue and open a request for it
    Submit {
        #[arg(long, short = 'l')]
        location: String,
        #[arg(long, short = 'c')]
        category: String,
        #[arg(long, short = 'd')]
        description: String,
    },
    /// Move a request to a new status
    Status {
        /// Request ID
        id: String,
        /// Status name or ordinal
        status: String,
        #[arg(long, default_value = "Staff")]
        by: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    let mut config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    if cli.no_seed {
        config.seed_sample_data = false;
    }

    let core = MunicipalCore::with_config(config);

    let result = match cli.command {
        Commands::Events(command) => handle_events(&core, command),
        Commands::Requests(command) => handle_requests(&core, command),
    };

    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("Failed to render output: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Command failed: {:#}", e);
            process::exit(1);
        }
    }
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date {value:?}, expected YYYY-MM-DD"))
}

fn handle_events(core: &MunicipalCore, command: EventCommands) -> anyhow::Result<Value> {
    let config = core.config();

    let output = match command {
        EventCommands::List => {
            let catalog = core.events();
            json!(catalog.get_all_events())
        }
        EventCommands::Search { query, category, from } => {
            let start = from.as_deref().map(parse_date).transpose()?;
            let catalog = core.events();
            let hits = catalog.search_events(query.as_deref(), category.as_deref(), start);
            info!("Search matched {} events", hits.len());
            json!(hits)
        }
        EventCommands::Featured { count } => {
            let catalog = core.events();
            json!(catalog.get_featured_events(count.unwrap_or(config.featured_count)))
        }
        EventCommands::Recommend { query, category, count } => {
            let catalog = core.events();
            let scored = catalog.get_scored_recommendations(query.as_deref(), category.as_deref(), count.unwrap_or(config.recommendation_count));
            json!(scored)
        }
        EventCommands::Related { id, count } => {
            let catalog = core.events();
            let base = catalog.get_event_by_id(&id).ok_or_else(|| anyhow!("Event not found: {id}"))?;
            json!(catalog.get_related_events(base, count.unwrap_or(config.related_count)))
        }
        EventCommands::Categories => json!(core.events().categories()),
        EventCommands::Stats => {
            let catalog = core.events();
            let index = catalog.date_index_stats();
            json!({
                "total_events": catalog.total_events(),
                "upcoming_events": catalog.upcoming_events_count(),
                "featured_events": catalog.featured_events_count(),
                "categories": catalog.categories().len(),
                "search": catalog.search_statistics(),
                "date_index": {
                    "type": format!("{:?}", index.index_type),
                    "days": index.entry_count,
                    "height": index.height,
                },
            })
        }
        EventCommands::ByDate => {
            let catalog = core.events();
            let days: Vec<Value> = catalog
                .events_by_date()
                .into_iter()
                .map(|(day, events)| json!({ "date": day, "events": events }))
                .collect();
            json!(days)
        }
    };

    Ok(output)
}

fn handle_requests(core: &MunicipalCore, command: RequestCommands) -> anyhow::Result<Value> {
    let config = core.config();

    let output = match command {
        RequestCommands::List => json!(core.requests().get_all_requests()),
        RequestCommands::Search { query, status, category, priority } => {
            let priority = priority.as_deref().map(str::parse::<RequestPriority>).transpose()?;
            let tracker = core.requests();
            let hits = tracker.search(query.as_deref(), status.as_deref(), category.as_deref(), priority);
            info!("Search matched {} requests", hits.len());
            json!(hits)
        }
        RequestCommands::Track { id } => {
            let tracking = core.track_request(&id).ok_or_else(|| anyhow!("Request not found: {id}"))?;
            json!(tracking)
        }
        RequestCommands::Priority { count } => {
            let tracker = core.requests();
            json!(tracker.get_high_priority_requests(count.unwrap_or(config.high_priority_count)))
        }
        RequestCommands::Range { from, to } => {
            let (start, end) = (parse_date(&from)?, parse_date(&to)?);
            json!(core.requests().get_requests_by_date_range(start, end))
        }
        RequestCommands::Stats => {
            let tracker = core.requests();
            let index = tracker.date_index_stats();
            json!({
                "statistics": tracker.statistics(),
                "date_index": {
                    "type": format!("{:?}", index.index_type),
                    "days": index.entry_count,
                    "height": index.height,
                },
            })
        }
        RequestCommands::Graph => {
            let tracker = core.requests();
            let graph = tracker.dependency_graph();
            json!({
                "vertices": graph.vertex_count(),
                "edges": graph.all_edges(),
            })
        }
        RequestCommands::Timeline { id } => {
            let tracker = core.requests();
            let request = tracker.get_request_by_id(&id).ok_or_else(|| anyhow!("Request not found: {id}"))?;
            json!(request.status_history())
        }
        RequestCommands::Submit { location, category, description } => {
            let issue = IssueReport {
                location,
                category,
                description,
                reported_at: core.clock().now(),
            };
            let id = core.submit_issue(&issue);
            info!("Opened request {} for reported issue", id);
            let issues = core.issues();
            json!({
                "tracking": core.track_request(id.as_str()),
                "intake": issues.statistics(),
                "category_count": issues.count_in_category(&issue.category),
                "last_submitted": issues.last_submitted().map(|last| &last.id),
                "next_for_processing": issues.next_for_processing().map(|next| &next.id),
            })
        }
        RequestCommands::Status { id, status, by, notes } => {
            let status: RequestStatus = status.parse()?;
            if !core.requests_mut().update_status(&id, status, &by, &notes) {
                return Err(anyhow!("Request not found: {id}"));
            }
            let tracker = core.requests();
            json!(tracker.get_request_by_id(&id))
        }
    };

    Ok(output)
}
