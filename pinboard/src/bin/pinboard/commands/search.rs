use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::Table;
use pinboard::{EntityStore, Guid, SearchRequest, SetEntity};
use serde::Serialize;

use super::{report, session_for};
use crate::context::Backend;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, header_cell};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Pin Picker",
        commands: &[
            "pinboard --user 1 search 10                     # My sets, excluding entity 10",
            "pinboard --user 2 search 10 --all               # Every set I may pin into",
            "pinboard --user 2 search 10 --all -Q vacation   # Filter by title or description",
        ],
    },
    ExampleGroup {
        title: "Debugging",
        commands: &["pinboard --user 2 search 10 --all --explain     # Print the generated query"],
    },
];

#[derive(Args)]
pub struct SearchArgs {
    /// Entity the picker is opened for; it never appears in the results
    pub entity: Guid,

    /// Case-insensitive text matched against title and description
    #[arg(short = 'Q', long)]
    pub query: Option<String>,

    /// Include every set the user may write to, not only their own
    #[arg(long)]
    pub all: bool,

    /// Print the query instead of running it
    #[arg(long)]
    pub explain: bool,
}

impl SearchArgs {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            entity_guid: Some(self.entity),
            query: self.query.clone(),
            filter_mine: Some(if self.all { "false" } else { "true" }.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct SearchRow {
    pub guid: Guid,
    pub title: String,
    pub owner_guid: Guid,
    pub write_access: String,
    pub time_created: DateTime<Utc>,
}

impl From<SetEntity> for SearchRow {
    fn from(set: SetEntity) -> Self {
        Self {
            guid: set.guid,
            title: set.title,
            owner_guid: set.owner_guid,
            write_access: set.write_access_id.to_string(),
            time_created: set.time_created,
        }
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct SearchResults(pub Vec<SearchRow>);

impl TableDisplay for SearchResults {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Guid", options),
            header_cell("Title", options),
            header_cell("Owner", options),
            header_cell("Write access", options),
            header_cell("Created", options),
        ]);
        for row in &self.0 {
            table.add_row(vec![
                row.guid.to_string(),
                row.title.clone(),
                row.owner_guid.to_string(),
                row.write_access.clone(),
                row.time_created.format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|row| format!("{}:{}", row.guid, row.title))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn handle_search(args: SearchArgs, backend: &Backend, user: Option<Guid>, output: &OutputManager) -> Result<()> {
    let host = backend.host();
    let session = session_for(host, user, output)?;
    let query = args
        .request()
        .build(host, session.user())
        .map_err(report)?;

    if args.explain {
        if output.options.output_format == crate::output::OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&query)?);
        } else {
            output.heading("Search query");
            for line in query.describe() {
                output.plain(&format!("  {line}"));
            }
        }
        return Ok(());
    }

    let results = host.query_sets(&query)?;
    if results.is_empty() {
        output.info("No sets found");
        return Ok(());
    }
    output.verbose(&format!("{} set(s) found", results.len()));
    output.display(&SearchResults(results.into_iter().map(SearchRow::from).collect()))
}
