use anyhow::Result;
use clap::Args;
use comfy_table::Table;
use pinboard::{Guid, PinAction, PinChange, PinManager, pins};
use serde::Serialize;

use super::{report, session_for};
use crate::context::Backend;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, header_cell};

pub const PIN_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Pinning",
    commands: &[
        "pinboard --user 1 pin 10 20                 # Pin entity 10 into set 20",
        "pinboard --user 4 pin 10 20 --as-user 1     # Administrator pins on behalf of user 1",
    ],
}];

pub const UNPIN_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Unpinning",
    commands: &["pinboard --user 1 unpin 10 20               # Remove entity 10 from set 20"],
}];

#[derive(Args)]
pub struct PinArgs {
    /// Entity to pin
    pub entity: Guid,

    /// Set to pin into
    pub set: Guid,

    /// User the change is made on behalf of (defaults to --user)
    #[arg(long = "as-user")]
    pub acting_user: Option<Guid>,
}

#[derive(Args)]
pub struct StatusArgs {
    pub entity: Guid,
    pub set: Guid,
}

#[derive(Serialize)]
pub struct PinOutcome {
    pub action: &'static str,
    pub entity: Guid,
    pub set: Guid,
    pub user: Option<Guid>,
    pub changed: bool,
}

impl PinOutcome {
    fn from_change(action: &'static str, change: &PinChange) -> Self {
        Self {
            action,
            entity: change.target.entity.guid(),
            set: change.target.set.guid,
            user: Some(change.target.user.guid),
            changed: change.changed,
        }
    }
}

impl TableDisplay for PinOutcome {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Action", options),
            header_cell("Entity", options),
            header_cell("Set", options),
            header_cell("User", options),
            header_cell("Changed", options),
        ]);
        table.add_row(vec![
            self.action.to_string(),
            self.entity.to_string(),
            self.set.to_string(),
            self.user.map(|guid| guid.to_string()).unwrap_or_else(|| "-".to_string()),
            self.changed.to_string(),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!("{} {} {} {}", self.action, self.entity, self.set, self.changed)
    }
}

fn run(action: PinAction, args: PinArgs, backend: &mut Backend, user: Option<Guid>, output: &OutputManager) -> Result<PinChange> {
    let session = session_for(backend.host(), user, output)?;
    let change = PinManager::new(backend.host_mut(), &session)
        .apply(action, args.entity, args.set, args.acting_user)
        .map_err(report)?;
    backend.flush()?;
    Ok(change)
}

pub fn handle_pin(args: PinArgs, backend: &mut Backend, user: Option<Guid>, output: &OutputManager) -> Result<()> {
    let change = run(PinAction::Pin, args, backend, user, output)?;
    let (entity, set) = (change.target.entity.display_title(), change.target.set.title.as_str());
    if change.changed {
        output.pinned(&format!("Pinned '{entity}' into '{set}'"));
    } else {
        output.info(&format!("'{entity}' was already pinned into '{set}'"));
    }
    output.display(&PinOutcome::from_change("pin", &change))
}

pub fn handle_unpin(args: PinArgs, backend: &mut Backend, user: Option<Guid>, output: &OutputManager) -> Result<()> {
    let change = run(PinAction::Unpin, args, backend, user, output)?;
    let (entity, set) = (change.target.entity.display_title(), change.target.set.title.as_str());
    if change.changed {
        output.success(&format!("Removed '{entity}' from '{set}'"));
    } else {
        output.warning(&format!("'{entity}' was not pinned into '{set}'"));
    }
    output.display(&PinOutcome::from_change("unpin", &change))
}

pub fn handle_status(args: StatusArgs, backend: &Backend, user: Option<Guid>, output: &OutputManager) -> Result<()> {
    let pinned = pins::is_pinned(backend.host(), args.entity, args.set).map_err(report)?;
    if pinned {
        output.pinned(&format!("{} is pinned into {}", args.entity, args.set));
    } else {
        output.info(&format!("{} is not pinned into {}", args.entity, args.set));
    }

    output.display(&PinOutcome {
        action: "status",
        entity: args.entity,
        set: args.set,
        user,
        changed: pinned,
    })
}
