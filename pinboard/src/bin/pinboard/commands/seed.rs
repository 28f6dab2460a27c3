use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pinboard::{MemoryHost, RedisHost, host::Fixture};

use crate::context::{BackendKind, PinboardConfig};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Seeding",
    commands: &[
        "pinboard seed demos/fixture.json            # Load into the configured store",
        "pinboard seed demos/fixture.json --reset    # Clear the Redis prefix first",
    ],
}];

#[derive(Args)]
pub struct SeedArgs {
    /// JSON fixture with entities, relationships and access collections
    pub fixture: PathBuf,

    /// Delete existing keys under the configured prefix first (redis backend)
    #[arg(long)]
    pub reset: bool,
}

fn read_fixture(path: &Path) -> Result<Fixture> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn handle_seed(args: SeedArgs, config: &PinboardConfig, output: &OutputManager) -> Result<()> {
    let fixture = read_fixture(&args.fixture)?;
    output.verbose(&format!(
        "Fixture holds {} entities and {} relationships",
        fixture.entities.len(),
        fixture.relationships.len()
    ));

    match config.store.backend {
        BackendKind::Memory => {
            let target = PathBuf::from(&config.store.fixture);
            let host = MemoryHost::from_fixture(fixture);
            host.save(&target)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            output.success(&format!("Seeded memory store at {}", target.display()));
        }
        BackendKind::Redis => {
            let url = config.redis_url()?;
            let mut host =
                RedisHost::connect(&url, config.store.prefix.clone()).context("Failed to connect to Redis")?;
            if args.reset {
                let removed = host.cleanup()?;
                output.info(&format!("Removed {removed} keys under '{}'", config.store.prefix));
            }
            let imported = host.import(&fixture)?;
            output.success(&format!("Imported {imported} entities under '{}'", config.store.prefix));
        }
    }
    Ok(())
}
