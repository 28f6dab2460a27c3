use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Table;
use pinboard::{
    Entity, EntityStore, Guid,
    form::{SetForm, StickyValues},
};

use crate::context::Backend;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, header_cell};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Edit Form",
    commands: &[
        "pinboard form                                         # Defaults for a new set",
        "pinboard form 20                                      # Values for set 20",
        "pinboard form 20 --sticky '{\"title\": \"Draft\"}'      # Replay a failed submission",
    ],
}];

#[derive(Args)]
pub struct FormArgs {
    /// Set being edited; omit for a new set
    pub set: Option<Guid>,

    /// JSON values from a failed submission
    #[arg(long)]
    pub sticky: Option<String>,
}

impl TableDisplay for SetForm {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Field", options), header_cell("Value", options)]);
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        table.add_row(vec!["title".to_string(), optional(&self.title)]);
        table.add_row(vec!["description".to_string(), optional(&self.description)]);
        table.add_row(vec!["access_id".to_string(), self.access_id.to_string()]);
        table.add_row(vec!["write_access_id".to_string(), self.write_access_id.to_string()]);
        table.add_row(vec!["comments_on".to_string(), format!("{:?}", self.comments_on)]);
        table.add_row(vec!["tags".to_string(), self.tags.join(", ")]);
        table.add_row(vec![
            "container_guid".to_string(),
            self.container_guid.map(|guid| guid.to_string()).unwrap_or_default(),
        ]);
        table.add_row(vec![
            "guid".to_string(),
            self.guid.map(|guid| guid.to_string()).unwrap_or_default(),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "title={} access={} write={}",
            self.title.as_deref().unwrap_or(""),
            self.access_id,
            self.write_access_id
        )
    }
}

pub fn handle_form(args: FormArgs, backend: &Backend, output: &OutputManager) -> Result<()> {
    let set = match args.set {
        Some(guid) => match backend.host().resolve_entity(guid)? {
            Some(Entity::Set(set)) => Some(set),
            _ => anyhow::bail!("{guid} is not a set"),
        },
        None => None,
    };
    let sticky: Option<StickyValues> = args
        .sticky
        .as_deref()
        .map(|raw| serde_json::from_str::<StickyValues>(raw))
        .transpose()
        .context("Failed to parse sticky values")?;

    output.display(&SetForm::prepare(set.as_ref(), sticky))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{memory_backend, quiet_output};
    use pinboard::AccessId;

    #[test]
    fn sticky_json_overrides_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let backend = memory_backend(dir.path());
        let args = FormArgs {
            set: Some(Guid::new(21)),
            sticky: Some(r#"{"title": "Draft", "write_access_id": 1}"#.to_string()),
        };

        handle_form(args, &backend, &quiet_output()).unwrap();
    }

    #[test]
    fn invalid_sticky_json_and_non_sets_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let backend = memory_backend(dir.path());
        let output = quiet_output();

        let bad_json = FormArgs {
            set: None,
            sticky: Some("{title".to_string()),
        };
        let err = handle_form(bad_json, &backend, &output).unwrap_err();
        assert!(err.to_string().contains("sticky"));

        let user = FormArgs {
            set: Some(Guid::new(1)),
            sticky: None,
        };
        assert!(handle_form(user, &backend, &output).is_err());
    }

    #[test]
    fn form_table_lists_every_field() {
        let form = SetForm::prepare(None, None);
        let options = GlobalOptions {
            no_color: true,
            ..GlobalOptions::default()
        };

        let table = form.to_table(&options).to_string();
        for field in ["title", "write_access_id", "comments_on", "container_guid", "guid"] {
            assert!(table.contains(field), "{field}");
        }
        assert_eq!(form.to_compact(), "title= access=default write=private");
        assert_eq!(form.write_access_id, AccessId::Private);
    }
}
