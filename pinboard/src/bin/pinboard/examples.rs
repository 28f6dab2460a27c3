use crate::commands::{form, pins, search, seed};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "pin",
            groups: pins::PIN_EXAMPLES,
        },
        CommandExample {
            name: "unpin",
            groups: pins::UNPIN_EXAMPLES,
        },
        CommandExample {
            name: "search",
            groups: search::EXAMPLES,
        },
        CommandExample {
            name: "seed",
            groups: seed::EXAMPLES,
        },
        CommandExample {
            name: "form",
            groups: form::EXAMPLES,
        },
    ]
}
