//! Demo commands.

use std::convert::Infallible;

use parking_lot::Mutex;
use relay::prelude::*;

// ============================================================================
// ping: prefix and slash, named after its entry point
// ============================================================================

pub struct Ping;

impl Ping {
    async fn ping(self: Arc<Self>, event: CommandEvent) -> String {
        format!("pong ({})", event.style())
    }
}

pub fn ping() -> CommandClass {
    CommandClass::new(Ping)
        .annotate(Annotation::prefix_command("", "Replies with pong"))
        .annotate(Annotation::slash_command("", "Replies with pong"))
        .method(MethodMeta::new("ping", Ping::ping).main())
}

// ============================================================================
// say: hybrid, options inferred from parameter types
// ============================================================================

pub struct Say;

impl Say {
    async fn say(
        self: Arc<Self>,
        _event: CommandEvent,
        text: String,
        times: Option<i64>,
        loud: Option<bool>,
    ) -> String {
        let text = if loud == Some(true) {
            text.to_uppercase()
        } else {
            text
        };
        let times = usize::try_from(times.unwrap_or(1)).unwrap_or(1).clamp(1, 5);
        vec![text; times].join(" ")
    }
}

pub fn say() -> CommandClass {
    let style = CommandStyle::Hybrid;
    CommandClass::new(Say)
        .annotate(Annotation::hybrid_command("say", "Repeat some text"))
        .method(
            MethodMeta::new("say", Say::say)
                .main()
                .param(
                    0,
                    [Annotation::option(style, "text", "Text to repeat"), Annotation::Required],
                )
                .param(1, [Annotation::option(style, "times", "Repetitions")])
                .param(2, [Annotation::option(style, "loud", "Shout it")]),
        )
}

// ============================================================================
// note: slash, subcommands plus an `admin` group
// ============================================================================

#[derive(Default)]
pub struct Notes {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Notes {
    async fn add(self: Arc<Self>, _event: CommandEvent, text: String) -> String {
        let mut entries = self.entries.lock();
        entries.push(text);
        format!("Saved note #{}", entries.len())
    }

    async fn list(self: Arc<Self>, event: CommandEvent) -> Result<(), BoxError> {
        let listing = {
            let entries = self.entries.lock();
            if entries.is_empty() {
                "No notes yet".to_string()
            } else {
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, note)| format!("{}. {note}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };
        event.reply_ephemeral(&listing).await?;
        Ok(())
    }
}

pub struct NotesAdmin {
    entries: Arc<Mutex<Vec<String>>>,
}

impl NotesAdmin {
    async fn clear(self: Arc<Self>, _event: CommandEvent) -> String {
        let removed = std::mem::take(&mut *self.entries.lock()).len();
        format!("Removed {removed} notes")
    }
}

pub fn note() -> CommandClass {
    let style = CommandStyle::Slash;
    let notes = Notes::default();
    let entries = Arc::clone(&notes.entries);

    CommandClass::new(notes)
        .annotate(Annotation::slash_command("note", "Keep short notes"))
        .method(
            MethodMeta::new("add", Notes::add)
                .annotate(Annotation::subcommand(style, "", "Save a note"))
                .param(
                    0,
                    [Annotation::option(style, "text", "Note text"), Annotation::Required],
                ),
        )
        .method(
            MethodMeta::new("list", Notes::list)
                .annotate(Annotation::subcommand(style, "", "Show saved notes")),
        )
        .group(
            GroupClass::with_constructor(move || {
                Ok::<_, Infallible>(NotesAdmin {
                    entries: Arc::clone(&entries),
                })
            })
            .annotate(Annotation::group(style, "admin", "Manage notes"))
            .method(
                MethodMeta::new("clear", NotesAdmin::clear)
                    .annotate(Annotation::subcommand(style, "", "Delete every note")),
            ),
        )
}

/// Every demo command.
pub fn all() -> Vec<CommandClass> {
    vec![ping(), say(), note()]
}
