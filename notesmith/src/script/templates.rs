//! AppleScript templates for Notes operations.
//!
//! Every caller-supplied value is spliced in with
//! [`EscapedLiteral::quoted`]. List templates return one name per line.

use notesmith_core::EscapedLiteral;

use super::Script;

/// Wraps statements in a `tell application "Notes"` block.
fn tell_notes(name: &'static str, statements: &[String]) -> Script {
    let mut source = String::from("tell application \"Notes\"\n");
    for statement in statements {
        source.push('\t');
        source.push_str(statement);
        source.push('\n');
    }
    source.push_str("end tell\n");
    Script::new(name, source)
}

/// Returns a reference to a note by name, optionally scoped to a folder.
fn note_ref(title: &EscapedLiteral, folder: Option<&EscapedLiteral>) -> String {
    match folder {
        Some(folder) => format!("note {} of folder {}", title.quoted(), folder.quoted()),
        None => format!("note {}", title.quoted()),
    }
}

/// Lists every element of a query, one name per line.
fn joined_names(query: &str) -> [String; 3] {
    [
        "set AppleScript's text item delimiters to linefeed".to_string(),
        format!("set matches to {query}"),
        "return matches as text".to_string(),
    ]
}

/// Lists folder names.
#[must_use]
pub fn list_folders() -> Script {
    tell_notes("list-folders", &joined_names("name of every folder"))
}

/// Creates a folder and returns its name.
#[must_use]
pub fn create_folder(name: &EscapedLiteral) -> Script {
    tell_notes(
        "create-folder",
        &[
            format!(
                "set newFolder to make new folder with properties {{name:{}}}",
                name.quoted()
            ),
            "return name of newFolder".to_string(),
        ],
    )
}

/// Lists note names in `folder`, or in every folder.
#[must_use]
pub fn list_notes(folder: Option<&EscapedLiteral>) -> Script {
    let query = match folder {
        Some(folder) => format!("name of every note of folder {}", folder.quoted()),
        None => "name of every note".to_string(),
    };
    tell_notes("list-notes", &joined_names(&query))
}

/// Lists names of notes whose title or body contains `query`.
#[must_use]
pub fn search_notes(query: &EscapedLiteral) -> Script {
    let quoted = query.quoted();
    let query = format!("name of every note whose name contains {quoted} or body contains {quoted}");
    tell_notes("search-notes", &joined_names(&query))
}

/// Returns the HTML body of a note.
#[must_use]
pub fn show_note(title: &EscapedLiteral, folder: Option<&EscapedLiteral>) -> Script {
    tell_notes(
        "show-note",
        &[format!("return body of {}", note_ref(title, folder))],
    )
}

/// Creates a note in `folder` and returns its name.
#[must_use]
pub fn create_note(title: &EscapedLiteral, body: &EscapedLiteral, folder: &EscapedLiteral) -> Script {
    tell_notes(
        "create-note",
        &[
            format!(
                "set newNote to make new note at folder {} with properties {{name:{}, body:{}}}",
                folder.quoted(),
                title.quoted(),
                body.quoted()
            ),
            "return name of newNote".to_string(),
        ],
    )
}

/// Replaces a note's body, optionally renaming it, and returns its name.
#[must_use]
pub fn update_note(
    title: &EscapedLiteral,
    body: &EscapedLiteral,
    new_title: Option<&EscapedLiteral>,
    folder: Option<&EscapedLiteral>,
) -> Script {
    let mut statements = vec![
        format!("set theNote to {}", note_ref(title, folder)),
        format!("set body of theNote to {}", body.quoted()),
    ];
    if let Some(new_title) = new_title {
        statements.push(format!("set name of theNote to {}", new_title.quoted()));
    }
    statements.push("return name of theNote".to_string());
    tell_notes("update-note", &statements)
}

/// Deletes a note.
#[must_use]
pub fn delete_note(title: &EscapedLiteral, folder: Option<&EscapedLiteral>) -> Script {
    tell_notes("delete-note", &[format!("delete {}", note_ref(title, folder))])
}
