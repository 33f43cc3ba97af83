//! The editor actor and its wire protocol.
//!
//! One actor per editor window. GUI shells send [`EditorRequest`]s and
//! render the [`EditorEvent`] stream; all state (sandbox root, directory
//! tree, open files, persisted session) lives behind the actor's mailbox so
//! concurrent requests always observe a consistent snapshot.

pub mod actor;
pub mod events;
pub mod requests;


pub use actor::{EditorActor, EditorActorBuilder};
pub use events::{EditorEvent, ErrorCode, ErrorInfo, EventSender};
pub use requests::EditorRequest;
