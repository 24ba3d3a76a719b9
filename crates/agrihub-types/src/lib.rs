//! Shared records for the agrihub portal: the rows stored in the hosted
//! backend, the payloads used to insert them, the acting user, and the
//! `{success, data | error}` envelope every data-access call returns.

pub mod api;
pub mod envelope;
pub mod identity;
pub mod models;
pub mod money;

pub use envelope::Envelope;
pub use identity::Actor;
