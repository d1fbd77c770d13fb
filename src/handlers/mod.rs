// Handlers are grouped by the access they require:
// public (no session), protected (session), admin (session with admin rights).
// Guards are the `AuthUser`/`AdminUser` extractors in each handler signature.

pub mod admin;
pub mod extract;
pub mod protected;
pub mod public;

pub use extract::{JsonBody, PathId, QueryParams};
