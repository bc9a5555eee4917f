//! Upload of discovered artists to the cvrs ingestion endpoint
//!
//! The endpoint is `POST {backend}/artists/add`, authenticated with a bearer
//! token, taking a multipart body with a `json` metadata field and an
//! optional `img` file part.

mod submitter;

pub use submitter::{metadata_json, ArtistMetadata, ArtistSubmission, IngestClient};
