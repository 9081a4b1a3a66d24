// Resume records: upload, analysis hand-off, review retrieval and wipe.
// Records live in the KvStore, files in the BlobStore, both scoped by username.

pub mod handlers;
pub mod record;
pub mod upload;
