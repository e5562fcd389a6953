//! Build output handling: discovery, directory archiving and upload.

pub mod compress;
pub mod discovery;
pub mod upload;

pub use compress::{ARCHIVE_PREFIX, archive_path, compress_directory};
pub use discovery::{DiscoveredArtifact, bundle_dir, discover};
pub use upload::{PlannedUpload, PreparedArtifact, plan_uploads, prepare_artifacts, publish_artifacts, upload_artifacts};
