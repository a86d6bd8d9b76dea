mod catalog;
mod qualified_id;
mod record;
mod release;
mod status;
pub mod version;

pub use catalog::{Catalog, FileEntry, PackageDescriptor};
pub use qualified_id::{AndGroup, CoreProgram, OrGroup, QualifiedId, VersionConstraint};
pub use record::{CoreVersions, InstalledRecord};
pub use release::{FileIntegrity, IntegrityAlgorithm, ReleaseInfo, ReleaseIntegrity};
pub use status::InstallationStatus;
pub use version::{compare_versions, satisfies, VersionOp};
