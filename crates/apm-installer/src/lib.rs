mod integrity;
mod layout;
mod record_store;
mod scan;

pub use integrity::{
    detect_installed_release, sha256_hex, sha256_hex_file, sha256_hex_reader,
    verify_file_integrity,
};
pub use layout::InstallLayout;
pub use record_store::{read_installed_record, write_installed_record};
pub use scan::{
    scan_installed_files, ScanOptions, DEFAULT_EXCLUDED_FILES, DEFAULT_TRACKED_EXTENSIONS,
};
