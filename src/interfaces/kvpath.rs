use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::helpers::base_path;

pub static SQLITE_STORE: Lazy<PathBuf> =
    Lazy::new(|| base_path::DATA_DIR.join("kvs-db/kvstore.db"));

pub static POLL_LOCK: Lazy<PathBuf> = Lazy::new(|| base_path::DATA_DIR.join("poll.lock"));
