#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

/// Copies fixture logs from `data/test` into a fresh directory.
pub fn fixture_dir(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        fs::copy(Path::new("data/test").join(file), dir.path().join(file))
            .unwrap();
    }
    dir
}

pub fn fixture(file: &str) -> PathBuf {
    PathBuf::from("data/test").join(file)
}

/// A stand-in solver: appends `<instance>;<value>` to `<method>Results.txt`
/// in the current directory, with the value derived from the time limit.
#[cfg(unix)]
pub fn fake_solver(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake_solver.sh");
    fs::write(
        &path,
        "#!/bin/sh\n\
         case \"$1\" in GA3) exit 2 ;; esac\n\
         echo \"$3;$2;0.1\" >> \"$1Results.txt\"\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}
