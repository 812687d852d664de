use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::{fs, io};

fn tmp_path(path: &Path) -> PathBuf {
    let mut file_name = OsString::from(".");
    file_name.push(path.file_name().unwrap_or_default());
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

/// Writes `data` next to `path` first and renames it into place, so readers see
/// either the previous file or the complete new one.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

pub fn copy_atomic(from: &Path, to: &Path) -> io::Result<()> {
    let data = fs::read(from)?;
    write_atomic(to, &data)
}
