use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::simulated::AMR_SIGNATURE;
use crate::error::{RecorderError, RecorderResult};

/// Append the audio of `addition` onto the end of `target`
///
/// AMR files are a header followed by self-delimiting frames, so joining
/// two recordings only needs the second header dropped. `addition` is left
/// untouched.
pub fn append_amr(target: &Path, addition: &Path) -> RecorderResult<()> {
    let target_header = read_header(target)?;
    if target_header != AMR_SIGNATURE {
        return Err(RecorderError::IllegalArgument(format!(
            "{} is not an AMR file",
            target.display()
        )));
    }

    let bytes = fs::read(addition)?;
    let frames = bytes.strip_prefix(AMR_SIGNATURE).ok_or_else(|| {
        RecorderError::IllegalArgument(format!("{} is not an AMR file", addition.display()))
    })?;

    let mut out = OpenOptions::new().append(true).open(target)?;
    out.write_all(frames)?;
    out.flush()?;

    info!(
        "Appended {} bytes of AMR frames from {} to {}",
        frames.len(),
        addition.display(),
        target.display()
    );

    Ok(())
}

fn read_header(path: &Path) -> RecorderResult<Vec<u8>> {
    let bytes = fs::read(path)?;
    Ok(bytes.into_iter().take(AMR_SIGNATURE.len()).collect())
}
