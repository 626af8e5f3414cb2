/// Capture of the raw shadow copy listing.
///
/// The catalog only consumes text; this is the one place that knows the
/// text comes from `vssadmin list shadows`.
use crate::error::CatalogError;
use tracing::info;

/// Run `vssadmin list shadows` and return its standard output.
#[cfg(windows)]
pub fn capture_listing() -> Result<String, CatalogError> {
    use std::process::Command;

    info!("Capturing shadow copy listing with vssadmin");
    let output = Command::new("vssadmin.exe")
        .args(["list", "shadows"])
        .output()
        .map_err(|e| CatalogError::ListingCapture(format!("cannot run vssadmin: {e}")))?;

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() && text.trim().is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CatalogError::ListingCapture(format!(
            "vssadmin exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(text)
}

#[cfg(not(windows))]
pub fn capture_listing() -> Result<String, CatalogError> {
    info!("Shadow copy listing requested on a non-Windows host");
    Err(CatalogError::ListingCapture(
        "volume shadow copies are only available on Windows; supply a listing file instead".into(),
    ))
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn capture_is_unsupported_off_windows() {
        assert!(matches!(capture_listing(), Err(CatalogError::ListingCapture(_))));
    }
}
