/// Elevation check.
///
/// Enumerating shadow copies and opening their device paths both require
/// an administrator token on Windows.

/// Whether the current process runs with an elevated (admin) token.
///
/// Any failure to query the token counts as "not elevated"; the caller
/// only uses this to warn before the listing step.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    match token::query_elevation() {
        Ok(elevated) => elevated,
        Err(e) => {
            tracing::debug!("Token elevation query failed: {e}");
            false
        }
    }
}

/// Shadow copies do not exist off Windows.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}

#[cfg(windows)]
mod token {
    use windows::core::Result;
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY};
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    /// Query access to this process's token, closed on drop.
    struct ProcessToken(HANDLE);

    impl ProcessToken {
        fn open() -> Result<Self> {
            let mut handle = HANDLE::default();
            // SAFETY: the pseudo-handle from GetCurrentProcess needs no
            // closing and `handle` outlives the call.
            unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut handle)? };
            Ok(Self(handle))
        }
    }

    impl Drop for ProcessToken {
        fn drop(&mut self) {
            // SAFETY: the handle was opened by `open` and is closed once.
            let _ = unsafe { CloseHandle(self.0) };
        }
    }

    pub(super) fn query_elevation() -> Result<bool> {
        let token = ProcessToken::open()?;
        let mut info = TOKEN_ELEVATION::default();
        let mut written = 0u32;
        // SAFETY: `info` is a TOKEN_ELEVATION and the length passed matches it.
        unsafe {
            GetTokenInformation(
                token.0,
                TokenElevation,
                Some(&mut info as *mut TOKEN_ELEVATION as *mut _),
                std::mem::size_of::<TOKEN_ELEVATION>() as u32,
                &mut written,
            )?;
        }
        Ok(info.TokenIsElevated != 0)
    }
}
