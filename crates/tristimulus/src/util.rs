/// Access to configuration variables.
///
/// The converter reads its strategy through this trait, so that tests can
/// substitute a fake for the process environment. Implementations only
/// provide the raw lookup.
pub(crate) trait Environment {
    /// Look up the variable's raw value.
    fn read_os(&self, key: &str) -> Option<std::ffi::OsString>;

    /// Look up the variable's value, which must be valid Unicode. A missing
    /// variable is [`VarError::NotPresent`](std::env::VarError::NotPresent).
    fn read(&self, key: &str) -> Result<String, std::env::VarError> {
        self.read_os(key).map_or_else(
            || Err(std::env::VarError::NotPresent),
            |s| s.into_string().map_err(std::env::VarError::NotUnicode),
        )
    }
}

/// The environment of the current process.
#[derive(Debug, Default)]
pub(crate) struct Env();

impl Environment for Env {
    fn read_os(&self, key: &str) -> Option<std::ffi::OsString> {
        std::env::var_os(key)
    }
}


#[cfg(test)]
pub(crate) use test::FakeEnv;
