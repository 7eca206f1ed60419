use std::env::VarError;

use anyhow::{Result, bail};


fn var_result(name: &str, r: Result<String, VarError>) -> Result<Option<String>> {
    match r {
        Ok(s) => Ok(Some(s)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => bail!("{name:?} env var is not unicode"),
    }
}

/// Get an env var as a String; decoding failures are reported as
/// errors.
pub fn getenv(name: &str) -> Result<Option<String>> {
    var_result(name, std::env::var(name))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_getenv() {
        // a name nobody sets
        let name = "PORTAL_UTIL_TEST_SURELY_UNSET";
        assert_eq!(getenv(name).unwrap(), None);
    }

    #[test]
    fn t_var_result() {
        assert_eq!(var_result("X", Ok("1".into())).unwrap(), Some("1".into()));
        let err = var_result("X", Err(VarError::NotUnicode("\u{0}".into()))).err().unwrap();
        assert!(err.to_string().contains("not unicode"));
    }
}
