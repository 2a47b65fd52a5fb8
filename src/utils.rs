use crate::error::{Error, Result};

/// Split an `owner/name` repository full name into its two parts
pub fn split_repo_full_name(repo_full_name: &str) -> Result<(String, String)> {
    let v: Vec<&str> = repo_full_name.split('/').collect();
    if v.len() != 2 || v.iter().any(|part| part.is_empty()) {
        return Err(Error::InvalidRepository(repo_full_name.to_string()));
    }
    Ok((v[0].to_string(), v[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_repo_full_name() {
        let (owner, name) = split_repo_full_name("microcai/gentoo-zh").unwrap();
        assert_eq!(owner, "microcai");
        assert_eq!(name, "gentoo-zh");
    }

    #[test]
    fn test_split_repo_full_name_rejects_malformed() {
        assert!(split_repo_full_name("gentoo-zh").is_err());
        assert!(split_repo_full_name("a/b/c").is_err());
        assert!(split_repo_full_name("/gentoo-zh").is_err());
    }
}
