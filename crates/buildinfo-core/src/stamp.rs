//! Content digest banner for generated files.
//!
//! The digest covers the body only, so a previously written file can be
//! recognised as up to date by looking for the digest string in its text.

use sha2::{Digest, Sha256};

pub const DIGEST_LABEL: &str = "SHA-256: ";

/// A rendered file: stamped text plus the digest of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub text: String,
    pub digest: String,
}

impl Artifact {
    /// Whether `existing` (the text currently on disk, if any) must be replaced.
    pub fn needs_write(&self, existing: Option<&str>) -> bool {
        needs_write(&self.digest, existing)
    }
}

/// Lowercase hex SHA-256 of the unstamped body.
pub fn digest(body: &str) -> String {
    Sha256::digest(body.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn stamp(body: &str) -> Artifact {
    let digest = digest(body);
    let rule = "*".repeat(77);
    let mut text = String::with_capacity(body.len() + 320);
    text.push_str(&format!("/*{rule}\n"));
    text.push_str(" * Generated by buildinfo. Do not edit.\n");
    text.push_str(" * The digest below is compared on regeneration to skip unchanged files.\n");
    text.push_str(&format!(" * {DIGEST_LABEL}{digest}\n"));
    text.push_str(&format!(" {rule}*/\n\n"));
    text.push_str(body);
    Artifact { text, digest }
}

pub fn needs_write(digest: &str, existing: Option<&str>) -> bool {
    match existing {
        Some(text) => !text.contains(digest),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_a_pure_function_of_the_body() {
        let a = stamp("int x;\n");
        let b = stamp("int x;\n");
        assert_eq!(a, b);
        assert_eq!(a.digest.len(), 64);
        assert!(a.text.contains(&format!("{DIGEST_LABEL}{}", a.digest)));
        assert!(a.text.ends_with("int x;\n"));
        assert_ne!(a.digest, stamp("int y;\n").digest);
    }

    #[test]
    fn skips_write_when_digest_already_present() {
        let a = stamp("int x;\n");
        assert!(a.needs_write(None));
        assert!(a.needs_write(Some("")));
        assert!(!a.needs_write(Some(&a.text)));
        let edited = format!("{} /* Append a comment. */\n", a.text);
        assert!(!a.needs_write(Some(&edited)));
        assert!(stamp("int y;\n").needs_write(Some(&a.text)));
    }
}
