use anyhow::Context;
use std::path::Path;

/// Opens a file in a vault; [`open_in_vault`] outside of tests.
pub type Opener = fn(&str, &Path) -> anyhow::Result<()>;

pub fn open_uri(vault: &str, file: &Path) -> String {
    format!(
        "obsidian://open?vault={}&file={}",
        urlencoding::encode(vault),
        urlencoding::encode(&file.to_string_lossy())
    )
}

/// Hands the vault URI for `file` to the OS default handler.
pub fn open_in_vault(vault: &str, file: &Path) -> anyhow::Result<()> {
    let uri = open_uri(vault, file);
    log::info!("Opening {}", uri);
    open::that(&uri).with_context(|| format!("No handler accepted {}", uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_is_percent_encoded() {
        let uri = open_uri("my vault", Path::new("/home/me/obsidian/2026 List.md"));
        assert_eq!(
            uri,
            "obsidian://open?vault=my%20vault&file=%2Fhome%2Fme%2Fobsidian%2F2026%20List.md"
        );
    }
}
