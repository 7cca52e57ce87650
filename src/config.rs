// Runtime configuration flags
//
// Process-level knobs consumed by the collaborator objects (connection
// cache defaults, diagnostics pages). Values are fixed once the struct is
// built; everything downstream takes a reference or a clone.

use std::path::PathBuf;

/// Runtime-configurable process flags with their defaults.
#[derive(Debug, Clone)]
pub struct Flags {
    /// Host of the default file-system connection.
    pub default_fs_host: String,
    /// Port of the default file-system connection (0 selects the
    /// connector's own default).
    pub default_fs_port: u16,
    /// Byte budget for the log tail shown on the diagnostics log page.
    pub web_log_bytes: u64,
    /// Path of the process log file backing the diagnostics log page.
    pub log_path: PathBuf,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            default_fs_host: String::from("default"),
            default_fs_port: 0,
            web_log_bytes: 1024 * 1024,
            log_path: PathBuf::from("scanner.log"),
        }
    }
}

impl Flags {
    /// Name/value pairs for every flag, in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("default_fs_host", self.default_fs_host.clone()),
            ("default_fs_port", self.default_fs_port.to_string()),
            ("web_log_bytes", self.web_log_bytes.to_string()),
            ("log_path", self.log_path.display().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let flags = Flags::default();
        assert_eq!(flags.default_fs_host, "default");
        assert_eq!(flags.default_fs_port, 0);
        assert_eq!(flags.web_log_bytes, 1024 * 1024);
    }

    #[test]
    fn entries_cover_every_flag() {
        let flags = Flags::default();
        let entries = flags.entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().any(|(name, value)| {
            *name == "web_log_bytes" && value == "1048576"
        }));
    }
}
