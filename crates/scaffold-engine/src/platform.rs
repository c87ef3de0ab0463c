//! Host platform detection and per-platform command builders
//!
//! The platform is resolved once at startup and then handed to every component
//! that needs to build or classify a shell command.

use crate::error::EngineError;
use std::fmt;

/// Extra exit codes accepted as success, keyed by a substring of the command.
///
/// robocopy reports 0-7 for successful copies (1-7 describe what was copied)
/// and 8+ for failures. rmdir reports 2 when the directory is already absent.
const ACCEPTED_EXIT_CODES: &[(&str, &[i32])] = &[
    ("robocopy", &[1, 2, 3, 4, 5, 6, 7]),
    ("rmdir", &[2]),
];

/// Supported host platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// Map a host operating system identifier to a platform.
    ///
    /// Accepts both Rust's `std::env::consts::OS` names and the `darwin` /
    /// `win32` spellings used in install specs.
    pub fn from_host(os: &str) -> Result<Self, EngineError> {
        match os {
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" | "win32" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => Err(EngineError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// The platform this process is running on
    pub fn current() -> Result<Self, EngineError> {
        Self::from_host(std::env::consts::OS)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
        }
    }

    /// Shell program and the flag that makes it run a command string
    pub fn shell(&self) -> (&'static str, &'static str) {
        match self {
            Platform::Windows => ("cmd", "/C"),
            Platform::MacOs | Platform::Linux => ("sh", "-c"),
        }
    }

    /// Name of the system package manager used to install prerequisites
    pub fn package_manager(&self) -> &'static str {
        match self {
            Platform::MacOs | Platform::Linux => "brew",
            Platform::Windows => "choco",
        }
    }

    /// Command that installs the package manager itself
    pub fn package_manager_install_command(&self) -> String {
        match self {
            Platform::MacOs | Platform::Linux => {
                "/bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\""
                    .to_string()
            }
            Platform::Windows => {
                "powershell -NoProfile -ExecutionPolicy Bypass -Command \"iex ((New-Object System.Net.WebClient).DownloadString('https://community.chocolatey.org/install.ps1'))\""
                    .to_string()
            }
        }
    }

    /// Where to find package manager installation instructions
    pub fn package_manager_docs_url(&self) -> &'static str {
        match self {
            Platform::MacOs | Platform::Linux => "https://brew.sh",
            Platform::Windows => "https://chocolatey.org/install",
        }
    }

    pub fn open_url_command(&self, url: &str) -> String {
        match self {
            Platform::MacOs => format!("open {}", self.quote(url)),
            // `start` treats the first quoted argument as a window title
            Platform::Windows => format!("start \"\" \"{}\"", url),
            Platform::Linux => format!("xdg-open {}", self.quote(url)),
        }
    }

    /// Quote one argument for this platform's shell
    pub fn quote(&self, arg: &str) -> String {
        match self {
            Platform::MacOs | Platform::Linux => format!("'{}'", arg.replace('\'', "'\\''")),
            Platform::Windows => format!("\"{}\"", arg),
        }
    }

    /// Recursive copy of `source` into `dest`.
    ///
    /// Pass `dir/.` as the source on unix to include hidden files.
    pub fn copy_command(&self, source: &str, dest: &str) -> String {
        match self {
            Platform::MacOs | Platform::Linux => {
                format!("cp -R {} {}", self.quote(source), self.quote(dest))
            }
            Platform::Windows => {
                let source = source.strip_suffix("/.").unwrap_or(source);
                format!("robocopy {} {} /MIR", self.quote(source), self.quote(dest))
            }
        }
    }

    pub fn remove_dir_command(&self, path: &str) -> String {
        let path = self.quote(path);
        match self {
            Platform::MacOs | Platform::Linux => format!("rm -rf {}", path),
            Platform::Windows => format!("rmdir {} /s /q", path),
        }
    }

    /// Create a directory including missing parents
    pub fn make_dir_command(&self, path: &str) -> String {
        let path = self.quote(path);
        match self {
            Platform::MacOs | Platform::Linux => format!("mkdir -p {}", path),
            Platform::Windows => format!("if not exist {0} mkdir {0}", path),
        }
    }

    /// Remove a directory if present and recreate it empty
    pub fn recreate_dir_command(&self, path: &str) -> String {
        let path = self.quote(path);
        match self {
            Platform::MacOs | Platform::Linux => format!("rm -rf {0} && mkdir -p {0}", path),
            Platform::Windows => format!(
                "if exist {0} (rmdir {0} /s /q && mkdir {0}) else (mkdir {0})",
                path
            ),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Whether `code` counts as success for `command`.
///
/// Zero is always success; the table can only add codes.
pub fn accepts_exit_code(command: &str, code: i32) -> bool {
    if code == 0 {
        return true;
    }
    ACCEPTED_EXIT_CODES
        .iter()
        .filter(|(needle, _)| command.contains(needle))
        .any(|(_, codes)| codes.contains(&code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_host_supported() {
        assert_eq!(Platform::from_host("macos").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_host("darwin").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_host("windows").unwrap(), Platform::Windows);
        assert_eq!(Platform::from_host("win32").unwrap(), Platform::Windows);
        assert_eq!(Platform::from_host("linux").unwrap(), Platform::Linux);
    }

    #[test]
    fn test_from_host_unsupported() {
        for host in ["freebsd", "android", ""] {
            match Platform::from_host(host) {
                Err(EngineError::UnsupportedPlatform(name)) => assert_eq!(name, host),
                other => panic!("expected unsupported platform, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_copy_commands() {
        assert_eq!(
            Platform::Linux.copy_command("/tpl/base/.", "/work/app"),
            "cp -R '/tpl/base/.' '/work/app'"
        );
        assert_eq!(
            Platform::Windows.copy_command("C:/tpl/base/.", "C:/work/app"),
            "robocopy \"C:/tpl/base\" \"C:/work/app\" /MIR"
        );
    }

    #[test]
    fn test_directory_commands() {
        assert_eq!(Platform::MacOs.make_dir_command("a/b"), "mkdir -p 'a/b'");
        assert_eq!(Platform::Linux.remove_dir_command(".git"), "rm -rf '.git'");
        assert_eq!(
            Platform::Windows.remove_dir_command(".git"),
            "rmdir \".git\" /s /q"
        );
        assert_eq!(
            Platform::Linux.recreate_dir_command("cache"),
            "rm -rf 'cache' && mkdir -p 'cache'"
        );
        assert!(Platform::Windows
            .recreate_dir_command("cache")
            .starts_with("if exist \"cache\""));
    }

    #[test]
    fn test_quote_keeps_spaces_and_quotes_in_one_word() {
        assert_eq!(
            Platform::Linux.quote("/Users/John Doe/.sensible"),
            "'/Users/John Doe/.sensible'"
        );
        assert_eq!(Platform::MacOs.quote("it's"), "'it'\\''s'");
        assert_eq!(
            Platform::Windows.quote("C:/Users/John Doe"),
            "\"C:/Users/John Doe\""
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_recreate_dir_with_space_in_path() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("John Doe");
        let cache = home.join(".sensible/cache");
        let unrelated = tmp.path().join("Doe/.sensible/cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::create_dir_all(&unrelated).unwrap();
        std::fs::write(cache.join("old.txt"), "").unwrap();
        std::fs::write(unrelated.join("keep.txt"), "").unwrap();

        let command = Platform::Linux.recreate_dir_command(&cache.display().to_string());
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(tmp.path())
            .status()
            .unwrap();

        assert!(status.success());
        assert!(cache.is_dir());
        assert!(!cache.join("old.txt").exists());
        assert!(unrelated.join("keep.txt").exists());
        assert!(!tmp.path().join("John").exists());
    }

    #[test]
    fn test_package_manager() {
        assert_eq!(Platform::MacOs.package_manager(), "brew");
        assert_eq!(Platform::Linux.package_manager(), "brew");
        assert_eq!(Platform::Windows.package_manager(), "choco");
    }

    #[test]
    fn test_zero_always_accepted() {
        assert!(accepts_exit_code("yarn add cors", 0));
        assert!(accepts_exit_code("robocopy a b /MIR", 0));
    }

    #[test]
    fn test_robocopy_exit_codes() {
        let command = Platform::Windows.copy_command("C:/cache/.", "C:/work/app");
        assert!(accepts_exit_code(&command, 2));
        assert!(accepts_exit_code(&command, 7));
        assert!(!accepts_exit_code(&command, 8));
        assert!(!accepts_exit_code(&command, 16));
    }

    #[test]
    fn test_rmdir_missing_directory_accepted() {
        let command = Platform::Windows.remove_dir_command(".git");
        assert!(accepts_exit_code(&command, 2));
        assert!(!accepts_exit_code(&command, 1));
    }

    #[test]
    fn test_unlisted_command_nonzero_rejected() {
        assert!(!accepts_exit_code("cp -R a b", 2));
        assert!(!accepts_exit_code("git push -u origin live", 1));
    }
}
