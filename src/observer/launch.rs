//! How the observed program is started.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use std::process::Command;

/// Program, arguments, and whether a shell sits in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    program: PathBuf,
    args: Vec<OsString>,
    via_shell: bool,
}

impl Launch {
    /// The program is the observer's child.
    pub fn direct(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            via_shell: false,
        }
    }

    /// The program runs under `sh -c`, making it the observer's grandchild.
    pub fn via_shell(program: impl Into<PathBuf>) -> Self {
        Self {
            via_shell: true,
            ..Self::direct(program)
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn is_via_shell(&self) -> bool {
        self.via_shell
    }

    /// Command for this launch, without stdio configuration.
    pub fn command(&self) -> Command {
        if self.via_shell {
            let mut command = Command::new("sh");
            command.arg("-c").arg(self.shell_script());
            command
        } else {
            let mut command = Command::new(&self.program);
            command.args(&self.args);
            command
        }
    }

    /// `<program> <args>; exit $?` keeps the shell alive as the parent: a
    /// trailing command after the program stops shells from exec-ing it in
    /// place.
    fn shell_script(&self) -> String {
        let mut words = vec![shell_quote(self.program.as_os_str())];
        words.extend(self.args.iter().map(|arg| shell_quote(arg)));
        format!("{}; exit $?", words.join(" "))
    }
}

fn shell_quote(word: &OsStr) -> String {
    format!("'{}'", word.to_string_lossy().replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_launch_keeps_shell_as_parent() {
        let launch = Launch::via_shell("/opt/bin/graceful-worker");
        assert_eq!(launch.shell_script(), "'/opt/bin/graceful-worker'; exit $?");
    }

    #[test]
    fn shell_launch_quotes_arguments() {
        let launch = Launch::via_shell("/opt/bin/graceful-worker")
            .arg("--config")
            .arg("/tmp/it's here.toml");
        assert_eq!(
            launch.shell_script(),
            r"'/opt/bin/graceful-worker' '--config' '/tmp/it'\''s here.toml'; exit $?"
        );
    }

    #[test]
    fn direct_launch_passes_arguments_through() {
        let launch = Launch::direct("/bin/echo").arg("hello");
        assert!(!launch.is_via_shell());
        assert_eq!(launch.program(), Path::new("/bin/echo"));

        let command = launch.command();
        assert_eq!(command.get_program(), "/bin/echo");
        assert_eq!(command.get_args().collect::<Vec<_>>(), ["hello"]);
    }
}
