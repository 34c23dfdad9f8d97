use cascade::cascade;
use std::{
    io,
    process::{Command, Stdio},
};

/// The captured result of an external command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Captured {
    pub success: bool,
    pub stdout:  String,
    pub stderr:  String,
}

impl Captured {
    pub fn ok(stdout: &str) -> Self {
        Captured { success: true, stdout: stdout.to_owned(), stderr: String::new() }
    }

    /// Converts an unsuccessful run into an error, keeping the output of a successful one.
    pub fn into_result(self, program: &str) -> io::Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} failed: {}", program, self.stderr.trim()),
            ))
        }
    }
}

/// Executes the external tools that the probes read from.
///
/// A missing program must be reported as an `io::ErrorKind::NotFound` error.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], envs: &[(&str, &str)]) -> io::Result<Captured>;
}

impl<'a, R: CommandRunner + ?Sized> CommandRunner for &'a R {
    fn run(&self, program: &str, args: &[&str], envs: &[(&str, &str)]) -> io::Result<Captured> {
        (**self).run(program, args, envs)
    }
}

/// Runs commands on the host, waiting for them to exit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], envs: &[(&str, &str)]) -> io::Result<Captured> {
        let mut cmd = cascade! {
            Command::new(program);
            ..args(args);
            ..envs(envs.iter().copied());
            ..stdin(Stdio::null());
            ..stdout(Stdio::piped());
            ..stderr(Stdio::piped());
        };

        debug!("executing {:?}", cmd);
        let output = cmd.output()?;

        Ok(Captured {
            success: output.status.success(),
            stdout:  String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr:  String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_not_found() {
        let error = SystemRunner.run("gpu-detect-no-such-program", &[], &[]).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn failure_into_error() {
        let failed = Captured { success: false, stdout: String::new(), stderr: "boom\n".into() };
        assert_eq!(failed.into_result("lspci").unwrap_err().to_string(), "lspci failed: boom");
        assert!(Captured::ok("fine").into_result("lspci").is_ok());
    }
}
