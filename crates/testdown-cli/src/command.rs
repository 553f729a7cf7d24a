use anyhow::{Context, Result, bail};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use testdown::{Assertion, Output};

/// Produces an assertion's output by running an external program.
///
/// The input is written to the program's stdin and whatever it prints to
/// stdout is the actual output. The program runs in `dir`, usually the root
/// the documents were loaded from.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
}

impl CommandOutput {
    /// `argv` is the program followed by its arguments.
    pub fn new(argv: &[String], dir: impl Into<PathBuf>) -> Result<Self> {
        let Some((program, args)) = argv.split_first() else {
            bail!("no output command configured");
        };

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            dir: dir.into(),
        })
    }
}

impl Output for CommandOutput {
    fn output(&self, assertion: &Assertion) -> Result<String> {
        log::debug!("{}:{}: running {}", assertion.file, assertion.line, self.program);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.dir)
            .env("TESTDOWN_FILE", assertion.file.as_str())
            .env("TESTDOWN_LINE", assertion.line.to_string())
            .env("TESTDOWN_INPUT_LANGUAGE", &assertion.input_language)
            .env("TESTDOWN_OUTPUT_LANGUAGE", &assertion.output_language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program))?;

        // Input is written from its own thread while stdout is drained.
        // Dropping stdin closes it so the program sees end of input.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = assertion.input.clone();
            thread::spawn(move || match stdin.write_all(input.as_bytes()) {
                // The program may exit without reading all of its input.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                result => result,
            })
        });

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for {}", self.program))?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(result) => result
                    .with_context(|| format!("failed to write input to {}", self.program))?,
                Err(_) => bail!("input writer for {} panicked", self.program),
            }
        }

        if !output.status.success() {
            bail!(
                "{} exited with {}\n{}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("{} printed invalid UTF-8", self.program))
    }
}
