use crate::error::signer::SignerError;
use crate::signer::Signer;

use std::io::ErrorKind;
use std::process::Stdio;

use log::{debug, info, warn};
use models::{Address, Signature};
use tokio::process::Command as TokioCommand;

const ADDRESS_COMMAND: &str = "address";
const SIGN_COMMAND: &str = "sign";

/// Exit status a wallet helper uses to report that the player declined.
pub const REJECTED_EXIT_CODE: i32 = 2;

/// Signer backed by an external wallet helper program.
///
/// The helper is invoked as `<program> [args..] address` and
/// `<program> [args..] sign <challenge> <address>` and prints its answer on the
/// first line of stdout. Exit status [`REJECTED_EXIT_CODE`] means the player
/// refused; any other failure means the wallet is unavailable. The child is
/// killed if the request future is dropped.
#[derive(Debug, Clone)]
pub struct CommandSigner {
    program: String,
    args: Vec<String>,
}

impl CommandSigner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_command(&self, trailing: &[&str]) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args)
            .args(trailing)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, trailing: &[&str]) -> Result<String, SignerError> {
        debug!("Invoking wallet helper {} {}", self.program, trailing[0]);

        let output = match self.build_command(trailing).output().await {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(SignerError::unavailable(format!(
                    "wallet helper '{}' not found",
                    self.program
                )));
            }
            Err(err) => {
                return Err(SignerError::unavailable(format!(
                    "failed to run wallet helper '{}': {err}",
                    self.program
                )));
            }
        };

        if output.status.code() == Some(REJECTED_EXIT_CODE) {
            info!("Wallet request '{}' rejected by user", trailing[0]);
            return Err(SignerError::rejected(format!(
                "'{}' request declined",
                trailing[0]
            )));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Wallet helper failed ({}): {}", output.status, stderr.trim());
            return Err(SignerError::unavailable(format!(
                "wallet helper exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let answer = stdout.lines().next().unwrap_or_default().trim().to_string();

        if answer.is_empty() {
            return Err(SignerError::unavailable(format!(
                "wallet helper printed nothing for '{}'",
                trailing[0]
            )));
        }

        Ok(answer)
    }
}

impl Signer for CommandSigner {
    async fn request_address(&self) -> Result<Address, SignerError> {
        let raw = self.run(&[ADDRESS_COMMAND]).await?;
        Address::parse(raw).map_err(|e| SignerError::unavailable(e.to_string()))
    }

    async fn sign(&self, challenge_text: &str, address: &Address) -> Result<Signature, SignerError> {
        let raw = self
            .run(&[SIGN_COMMAND, challenge_text, address.as_str()])
            .await?;
        Signature::new(raw).map_err(|e| SignerError::unavailable(e.to_string()))
    }
}
