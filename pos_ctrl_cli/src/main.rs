//! # Position Control Command Line
//!
//! Sends position control requests to the position control exec.
//!
//! With a command (`goto <x> <y>` or `stop`) a single request is sent and the exit code reports
//! whether it was acknowledged. Without a command an interactive prompt is started.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod client;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use rustyline::{error::ReadlineError, DefaultEditor};
use structopt::{clap, StructOpt};

use client::PosCtrlClient;
use comms_if::{
    net::zmq,
    tc::{PosCtrlCmd, PosCtrlResponse},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "pos_ctrl $ ";
const HISTORY_PATH: &str = "data/pos_ctrl_history.txt";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "pos_ctrl_cli", about = "Send requests to the position control exec")]
struct Opts {
    /// Endpoint of the position control exec
    #[structopt(short, long, default_value = "tcp://localhost:5100")]
    endpoint: String,

    /// Time to wait for the exec to acknowledge a request
    #[structopt(short, long, default_value = "1000")]
    timeout_ms: i32,

    #[structopt(subcommand)]
    cmd: Option<PosCtrlCmd>,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    let ctx = zmq::Context::new();
    let client = PosCtrlClient::new(&ctx, &opts.endpoint, opts.timeout_ms)
        .wrap_err("Failed to initialise the client")?;

    match opts.cmd {
        Some(cmd) => match client.send(&cmd.into()) {
            Ok(PosCtrlResponse::Ack) => {
                println!("Ack");
                Ok(())
            }
            Ok(PosCtrlResponse::Invalid) => Err(eyre!("The exec rejected the request as invalid")),
            Err(e) => Err(e).wrap_err("Request failed"),
        },
        None => interactive(&client),
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read commands from a prompt until interrupted.
fn interactive(client: &PosCtrlClient) -> Result<()> {
    let mut rl = DefaultEditor::new().wrap_err("Failed to start the prompt")?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).wrap_err("Could not read from the prompt"),
        };

        rl.add_history_entry(line.as_str()).ok();

        match parse_line(&line) {
            Ok(Some(cmd)) => match client.send(&cmd.into()) {
                Ok(response) => println!("{:?}", response),
                Err(e) => println!("{}", e),
            },
            Ok(None) => (),
            Err(LineError::Exit) => break,
            Err(LineError::Clap(e)) => println!("{}", e),
        }
    }

    if rl.save_history(HISTORY_PATH).is_err() {
        println!("Could not save history to {}", HISTORY_PATH);
    }

    Ok(())
}

/// Parse a line entered at the prompt.
///
/// Returns `Ok(None)` for an empty line.
fn parse_line(line: &str) -> Result<Option<PosCtrlCmd>, LineError> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.first() {
        None => Ok(None),
        Some(&"exit") | Some(&"quit") => Err(LineError::Exit),
        Some(_) => PosCtrlCmd::from_iter_safe(std::iter::once("pos_ctrl").chain(words))
            .map(Some)
            .map_err(LineError::Clap),
    }
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
enum LineError {
    Exit,
    Clap(clap::Error),
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert!(matches!(parse_line("  "), Ok(None)));
        assert!(matches!(parse_line("quit"), Err(LineError::Exit)));
        assert!(matches!(parse_line("stop"), Ok(Some(PosCtrlCmd::Stop))));

        match parse_line("goto 1.5 -2") {
            Ok(Some(PosCtrlCmd::Goto { x, y })) => {
                assert_eq!(x, 1.5);
                assert_eq!(y, -2.0);
            }
            r => panic!("Unexpected result {:?}", r),
        }

        assert!(matches!(parse_line("goto 1.5"), Err(LineError::Clap(_))));
        assert!(matches!(parse_line("fly"), Err(LineError::Clap(_))));
    }

    #[test]
    fn test_opts() {
        let opts = Opts::from_iter_safe(&["pos_ctrl_cli", "--timeout-ms", "250", "stop"]).unwrap();

        assert_eq!(opts.endpoint, "tcp://localhost:5100");
        assert_eq!(opts.timeout_ms, 250);
        assert!(matches!(opts.cmd, Some(PosCtrlCmd::Stop)));
    }
}
